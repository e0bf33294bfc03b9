//! Backend operations with the subscription rules applied.
//!
//! Creation calls count what the backend already holds and ask
//! [`EntitlementService`] before sending anything. Listings come back with
//! progress and the companion emotion attached.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::api::BackendClient;
use crate::clock::Clock;
use crate::emotion::{classify_project_progress_with_tasks, Emotion};
use crate::error::{CoreError, Result};
use crate::model::{percentage, NewProject, NewTask, Project, ProjectWithProgress, Task};
use crate::subscription::{EntitlementService, Limit};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectOverview {
    #[serde(flatten)]
    pub project: ProjectWithProgress,
    pub emotion: Emotion,
}

/// Every project, plus totals across all of them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Overview {
    pub projects: Vec<ProjectOverview>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Completed share of all tasks, 0.0..=100.0.
    pub overall_progress: f64,
}

pub struct Planner {
    client: BackendClient,
    entitlements: Arc<EntitlementService>,
    clock: Arc<dyn Clock>,
}

impl Planner {
    pub fn new(
        client: BackendClient,
        entitlements: Arc<EntitlementService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            entitlements,
            clock,
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Create a project unless the tier's project limit is reached.
    pub async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let count = self.client.list_projects().await?.len();
        if !self.entitlements.can_create_project(count) {
            return Err(limit_reached("project", self.entitlements.project_limit()));
        }
        let created = self.client.create_project(project).await?;
        info!(project_id = created.id, "project created");
        Ok(created)
    }

    /// Add a task unless the project is at the tier's task limit.
    pub async fn create_task(&self, project_id: i64, task: &NewTask) -> Result<Task> {
        let count = self.client.list_tasks(project_id).await?.len();
        if !self.entitlements.can_create_task(count) {
            return Err(limit_reached("task", self.entitlements.task_limit()));
        }
        let created = self.client.create_task(project_id, task).await?;
        info!(project_id, task_id = created.id, "task created");
        Ok(created)
    }

    pub async fn overview(&self) -> Result<Overview> {
        let now = self.clock.now();
        let projects: Vec<ProjectOverview> = self
            .client
            .list_projects()
            .await?
            .into_iter()
            .map(|project| {
                let view = ProjectWithProgress::from_project(project);
                ProjectOverview {
                    emotion: classify_project_progress_with_tasks(&view, now),
                    project: view,
                }
            })
            .collect();

        let total_tasks = projects.iter().map(|p| p.project.total_tasks).sum();
        let completed_tasks = projects.iter().map(|p| p.project.completed_tasks).sum();
        Ok(Overview {
            projects,
            total_tasks,
            completed_tasks,
            overall_progress: percentage(completed_tasks, total_tasks),
        })
    }
}

fn limit_reached(resource: &'static str, limit: Limit) -> CoreError {
    CoreError::LimitReached {
        resource,
        // Only bounded limits can refuse.
        limit: limit.as_option().unwrap_or(u32::MAX),
    }
}
