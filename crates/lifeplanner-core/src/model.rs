//! Project and task types as served by the LifePlanner backend.
//!
//! The backend owns these records; this crate only reads them. Enumerations
//! serialize to the backend's wire values (`pendiente`, `alta`, ...) and also
//! accept the English names.
//!
//! Due dates and deadlines are kept as the raw strings the backend sent.
//! They are parsed on use with [`parse_instant`], and a value that does not
//! parse is treated as "no date" rather than failing the whole payload.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    #[serde(rename = "baja", alias = "low")]
    Low,
    #[default]
    #[serde(rename = "media", alias = "medium")]
    Medium,
    #[serde(rename = "alta", alias = "high")]
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "pending")]
    Pending,
    #[serde(rename = "en_progreso", alias = "in_progress")]
    InProgress,
    #[serde(rename = "completada", alias = "completed")]
    Completed,
}

impl TaskStatus {
    /// The status a tap on the task's status chip moves it to.
    ///
    /// Cycles pending -> in progress -> completed -> pending.
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "activo", alias = "active")]
    Active,
    #[serde(rename = "en_pausa", alias = "paused")]
    Paused,
    #[serde(rename = "terminado", alias = "finished")]
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    pub project_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Due strictly before `now`. Missing or unparsable dates are never overdue.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        is_before(self.due_date.as_deref(), now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    /// Deadline strictly before `now`. Missing or unparsable dates are never past.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        is_before(self.deadline.as_deref(), now)
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed()).count()
    }
}

/// A project plus its derived completion figures.
///
/// Recomputed from the project's tasks on every listing; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectWithProgress {
    #[serde(flatten)]
    pub project: Project,
    /// Percentage of completed tasks, 0.0..=100.0.
    pub progress: f64,
    #[serde(rename = "totalTasks")]
    pub total_tasks: usize,
    #[serde(rename = "completedTasks")]
    pub completed_tasks: usize,
}

impl ProjectWithProgress {
    pub fn from_project(project: Project) -> Self {
        let total_tasks = project.tasks.len();
        let completed_tasks = project.completed_tasks();
        Self {
            progress: percentage(completed_tasks, total_tasks),
            total_tasks,
            completed_tasks,
            project,
        }
    }
}

impl From<Project> for ProjectWithProgress {
    fn from(project: Project) -> Self {
        Self::from_project(project)
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Body for `POST /projects/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewProject {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub status: ProjectStatus,
}

/// Body for `PATCH /projects/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

/// Body for `POST /tasks/project/{project_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<String>,
}

/// Body for `PUT /tasks/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Parse a backend date string.
///
/// Accepts RFC 3339 (`2026-01-01T00:00:00Z`), a naive date-time taken as local
/// time (`2026-01-01T09:30:00`, optionally with fractional seconds), and a
/// bare date taken as UTC midnight (`2026-01-01`). Anything else is `None`.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn is_before(raw: Option<&str>, now: DateTime<Utc>) -> bool {
    raw.and_then(parse_instant).is_some_and(|at| at < now)
}
