//! Companion emotion classification.
//!
//! Maps a task, a project, or a list of tasks to one [`Emotion`] so the UI
//! can pick the companion illustration and message. Every granularity goes
//! through the same [`RULES`] table: the subject is first reduced to its
//! [`Signals`], then the first rule whose signal is raised wins.
//!
//! | signal     | task                 | project                          | task list                           |
//! |------------|----------------------|----------------------------------|-------------------------------------|
//! | `finished` | status completed     | status finished or progress 100  | every task completed                |
//! | `overdue`  | due date before now  | deadline before now              | some unfinished task is overdue     |
//! | `urgent`   | priority high        | priority high                    | some unfinished task is high        |
//!
//! Nothing is cached: callers classify again whenever they render.

pub mod presentation;

pub use presentation::Companion;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Priority, Project, ProjectStatus, ProjectWithProgress, Task};

/// Display-only mood of the companion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Success,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Success,
        Emotion::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Success => "success",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition a subject can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Finished,
    Overdue,
    Urgent,
}

/// Precedence order. First raised signal wins.
pub const RULES: [(Signal, Emotion); 3] = [
    (Signal::Finished, Emotion::Success),
    (Signal::Overdue, Emotion::Sad),
    (Signal::Urgent, Emotion::Angry),
];

/// The signals a subject raises at a given instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub finished: bool,
    pub overdue: bool,
    pub urgent: bool,
}

impl Signals {
    pub fn raised(&self, signal: Signal) -> bool {
        match signal {
            Signal::Finished => self.finished,
            Signal::Overdue => self.overdue,
            Signal::Urgent => self.urgent,
        }
    }

    /// The emotion of the first matching rule, if any.
    pub fn resolve(&self) -> Option<Emotion> {
        RULES
            .iter()
            .find(|(signal, _)| self.raised(*signal))
            .map(|(_, emotion)| *emotion)
    }

    fn of_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            finished: task.is_completed(),
            overdue: task.is_past_due(now),
            urgent: task.priority == Priority::High,
        }
    }

    fn of_project(project: &Project, progress: Option<f64>, now: DateTime<Utc>) -> Self {
        let complete = progress.is_some_and(|p| (p - 100.0).abs() < f64::EPSILON);
        Self {
            finished: project.status == ProjectStatus::Finished || complete,
            overdue: project.is_past_deadline(now),
            urgent: project.priority == Some(Priority::High),
        }
    }

    fn of_task_list(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut open = tasks.iter().filter(|t| !t.is_completed()).peekable();
        let finished = open.peek().is_none();
        let (mut overdue, mut urgent) = (false, false);
        for task in open {
            overdue |= task.is_past_due(now);
            urgent |= task.priority == Priority::High;
        }
        Self {
            finished,
            overdue,
            urgent,
        }
    }
}

/// What is being classified.
///
/// `progress` is present when the project came with derived completion
/// figures (a [`ProjectWithProgress`]); a progress of 100 counts as finished.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Task(&'a Task),
    Project {
        project: &'a Project,
        progress: Option<f64>,
    },
    TaskList(&'a [Task]),
    /// Project-level signals first, then the project's tasks.
    ProjectWithTasks {
        project: &'a Project,
        progress: Option<f64>,
    },
}

impl<'a> Subject<'a> {
    pub fn project(project: &'a Project) -> Self {
        Subject::Project {
            project,
            progress: None,
        }
    }

    pub fn project_with_tasks(project: &'a Project) -> Self {
        Subject::ProjectWithTasks {
            project,
            progress: None,
        }
    }

    pub fn classify(self, now: DateTime<Utc>) -> Emotion {
        match self {
            Subject::Task(task) => Signals::of_task(task, now)
                .resolve()
                .unwrap_or(Emotion::Happy),
            Subject::Project { project, progress } => Signals::of_project(project, progress, now)
                .resolve()
                .unwrap_or(Emotion::Happy),
            Subject::TaskList([]) => Emotion::Neutral,
            Subject::TaskList(tasks) => Signals::of_task_list(tasks, now)
                .resolve()
                .unwrap_or(Emotion::Happy),
            Subject::ProjectWithTasks { project, progress } => {
                if let Some(emotion) = Signals::of_project(project, progress, now).resolve() {
                    return emotion;
                }
                if project.tasks.is_empty() {
                    Emotion::Happy
                } else {
                    Subject::TaskList(&project.tasks).classify(now)
                }
            }
        }
    }
}

impl<'a> From<&'a Task> for Subject<'a> {
    fn from(task: &'a Task) -> Self {
        Subject::Task(task)
    }
}

impl<'a> From<&'a [Task]> for Subject<'a> {
    fn from(tasks: &'a [Task]) -> Self {
        Subject::TaskList(tasks)
    }
}

impl<'a> From<&'a ProjectWithProgress> for Subject<'a> {
    fn from(view: &'a ProjectWithProgress) -> Self {
        Subject::Project {
            project: &view.project,
            progress: Some(view.progress),
        }
    }
}

pub fn classify_task(task: &Task, now: DateTime<Utc>) -> Emotion {
    Subject::Task(task).classify(now)
}

pub fn classify_project(project: &Project, now: DateTime<Utc>) -> Emotion {
    Subject::project(project).classify(now)
}

/// Like [`classify_project`], also treating 100% progress as finished.
pub fn classify_project_progress(view: &ProjectWithProgress, now: DateTime<Utc>) -> Emotion {
    Subject::from(view).classify(now)
}

pub fn classify_task_list(tasks: &[Task], now: DateTime<Utc>) -> Emotion {
    Subject::TaskList(tasks).classify(now)
}

/// The primary "how is this project doing" indicator.
pub fn classify_project_with_tasks(project: &Project, now: DateTime<Utc>) -> Emotion {
    Subject::project_with_tasks(project).classify(now)
}

/// [`classify_project_with_tasks`] for a project carrying derived progress.
pub fn classify_project_progress_with_tasks(
    view: &ProjectWithProgress,
    now: DateTime<Utc>,
) -> Emotion {
    Subject::ProjectWithTasks {
        project: &view.project,
        progress: Some(view.progress),
    }
    .classify(now)
}
