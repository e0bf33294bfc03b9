//! Task commands against the backend.

use clap::Subcommand;
use lifeplanner_core::emotion::classify_task;
use lifeplanner_core::model::NewTask;
use lifeplanner_core::{Clock, TaskStatus};

use super::project::parse_priority;
use super::{block_on, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a project, subject to the tier's task limit
    Create {
        project_id: i64,
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// baja, media or alta (low, medium, high also accepted)
        #[arg(long, default_value = "media")]
        priority: String,
        /// Due date as sent to the backend, e.g. 2026-11-01
        #[arg(long)]
        due: Option<String>,
    },
    /// List a project's tasks
    List {
        project_id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Move a task to its next status (pending, in progress, completed)
    Advance { project_id: i64, task_id: i64 },
}

pub fn run(action: TaskAction) -> CliResult {
    let ctx = Context::load()?;
    let planner = ctx.planner()?;

    match action {
        TaskAction::Create {
            project_id,
            title,
            description,
            priority,
            due,
        } => {
            let task = NewTask {
                title,
                description,
                status: TaskStatus::Pending,
                priority: parse_priority(&priority)?,
                due_date: due,
            };
            let created = block_on(planner.create_task(project_id, &task))??;
            println!("Task created: {}", created.id);
            print_json(&created)?;
        }
        TaskAction::List { project_id, json } => {
            let tasks = block_on(planner.client().list_tasks(project_id))??;
            if json {
                return print_json(&tasks);
            }
            let now = ctx.clock.now();
            for task in &tasks {
                println!(
                    "{:>4}  {:<30} {:?}/{:?}  {}",
                    task.id,
                    task.title,
                    task.status,
                    task.priority,
                    classify_task(task, now)
                );
            }
        }
        TaskAction::Advance {
            project_id,
            task_id,
        } => {
            let client = planner.client();
            let tasks = block_on(client.list_tasks(project_id))??;
            let task = tasks
                .iter()
                .find(|t| t.id == task_id)
                .ok_or_else(|| format!("task {task_id} not found in project {project_id}"))?;
            let updated = block_on(client.advance_task_status(task))??;
            println!("{:?} -> {:?}", task.status, updated.status);
        }
    }
    Ok(())
}
