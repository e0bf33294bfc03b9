//! Project commands against the backend.

use clap::Subcommand;
use lifeplanner_core::model::NewProject;
use lifeplanner_core::{Priority, ProjectStatus};

use super::{block_on, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project, subject to the tier's project limit
    Create {
        /// Project title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// baja, media or alta (low, medium, high also accepted)
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Deadline as sent to the backend, e.g. 2026-12-01
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List projects with progress and companion emotion
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ProjectAction) -> CliResult {
    let ctx = Context::load()?;
    let planner = ctx.planner()?;

    match action {
        ProjectAction::Create {
            title,
            description,
            priority,
            category,
            deadline,
        } => {
            let project = NewProject {
                title,
                description,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                category,
                deadline,
                status: ProjectStatus::Active,
            };
            let created = block_on(planner.create_project(&project))??;
            println!("Project created: {}", created.id);
            print_json(&created)?;
        }
        ProjectAction::List { json } => {
            let overview = block_on(planner.overview())??;
            if json {
                return print_json(&overview);
            }
            for entry in &overview.projects {
                let p = &entry.project;
                println!(
                    "{:>4}  {:<30} {:>5.1}% ({}/{})  {}",
                    p.project.id,
                    p.project.title,
                    p.progress,
                    p.completed_tasks,
                    p.total_tasks,
                    entry.emotion
                );
            }
            println!(
                "overall: {:.1}% ({}/{} tasks)",
                overview.overall_progress, overview.completed_tasks, overview.total_tasks
            );
        }
    }
    Ok(())
}

pub fn parse_priority(raw: &str) -> Result<Priority, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
}
