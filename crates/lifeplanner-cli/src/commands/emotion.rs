//! Companion emotion for JSON read from a file or stdin.

use std::io::Read;
use std::path::PathBuf;

use clap::Subcommand;
use lifeplanner_core::emotion::Subject;
use lifeplanner_core::{Clock, Emotion, Project, SystemClock, Task};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum EmotionAction {
    /// One task object
    Task {
        /// JSON file; stdin when omitted
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// One project object; an optional numeric "progress" field is honored
    Project {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// An array of task objects
    Tasks {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// A project object with its "tasks" array
    ProjectTasks {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EmotionAction) -> CliResult {
    let now = SystemClock.now();
    let (emotion, json) = match action {
        EmotionAction::Task { file, json } => {
            let task: Task = serde_json::from_str(&read_input(file)?)?;
            (Subject::Task(&task).classify(now), json)
        }
        EmotionAction::Project { file, json } => {
            let (project, progress) = read_project(file)?;
            (Subject::Project { project: &project, progress }.classify(now), json)
        }
        EmotionAction::Tasks { file, json } => {
            let tasks: Vec<Task> = serde_json::from_str(&read_input(file)?)?;
            (Subject::TaskList(&tasks).classify(now), json)
        }
        EmotionAction::ProjectTasks { file, json } => {
            let (project, progress) = read_project(file)?;
            let subject = Subject::ProjectWithTasks {
                project: &project,
                progress,
            };
            (subject.classify(now), json)
        }
    };
    report(emotion, json)
}

fn report(emotion: Emotion, json: bool) -> CliResult {
    let companion = emotion.companion();
    if json {
        return print_json(&companion);
    }
    println!("{emotion}");
    println!("{}: {}", companion.title, companion.message);
    Ok(())
}

fn read_project(
    file: Option<PathBuf>,
) -> Result<(Project, Option<f64>), Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(&read_input(file)?)?;
    let progress = value.get("progress").and_then(serde_json::Value::as_f64);
    Ok((serde_json::from_value(value)?, progress))
}

fn read_input(file: Option<PathBuf>) -> Result<String, std::io::Error> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
