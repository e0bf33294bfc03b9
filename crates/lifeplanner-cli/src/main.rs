use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "lifeplanner", version, about = "LifePlanner CLI")]
struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a task, project or task list read as JSON
    Emotion {
        #[command(subcommand)]
        action: commands::emotion::EmotionAction,
    },
    /// Subscription tier and limits
    Subscription {
        #[command(subcommand)]
        action: commands::subscription::SubscriptionAction,
    },
    /// Ad throttle state and simulated ads
    Ads {
        #[command(subcommand)]
        action: commands::ads::AdsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Project management (backend)
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Task management (backend)
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("lifeplanner_core={0},lifeplanner={0}", cli.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Emotion { action } => commands::emotion::run(action),
        Commands::Subscription { action } => commands::subscription::run(action),
        Commands::Ads { action } => commands::ads::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Task { action } => commands::task::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
