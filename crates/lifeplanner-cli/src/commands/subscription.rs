use clap::Subcommand;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum SubscriptionAction {
    /// Show tier and limits
    Info,
    /// Show feature switches
    Features,
    /// Switch to the premium tier
    Upgrade,
    /// Switch back to the free tier
    Downgrade,
    /// Whether a project can be created when COUNT already exist
    CanCreateProject { count: usize },
    /// Whether a task can be added to a project holding COUNT tasks
    CanCreateTask { count: usize },
}

pub fn run(action: SubscriptionAction) -> CliResult {
    let ctx = Context::load()?;
    let entitlements = &ctx.entitlements;

    match action {
        SubscriptionAction::Info => print_json(&entitlements.subscription_info())?,
        SubscriptionAction::Features => print_json(&entitlements.features())?,
        SubscriptionAction::Upgrade => {
            if !entitlements.upgrade_to_premium() {
                return Err("could not save the subscription".into());
            }
            println!("subscription: premium");
        }
        SubscriptionAction::Downgrade => {
            if !entitlements.downgrade_to_free() {
                return Err("could not save the subscription".into());
            }
            println!("subscription: free");
        }
        SubscriptionAction::CanCreateProject { count } => {
            println!("{}", entitlements.can_create_project(count));
        }
        SubscriptionAction::CanCreateTask { count } => {
            println!("{}", entitlements.can_create_task(count));
        }
    }
    Ok(())
}
