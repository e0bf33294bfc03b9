use clap::{Subcommand, ValueEnum};

use super::{print_json, CliResult, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum AdChoice {
    Interstitial,
    ThankYou,
    Daily,
}

#[derive(Subcommand)]
pub enum AdsAction {
    /// Session and daily counters
    Status,
    /// Show a simulated ad if the throttle allows it
    Show {
        #[arg(value_enum, default_value = "daily")]
        kind: AdChoice,
    },
    /// Clear the per-session counters
    ResetSession,
    /// Clear the persisted daily counter
    ResetDaily,
}

pub fn run(action: AdsAction) -> CliResult {
    let ctx = Context::load()?;
    let ads = ctx.ads()?;

    match action {
        AdsAction::Status => print_json(&ads.stats())?,
        AdsAction::Show { kind } => {
            let shown = match kind {
                AdChoice::Interstitial => ads.show_interstitial_ad(),
                AdChoice::ThankYou => ads.show_thank_you_ad(),
                AdChoice::Daily => ads.show_daily_ad(),
            };
            println!("{}", if shown { "shown" } else { "not shown" });
        }
        AdsAction::ResetSession => {
            ads.reset_session();
            println!("ok");
        }
        AdsAction::ResetDaily => {
            if !ads.reset_daily_ad_count() {
                return Err("could not reset the daily ad count".into());
            }
            println!("ok");
        }
    }
    Ok(())
}
