//! The seam to whatever actually puts an ad on screen.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::info;

use crate::error::AdError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdKind {
    Interstitial,
    /// Shown after the user finishes something; throttled like an interstitial.
    ThankYou,
}

impl fmt::Display for AdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdKind::Interstitial => "interstitial",
            AdKind::ThankYou => "thank_you",
        })
    }
}

/// Displays ads. Implemented over the platform ad SDK by the app shell.
pub trait AdPresenter: Send + Sync {
    /// Show one ad and return once it has been displayed.
    fn show(&self, kind: AdKind) -> Result<(), AdError>;

    /// An ad is loaded and ready to show immediately.
    fn has_preloaded_ad(&self) -> bool {
        false
    }

    fn is_preloading(&self) -> bool {
        false
    }
}

/// Logs instead of showing, for development builds and the CLI.
#[derive(Debug, Default)]
pub struct SimulatedPresenter {
    shown: AtomicU32,
}

impl SimulatedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ads "shown" so far.
    pub fn shown(&self) -> u32 {
        self.shown.load(Ordering::SeqCst)
    }
}

impl AdPresenter for SimulatedPresenter {
    fn show(&self, kind: AdKind) -> Result<(), AdError> {
        let message = match kind {
            AdKind::Interstitial => "This would be a real interstitial ad in production.",
            AdKind::ThankYou => "Thanks for using LifePlanner! This would be a thank-you ad.",
        };
        info!(%kind, "simulated ad: {message}");
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn has_preloaded_ad(&self) -> bool {
        true
    }
}
