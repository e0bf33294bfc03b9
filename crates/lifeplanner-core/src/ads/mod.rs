//! Ad throttling for free-tier users.
//!
//! [`AdThrottle`] owns the rules, an [`AdPresenter`] does the showing.

mod presenter;
mod throttle;

pub use presenter::{AdKind, AdPresenter, SimulatedPresenter};
pub use throttle::{AdStats, AdThrottle, DailyAdStats};
