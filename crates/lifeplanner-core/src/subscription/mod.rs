//! Subscription tiers and the limits they grant.
//!
//! Two tiers, no automatic transitions: only [`EntitlementService::upgrade_to_premium`]
//! and [`EntitlementService::downgrade_to_free`] move between them, and each
//! replaces the whole record.

mod record;
mod service;

pub use record::{Features, Limit, Limits, SubscriptionInfo, SubscriptionRecord, Tier};
pub use service::EntitlementService;
