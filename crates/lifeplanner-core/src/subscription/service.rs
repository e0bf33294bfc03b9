//! Entitlement checks backed by the persisted subscription record.
//!
//! Construct one [`EntitlementService`] at startup and share it. The record
//! is read lazily on first use and cached until the next upgrade/downgrade.
//! Counts are never tracked here: every limit check compares against the
//! number the caller just got from the backend.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use super::record::{Features, Limit, SubscriptionInfo, SubscriptionRecord, Tier};
use crate::clock::Clock;
use crate::error::StorageError;
use crate::policy::{Degradation, Engine};
use crate::storage::{keys, EntitlementsConfig, KeyValueStore};

pub struct EntitlementService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: EntitlementsConfig,
    cached: Mutex<Option<SubscriptionRecord>>,
}

impl EntitlementService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: EntitlementsConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            cached: Mutex::new(None),
        }
    }

    /// The current record. Never fails.
    ///
    /// A missing record is created with free defaults. An unreadable one is
    /// replaced, for this call only, by the free-tier record.
    pub fn subscription(&self) -> SubscriptionRecord {
        let mut cached = self.cache();
        if let Some(record) = cached.as_ref() {
            return record.clone();
        }

        match self.load() {
            Ok(Some(record)) => {
                *cached = Some(record.clone());
                record
            }
            Ok(None) => {
                let record = self.free_record();
                match self.write(&record) {
                    Ok(()) => info!("created free subscription record"),
                    Err(e) => warn!("could not persist default subscription: {e}"),
                }
                *cached = Some(record.clone());
                record
            }
            Err(e) => {
                debug_assert_eq!(
                    Engine::Entitlements.on_read_failure(),
                    Degradation::AssumeFreeTier
                );
                warn!("subscription unreadable, assuming free tier: {e}");
                self.free_record()
            }
        }
    }

    pub fn tier(&self) -> Tier {
        self.subscription().tier
    }

    pub fn subscription_info(&self) -> SubscriptionInfo {
        SubscriptionInfo::from(&self.subscription())
    }

    pub fn features(&self) -> Features {
        self.subscription().features
    }

    pub fn is_subscription_active(&self) -> bool {
        self.subscription().is_active
    }

    pub fn project_limit(&self) -> Limit {
        self.subscription().limits.max_projects
    }

    pub fn task_limit(&self) -> Limit {
        self.subscription().limits.max_tasks_per_project
    }

    /// Whether another project may be created when `current_count` exist.
    pub fn can_create_project(&self, current_count: usize) -> bool {
        let limit = self.project_limit();
        let allowed = limit.allows(current_count);
        debug!(current_count, %limit, allowed, "project creation check");
        allowed
    }

    /// Whether another task may be added to a project holding `current_count`.
    pub fn can_create_task(&self, current_count: usize) -> bool {
        let limit = self.task_limit();
        let allowed = limit.allows(current_count);
        debug!(current_count, %limit, allowed, "task creation check");
        allowed
    }

    pub fn ads_enabled(&self) -> bool {
        self.subscription().limits.ads_enabled
    }

    pub fn export_enabled(&self) -> bool {
        self.subscription().limits.export_enabled
    }

    pub fn advanced_stats_enabled(&self) -> bool {
        self.subscription().limits.advanced_stats
    }

    /// Replace the record with a fresh premium one.
    ///
    /// Returns `false` if the record could not be written; the caller may retry.
    pub fn upgrade_to_premium(&self) -> bool {
        self.replace(SubscriptionRecord::premium(self.clock.now()))
    }

    /// Replace the record with a fresh free one, discarding premium state.
    ///
    /// Returns `false` if the record could not be written; the caller may retry.
    pub fn downgrade_to_free(&self) -> bool {
        self.replace(self.free_record())
    }

    /// Drop the cached record so the next read goes to the store.
    pub fn reload(&self) {
        *self.cache() = None;
    }

    fn replace(&self, record: SubscriptionRecord) -> bool {
        let mut cached = self.cache();
        match self.write(&record) {
            Ok(()) => {
                info!(tier = %record.tier, "subscription replaced");
                *cached = Some(record);
                true
            }
            Err(e) => {
                error!(tier = %record.tier, "failed to save subscription: {e}");
                *cached = None;
                false
            }
        }
    }

    fn load(&self) -> Result<Option<SubscriptionRecord>, StorageError> {
        let Some(raw) = self.store.get(keys::SUBSCRIPTION)? else {
            return Ok(None);
        };
        let record: SubscriptionRecord =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key: keys::SUBSCRIPTION.to_string(),
                message: e.to_string(),
            })?;
        if record.is_consistent(&self.config) {
            Ok(Some(record))
        } else {
            warn!(tier = %record.tier, "stored subscription disagrees with its tier; normalizing");
            Ok(Some(record.normalized(&self.config)))
        }
    }

    fn write(&self, record: &SubscriptionRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record).map_err(|e| StorageError::Corrupt {
            key: keys::SUBSCRIPTION.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(keys::SUBSCRIPTION, &json)
    }

    fn free_record(&self) -> SubscriptionRecord {
        SubscriptionRecord::free(self.clock.now(), &self.config)
    }

    fn cache(&self) -> MutexGuard<'_, Option<SubscriptionRecord>> {
        self.cached.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::testing::FlakyStore;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::at_utc(
            Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0).unwrap(),
        ))
    }

    fn service(store: Arc<dyn KeyValueStore>) -> EntitlementService {
        EntitlementService::new(store, clock(), EntitlementsConfig::default())
    }

    #[test]
    fn fresh_install_is_free() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let info = svc.subscription_info();
        assert_eq!(info.tier, Tier::Free);
        assert!(info.is_active);
        assert_eq!(info.project_limit, Limit::Bounded(3));
        assert_eq!(info.task_limit, Limit::Bounded(10));
        assert!(info.ads_enabled);
        assert!(!info.export_enabled);
        assert!(!info.advanced_stats);
        assert!(store.get(keys::SUBSCRIPTION).unwrap().is_some());
    }

    #[test]
    fn free_project_limit() {
        let svc = service(Arc::new(MemoryStore::new()));
        assert!(svc.can_create_project(0));
        assert!(svc.can_create_project(2));
        assert!(!svc.can_create_project(3));
        assert!(svc.can_create_task(9));
        assert!(!svc.can_create_task(10));
    }

    #[test]
    fn premium_is_unbounded() {
        let svc = service(Arc::new(MemoryStore::new()));
        assert!(svc.upgrade_to_premium());
        assert!(svc.can_create_project(1_000_000));
        assert!(svc.can_create_task(1_000_000));
        assert!(!svc.ads_enabled());
        assert!(svc.export_enabled());
        assert!(svc.advanced_stats_enabled());
        assert_eq!(svc.features(), Features::all());
    }

    #[test]
    fn downgrade_restores_free_constants() {
        let svc = service(Arc::new(MemoryStore::new()));
        assert!(svc.upgrade_to_premium());
        assert!(svc.downgrade_to_free());
        let record = svc.subscription();
        assert_eq!(record.tier, Tier::Free);
        assert_eq!(record.features, Features::none());
        assert_eq!(record.limits.max_projects, Limit::Bounded(3));
        assert_eq!(record.limits.max_tasks_per_project, Limit::Bounded(10));
        assert!(record.limits.ads_enabled);
        assert!(!record.limits.export_enabled);
        assert!(!record.limits.advanced_stats);
    }

    #[test]
    fn tier_survives_a_new_service() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        assert!(service(store.clone()).upgrade_to_premium());
        assert_eq!(service(store).tier(), Tier::Premium);
    }

    #[test]
    fn unreadable_store_acts_as_free() {
        let store = Arc::new(FlakyStore::new());
        let svc = service(store.clone());
        assert!(svc.upgrade_to_premium());
        svc.reload();
        store.fail_reads(true);
        assert_eq!(svc.tier(), Tier::Free);
        assert!(!svc.can_create_project(3));
        assert!(svc.ads_enabled());

        // Degraded answers are not cached.
        store.fail_reads(false);
        assert_eq!(svc.tier(), Tier::Premium);
    }

    #[test]
    fn corrupt_record_acts_as_free() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::SUBSCRIPTION, "{not json").unwrap();
        let svc = service(store);
        assert_eq!(svc.tier(), Tier::Free);
        assert!(svc.can_create_project(2));
    }

    #[test]
    fn failed_write_reports_false() {
        let store = Arc::new(FlakyStore::new());
        let svc = service(store.clone());
        store.fail_writes(true);
        assert!(!svc.upgrade_to_premium());
        assert_eq!(svc.tier(), Tier::Free);
    }

    #[test]
    fn configured_free_limits_apply() {
        let config = EntitlementsConfig {
            free_max_projects: 5,
            free_max_tasks_per_project: 20,
        };
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        // A record written under the old limits is brought in line.
        service(store.clone()).subscription();
        let svc = EntitlementService::new(store, clock(), config);
        assert!(svc.can_create_project(4));
        assert!(!svc.can_create_project(5));
        assert_eq!(svc.task_limit(), Limit::Bounded(20));
    }
}
