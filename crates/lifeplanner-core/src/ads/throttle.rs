//! Decides whether an ad may be shown, and records the ones that were.
//!
//! Three gates, all of which must pass:
//! - the current tier has ads enabled
//! - the session gate: spacing since the last ad and a per-session cap
//! - the daily gate: a per-calendar-day cap persisted across launches
//!
//! Session state lives in memory and starts over with the process. The
//! daily count and the day it belongs to are kept in the store under
//! [`keys::ADS_SHOWN_TODAY`] and [`keys::LAST_AD_DATE`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use super::presenter::{AdKind, AdPresenter};
use crate::clock::{day_key, Clock};
use crate::error::StorageError;
use crate::policy::{Degradation, Engine};
use crate::storage::{keys, AdsConfig, KeyValueStore};
use crate::subscription::EntitlementService;

#[derive(Debug, Default)]
struct Session {
    shown: u32,
    last_shown_at: Option<DateTime<Utc>>,
}

/// Today's persisted counter, for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyAdStats {
    pub ads_shown_today: u32,
    pub can_show_today: bool,
    pub last_ad_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdStats {
    pub ads_shown_this_session: u32,
    pub max_ads_per_session: u32,
    pub last_ad_shown_at: Option<DateTime<Utc>>,
    pub can_show_ad: bool,
    pub has_preloaded_ad: bool,
    pub is_preloading: bool,
    pub daily: DailyAdStats,
}

pub struct AdThrottle {
    entitlements: Arc<EntitlementService>,
    store: Arc<dyn KeyValueStore>,
    presenter: Arc<dyn AdPresenter>,
    clock: Arc<dyn Clock>,
    config: AdsConfig,
    session: Mutex<Session>,
    // Held across check, display and record so two flows cannot both pass
    // the gates for the last slot.
    gate: Mutex<()>,
}

impl AdThrottle {
    pub fn new(
        entitlements: Arc<EntitlementService>,
        store: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn AdPresenter>,
        clock: Arc<dyn Clock>,
        config: AdsConfig,
    ) -> Self {
        Self {
            entitlements,
            store,
            presenter,
            clock,
            config,
            session: Mutex::new(Session::default()),
            gate: Mutex::new(()),
        }
    }

    /// Tier and session gates.
    pub fn can_show_ad(&self) -> bool {
        if !self.entitlements.ads_enabled() {
            debug!("ads disabled for this tier");
            return false;
        }

        let session = self.session();
        if let Some(last) = session.last_shown_at {
            let elapsed = self.clock.now() - last;
            if elapsed < self.config.min_interval() {
                debug!(
                    elapsed_secs = elapsed.num_seconds(),
                    "too soon since the last ad"
                );
                return false;
            }
        }
        if session.shown >= self.config.max_ads_per_session {
            debug!(shown = session.shown, "session ad cap reached");
            return false;
        }
        true
    }

    /// Daily gate. Rolls the counter over when the local date has changed.
    pub fn can_show_daily_ad(&self) -> bool {
        let _gate = self.lock_gate();
        self.daily_gate()
    }

    pub fn show_interstitial_ad(&self) -> bool {
        self.show(AdKind::Interstitial)
    }

    pub fn show_thank_you_ad(&self) -> bool {
        self.show(AdKind::ThankYou)
    }

    /// The once-a-day interstitial, checked against the daily gate first.
    pub fn show_daily_ad(&self) -> bool {
        if !self.can_show_daily_ad() {
            debug!("daily ad limit reached");
            return false;
        }
        self.show(AdKind::Interstitial)
    }

    /// Start a new session: the per-session count and spacing are cleared.
    pub fn reset_session(&self) {
        *self.session() = Session::default();
        info!("ad session reset");
    }

    /// Forget the persisted daily counter. Returns `false` if the store refused.
    pub fn reset_daily_ad_count(&self) -> bool {
        let _gate = self.lock_gate();
        let result = self
            .store
            .remove(keys::ADS_SHOWN_TODAY)
            .and_then(|()| self.store.remove(keys::LAST_AD_DATE));
        match result {
            Ok(()) => {
                info!("daily ad count reset");
                true
            }
            Err(e) => {
                error!("failed to reset daily ad count: {e}");
                false
            }
        }
    }

    /// Persisted daily state. Shows zeros if the store cannot be read.
    pub fn daily_stats(&self) -> DailyAdStats {
        match self.read_daily_stats() {
            Ok(stats) => stats,
            Err(e) => {
                warn!("daily ad stats unavailable: {e}");
                DailyAdStats {
                    ads_shown_today: 0,
                    can_show_today: true,
                    last_ad_date: None,
                }
            }
        }
    }

    pub fn stats(&self) -> AdStats {
        let (shown, last_shown_at) = {
            let session = self.session();
            (session.shown, session.last_shown_at)
        };
        AdStats {
            ads_shown_this_session: shown,
            max_ads_per_session: self.config.max_ads_per_session,
            last_ad_shown_at: last_shown_at,
            can_show_ad: self.can_show_ad(),
            has_preloaded_ad: self.presenter.has_preloaded_ad(),
            is_preloading: self.presenter.is_preloading(),
            daily: self.daily_stats(),
        }
    }

    fn show(&self, kind: AdKind) -> bool {
        let _gate = self.lock_gate();
        if !self.can_show_ad() || !self.daily_gate() {
            debug!(%kind, "ad not shown");
            return false;
        }

        if let Err(e) = self.presenter.show(kind) {
            warn!(%kind, "ad display failed: {e}");
            return false;
        }
        self.record_display(kind);
        true
    }

    fn record_display(&self, kind: AdKind) {
        {
            let mut session = self.session();
            session.shown += 1;
            session.last_shown_at = Some(self.clock.now());
        }
        match self.store.increment(keys::ADS_SHOWN_TODAY) {
            Ok(today) => info!(%kind, shown_today = today, "ad shown"),
            Err(e) => error!(%kind, "ad shown but daily count not saved: {e}"),
        }
    }

    /// Caller holds the gate lock.
    fn daily_gate(&self) -> bool {
        match self.check_daily() {
            Ok(allowed) => allowed,
            Err(e) => match Engine::AdThrottle.on_read_failure() {
                Degradation::Deny => {
                    warn!("daily ad state unavailable, denying: {e}");
                    false
                }
                Degradation::AssumeFreeTier => self.entitlements.ads_enabled(),
            },
        }
    }

    fn check_daily(&self) -> Result<bool, StorageError> {
        let today = day_key(self.clock.today());
        let last = self.store.get(keys::LAST_AD_DATE)?;
        if last.as_deref() != Some(today.as_str()) {
            self.store.set(keys::ADS_SHOWN_TODAY, "0")?;
            self.store.set(keys::LAST_AD_DATE, &today)?;
            info!(day = %today, "new day, daily ad count reset");
            return Ok(true);
        }
        Ok(self.shown_today()? < self.config.max_ads_per_day)
    }

    fn read_daily_stats(&self) -> Result<DailyAdStats, StorageError> {
        let today = day_key(self.clock.today());
        let shown = self.shown_today()?;
        let last_ad_date = self.store.get(keys::LAST_AD_DATE)?;
        let can_show_today =
            last_ad_date.as_deref() != Some(today.as_str()) || shown < self.config.max_ads_per_day;
        Ok(DailyAdStats {
            ads_shown_today: shown,
            can_show_today,
            last_ad_date,
        })
    }

    fn shown_today(&self) -> Result<u32, StorageError> {
        match self.store.get(keys::ADS_SHOWN_TODAY)? {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| StorageError::Corrupt {
                key: keys::ADS_SHOWN_TODAY.to_string(),
                message: format!("not a count: {raw:?}"),
            }),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::SimulatedPresenter;
    use crate::clock::ManualClock;
    use crate::error::AdError;
    use crate::storage::testing::FlakyStore;
    use crate::storage::{EntitlementsConfig, MemoryStore};
    use chrono::{Duration, FixedOffset, TimeZone};
    use std::thread;

    struct BrokenPresenter;

    impl AdPresenter for BrokenPresenter {
        fn show(&self, _kind: AdKind) -> Result<(), AdError> {
            Err(AdError::NotLoaded)
        }
    }

    struct Fixture {
        clock: Arc<ManualClock>,
        store: Arc<FlakyStore>,
        entitlements: Arc<EntitlementService>,
        presenter: Arc<SimulatedPresenter>,
        throttle: AdThrottle,
    }

    fn fixture_with(config: AdsConfig) -> Fixture {
        // 10:00 local on 2026-10-18, UTC+2.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let clock = Arc::new(ManualClock::new(
            offset.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap(),
        ));
        let store = Arc::new(FlakyStore::new());
        let entitlements = Arc::new(EntitlementService::new(
            store.clone(),
            clock.clone(),
            EntitlementsConfig::default(),
        ));
        let presenter = Arc::new(SimulatedPresenter::new());
        let throttle = AdThrottle::new(
            entitlements.clone(),
            store.clone(),
            presenter.clone(),
            clock.clone(),
            config,
        );
        Fixture {
            clock,
            store,
            entitlements,
            presenter,
            throttle,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(AdsConfig::default())
    }

    fn roomy() -> AdsConfig {
        AdsConfig {
            max_ads_per_session: 3,
            max_ads_per_day: 10,
            ..AdsConfig::default()
        }
    }

    #[test]
    fn first_ad_of_the_day_is_allowed() {
        let f = fixture();
        assert!(f.throttle.can_show_ad());
        assert!(f.throttle.can_show_daily_ad());
        assert!(f.throttle.show_daily_ad());
        assert_eq!(f.presenter.shown(), 1);
        assert_eq!(
            f.store.get(keys::ADS_SHOWN_TODAY).unwrap().as_deref(),
            Some("1")
        );
        assert_eq!(
            f.store.get(keys::LAST_AD_DATE).unwrap().as_deref(),
            Some("Sun Oct 18 2026")
        );
    }

    #[test]
    fn second_daily_ad_waits_for_tomorrow() {
        let f = fixture();
        assert!(f.throttle.show_daily_ad());

        f.throttle.reset_session();
        assert!(f.throttle.can_show_ad());
        assert!(!f.throttle.can_show_daily_ad());
        assert!(!f.throttle.show_daily_ad());
        assert_eq!(f.presenter.shown(), 1);

        f.clock.advance(Duration::days(1));
        assert!(f.throttle.can_show_daily_ad());
        assert_eq!(
            f.store.get(keys::ADS_SHOWN_TODAY).unwrap().as_deref(),
            Some("0")
        );
        assert!(f.throttle.show_daily_ad());
    }

    #[test]
    fn stored_counter_from_yesterday_rolls_over() {
        let f = fixture();
        f.store.set(keys::ADS_SHOWN_TODAY, "1").unwrap();
        f.store.set(keys::LAST_AD_DATE, "Sat Oct 17 2026").unwrap();
        assert!(f.throttle.can_show_daily_ad());
        assert_eq!(
            f.store.get(keys::ADS_SHOWN_TODAY).unwrap().as_deref(),
            Some("0")
        );

        f.store.set(keys::ADS_SHOWN_TODAY, "1").unwrap();
        assert!(!f.throttle.can_show_daily_ad());
    }

    #[test]
    fn day_boundary_follows_local_date() {
        let f = fixture();
        assert!(f.throttle.show_daily_ad());
        f.throttle.reset_session();

        // 23:59 local is still the same day.
        f.clock.advance(Duration::hours(13) + Duration::minutes(59));
        assert!(!f.throttle.can_show_daily_ad());

        f.clock.advance(Duration::minutes(1));
        assert!(f.throttle.can_show_daily_ad());
    }

    #[test]
    fn spacing_between_ads() {
        let f = fixture_with(roomy());
        assert!(f.throttle.show_interstitial_ad());

        f.clock.advance(Duration::seconds(299));
        assert!(!f.throttle.can_show_ad());
        assert!(!f.throttle.show_thank_you_ad());

        f.clock.advance(Duration::seconds(1));
        assert!(f.throttle.can_show_ad());
        assert!(f.throttle.show_thank_you_ad());
        assert_eq!(f.presenter.shown(), 2);
    }

    #[test]
    fn session_cap_until_reset() {
        let f = fixture_with(roomy());
        for _ in 0..3 {
            assert!(f.throttle.show_interstitial_ad());
            f.clock.advance(Duration::minutes(10));
        }
        assert!(!f.throttle.can_show_ad());
        assert!(!f.throttle.show_interstitial_ad());

        f.throttle.reset_session();
        assert!(f.throttle.can_show_ad());
        assert_eq!(f.throttle.stats().ads_shown_this_session, 0);
    }

    #[test]
    fn premium_never_sees_ads() {
        let f = fixture();
        assert!(f.entitlements.upgrade_to_premium());
        assert!(!f.throttle.can_show_ad());
        assert!(!f.throttle.show_interstitial_ad());
        assert!(!f.throttle.show_daily_ad());
        assert_eq!(f.presenter.shown(), 0);
    }

    #[test]
    fn display_failure_leaves_counters_alone() {
        let f = fixture();
        let throttle = AdThrottle::new(
            f.entitlements.clone(),
            f.store.clone(),
            Arc::new(BrokenPresenter),
            f.clock.clone(),
            AdsConfig::default(),
        );
        assert!(!throttle.show_interstitial_ad());
        let stats = throttle.stats();
        assert_eq!(stats.ads_shown_this_session, 0);
        assert!(stats.last_ad_shown_at.is_none());
        assert_eq!(stats.daily.ads_shown_today, 0);
        assert!(throttle.can_show_ad());
        assert!(throttle.can_show_daily_ad());
    }

    #[test]
    fn unreadable_store_denies() {
        let f = fixture();
        // Load the subscription before breaking reads.
        assert!(f.entitlements.ads_enabled());
        f.store.fail_reads(true);
        assert!(!f.throttle.can_show_daily_ad());
        assert!(!f.throttle.show_daily_ad());
        assert!(!f.throttle.show_interstitial_ad());
        assert_eq!(f.presenter.shown(), 0);

        let daily = f.throttle.daily_stats();
        assert_eq!(daily.ads_shown_today, 0);
        assert!(daily.can_show_today);
        assert!(daily.last_ad_date.is_none());
    }

    #[test]
    fn unwritable_store_denies() {
        let f = fixture();
        assert!(f.entitlements.ads_enabled());
        f.store.fail_writes(true);
        assert!(!f.throttle.show_daily_ad());
        assert_eq!(f.presenter.shown(), 0);
    }

    #[test]
    fn corrupt_counter_denies() {
        let f = fixture();
        f.store
            .set(keys::LAST_AD_DATE, &day_key(f.clock.today()))
            .unwrap();
        f.store.set(keys::ADS_SHOWN_TODAY, "lots").unwrap();
        assert!(!f.throttle.can_show_daily_ad());
    }

    #[test]
    fn reset_daily_count_clears_both_keys() {
        let f = fixture();
        assert!(f.throttle.show_daily_ad());
        assert!(f.throttle.reset_daily_ad_count());
        assert!(f.store.get(keys::ADS_SHOWN_TODAY).unwrap().is_none());
        assert!(f.store.get(keys::LAST_AD_DATE).unwrap().is_none());
        assert!(f.throttle.can_show_daily_ad());
    }

    #[test]
    fn stats_report_both_layers() {
        let f = fixture();
        assert!(f.throttle.show_interstitial_ad());
        let stats = f.throttle.stats();
        assert_eq!(stats.ads_shown_this_session, 1);
        assert_eq!(stats.max_ads_per_session, 1);
        assert_eq!(stats.last_ad_shown_at, Some(f.clock.now()));
        assert!(!stats.can_show_ad);
        assert!(stats.has_preloaded_ad);
        assert_eq!(
            stats.daily,
            DailyAdStats {
                ads_shown_today: 1,
                can_show_today: false,
                last_ad_date: Some("Sun Oct 18 2026".into()),
            }
        );
    }

    #[test]
    fn concurrent_flows_share_the_last_slot() {
        let f = fixture_with(AdsConfig {
            max_ads_per_session: 100,
            max_ads_per_day: 1,
            min_seconds_between_ads: 0,
            simulate: true,
        });
        let throttle = Arc::new(f.throttle);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let throttle = throttle.clone();
                thread::spawn(move || throttle.show_interstitial_ad())
            })
            .collect();
        let shown = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();
        assert_eq!(shown, 1);
        assert_eq!(f.presenter.shown(), 1);
    }

    #[test]
    fn works_over_plain_memory_store() {
        let clock = Arc::new(ManualClock::at_utc(
            Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap(),
        ));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let entitlements = Arc::new(EntitlementService::new(
            store.clone(),
            clock.clone(),
            EntitlementsConfig::default(),
        ));
        let throttle = AdThrottle::new(
            entitlements,
            store,
            Arc::new(SimulatedPresenter::new()),
            clock,
            AdsConfig::default(),
        );
        assert!(throttle.show_daily_ad());
        assert!(!throttle.show_daily_ad());
    }
}
