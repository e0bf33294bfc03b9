//! The persisted subscription record.
//!
//! Stored as one JSON document in the shape the mobile app has always
//! written, so existing installs keep their tier:
//!
//! ```json
//! {"type":"free","startDate":"2026-01-01T00:00:00.000Z","isActive":true,
//!  "features":{"UNLIMITED_PROJECTS":false, ...},
//!  "limits":{"MAX_PROJECTS":3,"MAX_TASKS_PER_PROJECT":10,"ADS_ENABLED":true, ...}}
//! ```
//!
//! An unbounded limit is written as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::EntitlementsConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        })
    }
}

/// A numeric cap, or none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Limit {
    Bounded(u32),
    Unbounded,
}

impl Limit {
    /// Whether one more item fits when `current` already exist.
    pub fn allows(self, current: usize) -> bool {
        match self {
            Limit::Bounded(max) => current < max as usize,
            Limit::Unbounded => true,
        }
    }

    pub fn as_option(self) -> Option<u32> {
        self.into()
    }
}

impl From<Option<u32>> for Limit {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Limit::Unbounded, Limit::Bounded)
    }
}

impl From<Limit> for Option<u32> {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Bounded(max) => Some(max),
            Limit::Unbounded => None,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Bounded(max) => write!(f, "{max}"),
            Limit::Unbounded => f.write_str("unlimited"),
        }
    }
}

/// Feature switches granted by a tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Features {
    pub unlimited_projects: bool,
    pub unlimited_tasks: bool,
    pub no_ads: bool,
    pub export_enabled: bool,
    pub advanced_stats: bool,
    pub custom_themes: bool,
    #[serde(rename = "BACKUP_CLOUD")]
    pub cloud_backup: bool,
    pub priority_support: bool,
}

impl Features {
    pub fn all() -> Self {
        Self {
            unlimited_projects: true,
            unlimited_tasks: true,
            no_ads: true,
            export_enabled: true,
            advanced_stats: true,
            custom_themes: true,
            cloud_backup: true,
            priority_support: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Limits {
    pub max_projects: Limit,
    pub max_tasks_per_project: Limit,
    pub ads_enabled: bool,
    pub export_enabled: bool,
    pub advanced_stats: bool,
}

impl Limits {
    pub fn free(config: &EntitlementsConfig) -> Self {
        Self {
            max_projects: Limit::Bounded(config.free_max_projects),
            max_tasks_per_project: Limit::Bounded(config.free_max_tasks_per_project),
            ads_enabled: true,
            export_enabled: false,
            advanced_stats: false,
        }
    }

    pub fn premium() -> Self {
        Self {
            max_projects: Limit::Unbounded,
            max_tasks_per_project: Limit::Unbounded,
            ads_enabled: false,
            export_enabled: true,
            advanced_stats: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    #[serde(rename = "type")]
    pub tier: Tier,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub features: Features,
    pub limits: Limits,
}

impl SubscriptionRecord {
    pub fn free(start_date: DateTime<Utc>, config: &EntitlementsConfig) -> Self {
        Self {
            tier: Tier::Free,
            start_date,
            end_date: None,
            is_active: true,
            features: Features::none(),
            limits: Limits::free(config),
        }
    }

    pub fn premium(start_date: DateTime<Utc>) -> Self {
        Self {
            tier: Tier::Premium,
            start_date,
            end_date: None,
            is_active: true,
            features: Features::all(),
            limits: Limits::premium(),
        }
    }

    /// Features and limits match what the tier grants.
    pub fn is_consistent(&self, config: &EntitlementsConfig) -> bool {
        let (features, limits) = Self::grants(self.tier, config);
        self.features == features && self.limits == limits
    }

    /// The same record with features and limits reset to what its tier grants.
    pub fn normalized(mut self, config: &EntitlementsConfig) -> Self {
        let (features, limits) = Self::grants(self.tier, config);
        self.features = features;
        self.limits = limits;
        self
    }

    fn grants(tier: Tier, config: &EntitlementsConfig) -> (Features, Limits) {
        match tier {
            Tier::Free => (Features::none(), Limits::free(config)),
            Tier::Premium => (Features::all(), Limits::premium()),
        }
    }
}

/// Summary shown on the subscription screen.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub tier: Tier,
    pub is_active: bool,
    pub project_limit: Limit,
    pub task_limit: Limit,
    pub ads_enabled: bool,
    pub export_enabled: bool,
    pub advanced_stats: bool,
}

impl From<&SubscriptionRecord> for SubscriptionInfo {
    fn from(record: &SubscriptionRecord) -> Self {
        Self {
            tier: record.tier,
            is_active: record.is_active,
            project_limit: record.limits.max_projects,
            task_limit: record.limits.max_tasks_per_project,
            ads_enabled: record.limits.ads_enabled,
            export_enabled: record.limits.export_enabled,
            advanced_stats: record.limits.advanced_stats,
        }
    }
}
