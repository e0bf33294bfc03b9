//! Persistence collaborators.
//!
//! The engines only need a string key-value store. [`Database`] backs it with
//! SQLite on disk; [`MemoryStore`] keeps it in process for tests and
//! throwaway sessions.

mod config;
pub mod database;
pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

pub use config::{AdsConfig, ApiConfig, Config, EntitlementsConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Fixed keys, one per logical record.
pub mod keys {
    /// JSON subscription record.
    pub const SUBSCRIPTION: &str = "lifeplanner_subscription";
    /// Number of ads shown on `LAST_AD_DATE`.
    pub const ADS_SHOWN_TODAY: &str = "adsShownToday";
    /// Day of the last daily-counter reset, e.g. `Sun Oct 18 2026`.
    pub const LAST_AD_DATE: &str = "lastAdDate";
}

/// String key-value persistence.
///
/// Individual operations are atomic. `increment` is the only
/// read-modify-write the engines need, so stores provide it as one step.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Add one to the integer stored under `key` and return the new value.
    ///
    /// A missing or non-numeric value counts as 0.
    fn increment(&self, key: &str) -> Result<u64, StorageError>;
}

/// Returns `~/.config/lifeplanner[-dev]/` based on LIFEPLANNER_ENV.
///
/// Set LIFEPLANNER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LIFEPLANNER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lifeplanner-dev")
    } else {
        base_dir.join("lifeplanner")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
