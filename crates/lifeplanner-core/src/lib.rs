//! # LifePlanner Core Library
//!
//! Client-side business logic for the LifePlanner project/task planner.
//! The mobile app and the `lifeplanner` CLI are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Emotion classifier**: Pure rules mapping tasks and projects to the
//!   companion character's mood
//! - **Entitlements**: The persisted free/premium record and the creation
//!   limits it implies
//! - **Ad throttle**: Session and daily gates for free-tier ads
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Backend client**: Async access to the REST backend that owns projects
//!   and tasks
//!
//! ## Key Components
//!
//! - [`Emotion`] and [`Subject`]: Classification
//! - [`EntitlementService`]: Tier, limits and feature switches
//! - [`AdThrottle`]: Whether an ad may be shown now
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management
//! - [`BackendClient`] and [`Planner`]: Backend access

pub mod ads;
pub mod api;
pub mod clock;
pub mod emotion;
pub mod error;
pub mod model;
pub mod planner;
pub mod policy;
pub mod storage;
pub mod subscription;

pub use ads::{AdKind, AdPresenter, AdStats, AdThrottle, DailyAdStats, SimulatedPresenter};
pub use api::BackendClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use emotion::{Companion, Emotion, Subject};
pub use error::{AdError, ApiError, ConfigError, CoreError, StorageError};
pub use model::{Priority, Project, ProjectStatus, ProjectWithProgress, Task, TaskStatus};
pub use planner::{Overview, Planner, ProjectOverview};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use subscription::{EntitlementService, Limit, SubscriptionInfo, SubscriptionRecord, Tier};
