//! Progression & Achievement Engine
//!
//! Tracks per-user experience points, derives levels from a fixed curve,
//! maintains consecutive-day login streaks, and evaluates declarative
//! achievement conditions to grant each achievement exactly once - even
//! under concurrent, interleaved events from unrelated portal subsystems.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │ Courses  │  │   Chat   │  │   Auth   │  │  Admin   │
//! └────┬─────┘  └────┬─────┘  └────┬─────┘  └────┬─────┘
//!      │ events      │ events      │ events      │ catalog
//!      └─────────────┴──────┬──────┘             │
//!                           ▼                    ▼
//!                  ProgressionEngine ──► ProgressionStore
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let store = SqliteStore::open(&path)?;
//! for def in catalog::load_catalog_file(&catalog_path)? {
//!     store.upsert_definition(&def)?;
//! }
//! let engine = ProgressionEngine::new(store);
//!
//! let result = engine.on_event("maria", &Event::CourseCompleted {
//!     course_id: "sec-101".into(),
//!     category: "Seguranca".into(),
//!     xp: 100,
//! })?;
//! for achievement in &result.unlocked {
//!     notify(&achievement.title);
//! }
//! ```
//!
//! The engine performs no blocking I/O of its own and owns no transport:
//! the surrounding service layer delivers events in-process, serialized per
//! user. All day and week boundaries are UTC.

pub mod catalog;
pub mod condition;
pub mod engine;
pub mod error;
pub mod event;
pub mod levels;
pub mod models;
pub mod snapshot;
pub mod store;
pub mod streak;
pub mod time_bucket;

pub use catalog::{AchievementDefinition, AchievementKind, CatalogError};
pub use condition::Condition;
pub use engine::{CatalogWarning, GrantResult, ProgressionEngine};
pub use error::EngineError;
pub use event::Event;
pub use levels::{Level, LevelProgress};
pub use models::{UserAchievement, UserProgress};
pub use snapshot::ProgressSnapshot;
pub use store::{CatalogRow, ProgressionStore, SqliteStore};
