//! Persistence boundary for the progression engine
//!
//! The engine is written against the [`ProgressionStore`] trait and is
//! storage-agnostic; [`SqliteStore`] is the bundled implementation the
//! portal deploys. The one operation that needs a true atomicity guarantee
//! is [`ProgressionStore::insert_if_absent`] - its uniqueness constraint is
//! the single source of truth for "already granted". Everything else only
//! has to be consistent within a single user's serialized event stream.

mod sqlite;

pub use sqlite::SqliteStore;

use anyhow::Result;

use crate::catalog::{AchievementDefinition, AchievementKind, CatalogError};
use crate::condition::Condition;
use crate::models::{UserAchievement, UserProgress};
use crate::snapshot::ProgressSnapshot;

/// A catalog entry as persisted: the kind discriminator and condition are
/// loosely-typed strings until [`CatalogRow::decode`] parses them.
///
/// Decoding at read time (instead of trusting whatever an admin tool wrote)
/// is what lets a malformed row fail closed per-achievement rather than
/// poison the whole catalog.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub xp_reward: u64,
    pub kind: String,
    /// Tagged JSON condition payload
    pub condition: String,
}

impl CatalogRow {
    /// Parse the stored discriminator and payload into a typed definition
    pub fn decode(&self) -> Result<AchievementDefinition, CatalogError> {
        let kind = AchievementKind::from_str(&self.kind)
            .ok_or_else(|| CatalogError::UnknownKind(self.kind.clone()))?;
        let condition = Condition::from_json(&self.condition)?;
        if !kind.matches(&condition) {
            return Err(CatalogError::KindMismatch {
                id: self.id.clone(),
                kind,
            });
        }
        Ok(AchievementDefinition {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            xp_reward: self.xp_reward,
            kind,
            condition,
        })
    }
}

/// Contract between the engine and whatever persists progression state
pub trait ProgressionStore {
    /// Load a user's progress, or fresh zeroed state for an unseen user
    fn load_progress(&self, user_id: &str) -> Result<UserProgress>;

    /// Persist a user's progress in a single atomic write
    fn save_progress(&self, progress: &UserProgress) -> Result<()>;

    /// Create the unlock record for `(user_id, achievement_id)` if and only
    /// if none exists. Returns `true` when this call inserted the record.
    /// A `false` return is the expected concurrent-grant-avoidance path,
    /// never an error.
    fn insert_if_absent(&self, user_id: &str, achievement_id: &str, unlocked_at: i64)
    -> Result<bool>;

    /// Aggregate the facts condition evaluation needs, fresh
    fn read_snapshot(&self, user_id: &str) -> Result<ProgressSnapshot>;

    /// All catalog entries, in their stored loosely-typed form
    fn read_catalog(&self) -> Result<Vec<CatalogRow>>;

    /// All achievements a user has unlocked
    fn unlocked(&self, user_id: &str) -> Result<Vec<UserAchievement>>;

    /// Record a distinct course completion (re-recording the same course is
    /// a no-op; distinctness drives the completion counters)
    fn record_course_completion(&self, user_id: &str, course_id: &str, category: &str)
    -> Result<()>;

    /// Record a distinct lesson completion
    fn record_lesson_completion(&self, user_id: &str, lesson_id: &str) -> Result<()>;

    /// Bump the user's lifetime message counter
    fn record_message(&self, user_id: &str) -> Result<()>;

    /// Admin side: add or update a published course in the live catalog
    fn publish_course(&self, course_id: &str, category: &str) -> Result<()>;

    /// Admin side: add or update an achievement definition
    fn upsert_definition(&self, def: &AchievementDefinition) -> Result<()>;
}
