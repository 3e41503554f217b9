//! Data models for the progression engine
//!
//! These structures represent the per-user state stored in and read back
//! from the progression store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::levels::Level;

/// Per-user progression state (one record per user)
///
/// Owned exclusively by the engine and mutated only through engine
/// operations. `total_xp` never decreases; the level is always derived from
/// it via [`Level::for_xp`] and never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub total_xp: u64,
    /// XP earned in the current ISO week; lazily reset when a mutating
    /// operation notices the stored `week_bucket` is stale.
    pub weekly_xp: u64,
    /// ISO-week bucket the weekly counter belongs to, e.g. "2026-W32"
    pub week_bucket: Option<String>,
    /// Consecutive qualifying days, incremented at most once per day
    pub current_streak: u32,
    /// High-water mark of `current_streak`
    pub best_streak: u32,
    pub last_activity_day: Option<NaiveDate>,
}

impl UserProgress {
    /// Fresh state for a user the engine has never seen
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_xp: 0,
            weekly_xp: 0,
            week_bucket: None,
            current_streak: 0,
            best_streak: 0,
            last_activity_day: None,
        }
    }

    /// Current level, recomputed from total XP
    pub fn level(&self) -> u32 {
        Level::for_xp(self.total_xp).level
    }
}

/// One unlocked achievement for one user
///
/// Existence of the record *is* the unlocked state. Created exactly once
/// (enforced by the store's uniqueness constraint), never updated, never
/// deleted by normal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    /// Unlock timestamp (ms since epoch)
    pub unlocked_at: i64,
}
