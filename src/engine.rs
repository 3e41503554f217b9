//! Achievement grant coordination
//!
//! [`ProgressionEngine::on_event`] is the sole mutating entry point: it
//! applies an event's direct effect, re-evaluates every still-locked
//! achievement against a fresh snapshot, and grants each satisfied one
//! exactly once. "Exactly once" comes from the store's uniqueness
//! constraint, not from any in-process check - two concurrent events that
//! both satisfy a condition race on the insert, and the loser silently
//! skips the reward.
//!
//! Callers own event delivery: events for one user must arrive serialized,
//! events for different users may be processed in parallel, and redelivery
//! of the same event is safe.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::AchievementDefinition;
use crate::error::EngineError;
use crate::event::Event;
use crate::levels::{self, LevelProgress};
use crate::models::{UserAchievement, UserProgress};
use crate::store::ProgressionStore;
use crate::streak;

/// A catalog row that could not be evaluated
///
/// The achievement fails closed (never granted) and evaluation of the rest
/// of the catalog continues; the warning tells the caller which definitions
/// need admin attention.
#[derive(Debug, Clone)]
pub struct CatalogWarning {
    pub achievement_id: String,
    pub detail: String,
}

/// Outcome of one processed event
#[derive(Debug, Clone, Default)]
pub struct GrantResult {
    /// Whether the event (including any achievement bonuses) crossed a
    /// level threshold. Level is recomputed once from the final total.
    pub leveled_up: bool,
    pub new_level: u32,
    /// Achievements granted by this event, in catalog order
    pub unlocked: Vec<AchievementDefinition>,
    /// Malformed catalog entries skipped during evaluation
    pub warnings: Vec<CatalogWarning>,
}

/// Coordinates XP, streaks, and achievement grants over a progression store
pub struct ProgressionEngine<S: ProgressionStore> {
    store: S,
}

impl<S: ProgressionStore> ProgressionEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store (admin seeding, projections)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one domain event for one user
    ///
    /// Validation happens before any mutation; a store failure aborts the
    /// event and the caller retries it whole, which the idempotent grant
    /// design makes safe.
    pub fn on_event(&self, user_id: &str, event: &Event) -> Result<GrantResult, EngineError> {
        event.validate()?;

        let now = Utc::now();
        let mut progress = self.store.load_progress(user_id)?;
        let start_level = progress.level();

        // Direct effect first, so the snapshot below already sees it
        match event {
            Event::CourseCompleted {
                course_id,
                category,
                xp,
            } => {
                self.store
                    .record_course_completion(user_id, course_id, category)?;
                levels::add_xp(&mut progress, *xp as u64, now);
                debug!(user = user_id, course = %course_id, xp, "course completed");
            }
            Event::LessonCompleted { lesson_id } => {
                self.store.record_lesson_completion(user_id, lesson_id)?;
            }
            Event::MessageSent { channel_id } => {
                self.store.record_message(user_id)?;
                debug!(user = user_id, channel = %channel_id, "message counted");
            }
            Event::UserLoggedIn { at } => {
                if streak::record_activity(&mut progress, *at) {
                    info!(
                        user = user_id,
                        streak = progress.current_streak,
                        "streak advanced"
                    );
                }
            }
            Event::XpGranted { amount, reason } => {
                levels::add_xp(&mut progress, *amount as u64, now);
                debug!(user = user_id, amount, reason = %reason, "xp granted");
            }
        }
        self.store.save_progress(&progress)?;

        let snapshot = self.store.read_snapshot(user_id)?;

        let already: HashSet<String> = self
            .store
            .unlocked(user_id)?
            .into_iter()
            .map(|a| a.achievement_id)
            .collect();

        let mut result = GrantResult::default();
        for row in self.store.read_catalog()? {
            if already.contains(&row.id) {
                continue;
            }
            let def = match row.decode() {
                Ok(def) => def,
                Err(err) => {
                    warn!(achievement = %row.id, error = %err, "skipping malformed catalog entry");
                    result.warnings.push(CatalogWarning {
                        achievement_id: row.id.clone(),
                        detail: err.to_string(),
                    });
                    continue;
                }
            };
            if !def.condition.evaluate(&snapshot) {
                continue;
            }

            // The uniqueness constraint is the arbiter; losing the race to
            // a concurrent event is a no-op, not an error.
            if !self
                .store
                .insert_if_absent(user_id, &def.id, now.timestamp_millis())?
            {
                continue;
            }

            info!(user = user_id, achievement = %def.id, reward = def.xp_reward, "achievement unlocked");
            if def.xp_reward > 0 {
                levels::add_xp(&mut progress, def.xp_reward, now);
            }
            result.unlocked.push(def);
        }

        if !result.unlocked.is_empty() {
            self.store.save_progress(&progress)?;
        }

        // One level recomputation from the final total, however many
        // bonuses landed
        result.new_level = progress.level();
        result.leveled_up = result.new_level > start_level;
        if result.leveled_up {
            info!(
                user = user_id,
                old_level = start_level,
                new_level = result.new_level,
                "level up"
            );
        }

        Ok(result)
    }

    /// Read-only progress projection for profile and dashboard UI
    ///
    /// `weekly_xp` reflects the last mutating touch: a dormant user's
    /// counter resets lazily on their next event, not at the week boundary.
    pub fn get_progress(&self, user_id: &str) -> Result<UserProgress, EngineError> {
        Ok(self.store.load_progress(user_id)?)
    }

    /// Position on the level curve, derived from total XP
    pub fn get_level_progress(&self, user_id: &str) -> Result<LevelProgress, EngineError> {
        let progress = self.store.load_progress(user_id)?;
        Ok(LevelProgress::for_xp(progress.total_xp))
    }

    /// Everything the user has unlocked, oldest first
    pub fn get_unlocked(&self, user_id: &str) -> Result<Vec<UserAchievement>, EngineError> {
        Ok(self.store.unlocked(user_id)?)
    }
}
