//! Consecutive-day activity streaks
//!
//! A streak counts qualifying days (logins), at most one increment per
//! calendar day. Days are compared at UTC day granularity - the same
//! boundary used everywhere else in the engine.

use chrono::NaiveDate;

use crate::models::UserProgress;

/// Record qualifying activity for a calendar day
///
/// Rules:
/// - first activity ever starts the streak at 1
/// - a repeat of the last recorded day changes nothing
/// - exactly one day after the last recorded day extends the streak
/// - a gap of more than one day resets the streak to 1, not 0
///
/// Returns `true` when the streak started or extended, so the caller can
/// log the advance. `last_activity_day` always moves to `day`.
pub fn record_activity(progress: &mut UserProgress, day: NaiveDate) -> bool {
    let advanced = match progress.last_activity_day {
        None => {
            progress.current_streak = 1;
            true
        }
        Some(last) if day == last => false,
        Some(last) if last.succ_opt() == Some(day) => {
            progress.current_streak += 1;
            true
        }
        Some(_) => {
            progress.current_streak = 1;
            true
        }
    };

    progress.last_activity_day = Some(day);
    progress.best_streak = progress.best_streak.max(progress.current_streak);
    advanced
}
