//! Point-in-time aggregate of a user's history for condition evaluation

use std::collections::HashMap;

/// Everything the condition evaluator is allowed to look at
///
/// Built fresh by the store for each evaluation pass and thrown away
/// afterwards. Never cached across passes: it must reflect the event that
/// was just applied, and `published_by_category` can change underneath us
/// whenever an administrator publishes a course.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub total_xp: u64,
    pub current_streak: u32,
    /// Lifetime count of distinct completed courses
    pub completed_courses: u64,
    /// Distinct completed courses per category
    pub completed_by_category: HashMap<String, u64>,
    /// Currently published courses per category (live catalog, not history)
    pub published_by_category: HashMap<String, u64>,
    /// Lifetime count of chat messages sent
    pub messages_sent: u64,
}

impl ProgressSnapshot {
    pub fn completed_in(&self, category: &str) -> u64 {
        self.completed_by_category.get(category).copied().unwrap_or(0)
    }

    pub fn published_in(&self, category: &str) -> u64 {
        self.published_by_category.get(category).copied().unwrap_or(0)
    }
}
