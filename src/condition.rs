//! Declarative achievement conditions
//!
//! Conditions are stored in the catalog as a tagged JSON payload and
//! deserialized into this closed enum, so evaluation is exhaustive and a new
//! condition kind is a compile-visible enum addition rather than ad-hoc
//! string matching. A payload that fails to parse never unlocks anything -
//! the catalog row is skipped and reported as a data-quality warning.

use serde::{Deserialize, Serialize};

use crate::snapshot::ProgressSnapshot;

/// Predicate deciding whether an achievement is earned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Lifetime count of distinct completed courses reaches `count`
    CourseCompletion { count: u64 },

    /// Every course currently published under `category` is completed.
    /// Non-monotonic: publishing another course can flip this back to false,
    /// which is why it is re-evaluated from scratch every pass and never
    /// cached.
    CategoryCompletion { category: String },

    /// Lifetime XP reaches `amount`
    XpMilestone { amount: u64 },

    /// Current consecutive-day login streak reaches `days`
    LoginStreak { days: u32 },

    /// Lifetime count of chat messages sent reaches `count`
    MessagesSent { count: u64 },
}

impl Condition {
    /// Evaluate against a snapshot. Pure: no state is touched.
    pub fn evaluate(&self, snapshot: &ProgressSnapshot) -> bool {
        match self {
            Self::CourseCompletion { count } => snapshot.completed_courses >= *count,
            Self::CategoryCompletion { category } => {
                let published = snapshot.published_in(category);
                // An empty category is never "completed"
                published > 0 && snapshot.completed_in(category) >= published
            }
            Self::XpMilestone { amount } => snapshot.total_xp >= *amount,
            Self::LoginStreak { days } => snapshot.current_streak >= *days,
            Self::MessagesSent { count } => snapshot.messages_sent >= *count,
        }
    }

    /// Parse the stored catalog payload
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize for catalog storage
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("condition serialization is infallible")
    }
}
