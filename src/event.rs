//! Domain events consumed by the engine
//!
//! Each collaborator subsystem (courses, chat, auth, the engine itself)
//! raises one of these when something progression-relevant happens. Events
//! are immutable values; the engine does not deduplicate them. XP deltas
//! arrive as `i64` and must already be deduplicated by the caller - the
//! engine rejects negatives but does not detect "this course already paid
//! out once".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A domain event raised by a collaborator subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A user finished a course. Carries the XP the course pays out, already
    /// deduplicated by the course subsystem.
    CourseCompleted {
        course_id: String,
        category: String,
        xp: i64,
    },

    /// A user finished a lesson. Counted for forward compatibility; no
    /// current condition consumes it.
    LessonCompleted { lesson_id: String },

    /// A user sent a chat message
    MessageSent { channel_id: String },

    /// A user logged in on the given calendar day (UTC)
    UserLoggedIn { at: NaiveDate },

    /// A bare XP grant. Raised inbound by collaborators and internally by
    /// the grant coordinator when an achievement bonus pays out.
    XpGranted { amount: i64, reason: String },
}

impl Event {
    /// Short name for logging and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CourseCompleted { .. } => "course_completed",
            Self::LessonCompleted { .. } => "lesson_completed",
            Self::MessageSent { .. } => "message_sent",
            Self::UserLoggedIn { .. } => "user_logged_in",
            Self::XpGranted { .. } => "xp_granted",
        }
    }

    /// XP delta carried by this event, if any
    pub fn xp_delta(&self) -> Option<i64> {
        match self {
            Self::CourseCompleted { xp, .. } => Some(*xp),
            Self::XpGranted { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    /// Validate the payload before any mutation
    ///
    /// XP is never retracted through this engine, so a negative delta is a
    /// caller bug and the whole event is rejected.
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(delta) = self.xp_delta() {
            if delta < 0 {
                return Err(EngineError::InvalidEvent(format!(
                    "negative xp delta {} in {} event",
                    delta,
                    self.kind()
                )));
            }
        }
        Ok(())
    }
}
