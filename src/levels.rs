//! XP and level system
//!
//! Defines the level curve and the single mutation path for XP.
//!
//! The curve is a fixed banded table: level 1 starts at 0 XP and each level
//! opens at a hand-tuned threshold. [`Level::for_xp`] is pure and monotonic,
//! so a user's level can always be recomputed from `total_xp` alone - the
//! store never persists level as its own column.

use chrono::{DateTime, Utc};

use crate::models::UserProgress;
use crate::time_bucket::week_bucket;

/// Level definition
#[derive(Debug, Clone)]
pub struct Level {
    pub level: u32,
    pub xp_required: u64,
    pub title: &'static str,
}

/// All level definitions (must be sorted by level)
pub static LEVELS: &[Level] = &[
    Level {
        level: 1,
        xp_required: 0,
        title: "Newcomer",
    },
    Level {
        level: 2,
        xp_required: 100,
        title: "Explorer",
    },
    Level {
        level: 3,
        xp_required: 250,
        title: "Explorer",
    },
    Level {
        level: 4,
        xp_required: 500,
        title: "Contributor",
    },
    Level {
        level: 5,
        xp_required: 850,
        title: "Contributor",
    },
    Level {
        level: 6,
        xp_required: 1300,
        title: "Collaborator",
    },
    Level {
        level: 7,
        xp_required: 1900,
        title: "Collaborator",
    },
    Level {
        level: 8,
        xp_required: 2700,
        title: "Specialist",
    },
    Level {
        level: 9,
        xp_required: 3700,
        title: "Specialist",
    },
    Level {
        level: 10,
        xp_required: 5000,
        title: "Mentor",
    },
    Level {
        level: 11,
        xp_required: 6600,
        title: "Mentor",
    },
    Level {
        level: 12,
        xp_required: 8500,
        title: "Expert",
    },
    Level {
        level: 13,
        xp_required: 11000,
        title: "Expert",
    },
    Level {
        level: 14,
        xp_required: 14000,
        title: "Luminary",
    },
    Level {
        level: 15,
        xp_required: 18000,
        title: "Legend",
    },
];

impl Level {
    /// Calculate level and title for given XP
    pub fn for_xp(xp: u64) -> &'static Level {
        LEVELS
            .iter()
            .rev()
            .find(|l| xp >= l.xp_required)
            .unwrap_or(&LEVELS[0])
    }

    /// Get XP needed for next level (None if max level)
    pub fn xp_for_next(current_level: u32) -> Option<u64> {
        LEVELS
            .iter()
            .find(|l| l.level == current_level + 1)
            .map(|l| l.xp_required)
    }

    /// Get max level
    pub fn max_level() -> u32 {
        LEVELS.last().map(|l| l.level).unwrap_or(1)
    }
}

/// Read-only projection of a user's position on the level curve
///
/// Everything here is derived from `total_xp`; build it fresh whenever the
/// profile or dashboard needs it.
#[derive(Debug, Clone, Default)]
pub struct LevelProgress {
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    /// XP threshold of the current level
    pub current_level_xp: u64,
    /// XP threshold of the next level (None if max)
    pub next_level_xp: Option<u64>,
}

impl LevelProgress {
    pub fn for_xp(total_xp: u64) -> Self {
        let level_info = Level::for_xp(total_xp);
        let next_xp = Level::xp_for_next(level_info.level);

        Self {
            total_xp,
            level: level_info.level,
            title: level_info.title.to_string(),
            current_level_xp: level_info.xp_required,
            next_level_xp: next_xp,
        }
    }

    /// Progress toward the next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        match self.next_level_xp {
            Some(next) => {
                let xp_in_level = self.total_xp - self.current_level_xp;
                let xp_for_level = next - self.current_level_xp;
                if xp_for_level == 0 {
                    1.0
                } else {
                    (xp_in_level as f32) / (xp_for_level as f32)
                }
            }
            None => 1.0, // Max level
        }
    }

    pub fn is_max_level(&self) -> bool {
        self.next_level_xp.is_none()
    }
}

/// Outcome of applying an XP delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpApplied {
    pub old_level: u32,
    pub new_level: u32,
}

impl XpApplied {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Apply a non-negative XP delta to a user's progress
///
/// Adds to both the lifetime total and the weekly counter. The weekly
/// counter belongs to a single ISO week (Monday 00:00 UTC); if the stored
/// week marker is stale the counter resets to zero before the delta lands.
/// The reset is lazy - nothing touches a dormant user's record at the
/// week boundary itself.
pub fn add_xp(progress: &mut UserProgress, amount: u64, now: DateTime<Utc>) -> XpApplied {
    let old_level = progress.level();

    let current_week = week_bucket(now);
    if progress.week_bucket.as_deref() != Some(current_week.as_str()) {
        progress.weekly_xp = 0;
        progress.week_bucket = Some(current_week);
    }

    progress.total_xp += amount;
    progress.weekly_xp += amount;

    XpApplied {
        old_level,
        new_level: progress.level(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(Level::for_xp(0).level, 1);
        assert_eq!(Level::for_xp(99).level, 1);
        assert_eq!(Level::for_xp(100).level, 2);
        assert_eq!(Level::for_xp(850).level, 5);
        assert_eq!(Level::for_xp(18000).level, 15);
        assert_eq!(Level::for_xp(1_000_000).level, 15); // Beyond max
    }

    #[test]
    fn test_level_curve_is_monotonic() {
        for pair in LEVELS.windows(2) {
            assert!(pair[1].level == pair[0].level + 1);
            assert!(pair[1].xp_required > pair[0].xp_required);
        }
    }

    #[test]
    fn test_progress_to_next() {
        let progress = LevelProgress::for_xp(175); // Between level 2 (100) and 3 (250)
        assert_eq!(progress.level, 2);
        assert!((progress.progress_to_next() - 0.5).abs() < 0.01); // 75/150
        assert!(!progress.is_max_level());

        let maxed = LevelProgress::for_xp(50_000);
        assert!(maxed.is_max_level());
        assert_eq!(maxed.progress_to_next(), 1.0);
    }

    #[test]
    fn test_add_xp_is_additive() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
        let mut progress = UserProgress::new("u1");

        add_xp(&mut progress, 40, now);
        add_xp(&mut progress, 0, now);
        add_xp(&mut progress, 25, now);

        assert_eq!(progress.total_xp, 65);
        assert_eq!(progress.weekly_xp, 65);
        assert_eq!(progress.level(), Level::for_xp(65).level);
    }

    #[test]
    fn test_add_xp_reports_level_up() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
        let mut progress = UserProgress::new("u1");

        let applied = add_xp(&mut progress, 99, now);
        assert!(!applied.leveled_up());

        let applied = add_xp(&mut progress, 1, now);
        assert!(applied.leveled_up());
        assert_eq!(applied.old_level, 1);
        assert_eq!(applied.new_level, 2);
    }

    #[test]
    fn test_weekly_xp_resets_across_week_boundary() {
        // Wednesday, then the following Monday
        let wednesday = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap();

        let mut progress = UserProgress::new("u1");
        add_xp(&mut progress, 120, wednesday);
        assert_eq!(progress.weekly_xp, 120);

        add_xp(&mut progress, 30, monday);
        assert_eq!(progress.weekly_xp, 30);
        assert_eq!(progress.total_xp, 150);
    }

    #[test]
    fn test_weekly_xp_resets_only_once_per_week() {
        let monday = Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();
        let friday = Utc.with_ymd_and_hms(2026, 3, 13, 8, 0, 0).unwrap();

        let mut progress = UserProgress::new("u1");
        progress.weekly_xp = 500;
        progress.week_bucket = Some("2026-W11".into());

        add_xp(&mut progress, 10, monday);
        add_xp(&mut progress, 10, friday);
        assert_eq!(progress.weekly_xp, 520); // same week, no second reset
    }
}
