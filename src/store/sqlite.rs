//! SQLite-backed progression store
//!
//! Single-file database shared by every engine consumer in the portal
//! process. WAL mode so profile reads don't block event processing.
//! The `(user_id, achievement_id)` composite primary key on
//! `user_achievements` is the uniqueness constraint the whole exactly-once
//! grant design rests on.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{CatalogRow, ProgressionStore};
use crate::catalog::AchievementDefinition;
use crate::models::{UserAchievement, UserProgress};
use crate::snapshot::ProgressSnapshot;
use crate::time_bucket::{day_bucket, parse_day_bucket};

/// Database wrapper, cheap to clone
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the progression database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progression db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Direct connection access (ad-hoc queries, tests)
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Progression DB lock poisoned")
    }

    // Future schema changes append versioned migrations here, keyed off
    // the schema_version table.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

impl ProgressionStore for SqliteStore {
    fn load_progress(&self, user_id: &str) -> Result<UserProgress> {
        let conn = self.conn();
        let row = conn
            .query_row(
                r#"SELECT total_xp, weekly_xp, week_bucket, current_streak, best_streak, last_activity_day
                   FROM user_progress WHERE user_id = ?1"#,
                [user_id],
                |r| {
                    Ok((
                        r.get::<_, u64>(0)?,
                        r.get::<_, u64>(1)?,
                        r.get::<_, Option<String>>(2)?,
                        r.get::<_, u32>(3)?,
                        r.get::<_, u32>(4)?,
                        r.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()
            .context("Failed to load user progress")?;

        let Some((total_xp, weekly_xp, week_bucket, current_streak, best_streak, last_day)) = row
        else {
            return Ok(UserProgress::new(user_id));
        };

        Ok(UserProgress {
            user_id: user_id.to_string(),
            total_xp,
            weekly_xp,
            week_bucket,
            current_streak,
            best_streak,
            last_activity_day: last_day.as_deref().and_then(parse_day_bucket),
        })
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<()> {
        let last_day = progress.last_activity_day.map(day_bucket);
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO user_progress
                   (user_id, total_xp, weekly_xp, week_bucket, current_streak, best_streak, last_activity_day)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(user_id) DO UPDATE SET
                   total_xp = ?2, weekly_xp = ?3, week_bucket = ?4,
                   current_streak = ?5, best_streak = ?6, last_activity_day = ?7"#,
            params![
                progress.user_id,
                progress.total_xp,
                progress.weekly_xp,
                progress.week_bucket,
                progress.current_streak,
                progress.best_streak,
                last_day,
            ],
        )
        .context("Failed to save user progress")?;
        Ok(())
    }

    fn insert_if_absent(
        &self,
        user_id: &str,
        achievement_id: &str,
        unlocked_at: i64,
    ) -> Result<bool> {
        let conn = self.conn();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, unlocked_at)
                 VALUES (?1, ?2, ?3)",
                params![user_id, achievement_id, unlocked_at],
            )
            .context("Failed to insert unlock record")?;
        Ok(inserted == 1)
    }

    fn read_snapshot(&self, user_id: &str) -> Result<ProgressSnapshot> {
        let conn = self.conn();
        let mut snapshot = ProgressSnapshot::default();

        if let Some((total_xp, current_streak)) = conn
            .query_row(
                "SELECT total_xp, current_streak FROM user_progress WHERE user_id = ?1",
                [user_id],
                |r| Ok((r.get::<_, u64>(0)?, r.get::<_, u32>(1)?)),
            )
            .optional()
            .context("Failed to read progress for snapshot")?
        {
            snapshot.total_xp = total_xp;
            snapshot.current_streak = current_streak;
        }

        snapshot.completed_courses = conn
            .query_row(
                "SELECT COUNT(*) FROM course_completions WHERE user_id = ?1",
                [user_id],
                |r| r.get(0),
            )
            .context("Failed to count course completions")?;

        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM course_completions WHERE user_id = ?1 GROUP BY category",
        )?;
        let rows = stmt.query_map([user_id], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, u64>(1)?))
        })?;
        for row in rows {
            let (category, count) = row?;
            snapshot.completed_by_category.insert(category, count);
        }

        let mut stmt =
            conn.prepare("SELECT category, COUNT(*) FROM course_catalog GROUP BY category")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, u64>(1)?)))?;
        for row in rows {
            let (category, count) = row?;
            snapshot.published_by_category.insert(category, count);
        }

        snapshot.messages_sent = conn
            .query_row(
                "SELECT total FROM message_counts WHERE user_id = ?1",
                [user_id],
                |r| r.get(0),
            )
            .optional()
            .context("Failed to read message count")?
            .unwrap_or(0);

        Ok(snapshot)
    }

    fn read_catalog(&self) -> Result<Vec<CatalogRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, xp_reward, kind, condition
             FROM achievement_catalog ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(CatalogRow {
                    id: r.get(0)?,
                    title: r.get(1)?,
                    description: r.get(2)?,
                    xp_reward: r.get(3)?,
                    kind: r.get(4)?,
                    condition: r.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read achievement catalog")?;
        Ok(rows)
    }

    fn unlocked(&self, user_id: &str) -> Result<Vec<UserAchievement>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT achievement_id, unlocked_at FROM user_achievements
             WHERE user_id = ?1 ORDER BY unlocked_at",
        )?;
        let rows = stmt
            .query_map([user_id], |r| {
                Ok(UserAchievement {
                    user_id: user_id.to_string(),
                    achievement_id: r.get(0)?,
                    unlocked_at: r.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read unlocked achievements")?;
        Ok(rows)
    }

    fn record_course_completion(
        &self,
        user_id: &str,
        course_id: &str,
        category: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO course_completions (user_id, course_id, category, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, course_id, category, now],
        )
        .context("Failed to record course completion")?;
        Ok(())
    }

    fn record_lesson_completion(&self, user_id: &str, lesson_id: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO lesson_completions (user_id, lesson_id, completed_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, lesson_id, now],
        )
        .context("Failed to record lesson completion")?;
        Ok(())
    }

    fn record_message(&self, user_id: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO message_counts (user_id, total, last_updated)
               VALUES (?1, 1, ?2)
               ON CONFLICT(user_id) DO UPDATE SET total = total + 1, last_updated = ?2"#,
            params![user_id, now],
        )
        .context("Failed to record message")?;
        Ok(())
    }

    fn publish_course(&self, course_id: &str, category: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO course_catalog (course_id, category)
               VALUES (?1, ?2)
               ON CONFLICT(course_id) DO UPDATE SET category = ?2"#,
            params![course_id, category],
        )
        .context("Failed to publish course")?;
        Ok(())
    }

    fn upsert_definition(&self, def: &AchievementDefinition) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO achievement_catalog (id, title, description, xp_reward, kind, condition)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               ON CONFLICT(id) DO UPDATE SET
                   title = ?2, description = ?3, xp_reward = ?4, kind = ?5, condition = ?6"#,
            params![
                def.id,
                def.title,
                def.description,
                def.xp_reward,
                def.kind.as_str(),
                def.condition.to_json(),
            ],
        )
        .context("Failed to upsert achievement definition")?;
        Ok(())
    }
}

/// SQL schema for the progression database
const SCHEMA_SQL: &str = r#"
-- Per-user progression state (level is always derived, never stored)
CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT PRIMARY KEY,
    total_xp INTEGER NOT NULL DEFAULT 0,
    weekly_xp INTEGER NOT NULL DEFAULT 0,
    week_bucket TEXT,
    current_streak INTEGER NOT NULL DEFAULT 0,
    best_streak INTEGER NOT NULL DEFAULT 0,
    last_activity_day TEXT
);

-- Unlocked achievements; the composite key is the exactly-once guarantee
CREATE TABLE IF NOT EXISTS user_achievements (
    user_id TEXT NOT NULL,
    achievement_id TEXT NOT NULL,
    unlocked_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, achievement_id)
);

-- Admin-authored achievement definitions; condition is a tagged JSON payload
CREATE TABLE IF NOT EXISTS achievement_catalog (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    xp_reward INTEGER NOT NULL DEFAULT 0,
    kind TEXT NOT NULL,
    condition TEXT NOT NULL
);

-- Live course catalog (what category_completion measures against)
CREATE TABLE IF NOT EXISTS course_catalog (
    course_id TEXT PRIMARY KEY,
    category TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_course_category ON course_catalog(category);

-- Distinct completed courses per user
CREATE TABLE IF NOT EXISTS course_completions (
    user_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    category TEXT NOT NULL,
    completed_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, course_id)
);
CREATE INDEX IF NOT EXISTS idx_completion_category ON course_completions(user_id, category);

-- Distinct completed lessons per user (no condition consumes these yet)
CREATE TABLE IF NOT EXISTS lesson_completions (
    user_id TEXT NOT NULL,
    lesson_id TEXT NOT NULL,
    completed_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, lesson_id)
);

-- Lifetime chat message counters
CREATE TABLE IF NOT EXISTS message_counts (
    user_id TEXT PRIMARY KEY,
    total INTEGER NOT NULL DEFAULT 0,
    last_updated INTEGER NOT NULL
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
