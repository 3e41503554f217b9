//! Shared helpers for progression engine integration tests
#![allow(dead_code)]

use tempfile::TempDir;

use progression_engine::{
    AchievementDefinition, AchievementKind, Condition, ProgressionEngine, ProgressionStore,
    SqliteStore,
};

/// Build an engine over a file-backed store in a temp directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn test_engine() -> (ProgressionEngine<SqliteStore>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteStore::open(&dir.path().join("progression.db"))
        .expect("Failed to open progression store");
    (ProgressionEngine::new(store), dir)
}

/// Shorthand for a catalog definition
pub fn def(
    id: &str,
    xp_reward: u64,
    kind: AchievementKind,
    condition: Condition,
) -> AchievementDefinition {
    AchievementDefinition {
        id: id.to_string(),
        title: id.to_string(),
        description: String::new(),
        xp_reward,
        kind,
        condition,
    }
}

/// Seed definitions into the engine's store
pub fn seed(engine: &ProgressionEngine<SqliteStore>, defs: &[AchievementDefinition]) {
    for d in defs {
        engine
            .store()
            .upsert_definition(d)
            .expect("Failed to seed achievement definition");
    }
}
