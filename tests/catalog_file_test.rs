//! Integration test for the admin catalog pipeline: TOML file -> store -> grant

mod common;

use std::fs;

use progression_engine::{catalog, Event, ProgressionStore};

use common::test_engine;

const CATALOG_TOML: &str = r#"
[[achievement]]
id = "first-course"
title = "First Steps"
description = "Complete your first course"
xp_reward = 50
kind = "COURSE_COMPLETION"
condition = { type = "course_completion", count = 1 }

[[achievement]]
id = "xp-1000"
title = "Rising Star"
description = "Reach 1000 XP"
xp_reward = 100
kind = "XP_MILESTONE"
condition = { type = "xp_milestone", amount = 1000 }

[[achievement]]
id = "week-streak"
title = "Regular"
description = "Log in seven days in a row"
xp_reward = 75
kind = "LOGIN_STREAK"
condition = { type = "login_streak", days = 7 }
"#;

#[test]
fn test_catalog_file_seeds_store_and_grants() {
    let (engine, dir) = test_engine();

    let catalog_path = dir.path().join("achievements.toml");
    fs::write(&catalog_path, CATALOG_TOML).unwrap();

    let defs = catalog::load_catalog_file(&catalog_path).unwrap();
    assert_eq!(defs.len(), 3);
    for def in &defs {
        engine.store().upsert_definition(def).unwrap();
    }

    let result = engine
        .on_event(
            "maria",
            &Event::CourseCompleted {
                course_id: "onb-1".into(),
                category: "Onboarding".into(),
                xp: 20,
            },
        )
        .unwrap();

    assert_eq!(result.unlocked.len(), 1);
    assert_eq!(result.unlocked[0].id, "first-course");
    assert_eq!(result.unlocked[0].title, "First Steps");
    assert!(result.warnings.is_empty());
}

#[test]
fn test_reloading_catalog_is_idempotent() {
    let (engine, dir) = test_engine();

    let catalog_path = dir.path().join("achievements.toml");
    fs::write(&catalog_path, CATALOG_TOML).unwrap();

    // Admin deploys the same catalog twice; definitions upsert in place
    for _ in 0..2 {
        for def in catalog::load_catalog_file(&catalog_path).unwrap() {
            engine.store().upsert_definition(&def).unwrap();
        }
    }

    let rows = engine.store().read_catalog().unwrap();
    assert_eq!(rows.len(), 3);
}
