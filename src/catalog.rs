//! Achievement catalog
//!
//! Definitions are admin-authored configuration: created and edited outside
//! the engine, append-only from the engine's point of view. They can be
//! loaded from a TOML document:
//!
//! ```toml
//! [[achievement]]
//! id = "security-graduate"
//! title = "Security Graduate"
//! description = "Complete every published security course"
//! xp_reward = 150
//! kind = "COURSE_COMPLETION"
//! condition = { type = "category_completion", category = "Seguranca" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Broad achievement family, stored alongside the condition payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementKind {
    CourseCompletion,
    XpMilestone,
    LoginStreak,
    CommunityParticipation,
}

impl AchievementKind {
    /// String form for catalog storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CourseCompletion => "COURSE_COMPLETION",
            Self::XpMilestone => "XP_MILESTONE",
            Self::LoginStreak => "LOGIN_STREAK",
            Self::CommunityParticipation => "COMMUNITY_PARTICIPATION",
        }
    }

    /// Parse from catalog storage
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "COURSE_COMPLETION" => Some(Self::CourseCompletion),
            "XP_MILESTONE" => Some(Self::XpMilestone),
            "LOGIN_STREAK" => Some(Self::LoginStreak),
            "COMMUNITY_PARTICIPATION" => Some(Self::CommunityParticipation),
            _ => None,
        }
    }

    /// Whether a condition belongs to this family
    pub fn matches(&self, condition: &Condition) -> bool {
        matches!(
            (self, condition),
            (
                Self::CourseCompletion,
                Condition::CourseCompletion { .. } | Condition::CategoryCompletion { .. }
            ) | (Self::XpMilestone, Condition::XpMilestone { .. })
                | (Self::LoginStreak, Condition::LoginStreak { .. })
                | (Self::CommunityParticipation, Condition::MessagesSent { .. })
        )
    }
}

/// One catalog entry, fully parsed and validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub xp_reward: u64,
    pub kind: AchievementKind,
    pub condition: Condition,
}

/// Error type for catalog parsing
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("duplicate achievement id: {0}")]
    DuplicateId(String),

    #[error("achievement {id}: missing required field {field}")]
    MissingField { id: String, field: &'static str },

    #[error("unknown achievement kind: {0}")]
    UnknownKind(String),

    #[error("malformed condition payload: {0}")]
    Condition(#[from] serde_json::Error),

    #[error("achievement {id}: {kind:?} kind does not match its condition")]
    KindMismatch { id: String, kind: AchievementKind },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    achievement: Vec<AchievementDefinition>,
}

/// Parse a catalog TOML document
pub fn parse_catalog(content: &str) -> Result<Vec<AchievementDefinition>, CatalogError> {
    let file: CatalogFile = toml::from_str(content)?;

    let mut seen = std::collections::HashSet::new();
    for def in &file.achievement {
        if def.id.is_empty() {
            return Err(CatalogError::MissingField {
                id: def.title.clone(),
                field: "id",
            });
        }
        if !seen.insert(def.id.clone()) {
            return Err(CatalogError::DuplicateId(def.id.clone()));
        }
        if !def.kind.matches(&def.condition) {
            return Err(CatalogError::KindMismatch {
                id: def.id.clone(),
                kind: def.kind,
            });
        }
    }

    Ok(file.achievement)
}

/// Load a catalog TOML file from disk
pub fn load_catalog_file(path: &Path) -> Result<Vec<AchievementDefinition>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
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
        xp_reward = 100
        kind = "XP_MILESTONE"
        condition = { type = "xp_milestone", amount = 1000 }

        [[achievement]]
        id = "chatterbox"
        title = "Chatterbox"
        xp_reward = 75
        kind = "COMMUNITY_PARTICIPATION"
        condition = { type = "messages_sent", count = 50 }
    "#;

    #[test]
    fn test_parse_sample_catalog() {
        let defs = parse_catalog(SAMPLE).unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].id, "first-course");
        assert_eq!(defs[0].condition, Condition::CourseCompletion { count: 1 });
        assert_eq!(defs[1].description, ""); // optional field defaults
        assert_eq!(defs[2].kind, AchievementKind::CommunityParticipation);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let doc = r#"
            [[achievement]]
            id = "dup"
            title = "A"
            kind = "XP_MILESTONE"
            condition = { type = "xp_milestone", amount = 1 }

            [[achievement]]
            id = "dup"
            title = "B"
            kind = "XP_MILESTONE"
            condition = { type = "xp_milestone", amount = 2 }
        "#;
        assert!(matches!(
            parse_catalog(doc),
            Err(CatalogError::DuplicateId(id)) if id == "dup"
        ));
    }

    #[test]
    fn test_kind_condition_mismatch_rejected() {
        let doc = r#"
            [[achievement]]
            id = "confused"
            title = "Confused"
            kind = "LOGIN_STREAK"
            condition = { type = "messages_sent", count = 10 }
        "#;
        assert!(matches!(
            parse_catalog(doc),
            Err(CatalogError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_category_condition_belongs_to_course_kind() {
        let doc = r#"
            [[achievement]]
            id = "security-graduate"
            title = "Security Graduate"
            kind = "COURSE_COMPLETION"
            condition = { type = "category_completion", category = "Seguranca" }
        "#;
        let defs = parse_catalog(doc).unwrap();
        assert_eq!(
            defs[0].condition,
            Condition::CategoryCompletion {
                category: "Seguranca".into()
            }
        );
    }

    #[test]
    fn test_unknown_condition_type_is_a_toml_error() {
        let doc = r#"
            [[achievement]]
            id = "weird"
            title = "Weird"
            kind = "XP_MILESTONE"
            condition = { type = "karma", amount = 1 }
        "#;
        assert!(matches!(parse_catalog(doc), Err(CatalogError::Toml(_))));
    }
}
