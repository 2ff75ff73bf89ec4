//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// A journaling topic used to diversify prompting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Person,
    Place,
    Conversation,
    Object,
    Moment,
    Routine,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 6] = [
        Category::Person,
        Category::Place,
        Category::Conversation,
        Category::Object,
        Category::Moment,
        Category::Routine,
    ];

    /// Stable label used as a map key in persisted state
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Person => "person",
            Category::Place => "place",
            Category::Conversation => "conversation",
            Category::Object => "object",
            Category::Moment => "moment",
            Category::Routine => "routine",
        }
    }

    /// Parse from a persisted label
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "person" => Some(Category::Person),
            "place" => Some(Category::Place),
            "conversation" => Some(Category::Conversation),
            "object" => Some(Category::Object),
            "moment" => Some(Category::Moment),
            "routine" => Some(Category::Routine),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| anyhow::anyhow!("Unknown category: {}", s))
    }
}

/// Count words the way the capture screen does: whitespace-separated tokens
pub fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
