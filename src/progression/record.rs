//! Progression record - the per-user skill state
//!
//! One record per user, created at stage 1 with zeroed counters and
//! mutated only by the tracker on each capture event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Journaling maturity stage, 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    pub const FIRST: Stage = Stage(1);
    pub const LAST: Stage = Stage(4);

    /// Build a stage from its number, if in range
    pub fn new(n: u8) -> Option<Self> {
        (Self::FIRST.0..=Self::LAST.0).contains(&n).then_some(Stage(n))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// The following stage, or `None` at the last stage
    pub fn next(&self) -> Option<Stage> {
        Stage::new(self.0 + 1)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for Stage {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Stage::new(n).ok_or_else(|| format!("stage out of range: {}", n))
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        stage.0
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Long-lived progression state for a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRecord {
    pub stage: Stage,
    pub capture_count: u32,
    pub phase2_completion_count: u32,
    pub total_word_count: u64,
    pub causal_language_hits: u32,
    pub perspective_marker_hits: u32,
    /// Maintained by whatever links entries together; nothing here updates it
    pub cross_reference_count: u32,
    pub category_domain_distribution: HashMap<String, u32>,
    pub category_last_used: HashMap<String, DateTime<Utc>>,
    /// Append-only: one entry per stage ever reached through advancement
    pub stage_advanced_at: BTreeMap<u8, DateTime<Utc>>,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            stage: Stage::FIRST,
            capture_count: 0,
            phase2_completion_count: 0,
            total_word_count: 0,
            causal_language_hits: 0,
            perspective_marker_hits: 0,
            cross_reference_count: 0,
            category_domain_distribution: HashMap::new(),
            category_last_used: HashMap::new(),
            stage_advanced_at: BTreeMap::new(),
        }
    }
}

impl ProgressionRecord {
    /// Create a fresh record at stage 1
    pub fn new() -> Self {
        Self::default()
    }

    fn per_capture(&self, value: f64) -> f64 {
        if self.capture_count == 0 {
            0.0
        } else {
            value / self.capture_count as f64
        }
    }

    /// Mean words per capture
    pub fn average_words(&self) -> f64 {
        self.per_capture(self.total_word_count as f64)
    }

    /// Share of captures that went on to complete phase 2
    pub fn phase2_rate(&self) -> f64 {
        self.per_capture(self.phase2_completion_count as f64)
    }

    /// Causal marker hits per capture. Can exceed 1.0 since an entry may
    /// contribute one hit for each distinct marker it contains.
    pub fn causal_rate(&self) -> f64 {
        self.per_capture(self.causal_language_hits as f64)
    }

    /// Perspective marker hits per capture, same arithmetic as `causal_rate`
    pub fn perspective_rate(&self) -> f64 {
        self.per_capture(self.perspective_marker_hits as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record() {
        let record = ProgressionRecord::new();
        assert_eq!(record.stage, Stage::FIRST);
        assert_eq!(record.capture_count, 0);
        assert_eq!(record.average_words(), 0.0);
        assert_eq!(record.phase2_rate(), 0.0);
        assert!(record.stage_advanced_at.is_empty());
    }

    #[test]
    fn test_stage_bounds() {
        assert_eq!(Stage::new(0), None);
        assert_eq!(Stage::new(5), None);
        assert_eq!(Stage::FIRST.next(), Stage::new(2));
        assert_eq!(Stage::LAST.next(), None);
    }

    #[test]
    fn test_stage_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Stage>("3").is_ok());
        assert!(serde_json::from_str::<Stage>("7").is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let record: ProgressionRecord =
            serde_json::from_str(r#"{"stage": 2, "capture_count": 9}"#).unwrap();
        assert_eq!(record.stage.number(), 2);
        assert_eq!(record.capture_count, 9);
        assert_eq!(record.total_word_count, 0);
    }
}
