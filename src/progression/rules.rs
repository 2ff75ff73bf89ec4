//! Stage advancement rules
//!
//! Each stage has exactly one outgoing rule. All of its thresholds must
//! hold at once. Only the rule for the record's current stage is ever
//! evaluated, so a stage can never be skipped.

use serde::Serialize;

use super::record::{ProgressionRecord, Stage};

/// Which rate a rule gates on besides volume and length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMetric {
    Phase2Completion,
    CausalLanguage,
    PerspectiveMarkers,
}

impl RateMetric {
    fn read(&self, record: &ProgressionRecord) -> f64 {
        match self {
            RateMetric::Phase2Completion => record.phase2_rate(),
            RateMetric::CausalLanguage => record.causal_rate(),
            RateMetric::PerspectiveMarkers => record.perspective_rate(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RateMetric::Phase2Completion => "phase 2 rate",
            RateMetric::CausalLanguage => "causal rate",
            RateMetric::PerspectiveMarkers => "perspective rate",
        }
    }
}

/// Thresholds for leaving one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdvancementRule {
    pub from: u8,
    pub min_captures: u32,
    pub min_average_words: f64,
    pub rate: RateMetric,
    pub min_rate: f64,
}

const RULES: [AdvancementRule; 3] = [
    AdvancementRule {
        from: 1,
        min_captures: 5,
        min_average_words: 50.0,
        rate: RateMetric::Phase2Completion,
        min_rate: 0.6,
    },
    AdvancementRule {
        from: 2,
        min_captures: 15,
        min_average_words: 75.0,
        rate: RateMetric::CausalLanguage,
        min_rate: 0.5,
    },
    AdvancementRule {
        from: 3,
        min_captures: 30,
        min_average_words: 100.0,
        rate: RateMetric::PerspectiveMarkers,
        min_rate: 0.4,
    },
];

/// The rule that applies while at `stage`, if any
pub fn rule_for(stage: Stage) -> Option<&'static AdvancementRule> {
    RULES.iter().find(|r| r.from == stage.number())
}

impl AdvancementRule {
    /// Whether every threshold holds for `record`
    pub fn is_satisfied(&self, record: &ProgressionRecord) -> bool {
        record.capture_count >= self.min_captures
            && record.average_words() >= self.min_average_words
            && self.rate.read(record) >= self.min_rate
    }

    /// Per-threshold status for display
    pub fn progress(&self, record: &ProgressionRecord) -> Vec<ThresholdStatus> {
        let rate = self.rate.read(record);
        vec![
            ThresholdStatus {
                name: "captures",
                current: record.capture_count as f64,
                required: self.min_captures as f64,
                met: record.capture_count >= self.min_captures,
            },
            ThresholdStatus {
                name: "average words",
                current: record.average_words(),
                required: self.min_average_words,
                met: record.average_words() >= self.min_average_words,
            },
            ThresholdStatus {
                name: self.rate.label(),
                current: rate,
                required: self.min_rate,
                met: rate >= self.min_rate,
            },
        ]
    }
}

/// One threshold of the active rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdStatus {
    pub name: &'static str,
    pub current: f64,
    pub required: f64,
    pub met: bool,
}

/// The stage `record` should move to now, if its current rule is met
pub fn next_stage(record: &ProgressionRecord) -> Option<Stage> {
    let rule = rule_for(record.stage)?;
    if rule.is_satisfied(record) {
        record.stage.next()
    } else {
        None
    }
}
