//! Capture quality results
//!
//! Real assessments come from the remote generation service. When it is
//! unavailable the heuristic below yields a fixed degraded default, tagged
//! so callers can tell it apart from an assessed result.

use serde::{Deserialize, Serialize};

/// Coarse level for specificity and sensory detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

impl QualityLevel {
    /// Parse a level as the remote service reports it
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "1" => Some(QualityLevel::Low),
            "medium" | "moderate" | "2" => Some(QualityLevel::Medium),
            "high" | "3" => Some(QualityLevel::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityLevel::Low => write!(f, "low"),
            QualityLevel::Medium => write!(f, "medium"),
            QualityLevel::High => write!(f, "high"),
        }
    }
}

/// Where a quality result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSource {
    Assessed,
    Defaulted,
}

/// Structured capture quality feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureQuality {
    pub specificity: QualityLevel,
    pub sensory_detail: QualityLevel,
    pub verbatim_presence: bool,
    /// 0.0 is purely emotional, 1.0 purely behavioral
    pub behavioral_vs_emotional: f64,
    pub suggestions: Vec<String>,
    pub source: AssessmentSource,
}

impl CaptureQuality {
    /// Whether this came from a real assessment
    pub fn is_assessed(&self) -> bool {
        self.source == AssessmentSource::Assessed
    }
}

/// Degraded-mode quality result used when no assessment is available.
///
/// The text is not inspected.
pub fn capture_quality_heuristic(_text: &str) -> CaptureQuality {
    CaptureQuality {
        specificity: QualityLevel::Low,
        sensory_detail: QualityLevel::Low,
        verbatim_presence: false,
        behavioral_vs_emotional: 0.5,
        suggestions: Vec::new(),
        source: AssessmentSource::Defaulted,
    }
}
