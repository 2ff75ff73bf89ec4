//! Text signal analysis
//!
//! Lightweight keyword detectors run over journal entries. They are
//! deliberately simple presence tests, not linguistic models.

pub mod signals;
pub mod quality;

pub use signals::{
    causal_language_count, perspective_marker_count, interpretation_drift_signal,
    analyze, TextSignals, DRIFT_WINDOW,
};
pub use quality::{capture_quality_heuristic, CaptureQuality, QualityLevel, AssessmentSource};
