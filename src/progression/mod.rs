//! Skill progression
//!
//! Tracks a user's movement through four journaling stages. Stages only
//! move forward, one at a time, when every threshold of the current
//! stage's rule holds together.

pub mod record;
pub mod rules;
pub mod tracker;

pub use record::{ProgressionRecord, Stage};
pub use rules::{AdvancementRule, RateMetric, ThresholdStatus};
pub use tracker::{apply_capture, CaptureEvent, ProgressionChange, ProgressionTracker};
