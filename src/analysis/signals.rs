//! Signal detectors - marker presence tests over entry text
//!
//! Each detector lowercases the text once and checks a fixed marker list.
//! A marker counts at most once per call no matter how often it occurs.

use serde::Serialize;

/// Number of trailing entries considered by the drift detector
pub const DRIFT_WINDOW: usize = 5;

/// Minimum entries required before the drift detector reports anything
const DRIFT_MIN_ENTRIES: usize = 3;

/// Qualifying entries needed to raise the drift flag
const DRIFT_THRESHOLD: usize = 3;

/// Markers of causal reasoning
const CAUSAL_MARKERS: &[&str] = &[
    "because",
    "therefore",
    "led to",
    "as a result",
    "which meant",
    "so that",
    "caused",
    "resulted in",
    "due to",
    "that's why",
    "consequently",
];

/// Markers of taking another person's point of view
const PERSPECTIVE_MARKERS: &[&str] = &[
    "might have",
    "from their perspective",
    "from his perspective",
    "from her perspective",
    "their point of view",
    "in their shoes",
    "they probably",
    "maybe they",
    "they may have",
    "must have felt",
    "could have been",
];

/// Markers of interpretation rather than observation
const INTERPRETATION_MARKERS: &[&str] = &[
    "i realized",
    "i think",
    "this means",
    "i believe",
    "i learned",
    "it seems",
    "i feel like",
    "i understand",
    "it shows",
];

/// Markers of concrete sensory or behavioral observation
const SENSORY_MARKERS: &[&str] = &[
    "saw",
    "heard",
    "felt",
    "said",
    "smelled",
    "tasted",
    "touched",
    "noticed",
    "watched",
    "looked",
    "sounded",
];

/// Heuristic signals for a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextSignals {
    pub causal_hits: u32,
    pub perspective_hits: u32,
    pub has_interpretation: bool,
    pub has_sensory: bool,
}

/// Count distinct markers from `markers` present in already-lowercased text
fn markers_present(lower: &str, markers: &[&str]) -> u32 {
    markers.iter().filter(|m| lower.contains(*m)).count() as u32
}

fn contains_any(lower: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| lower.contains(m))
}

/// Number of distinct causal markers present in `text`
pub fn causal_language_count(text: &str) -> u32 {
    markers_present(&text.to_lowercase(), CAUSAL_MARKERS)
}

/// Number of distinct perspective markers present in `text`
pub fn perspective_marker_count(text: &str) -> u32 {
    markers_present(&text.to_lowercase(), PERSPECTIVE_MARKERS)
}

/// Whether an entry interprets without observing: it carries an
/// interpretation marker and no sensory marker at all.
fn is_interpretation_only(text: &str) -> bool {
    let lower = text.to_lowercase();
    contains_any(&lower, INTERPRETATION_MARKERS) && !contains_any(&lower, SENSORY_MARKERS)
}

/// Detect a drift toward interpretation over the most recent entries.
///
/// Only the last [`DRIFT_WINDOW`] texts are considered. Fewer than three
/// texts never produce a signal. Recomputed from scratch on every call.
pub fn interpretation_drift_signal<S: AsRef<str>>(recent_texts: &[S]) -> bool {
    let start = recent_texts.len().saturating_sub(DRIFT_WINDOW);
    let window = &recent_texts[start..];
    if window.len() < DRIFT_MIN_ENTRIES {
        return false;
    }

    let qualifying = window
        .iter()
        .filter(|t| is_interpretation_only(t.as_ref()))
        .count();
    qualifying >= DRIFT_THRESHOLD
}

/// Run every single-entry detector over `text`
pub fn analyze(text: &str) -> TextSignals {
    let lower = text.to_lowercase();
    TextSignals {
        causal_hits: markers_present(&lower, CAUSAL_MARKERS),
        perspective_hits: markers_present(&lower, PERSPECTIVE_MARKERS),
        has_interpretation: contains_any(&lower, INTERPRETATION_MARKERS),
        has_sensory: contains_any(&lower, SENSORY_MARKERS),
    }
}
