//! Progression tracker - the engine's state machine
//!
//! Consumes capture events, updates the record's running counters from the
//! text signal detectors, and advances the stage when the active rule holds.
//! Every capture is applied, evaluated and persisted under a single lock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::record::{ProgressionRecord, Stage};
use super::rules::{self, ThresholdStatus};
use crate::analysis::{self, DRIFT_WINDOW};
use crate::storage::{self, StateStore};
use crate::types::Category;

/// Capacity of the change broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// A saved journal entry, as reported by the capture screen
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub entry_text: String,
    pub word_count: u32,
    pub phase2_completed: bool,
    pub category: Option<Category>,
    pub domain: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CaptureEvent {
    /// Build an event stamped now, counting words from the text
    pub fn new(entry_text: impl Into<String>) -> Self {
        let entry_text = entry_text.into();
        Self {
            word_count: crate::types::word_count(&entry_text),
            entry_text,
            phase2_completed: false,
            category: None,
            domain: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_word_count(mut self, word_count: u32) -> Self {
        self.word_count = word_count;
        self
    }

    pub fn with_phase2(mut self, completed: bool) -> Self {
        self.phase2_completed = completed;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// What a capture did to the record, published to subscribers
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionChange {
    pub previous_stage: Stage,
    pub stage: Stage,
    pub advanced_to: Option<Stage>,
    pub capture_count: u32,
    pub total_word_count: u64,
    pub phase2_completion_count: u32,
    pub causal_hits_added: u32,
    pub perspective_hits_added: u32,
    pub average_words: f64,
    pub phase2_rate: f64,
    pub causal_rate: f64,
    pub perspective_rate: f64,
    pub interpretation_drift: bool,
    pub persisted: bool,
    pub timestamp: DateTime<Utc>,
}

/// Apply one capture to `record` and advance at most one stage.
///
/// Returns the new stage if advancement happened.
pub fn apply_capture(record: &mut ProgressionRecord, event: &CaptureEvent) -> Option<Stage> {
    record.capture_count += 1;
    record.total_word_count += u64::from(event.word_count);

    if event.phase2_completed {
        record.phase2_completion_count += 1;
    }

    if let Some(category) = event.category {
        record
            .category_last_used
            .insert(category.as_str().to_string(), event.timestamp);
    }

    if let Some(domain) = &event.domain {
        *record
            .category_domain_distribution
            .entry(domain.clone())
            .or_insert(0) += 1;
    }

    // Presence counts per entry, later compared against per-capture rates.
    record.causal_language_hits += analysis::causal_language_count(&event.entry_text);
    record.perspective_marker_hits += analysis::perspective_marker_count(&event.entry_text);

    let next = rules::next_stage(record)?;
    debug_assert!(next > record.stage, "stage must only move forward");
    record.stage = next;
    record
        .stage_advanced_at
        .entry(next.number())
        .or_insert(event.timestamp);
    Some(next)
}

struct TrackerState {
    record: ProgressionRecord,
    recent_texts: VecDeque<String>,
}

/// Single owner of the user's progression record
pub struct ProgressionTracker {
    state: Mutex<TrackerState>,
    store: Arc<dyn StateStore>,
    events: broadcast::Sender<ProgressionChange>,
}

impl ProgressionTracker {
    /// Load the record and the drift window from `store`, starting fresh
    /// if either is absent or unreadable
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let record = storage::load_record_or_default(store.as_ref());
        let recent = storage::load_recent_or_default(store.as_ref());
        debug!(
            "Loaded progression record at stage {} with {} captures",
            record.stage, record.capture_count
        );

        let tracker = Self::with_record(record, store);
        {
            let mut state = tracker.lock();
            let skip = recent.len().saturating_sub(DRIFT_WINDOW);
            state.recent_texts.extend(recent.into_iter().skip(skip));
        }
        tracker
    }

    /// Create around an existing record
    pub fn with_record(record: ProgressionRecord, store: Arc<dyn StateStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(TrackerState {
                record,
                recent_texts: VecDeque::with_capacity(DRIFT_WINDOW),
            }),
            store,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a saved entry, evaluate advancement, and persist.
    ///
    /// Persistence failures are logged and the session continues in memory.
    pub fn record_capture(&self, event: &CaptureEvent) -> ProgressionChange {
        let mut state = self.lock();
        let previous_stage = state.record.stage;

        let advanced_to = apply_capture(&mut state.record, event);

        if state.recent_texts.len() == DRIFT_WINDOW {
            state.recent_texts.pop_front();
        }
        state.recent_texts.push_back(event.entry_text.clone());
        let drift = analysis::interpretation_drift_signal(state.recent_texts.make_contiguous());

        let window: Vec<String> = state.recent_texts.iter().cloned().collect();
        if let Err(e) = self.store.save_recent_texts(&window) {
            warn!("Failed to persist recent entries: {:#}", e);
        }

        let persisted = match self.store.save_record(&state.record) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist progression record: {:#}", e);
                false
            }
        };

        if let Some(stage) = advanced_to {
            info!(
                "Advanced from stage {} to stage {} after {} captures",
                previous_stage, stage, state.record.capture_count
            );
        }

        let record = &state.record;
        let change = ProgressionChange {
            previous_stage,
            stage: record.stage,
            advanced_to,
            capture_count: record.capture_count,
            total_word_count: record.total_word_count,
            phase2_completion_count: record.phase2_completion_count,
            causal_hits_added: analysis::causal_language_count(&event.entry_text),
            perspective_hits_added: analysis::perspective_marker_count(&event.entry_text),
            average_words: record.average_words(),
            phase2_rate: record.phase2_rate(),
            causal_rate: record.causal_rate(),
            perspective_rate: record.perspective_rate(),
            interpretation_drift: drift,
            persisted,
            timestamp: event.timestamp,
        };
        drop(state);

        // No subscribers is fine.
        let _ = self.events.send(change.clone());
        change
    }

    /// Subscribe to change descriptors from future captures
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressionChange> {
        self.events.subscribe()
    }

    /// Copy of the current record
    pub fn snapshot(&self) -> ProgressionRecord {
        self.lock().record.clone()
    }

    pub fn current_stage(&self) -> Stage {
        self.lock().record.stage
    }

    /// Threshold status for the active rule, `None` at the last stage
    pub fn progress_toward_next(&self) -> Option<Vec<ThresholdStatus>> {
        let state = self.lock();
        rules::rule_for(state.record.stage).map(|rule| rule.progress(&state.record))
    }

    /// Drift signal over entries captured this session
    pub fn interpretation_drift(&self) -> bool {
        let mut state = self.lock();
        analysis::interpretation_drift_signal(state.recent_texts.make_contiguous())
    }
}
