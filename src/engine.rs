//! Reflection engine - process-wide wiring
//!
//! Constructs the tracker, cache, orchestrator and optional remote generator
//! once and hands out the single shared instance. Every accessor is total:
//! remote failures degrade to local defaults.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analysis::{self, CaptureQuality, TextSignals};
use crate::config::Config;
use crate::generation::{
    self, ChatCompletionsGenerator, EntryConnection, EntrySummary, PromptGenerator,
};
use crate::progression::{
    CaptureEvent, ProgressionChange, ProgressionRecord, ProgressionTracker, Stage, ThresholdStatus,
};
use crate::prompts::{
    CategorySelector, FocusType, NextPrompt, Prompt, PromptCache, PromptCatalog, PromptMode,
    PromptOrchestrator, PromptQuery, PromptType, Tier,
};
use crate::storage::{JsonFileStore, MemoryStore, StateStore};
use crate::types::Category;

/// Snapshot of where the writer stands
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub stage: Stage,
    pub record: ProgressionRecord,
    /// Thresholds of the active rule; `None` at the last stage
    pub progress: Option<Vec<ThresholdStatus>>,
    pub interpretation_drift: bool,
    pub generation_available: bool,
}

/// Cache fill level for one category
#[derive(Debug, Clone, Serialize)]
pub struct CacheStat {
    pub category: Category,
    pub size: usize,
    pub ready: bool,
}

pub struct ReflectionEngine {
    tracker: Arc<ProgressionTracker>,
    orchestrator: Arc<PromptOrchestrator>,
    generator: Option<Arc<dyn PromptGenerator>>,
    timeout: Duration,
}

impl ReflectionEngine {
    /// Build from configuration with JSON file storage and, when a key is
    /// available, the remote chat-completions generator.
    ///
    /// If the data directory is unusable the session runs on an in-memory
    /// store and nothing is saved.
    pub fn from_config(config: &Config) -> Self {
        Self::with_store(config, file_store(config), remote_generator(config))
    }

    /// Build around an explicit store and generator
    pub fn with_store(
        config: &Config,
        store: Arc<dyn StateStore>,
        generator: Option<Arc<dyn PromptGenerator>>,
    ) -> Self {
        Self::build(config, store, generator, None)
    }

    /// Like `with_store`, with a fixed random seed for reproducible prompting
    pub fn with_seed(
        config: &Config,
        store: Arc<dyn StateStore>,
        generator: Option<Arc<dyn PromptGenerator>>,
        seed: u64,
    ) -> Self {
        Self::build(config, store, generator, Some(seed))
    }

    fn build(
        config: &Config,
        store: Arc<dyn StateStore>,
        generator: Option<Arc<dyn PromptGenerator>>,
        seed: Option<u64>,
    ) -> Self {
        let timeout = Duration::from_secs(config.generation.timeout_secs);
        let tracker = Arc::new(ProgressionTracker::load(store.clone()));
        let cache = Arc::new(PromptCache::with_limits(
            store,
            config.prompts.min_pool_size,
            config.prompts.recent_capacity,
        ));

        let mut orchestrator = PromptOrchestrator::new(cache)
            .with_selector(CategorySelector::new(
                config.selection.neglect_days,
                config.selection.neglect_probability,
            ))
            .with_catalog(PromptCatalog::builtin().with_humor_probability(config.prompts.humor_probability));
        if let Some(generator) = &generator {
            orchestrator = orchestrator.with_generator(generator.clone(), timeout);
        }
        if let Some(seed) = seed {
            orchestrator = orchestrator.with_seed(seed);
        }

        Self {
            tracker,
            orchestrator: Arc::new(orchestrator),
            generator,
            timeout,
        }
    }

    pub fn tracker(&self) -> Arc<ProgressionTracker> {
        self.tracker.clone()
    }

    pub fn orchestrator(&self) -> Arc<PromptOrchestrator> {
        self.orchestrator.clone()
    }

    /// Feed a saved entry into the progression state machine
    pub fn record_capture(&self, event: &CaptureEvent) -> ProgressionChange {
        self.tracker.record_capture(event)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressionChange> {
        self.tracker.subscribe()
    }

    /// Next phase 1 / phase 2 pair for the writer's current stage
    pub async fn next_prompt(&self) -> NextPrompt {
        let record = self.tracker.snapshot();
        self.orchestrator.get_next_prompt(record.stage, &record).await
    }

    /// Phase 2 follow-up for `category` at the current stage
    pub fn followup(&self, category: Category, key_element: Option<&str>) -> Option<String> {
        self.orchestrator
            .phase2_prompt(category, self.tracker.current_stage(), key_element)
    }

    /// A catalog prompt of `kind` for the current stage
    pub fn catalog_prompt(
        &self,
        kind: PromptType,
        mode: PromptMode,
        focus: Option<FocusType>,
        tier: Option<Tier>,
    ) -> Prompt {
        let query = PromptQuery::new(kind, mode, self.tracker.current_stage())
            .with_focus(focus)
            .with_tier(tier);
        self.orchestrator.catalog_prompt(&query)
    }

    /// Local heuristic signals for an entry
    pub fn signals(&self, text: &str) -> TextSignals {
        analysis::analyze(text)
    }

    /// Remote quality assessment, or the degraded default
    pub async fn assess_quality(&self, entry_text: &str) -> CaptureQuality {
        match &self.generator {
            Some(generator) => generation::assess_quality(&**generator, entry_text, self.timeout).await,
            None => analysis::capture_quality_heuristic(entry_text),
        }
    }

    /// Open questions raised by an entry; empty without a generator
    pub async fn extract_questions(&self, entry_text: &str) -> Vec<String> {
        match &self.generator {
            Some(generator) => generation::extract_questions(&**generator, entry_text, self.timeout).await,
            None => Vec::new(),
        }
    }

    /// Links between entries; empty without a generator
    pub async fn find_connections(&self, entries: Vec<EntrySummary>) -> Vec<EntryConnection> {
        match &self.generator {
            Some(generator) => generation::find_connections(&**generator, entries, self.timeout).await,
            None => Vec::new(),
        }
    }

    pub fn status(&self) -> EngineStatus {
        let record = self.tracker.snapshot();
        EngineStatus {
            stage: record.stage,
            progress: self.tracker.progress_toward_next(),
            interpretation_drift: self.tracker.interpretation_drift(),
            generation_available: self.generator.is_some(),
            record,
        }
    }

    pub fn cache_stats(&self) -> Vec<CacheStat> {
        let cache = self.orchestrator.cache();
        cache
            .stats()
            .into_iter()
            .map(|(category, size)| CacheStat {
                category,
                size,
                ready: size >= cache.min_pool_size(),
            })
            .collect()
    }
}

/// JSON storage under the configured data dir, or memory if that fails
fn file_store(config: &Config) -> Arc<dyn StateStore> {
    match config.resolved_data_dir().and_then(JsonFileStore::with_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Storage unavailable, progress will not be saved: {:#}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

/// The configured remote generator, if enabled and a key is present
fn remote_generator(config: &Config) -> Option<Arc<dyn PromptGenerator>> {
    if !config.generation.enabled {
        debug!("Remote generation disabled in config");
        return None;
    }
    match ChatCompletionsGenerator::from_config(&config.generation) {
        Ok(generator) if generator.is_configured() => Some(Arc::new(generator)),
        Ok(_) => {
            info!(
                "No API key in ${}, using cached and built-in prompts only",
                config.generation.api_key_env
            );
            None
        }
        Err(e) => {
            info!("Remote generation unavailable: {}", e);
            None
        }
    }
}
