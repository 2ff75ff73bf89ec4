//! Prompt flow: generation, harvesting into the cache, and fallbacks

use async_trait::async_trait;
use reflection_engine::generation::EntrySummary;
use reflection_engine::prompts::{library, PromptMode, PromptType, Tier};
use reflection_engine::storage::StateStore;
use reflection_engine::{
    Category, Config, GenerationError, GenerationTask, MemoryStore, PromptGenerator, PromptSource,
    ReflectionEngine,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers every task with a fixed, numbered response
#[derive(Default)]
struct ScriptedGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl PromptGenerator for ScriptedGenerator {
    async fn generate(&self, task: GenerationTask) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match task {
            GenerationTask::Prompt { category } => {
                let label = category.map_or("anything", |c| c.as_str());
                format!("Describe {} detail number {}.", label, n)
            }
            GenerationTask::ExtractQuestions { .. } => {
                "```json\n[\"Why did the meeting run late?\", \"Who noticed?\"]\n```".to_string()
            }
            GenerationTask::AssessQuality { .. } => r#"{
                "specificity": "high",
                "sensory_detail": "medium",
                "verbatim_presence": true,
                "behavioral_vs_emotional": 0.8,
                "suggestions": ["Add what you heard."]
            }"#
            .to_string(),
            GenerationTask::FindConnections { entries } => format!(
                r#"[{{"entry_ids": ["{}", "{}"], "connection_type": "place", "description": "Both happen at the station."}}]"#,
                entries[0].id, entries[1].id
            ),
        })
    }
}

/// Never answers in time
struct StalledGenerator;

#[async_trait]
impl PromptGenerator for StalledGenerator {
    async fn generate(&self, _task: GenerationTask) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

fn small_cache_config() -> Config {
    let mut config = Config::default();
    config.prompts.min_pool_size = 2;
    config.prompts.recent_capacity = 1;
    config
}

#[tokio::test]
async fn test_generation_fills_cache_then_stops() {
    let store = Arc::new(MemoryStore::new());
    let generator = Arc::new(ScriptedGenerator::default());
    let engine = ReflectionEngine::with_seed(
        &small_cache_config(),
        store.clone(),
        Some(generator.clone()),
        21,
    );

    // Enough draws to fill every category's pool of two
    let mut sources = Vec::new();
    for _ in 0..200 {
        sources.push(engine.next_prompt().await.source);
    }
    assert!(sources.contains(&PromptSource::Generated));
    assert!(sources.contains(&PromptSource::Cache));
    assert!(!sources.contains(&PromptSource::Static));

    let stats = engine.cache_stats();
    assert!(stats.iter().all(|s| s.ready), "{:?}", stats);

    // Once every pool is ready nothing more is generated
    let calls = generator.calls.load(Ordering::SeqCst);
    for _ in 0..20 {
        assert_eq!(engine.next_prompt().await.source, PromptSource::Cache);
    }
    assert_eq!(generator.calls.load(Ordering::SeqCst), calls);

    // The harvested pools were persisted
    let pools = store.load_prompt_pools().unwrap();
    assert_eq!(pools.len(), Category::ALL.len());
}

#[tokio::test]
async fn test_stalled_generator_falls_back_to_static() {
    let mut config = Config::default();
    config.generation.timeout_secs = 0;
    let engine = ReflectionEngine::with_seed(
        &config,
        Arc::new(MemoryStore::new()),
        Some(Arc::new(StalledGenerator)),
        4,
    );

    let next = engine.next_prompt().await;
    assert_eq!(next.source, PromptSource::Static);
    assert!(library::phase1_prompts(next.category)
        .iter()
        .any(|p| next.phase1.starts_with(p)));
    // Stage 1 carries the worked example
    assert!(next.phase1.ends_with(library::scaffolding_example(next.category)));
}

#[tokio::test]
async fn test_remote_analysis_tasks() {
    let engine = ReflectionEngine::with_seed(
        &Config::default(),
        Arc::new(MemoryStore::new()),
        Some(Arc::new(ScriptedGenerator::default())),
        1,
    );

    let quality = engine.assess_quality("The meeting ran late.").await;
    assert!(quality.is_assessed());
    assert!(quality.verbatim_presence);
    assert_eq!(quality.suggestions, vec!["Add what you heard.".to_string()]);

    let questions = engine.extract_questions("The meeting ran late.").await;
    assert_eq!(questions.len(), 2);

    let connections = engine
        .find_connections(vec![
            EntrySummary { id: "e1".into(), text: "Train delayed.".into() },
            EntrySummary { id: "e2".into(), text: "Met Sam on the platform.".into() },
        ])
        .await;
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].entry_ids, vec!["e1".to_string(), "e2".to_string()]);

    // A single entry has nothing to connect to
    let lone = engine
        .find_connections(vec![EntrySummary { id: "e1".into(), text: "Alone.".into() }])
        .await;
    assert!(lone.is_empty());
}

#[test]
fn test_catalog_prompts_total_for_every_combination() {
    let engine = ReflectionEngine::with_seed(&Config::default(), Arc::new(MemoryStore::new()), None, 9);
    let kinds = [
        PromptType::Orientation,
        PromptType::Primary,
        PromptType::CaptureQuality,
        PromptType::LensProgression,
        PromptType::VoiceExpansion,
        PromptType::Refinement,
        PromptType::Aggregation,
    ];
    let modes = [PromptMode::Capture, PromptMode::Synthesis, PromptMode::Either];
    let tiers = [None, Some(Tier::Quick), Some(Tier::Standard), Some(Tier::Deep)];

    for kind in kinds {
        for mode in modes {
            for tier in tiers {
                let prompt = engine.catalog_prompt(kind, mode, None, tier);
                assert_eq!(prompt.kind, kind);
                assert!(!prompt.text.trim().is_empty());
            }
        }
    }
}
