//! Prompt orchestrator - produces the next phase 1 / phase 2 pair
//!
//! Picks a category, then serves phase 1 text from the cache when the
//! category's pool is large enough, from the remote generator otherwise
//! (harvesting the result into the cache), and from the static per-category
//! list when generation is unavailable.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::cache::PromptCache;
use super::catalog::{Prompt, PromptCatalog, PromptQuery, PromptType};
use super::library;
use super::selector::CategorySelector;
use crate::generation::{self, PromptGenerator, DEFAULT_TIMEOUT};
use crate::progression::{ProgressionRecord, Stage};
use crate::types::Category;

/// Where the phase 1 text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    Cache,
    Generated,
    Static,
}

/// A ready-to-display prompt pair
#[derive(Debug, Clone, Serialize)]
pub struct NextPrompt {
    pub category: Category,
    /// Phase 1 text, with the scaffolding example appended at stage 1
    pub phase1: String,
    /// Phase 2 follow-up; absent at stage 4
    pub phase2: Option<String>,
    /// The stage 1 worked example, also present at the end of `phase1`
    pub scaffolding: Option<String>,
    pub source: PromptSource,
}

pub struct PromptOrchestrator {
    selector: CategorySelector,
    cache: Arc<PromptCache>,
    catalog: PromptCatalog,
    generator: Option<Arc<dyn PromptGenerator>>,
    timeout: Duration,
    rng: Mutex<StdRng>,
}

impl PromptOrchestrator {
    pub fn new(cache: Arc<PromptCache>) -> Self {
        Self {
            selector: CategorySelector::default(),
            cache,
            catalog: PromptCatalog::builtin(),
            generator: None,
            timeout: DEFAULT_TIMEOUT,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_selector(mut self, selector: CategorySelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_catalog(mut self, catalog: PromptCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn PromptGenerator>, timeout: Duration) -> Self {
        self.generator = Some(generator);
        self.timeout = timeout;
        self
    }

    /// Seed the random source for reproducible selection
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cache(&self) -> &PromptCache {
        &self.cache
    }

    /// Produce the next prompt pair for a writer at `stage`
    pub async fn get_next_prompt(&self, stage: Stage, record: &ProgressionRecord) -> NextPrompt {
        // The rng guard must be released before awaiting the generator.
        let (category, cached) = {
            let mut rng = self.rng();
            let category = self
                .selector
                .select_category(&record.category_last_used, &Category::ALL, Utc::now(), &mut *rng)
                .unwrap_or(Category::Moment);
            let cached = if self.cache.has_enough_prompts(category) {
                self.cache.get_cached_prompt(category, &mut *rng)
            } else {
                None
            };
            (category, cached)
        };

        let (base, source) = match cached {
            Some(text) => (text, PromptSource::Cache),
            None => match self.generate(category).await {
                Some(text) => (text, PromptSource::Generated),
                None => (self.static_phase1(category), PromptSource::Static),
            },
        };
        debug!("Phase 1 prompt for {} from {:?}", category, source);

        let scaffolding = (stage == Stage::FIRST).then(|| library::scaffolding_example(category).to_string());
        let phase1 = match &scaffolding {
            Some(example) => format!("{}\n\n{}", base, example),
            None => base,
        };

        NextPrompt {
            category,
            phase1,
            phase2: self.phase2_prompt(category, stage, None),
            scaffolding,
            source,
        }
    }

    async fn generate(&self, category: Category) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let text = generation::generate_prompt(&**generator, Some(category), self.timeout).await?;
        if self.cache.save_prompt(category, &text) {
            info!(
                "Harvested generated prompt for {} ({} of {})",
                category,
                self.cache.pool_size(category),
                self.cache.min_pool_size()
            );
        }
        Some(text)
    }

    fn static_phase1(&self, category: Category) -> String {
        library::phase1_prompts(category)
            .choose(&mut *self.rng())
            .map(|s| s.to_string())
            .unwrap_or_else(|| library::default_prompt(PromptType::Primary).text.to_string())
    }

    /// Phase 2 follow-up for `category` at `stage`.
    ///
    /// At stage 1 a non-empty `key_element` is woven into the question.
    /// Stage 3 always asks the same generic question; stage 4 offers none.
    pub fn phase2_prompt(&self, category: Category, stage: Stage, key_element: Option<&str>) -> Option<String> {
        phase2_for(category, stage, key_element, &mut *self.rng())
    }

    /// Select a catalog prompt using the orchestrator's random source
    pub fn catalog_prompt(&self, query: &PromptQuery) -> Prompt {
        self.catalog.select(query, &mut *self.rng())
    }
}

/// Phase 2 text for `category` at `stage`, drawing with `rng`
pub fn phase2_for<R: Rng + ?Sized>(
    category: Category,
    stage: Stage,
    key_element: Option<&str>,
    rng: &mut R,
) -> Option<String> {
    match stage.number() {
        3 => Some(library::STAGE_THREE_PHASE2.to_string()),
        4 => None,
        n => {
            let question = library::phase2_prompts(category).choose(rng)?;
            let key = key_element.map(str::trim).filter(|k| !k.is_empty());
            match key {
                Some(key) if n == 1 => Some(format!("Thinking about \"{}\": {}", key, question)),
                _ => Some(question.to_string()),
            }
        }
    }
}
