//! Prompt cache - harvested remote prompts, reused once a pool is big enough
//!
//! Each category keeps an append-only, deduplicated pool of generated
//! prompt strings. Once a pool reaches the minimum size, prompts are served
//! from it instead of calling the remote service. A short per-category ring
//! of recently shown prompts avoids immediate repeats; the ring is never
//! persisted.

use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::storage::{self, PromptPools, StateStore};
use crate::types::Category;

/// Pool size at which a category stops needing remote generation
pub const DEFAULT_MIN_POOL_SIZE: usize = 15;

/// Number of recently shown prompts excluded from the next pick
pub const DEFAULT_RECENT_CAPACITY: usize = 5;

#[derive(Debug, Default)]
struct CacheState {
    pools: PromptPools,
    recent: HashMap<String, VecDeque<String>>,
}

/// Per-category store of generated prompts
pub struct PromptCache {
    state: Mutex<CacheState>,
    store: Arc<dyn StateStore>,
    min_pool_size: usize,
    recent_capacity: usize,
}

impl PromptCache {
    /// Load pools from `store` with default sizing
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        Self::with_limits(store, DEFAULT_MIN_POOL_SIZE, DEFAULT_RECENT_CAPACITY)
    }

    /// Load pools from `store` with explicit sizing
    pub fn with_limits(store: Arc<dyn StateStore>, min_pool_size: usize, recent_capacity: usize) -> Self {
        let pools = storage::load_pools_or_default(store.as_ref());
        debug!("Loaded prompt cache with {} categories", pools.len());
        Self {
            state: Mutex::new(CacheState {
                pools,
                recent: HashMap::new(),
            }),
            store,
            min_pool_size,
            recent_capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn min_pool_size(&self) -> usize {
        self.min_pool_size
    }

    /// Number of cached prompts for `category`
    pub fn pool_size(&self, category: Category) -> usize {
        self.lock()
            .pools
            .get(category.as_str())
            .map_or(0, Vec::len)
    }

    /// Whether `category` can be served without remote generation
    pub fn has_enough_prompts(&self, category: Category) -> bool {
        self.pool_size(category) >= self.min_pool_size
    }

    /// Pick a cached prompt for `category`, avoiding recently shown ones.
    ///
    /// Returns `None` until the pool reaches the minimum size.
    pub fn get_cached_prompt<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> Option<String> {
        let mut state = self.lock();
        let CacheState { pools, recent } = &mut *state;

        let pool = pools.get(category.as_str())?;
        if pool.len() < self.min_pool_size {
            return None;
        }

        let ring = recent.entry(category.as_str().to_string()).or_default();
        let fresh: Vec<&String> = pool.iter().filter(|p| !ring.contains(*p)).collect();
        let picked = if fresh.is_empty() {
            pool.choose(rng)
        } else {
            fresh.choose(rng).copied()
        };
        let choice = picked?.clone();

        ring.push_back(choice.clone());
        while ring.len() > self.recent_capacity {
            ring.pop_front();
        }
        Some(choice)
    }

    /// Add a generated prompt to `category`'s pool and persist.
    ///
    /// Returns false if the text was blank or already cached.
    pub fn save_prompt(&self, category: Category, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let mut state = self.lock();
        let pool = state.pools.entry(category.as_str().to_string()).or_default();
        if pool.iter().any(|p| p == text) {
            return false;
        }
        pool.push(text.to_string());
        debug!("Cached prompt for {} (pool size {})", category, pool.len());

        if let Err(e) = self.store.save_prompt_pools(&state.pools) {
            warn!("Failed to persist prompt cache: {:#}", e);
        }
        true
    }

    /// Pool size per category, in category order
    pub fn stats(&self) -> Vec<(Category, usize)> {
        let state = self.lock();
        Category::ALL
            .iter()
            .map(|c| (*c, state.pools.get(c.as_str()).map_or(0, Vec::len)))
            .collect()
    }
}
