//! Persistence for the progression record and the prompt cache
//!
//! Both are stored as independent blobs. A missing or unreadable blob is
//! never fatal: callers fall back to a fresh default and carry on in memory.

pub mod json;
pub mod memory;

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::warn;

use crate::progression::ProgressionRecord;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// Cached prompt strings keyed by category label
pub type PromptPools = BTreeMap<String, Vec<String>>;

/// Durable key-value storage for engine state
pub trait StateStore: Send + Sync {
    /// Load the progression record, `None` if never saved
    fn load_record(&self) -> Result<Option<ProgressionRecord>>;

    /// Overwrite the stored progression record
    fn save_record(&self, record: &ProgressionRecord) -> Result<()>;

    /// Load cached prompt pools, empty if never saved
    fn load_prompt_pools(&self) -> Result<PromptPools>;

    /// Overwrite the stored prompt pools
    fn save_prompt_pools(&self, pools: &PromptPools) -> Result<()>;

    /// Load the trailing entry texts used for drift detection, oldest first
    fn load_recent_texts(&self) -> Result<Vec<String>>;

    /// Overwrite the stored trailing entry texts
    fn save_recent_texts(&self, texts: &[String]) -> Result<()>;
}

/// Load the record, treating absence or corruption as a fresh start
pub fn load_record_or_default(store: &dyn StateStore) -> ProgressionRecord {
    match store.load_record() {
        Ok(Some(record)) => record,
        Ok(None) => ProgressionRecord::new(),
        Err(e) => {
            warn!("Failed to load progression record, starting fresh: {:#}", e);
            ProgressionRecord::new()
        }
    }
}

/// Load prompt pools, treating absence or corruption as an empty cache
pub fn load_pools_or_default(store: &dyn StateStore) -> PromptPools {
    store.load_prompt_pools().unwrap_or_else(|e| {
        warn!("Failed to load prompt cache, starting empty: {:#}", e);
        PromptPools::new()
    })
}

/// Load the drift window, treating absence or corruption as empty
pub fn load_recent_or_default(store: &dyn StateStore) -> Vec<String> {
    store.load_recent_texts().unwrap_or_else(|e| {
        warn!("Failed to load recent entries, starting empty: {:#}", e);
        Vec::new()
    })
}
