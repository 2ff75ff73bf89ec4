//! In-memory store for tests and ephemeral sessions

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{PromptPools, StateStore};
use crate::progression::ProgressionRecord;

/// Volatile state store. Writes can be made to fail to exercise
/// degraded persistence paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<ProgressionRecord>>,
    pools: Mutex<PromptPools>,
    recent: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing record
    pub fn with_record(record: ProgressionRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("Memory store is read-only");
        }
        Ok(())
    }
}

impl StateStore for MemoryStore {
    fn load_record(&self) -> Result<Option<ProgressionRecord>> {
        Ok(self.record.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save_record(&self, record: &ProgressionRecord) -> Result<()> {
        self.check_writable()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        Ok(())
    }

    fn load_prompt_pools(&self) -> Result<PromptPools> {
        Ok(self.pools.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save_prompt_pools(&self, pools: &PromptPools) -> Result<()> {
        self.check_writable()?;
        *self.pools.lock().unwrap_or_else(PoisonError::into_inner) = pools.clone();
        Ok(())
    }

    fn load_recent_texts(&self) -> Result<Vec<String>> {
        Ok(self.recent.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save_recent_texts(&self, texts: &[String]) -> Result<()> {
        self.check_writable()?;
        *self.recent.lock().unwrap_or_else(PoisonError::into_inner) = texts.to_vec();
        Ok(())
    }
}
