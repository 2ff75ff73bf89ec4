//! JSON file store
//!
//! Writes `progression.json`, `prompt_cache.json` and `recent_entries.json`
//! under a data directory, by default ~/.local/share/reflection-engine/.
//! Each write goes to a temporary file in the same directory which is then
//! renamed over the target, so a file is either the old or the new version.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{PromptPools, StateStore};
use crate::progression::ProgressionRecord;

const RECORD_FILE: &str = "progression.json";
const CACHE_FILE: &str = "prompt_cache.json";
const RECENT_FILE: &str = "recent_entries.json";

/// File-backed state store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Create with a custom base directory
    pub fn with_dir(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create data directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.base_dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.base_dir.join(name);
        let contents = serde_json::to_string_pretty(value)
            .context("Failed to serialize state")?;

        let mut tmp = NamedTempFile::new_in(&self.base_dir)
            .context("Failed to create temporary state file")?;
        tmp.write_all(contents.as_bytes())
            .context("Failed to write temporary state file")?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush temporary state file")?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn load_record(&self) -> Result<Option<ProgressionRecord>> {
        self.read_json(RECORD_FILE)
    }

    fn save_record(&self, record: &ProgressionRecord) -> Result<()> {
        self.write_json(RECORD_FILE, record)
    }

    fn load_prompt_pools(&self) -> Result<PromptPools> {
        Ok(self.read_json(CACHE_FILE)?.unwrap_or_default())
    }

    fn save_prompt_pools(&self, pools: &PromptPools) -> Result<()> {
        self.write_json(CACHE_FILE, pools)
    }

    fn load_recent_texts(&self) -> Result<Vec<String>> {
        Ok(self.read_json(RECENT_FILE)?.unwrap_or_default())
    }

    fn save_recent_texts(&self, texts: &[String]) -> Result<()> {
        self.write_json(RECENT_FILE, &texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Stage;
    use crate::storage::load_record_or_default;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.load_record().unwrap().is_none());
        assert!(store.load_prompt_pools().unwrap().is_empty());
    }

    #[test]
    fn test_record_persists() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();

        let mut record = ProgressionRecord::new();
        record.stage = Stage::new(3).unwrap();
        record.capture_count = 42;
        store.save_record(&record).unwrap();

        let reopened = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.load_record().unwrap(), Some(record));
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RECORD_FILE), "{not json").unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();

        assert!(store.load_record().is_err());
        assert_eq!(load_record_or_default(&store), ProgressionRecord::new());
    }

    #[test]
    fn test_pools_persist() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();

        let mut pools = PromptPools::new();
        pools.insert("place".to_string(), vec!["Describe the light.".to_string()]);
        store.save_prompt_pools(&pools).unwrap();
        assert_eq!(store.load_prompt_pools().unwrap(), pools);
    }

    #[test]
    fn test_overwrite_leaves_only_state_files() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();

        let mut record = ProgressionRecord::new();
        for count in 1..=3 {
            record.capture_count = count;
            store.save_record(&record).unwrap();
        }
        store.save_recent_texts(&["I saw a heron.".to_string()]).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![RECORD_FILE.to_string(), RECENT_FILE.to_string()]);
        assert_eq!(store.load_record().unwrap().unwrap().capture_count, 3);
    }

    #[test]
    fn test_failed_replace_keeps_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();

        let mut record = ProgressionRecord::new();
        record.capture_count = 7;
        store.save_record(&record).unwrap();

        // A directory squatting on the target makes the rename fail
        std::fs::create_dir(dir.path().join(CACHE_FILE)).unwrap();
        assert!(store.save_prompt_pools(&PromptPools::new()).is_err());

        assert_eq!(store.load_record().unwrap().unwrap().capture_count, 7);
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().is_file())
            .count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_recent_texts_persist() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.load_recent_texts().unwrap().is_empty());

        let texts = vec!["I think so.".to_string(), "I heard rain.".to_string()];
        store.save_recent_texts(&texts).unwrap();
        let reopened = JsonFileStore::with_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.load_recent_texts().unwrap(), texts);
    }

    #[test]
    fn test_uncreatable_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        assert!(JsonFileStore::with_dir(blocker.join("data")).is_err());
    }
}
