//! Configuration management
//!
//! Manages engine configuration: the remote generation endpoint, prompt
//! cache sizing, category selection weights, and the storage location.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prompts::cache::{DEFAULT_MIN_POOL_SIZE, DEFAULT_RECENT_CAPACITY};
use crate::prompts::catalog::DEFAULT_HUMOR_PROBABILITY;
use crate::prompts::selector::{DEFAULT_NEGLECT_DAYS, DEFAULT_NEGLECT_PROBABILITY};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote prompt generation
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Prompt cache and catalog settings
    #[serde(default)]
    pub prompts: PromptsConfig,
    /// Category selection weighting
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Where progression and cache files live
    #[serde(default)]
    pub storage: StorageConfig,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Whether to call the remote service at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "REFLECT_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    400
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Cached prompts per category before remote generation stops
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: usize,
    /// Recently shown prompts excluded from the next cache pick
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
    /// Chance of picking a humorous catalog prompt when one matches
    #[serde(default = "default_humor_probability")]
    pub humor_probability: f64,
}

fn default_min_pool_size() -> usize {
    DEFAULT_MIN_POOL_SIZE
}

fn default_recent_capacity() -> usize {
    DEFAULT_RECENT_CAPACITY
}

fn default_humor_probability() -> f64 {
    DEFAULT_HUMOR_PROBABILITY
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            min_pool_size: default_min_pool_size(),
            recent_capacity: default_recent_capacity(),
            humor_probability: default_humor_probability(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Days unused before a category counts as neglected
    #[serde(default = "default_neglect_days")]
    pub neglect_days: i64,
    /// Chance of drawing a neglected category when any exist
    #[serde(default = "default_neglect_probability")]
    pub neglect_probability: f64,
}

fn default_neglect_days() -> i64 {
    DEFAULT_NEGLECT_DAYS
}

fn default_neglect_probability() -> f64 {
    DEFAULT_NEGLECT_PROBABILITY
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            neglect_days: default_neglect_days(),
            neglect_probability: default_neglect_probability(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the platform config file, writing defaults
    /// if it does not exist yet
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save configuration to the platform config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Storage directory: the configured override or the platform default
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir(),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "reflection-engine", "reflection-engine")
        .context("Failed to get project directories")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;
    let key_present = std::env::var(&config.generation.api_key_env)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);

    println!("{}", crate::info());
    println!();
    println!("Config file: {}", config_path()?.display());
    println!("Data dir:    {}", config.resolved_data_dir()?.display());
    println!();
    println!("Generation:");
    println!("  enabled:       {}", config.generation.enabled);
    println!("  base_url:      {}", config.generation.base_url);
    println!("  model:         {}", config.generation.model);
    println!(
        "  api key:       ${} ({})",
        config.generation.api_key_env,
        if key_present { "set" } else { "not set" }
    );
    println!("  timeout:       {}s", config.generation.timeout_secs);
    println!("Prompts:");
    println!("  min pool size: {}", config.prompts.min_pool_size);
    println!("  recent ring:   {}", config.prompts.recent_capacity);
    println!("  humor chance:  {}", config.prompts.humor_probability);
    println!("Selection:");
    println!("  neglect after: {} days", config.selection.neglect_days);
    println!("  neglect bias:  {}", config.selection.neglect_probability);

    Ok(())
}

/// Set the generation model
pub fn set_model(model: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.generation.model = model.to_string();
    config.save()?;
    println!("Generation model set to: {}", model);
    Ok(())
}

/// Set the generation endpoint
pub fn set_base_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("Base URL must start with http:// or https://: {}", url);
    }
    let mut config = Config::load()?;
    config.generation.base_url = url.to_string();
    config.save()?;
    println!("Generation endpoint set to: {}", url);
    Ok(())
}

/// Turn remote generation on or off
pub fn set_generation_enabled(enabled: bool) -> Result<()> {
    let mut config = Config::load()?;
    config.generation.enabled = enabled;
    config.save()?;
    println!("Remote generation {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generation.timeout_secs, 30);
        assert_eq!(config.prompts.min_pool_size, 15);
        assert_eq!(config.prompts.recent_capacity, 5);
        assert_eq!(config.selection.neglect_days, 7);
        assert!((config.selection.neglect_probability - 0.7).abs() < f64::EPSILON);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [generation]
            model = "local/llama"

            [selection]
            neglect_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.generation.model, "local/llama");
        assert_eq!(config.generation.api_key_env, "REFLECT_API_KEY");
        assert_eq!(config.selection.neglect_days, 3);
        assert_eq!(config.prompts.min_pool_size, 15);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.prompts.min_pool_size = 4;
        config.storage.data_dir = Some(dir.path().join("data"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.prompts.min_pool_size, 4);
        assert_eq!(loaded.resolved_data_dir().unwrap(), dir.path().join("data"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generation\nmodel =").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let parsed: Config = toml::from_str(&default_config_toml()).unwrap();
        assert_eq!(parsed.generation.base_url, default_base_url());
    }
}
