//! Reflection Engine - adaptive prompting for reflective journaling
//!
//! Tracks a writer through four stages of journaling skill and decides what
//! to ask them next:
//! - Keyword signal detectors over entry text
//! - A forward-only stage state machine fed by capture events
//! - Neglect-weighted category selection
//! - A filterable prompt catalog whose accessors never come back empty
//! - A cache that harvests remotely generated prompts until the remote
//!   service is no longer needed
//!
//! # Example
//!
//! ```ignore
//! use reflection_engine::{CaptureEvent, Config, ReflectionEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = ReflectionEngine::from_config(&Config::load()?)?;
//!     let next = engine.next_prompt().await;
//!     println!("{}", next.phase1);
//!     engine.record_capture(&CaptureEvent::new("The kettle clicked off.").with_phase2(true));
//!     Ok(())
//! }
//! ```

// Core modules (order matters for cross-module dependencies)
pub mod types;
pub mod analysis;
pub mod progression;
pub mod storage;
pub mod generation;
pub mod prompts;
pub mod engine;
pub mod config;
pub mod cli;

// Re-export commonly used types for convenience
pub use analysis::{CaptureQuality, TextSignals};
pub use config::Config;
pub use engine::{CacheStat, EngineStatus, ReflectionEngine};
pub use generation::{ChatCompletionsGenerator, GenerationError, GenerationTask, PromptGenerator};
pub use progression::{CaptureEvent, ProgressionChange, ProgressionRecord, ProgressionTracker, Stage};
pub use prompts::{NextPrompt, Prompt, PromptCatalog, PromptOrchestrator, PromptSource};
pub use storage::{JsonFileStore, MemoryStore, StateStore};
pub use types::Category;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Adaptive Reflection Progression Engine", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_names_package() {
        let info = info();
        assert!(info.starts_with(NAME));
        assert!(info.contains(VERSION));
    }
}
