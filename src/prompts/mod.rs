//! Prompting - what to ask the writer next
//!
//! The catalog and library hold hand-authored prompts, the selector picks a
//! topic, the cache harvests generated prompts, and the orchestrator ties
//! them together into a phase 1 / phase 2 pair.

pub mod cache;
pub mod catalog;
pub mod library;
pub mod orchestrator;
pub mod selector;

pub use cache::PromptCache;
pub use catalog::{FocusType, Prompt, PromptCatalog, PromptMode, PromptQuery, PromptType, Tier};
pub use orchestrator::{phase2_for, NextPrompt, PromptOrchestrator, PromptSource};
pub use selector::CategorySelector;
