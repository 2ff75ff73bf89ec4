//! Remote text generation
//!
//! The engine asks a remote language model for fresh prompts, for the open
//! questions in an entry, for a capture quality assessment, and for links
//! between entries. Every call is best effort: failures, timeouts and
//! malformed output resolve to local defaults and are never surfaced.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::{capture_quality_heuristic, AssessmentSource, CaptureQuality, QualityLevel};
use crate::types::Category;

pub use client::ChatCompletionsGenerator;

/// Default bound on a single remote call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a remote call produced nothing
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("remote generation is not configured")]
    NotConfigured,
    #[error("remote generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service returned an empty response")]
    EmptyResponse,
}

/// An entry offered for connection finding
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub text: String,
}

/// What the remote service is asked to do
#[derive(Debug, Clone)]
pub enum GenerationTask {
    /// A fresh phase 1 prompt, optionally scoped to a category
    Prompt { category: Option<Category> },
    /// Open questions raised by an entry
    ExtractQuestions { entry_text: String },
    /// Capture quality assessment of an entry
    AssessQuality { entry_text: String },
    /// Links between several entries
    FindConnections { entries: Vec<EntrySummary> },
}

impl GenerationTask {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationTask::Prompt { .. } => "prompt",
            GenerationTask::ExtractQuestions { .. } => "questions",
            GenerationTask::AssessQuality { .. } => "quality",
            GenerationTask::FindConnections { .. } => "connections",
        }
    }
}

/// The remote generation collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    /// Run `task` and return the raw text the service produced
    async fn generate(&self, task: GenerationTask) -> Result<String, GenerationError>;
}

/// Run `task` under `timeout`, logging and discarding any failure
pub async fn run_task(
    generator: &dyn PromptGenerator,
    task: GenerationTask,
    timeout: Duration,
) -> Option<String> {
    let name = task.name();
    let result = match tokio::time::timeout(timeout, generator.generate(task)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout(timeout)),
    };

    match result {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!("Remote {} generation degraded: {}", name, GenerationError::EmptyResponse);
            None
        }
        Err(e) => {
            warn!("Remote {} generation degraded: {}", name, e);
            None
        }
    }
}

/// Ask for a fresh prompt, cleaned up for display
pub async fn generate_prompt(
    generator: &dyn PromptGenerator,
    category: Option<Category>,
    timeout: Duration,
) -> Option<String> {
    let raw = run_task(generator, GenerationTask::Prompt { category }, timeout).await?;
    let prompt = clean_prompt(&raw);
    (!prompt.is_empty()).then_some(prompt)
}

/// Open questions raised by an entry; empty on any failure
pub async fn extract_questions(
    generator: &dyn PromptGenerator,
    entry_text: &str,
    timeout: Duration,
) -> Vec<String> {
    let task = GenerationTask::ExtractQuestions {
        entry_text: entry_text.to_string(),
    };
    match run_task(generator, task, timeout).await {
        Some(raw) => parse_questions(&raw),
        None => Vec::new(),
    }
}

/// Quality assessment of an entry; the degraded default on any failure
pub async fn assess_quality(
    generator: &dyn PromptGenerator,
    entry_text: &str,
    timeout: Duration,
) -> CaptureQuality {
    let task = GenerationTask::AssessQuality {
        entry_text: entry_text.to_string(),
    };
    run_task(generator, task, timeout)
        .await
        .and_then(|raw| parse_quality(&raw))
        .unwrap_or_else(|| capture_quality_heuristic(entry_text))
}

/// Links between entries; empty on any failure
pub async fn find_connections(
    generator: &dyn PromptGenerator,
    entries: Vec<EntrySummary>,
    timeout: Duration,
) -> Vec<EntryConnection> {
    if entries.len() < 2 {
        return Vec::new();
    }
    match run_task(generator, GenerationTask::FindConnections { entries }, timeout).await {
        Some(raw) => parse_connections(&raw),
        None => Vec::new(),
    }
}

/// A link the service found between entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryConnection {
    pub entry_ids: Vec<String>,
    pub connection_type: String,
    pub description: String,
}

/// Strip a Markdown code fence if the model wrapped its JSON in one
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json(raw: &str) -> Option<Value> {
    match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding malformed JSON from remote service: {}", e);
            None
        }
    }
}

/// Tidy generated prompt text: one line, no wrapping quotes
pub fn clean_prompt(raw: &str) -> String {
    let text = strip_code_fence(raw)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    text.trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
        .to_string()
}

/// Parse a JSON array of question strings
pub fn parse_questions(raw: &str) -> Vec<String> {
    let Some(Value::Array(items)) = parse_json(raw) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawQuality {
    specificity: Value,
    sensory_detail: Value,
    #[serde(default)]
    verbatim_presence: bool,
    #[serde(default = "neutral_balance")]
    behavioral_vs_emotional: f64,
    #[serde(default)]
    suggestions: Vec<String>,
}

fn neutral_balance() -> f64 {
    0.5
}

fn level_from(value: &Value) -> Option<QualityLevel> {
    match value {
        Value::String(s) => QualityLevel::parse(s),
        Value::Number(n) => QualityLevel::parse(&n.to_string()),
        _ => None,
    }
}

/// Parse a quality assessment object; `None` if it doesn't fit the schema
pub fn parse_quality(raw: &str) -> Option<CaptureQuality> {
    let raw: RawQuality = serde_json::from_value(parse_json(raw)?).ok()?;
    Some(CaptureQuality {
        specificity: level_from(&raw.specificity)?,
        sensory_detail: level_from(&raw.sensory_detail)?,
        verbatim_presence: raw.verbatim_presence,
        behavioral_vs_emotional: raw.behavioral_vs_emotional.clamp(0.0, 1.0),
        suggestions: raw.suggestions,
        source: AssessmentSource::Assessed,
    })
}

/// Parse an array of connection objects, skipping malformed items
pub fn parse_connections(raw: &str) -> Vec<EntryConnection> {
    let Some(Value::Array(items)) = parse_json(raw) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<EntryConnection>(item).ok())
        .filter(|c| !c.entry_ids.is_empty())
        .collect()
}
