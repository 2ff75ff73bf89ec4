//! Chat-completions client for OpenAI-compatible providers

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{GenerationError, GenerationTask, PromptGenerator};
use crate::config::GenerationConfig;

const PROMPT_SYSTEM: &str = "You write short journaling prompts. Each prompt asks the writer \
to describe something concrete they observed today: what they saw, heard, or what someone \
said. Never ask about feelings or meaning. Reply with the prompt text only, one sentence.";

const QUESTIONS_SYSTEM: &str = "You read a journal entry and list the open questions it raises \
for the writer to reflect on later. Reply with a JSON array of question strings and nothing else.";

const QUALITY_SYSTEM: &str = "You assess how observational a journal entry is. Reply with a JSON \
object and nothing else: {\"specificity\": \"low|medium|high\", \"sensory_detail\": \
\"low|medium|high\", \"verbatim_presence\": bool, \"behavioral_vs_emotional\": number between \
0 and 1, \"suggestions\": [string]}.";

const CONNECTIONS_SYSTEM: &str = "You find links between journal entries: shared people, places, \
themes, or cause and effect. Reply with a JSON array and nothing else, each item \
{\"entry_ids\": [string], \"connection_type\": string, \"description\": string}.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self { role: "system", content: content.to_string() }
    }

    fn user(content: String) -> Self {
        Self { role: "user", content }
    }
}

/// Build the system and user messages for a task
fn messages_for(task: &GenerationTask) -> Vec<ChatMessage> {
    match task {
        GenerationTask::Prompt { category } => {
            let user = match category {
                Some(category) => format!("Write one prompt about a {} from the writer's day.", category),
                None => "Write one prompt about something from the writer's day.".to_string(),
            };
            vec![ChatMessage::system(PROMPT_SYSTEM), ChatMessage::user(user)]
        }
        GenerationTask::ExtractQuestions { entry_text } => vec![
            ChatMessage::system(QUESTIONS_SYSTEM),
            ChatMessage::user(entry_text.clone()),
        ],
        GenerationTask::AssessQuality { entry_text } => vec![
            ChatMessage::system(QUALITY_SYSTEM),
            ChatMessage::user(entry_text.clone()),
        ],
        GenerationTask::FindConnections { entries } => {
            let listing = entries
                .iter()
                .map(|e| format!("[{}] {}", e.id, e.text))
                .collect::<Vec<_>>()
                .join("\n\n");
            vec![ChatMessage::system(CONNECTIONS_SYSTEM), ChatMessage::user(listing)]
        }
    }
}

/// Pull the assistant text out of a chat-completions response body
fn extract_content(body: &Value) -> Option<String> {
    let content = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))?;

    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join(""),
        ),
        _ => None,
    }
}

/// Remote generator over an OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct ChatCompletionsGenerator {
    client: Arc<Client>,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl ChatCompletionsGenerator {
    /// Build from configuration, reading the API key from the configured
    /// environment variable
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
        })
    }

    /// Whether an API key was found
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl PromptGenerator for ChatCompletionsGenerator {
    async fn generate(&self, task: GenerationTask) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let request = ChatRequest {
            model: &self.model,
            messages: messages_for(&task),
            max_tokens: self.max_tokens,
        };

        debug!("Requesting {} generation from {}", task.name(), self.base_url);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        extract_content(&body)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
