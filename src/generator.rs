//! Work item generation through the OpenRouter chat completions API.

use std::sync::LazyLock;

use async_trait::async_trait;
use const_format::concatcp;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{PusherError, Result};
use crate::types::WorkItem;

const SERVICE: &str = "OpenRouter";
const APP_TITLE: &str = "DevOps AI Pusher";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 4000;

const SCHEMA_EXAMPLE: &str = r#"[
  {
    "title": "Implement user authentication",
    "description": "Create a secure authentication system with JWT tokens and password hashing. Include login, logout, and session management.",
    "type": "Feature",
    "priority": "High",
    "acceptanceCriteria": [
      "Users can login with email and password",
      "JWT tokens expire after 24 hours",
      "Failed login attempts are rate limited"
    ],
    "tags": ["authentication", "security", "backend"],
    "estimatedHours": 8
  }
]"#;

pub const SYSTEM_PROMPT: &str = concatcp!(
    "You are an expert project manager and DevOps consultant. Generate structured work items based on user requirements.

For each work item, provide:
- title: Clear, concise title (max 100 chars)
- description: Detailed description of the work (2-3 sentences)
- type: One of: \"User Story\", \"Task\", \"Bug\", \"Feature\", or \"Epic\"
- priority: One of: \"Critical\", \"High\", \"Medium\", or \"Low\"
- acceptanceCriteria: Array of 2-4 specific, testable acceptance criteria (optional for bugs/tasks)
- tags: Array of relevant tags (e.g., [\"frontend\", \"api\", \"security\"])
- estimatedHours: Estimated hours to complete (number)

Respond ONLY with valid JSON array of work items. No additional text or markdown.

Example format:
",
    SCHEMA_EXAMPLE
);

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?").expect("fence pattern is valid"));

/// A chat completion provider returning the assistant's text reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, api_key: &str, model: &str, system: &str, prompt: &str)
        -> Result<String>;
}

pub struct GenerateRequest {
    pub prompt: String,
    pub model: String,
    pub api_key: String,
}

/// Ask the backend for work items and decode its reply. One call, no retry.
pub async fn generate_work_items(
    backend: &dyn CompletionBackend,
    request: &GenerateRequest,
) -> Result<Vec<WorkItem>> {
    if request.prompt.trim().is_empty() {
        return Err(PusherError::Validation("Prompt is required".into()));
    }
    if request.api_key.trim().is_empty() {
        return Err(PusherError::MissingApiKey);
    }

    info!(model = %request.model, "Generating work items");
    let reply = backend
        .complete(&request.api_key, &request.model, SYSTEM_PROMPT, &request.prompt)
        .await?;

    let items = parse_work_items(&reply).inspect_err(|e| {
        error!(error = %e, response = %reply, "Failed to parse AI response");
    })?;
    info!(count = items.len(), "Generated work items");
    Ok(items)
}

/// Remove Markdown code fences (```json / ```) wrapped around a reply.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Decode a reply into work items, validating every element.
pub fn parse_work_items(text: &str) -> Result<Vec<WorkItem>> {
    let cleaned = strip_code_fences(text);
    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| PusherError::InvalidAiResponse(e.to_string()))?;

    let records = value
        .as_array()
        .ok_or_else(|| PusherError::InvalidAiResponse("AI response is not an array".into()))?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            WorkItem::from_value(record).map_err(|e| {
                PusherError::InvalidAiResponse(format!("work item {index}: {e}"))
            })
        })
        .collect()
}

pub struct OpenRouterClient {
    http: Client,
    base_url: String,
    referer: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: GatewayError,
}

#[derive(Deserialize)]
struct GatewayError {
    message: String,
}

impl OpenRouterClient {
    pub fn new(base_url: impl Into<String>, referer: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            referer: referer.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    async fn complete(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = self.endpoint();
        debug!(url = %url, model, "POST chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", APP_TITLE)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            return Err(PusherError::Upstream {
                service: SERVICE,
                status: Some(status.as_u16()),
                message: gateway_error_message(&body),
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| PusherError::Upstream {
                service: SERVICE,
                status: None,
                message: "No response from AI".into(),
            })
    }
}

fn gateway_error_message(body: &str) -> String {
    serde_json::from_str::<GatewayErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}
