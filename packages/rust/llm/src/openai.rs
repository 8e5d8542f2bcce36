//! OpenAI-compatible chat-completions client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

use wikicards_shared::{LlmConfig, Result, WikicardsError};

use crate::LanguageModel;

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("wikicards/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// `response_format` body; only the JSON Schema mode is used.
#[derive(Debug, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat<'a> {
    JsonSchema { json_schema: JsonSchemaSpec<'a> },
}

#[derive(Debug, serde::Serialize)]
struct JsonSchemaSpec<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, serde::Deserialize)]
struct Choice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`LanguageModel`] backed by an OpenAI-compatible `/chat/completions` API.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Build a client for one model. The API key is resolved once at startup
    /// and injected here; the client never reads the environment.
    pub fn new(
        config: &LlmConfig,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WikicardsError::Model(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Send one chat request and return the assistant's text content.
    async fn send(&self, request: &ChatRequest<'_>) -> Result<String> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| WikicardsError::Model(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WikicardsError::Model(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(WikicardsError::Model(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            WikicardsError::Model(format!(
                "invalid chat completion response: {e} (got: {})",
                body.chars().take(200).collect::<String>()
            ))
        })?;

        let usage = parsed.usage.unwrap_or_default();
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| WikicardsError::Model("response contained no choices".into()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(WikicardsError::Model(format!("model refused: {refusal}")));
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| WikicardsError::Model("response content is empty".into()))?;

        info!(
            model = %self.model,
            tokens_in = usage.prompt_tokens,
            tokens_out = usage.completion_tokens,
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            latency_ms = start.elapsed().as_millis() as u64,
            "chat completion received"
        );

        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: None,
        };
        self.send(&request).await
    }

    #[instrument(skip_all, fields(model = %self.model, schema = schema_name))]
    async fn complete_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaSpec {
                    name: schema_name,
                    strict: true,
                    schema,
                },
            }),
        };

        let content = self.send(&request).await?;
        debug!(len = content.len(), "decoding structured response");

        serde_json::from_str(&content).map_err(|e| {
            WikicardsError::Model(format!("structured response is not valid JSON: {e}"))
        })
    }
}
