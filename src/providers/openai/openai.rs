use axum::body::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Fault;
use crate::providers::utils::send_json;

pub const DEFAULT_MAX_TOKENS: u64 = 800;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

fn default_max_tokens() -> Value {
    json!(DEFAULT_MAX_TOKENS)
}

fn default_temperature() -> Value {
    json!(DEFAULT_TEMPERATURE)
}

/// Inbound `/api/ai` payload. Every field is forwarded as sent; the
/// generation parameters fall back to defaults only when the key is absent.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Value,
    #[serde(default = "default_temperature")]
    pub temperature: Value,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            messages: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<Value>,
    max_tokens: Value,
    temperature: Value,
}

#[derive(Clone)]
pub struct OpenAIProvider {
    api_key: Option<String>,
    api_url: String,
    chat_model: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(api_key: Option<String>, api_url: String, chat_model: String, client: Client) -> Self {
        Self {
            api_key,
            api_url,
            chat_model,
            client,
        }
    }

    pub fn require_api_key(&self) -> Result<&str, Fault> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Fault::MissingCredential("Server is missing OPENAI_API_KEY".to_string()))
    }

    /// Forwards a chat completion and returns the upstream JSON body unchanged.
    pub async fn complete(&self, request: ChatRequest) -> Result<Bytes, Fault> {
        let api_key = self.require_api_key()?;

        let body = ChatCompletionBody {
            model: &self.chat_model,
            messages: request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(model = %self.chat_model, "Forwarding chat completion");

        let request = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body);

        send_json(request).await
    }
}
