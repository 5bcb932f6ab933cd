//! OpenAI backend (Chat Completions API).

use super::http::HttpClient;
use super::{Backend, ProviderSettings};
use crate::prompt::JSON_OBJECT_SYSTEM_PROMPT;
use autodeck_core::{Error, Provider, Result};
use serde::{Deserialize, Serialize};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(super) const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Build the chat request for `prompt`.
pub(crate) fn build_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: JSON_OBJECT_SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

/// Extract `choices[0].message.content` from a response body.
pub(crate) fn extract_text(body: &str) -> std::result::Result<String, String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected response: {}", e))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| "response contains no message content".to_string())
}

/// Backend for OpenAI chat models.
pub struct OpenAiBackend {
    api_key: String,
    settings: ProviderSettings,
    http: HttpClient,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        Self {
            api_key: api_key.into(),
            settings,
            http: HttpClient::new(),
        }
    }
}

impl Backend for OpenAiBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.settings.base_url);
        let auth = format!("Bearer {}", self.api_key);
        let request = build_request(&self.settings.model, prompt);

        let body = self
            .http
            .post_json(self.provider(), &url, &[("Authorization", auth.as_str())], &request)?;
        extract_text(&body).map_err(|message| Error::backend(self.provider().display_name(), message))
    }
}
