//! Anthropic backend (Messages API).

use super::http::HttpClient;
use super::{Backend, ProviderSettings};
use crate::prompt::JSON_ARRAY_SYSTEM_PROMPT;
use autodeck_core::{Error, Provider, Result};
use serde::{Deserialize, Serialize};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(super) const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'static str,
    pub messages: Vec<UserMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub(crate) fn build_request<'a>(model: &'a str, prompt: &'a str) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens: MAX_TOKENS,
        system: JSON_ARRAY_SYSTEM_PROMPT,
        messages: vec![UserMessage {
            role: "user",
            content: prompt,
        }],
    }
}

/// Extract the text of the first content block.
pub(crate) fn extract_text(body: &str) -> std::result::Result<String, String> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected response: {}", e))?;
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| "response contains no text block".to_string())
}

/// Backend for Anthropic Claude models.
pub struct AnthropicBackend {
    api_key: String,
    settings: ProviderSettings,
    http: HttpClient,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        Self {
            api_key: api_key.into(),
            settings,
            http: HttpClient::new(),
        }
    }
}

impl Backend for AnthropicBackend {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.settings.base_url);
        let request = build_request(&self.settings.model, prompt);

        let body = self.http.post_json(
            self.provider(),
            &url,
            &[
                ("x-api-key", self.api_key.as_str()),
                ("anthropic-version", API_VERSION),
            ],
            &request,
        )?;
        extract_text(&body).map_err(|message| Error::backend(self.provider().display_name(), message))
    }
}
