//! Gemini backend (Generative Language API, `generateContent`).

use super::http::HttpClient;
use super::{Backend, ProviderSettings};
use autodeck_core::{Error, Provider, Result};
use serde::{Deserialize, Serialize};

pub(super) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(super) const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    pub role: &'static str,
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Part<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub(crate) fn build_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(body: &str) -> std::result::Result<String, String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected response: {}", e))?;

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or_else(|| "response contains no candidates".to_string())?;

    let text: String = parts.into_iter().filter_map(|part| part.text).collect();
    if text.is_empty() {
        return Err("response contains no text".to_string());
    }
    Ok(text)
}

/// Backend for Google Gemini models.
pub struct GeminiBackend {
    api_key: String,
    settings: ProviderSettings,
    http: HttpClient,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        Self {
            api_key: api_key.into(),
            settings,
            http: HttpClient::new(),
        }
    }
}

impl Backend for GeminiBackend {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );
        let request = build_request(prompt);

        let body = self.http.post_json(
            self.provider(),
            &url,
            &[("x-goog-api-key", self.api_key.as_str())],
            &request,
        )?;
        extract_text(&body).map_err(|message| Error::backend(self.provider().display_name(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let value = serde_json::to_value(build_request("make slides")).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "make slides"}]}],
                "generationConfig": {"responseMimeType": "application/json"}
            })
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[{\"title\":"},{"text":"\"A\"}]"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"[{"title":"A"}]"#);
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(extract_text(body).unwrap_err(), "response contains no candidates");
    }
}
