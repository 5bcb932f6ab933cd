//! Blocking JSON-over-HTTP transport shared by the backends.

use autodeck_core::{Error, Provider, Result};
use serde::Serialize;
use serde_json::Value;
use ureq::Agent;

/// Longest error body echoed back to the user.
const MAX_ERROR_BODY: usize = 200;

/// Thin wrapper over a `ureq` agent that reports failures per provider.
pub(crate) struct HttpClient {
    agent: Agent,
}

impl HttpClient {
    pub(crate) fn new() -> Self {
        // Status codes are inspected below so the API's own error message
        // can be surfaced.
        let config = Agent::config_builder().http_status_as_error(false).build();
        Self {
            agent: config.into(),
        }
    }

    /// POST `body` as JSON and return the response body on a 2xx status.
    pub(crate) fn post_json<B: Serialize>(
        &self,
        provider: Provider,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
    ) -> Result<String> {
        let name = provider.display_name();
        log::info!("Requesting slide plan from {}", name);
        log::debug!("POST {}", url);

        let mut request = self.agent.post(url);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let mut response = request
            .send_json(body)
            .map_err(|e| Error::backend(name, e.to_string()))?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::backend(name, format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::backend(
                name,
                format!("HTTP {}: {}", status.as_u16(), api_error_message(&text)),
            ));
        }

        log::debug!("{} replied with {} bytes", name, text.len());
        Ok(text)
    }
}

/// Pull a readable message out of an API error body.
///
/// All three providers use `{"error": {"message": ...}}`; anything else is
/// echoed back, truncated.
pub(crate) fn api_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("error") {
            Some(Value::Object(error)) => {
                if let Some(Value::String(message)) = error.get("message") {
                    return message.clone();
                }
            }
            Some(Value::String(message)) => return message.clone(),
            _ => {}
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
