//! Model backends.
//!
//! Each backend turns the prompt into its provider's native request and hands
//! back the reply text. They are interchangeable behind [`Backend`];
//! [`backend_for`] picks one from a [`Provider`].

mod anthropic;
mod gemini;
mod http;
mod openai;

pub use anthropic::AnthropicBackend;
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

use autodeck_core::{Error, Provider, Result};

/// A text-completion service that answers one prompt with one reply.
pub trait Backend {
    /// Provider this backend talks to.
    fn provider(&self) -> Provider;

    /// Send `prompt` and return the raw reply text.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Model and endpoint used for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Model identifier sent with the request.
    pub model: String,

    /// API base URL, without a trailing slash.
    pub base_url: String,
}

impl ProviderSettings {
    /// Default model and endpoint for `provider`.
    pub fn defaults_for(provider: Provider) -> Self {
        let (model, base_url) = match provider {
            Provider::OpenAi => (openai::DEFAULT_MODEL, openai::DEFAULT_BASE_URL),
            Provider::Anthropic => (anthropic::DEFAULT_MODEL, anthropic::DEFAULT_BASE_URL),
            Provider::Gemini => (gemini::DEFAULT_MODEL, gemini::DEFAULT_BASE_URL),
        };
        Self {
            model: model.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

/// Per-provider settings for the outline generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    openai: ProviderSettings,
    anthropic: ProviderSettings,
    gemini: ProviderSettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::defaults_for(Provider::OpenAi),
            anthropic: ProviderSettings::defaults_for(Provider::Anthropic),
            gemini: ProviderSettings::defaults_for(Provider::Gemini),
        }
    }
}

impl GeneratorConfig {
    /// Create a config with every provider's defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for `provider`.
    pub fn settings(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Gemini => &self.gemini,
        }
    }

    fn settings_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Anthropic => &mut self.anthropic,
            Provider::Gemini => &mut self.gemini,
        }
    }

    /// Override the model used for `provider`. Blank values are ignored.
    pub fn with_model(mut self, provider: Provider, model: &str) -> Self {
        let model = model.trim();
        if !model.is_empty() {
            self.settings_mut(provider).model = model.to_string();
        }
        self
    }

    /// Override the base URL used for `provider`. Blank values are ignored.
    pub fn with_base_url(mut self, provider: Provider, base_url: &str) -> Self {
        let base_url = base_url.trim().trim_end_matches('/');
        if !base_url.is_empty() {
            self.settings_mut(provider).base_url = base_url.to_string();
        }
        self
    }
}

/// Build the backend for `provider`.
///
/// Fails when `credential` is blank.
pub fn backend_for(
    provider: Provider,
    credential: &str,
    config: &GeneratorConfig,
) -> Result<Box<dyn Backend>> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Err(Error::backend(
            provider.display_name(),
            format!("no API key provided (set {})", provider.api_key_env()),
        ));
    }

    let settings = config.settings(provider).clone();
    let backend: Box<dyn Backend> = match provider {
        Provider::OpenAi => Box::new(OpenAiBackend::new(credential, settings)),
        Provider::Anthropic => Box::new(AnthropicBackend::new(credential, settings)),
        Provider::Gemini => Box::new(GeminiBackend::new(credential, settings)),
    };
    Ok(backend)
}
