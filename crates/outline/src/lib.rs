//! Outline generator: asks one model backend to structure free text into a
//! slide plan.
//!
//! The provider only changes how the request is sent. Every reply goes
//! through the same JSON normalization, so callers get an [`OutlinePlan`]
//! no matter which backend produced it.

pub mod backend;
pub mod plan;
pub mod prompt;

pub use backend::{backend_for, Backend, GeneratorConfig, ProviderSettings};
pub use plan::parse_plan;
pub use prompt::build_prompt;

use autodeck_core::{OutlinePlan, Provider, Result};

/// Generates slide plans through a configured set of backends.
#[derive(Debug, Clone, Default)]
pub struct OutlineGenerator {
    config: GeneratorConfig,
}

impl OutlineGenerator {
    /// Create a generator using each provider's default model and endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom per-provider settings.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Turn `text` into a slide plan with the backend selected by `provider`.
    ///
    /// Exactly one request is made. Any failure (transport, status, JSON,
    /// shape) aborts with an error naming the provider; no partial plan is
    /// returned.
    pub fn generate(
        &self,
        text: &str,
        guidance: &str,
        credential: &str,
        provider: Provider,
    ) -> Result<OutlinePlan> {
        let backend = backend_for(provider, credential, &self.config)?;
        self.generate_with(backend.as_ref(), text, guidance)
    }

    /// Same as [`generate`](Self::generate), with an already-built backend.
    pub fn generate_with(
        &self,
        backend: &dyn Backend,
        text: &str,
        guidance: &str,
    ) -> Result<OutlinePlan> {
        let prompt = build_prompt(guidance, text);
        let raw = backend.complete(&prompt)?;
        let plan = parse_plan(backend.provider(), &raw)?;
        log::info!(
            "{} proposed {} slides",
            backend.provider().display_name(),
            plan.len()
        );
        Ok(plan)
    }
}
