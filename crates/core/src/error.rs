//! Error types for outline generation and deck rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating an outline or rendering a deck.
///
/// Every variant renders to a short message that can be shown to the user
/// as-is. A content slide without a body placeholder is not an error; it is
/// rendered title-only.
#[derive(Error, Debug)]
pub enum Error {
    /// The selected model backend could not be reached or refused the request
    /// (network, authentication, quota).
    #[error("An error occurred with {provider}: {message}")]
    Backend { provider: String, message: String },

    /// The backend replied, but the payload is not valid JSON or not shaped
    /// like a slide plan.
    #[error("An error occurred with {provider}: malformed slide plan: {message}")]
    MalformedPlan { provider: String, message: String },

    /// A slide plan must contain at least the title slide.
    #[error("Slide plan is empty")]
    EmptyPlan,

    /// The template cannot be opened or lacks the layouts needed.
    #[error("Error creating presentation: template error: {0}")]
    Template(String),

    /// Any other failure while building the deck.
    #[error("Error creating presentation: {0}")]
    Render(String),

    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}

impl Error {
    /// Build a [`Error::Backend`] for the named provider.
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Build a [`Error::MalformedPlan`] for the named provider.
    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPlan {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error belongs to the template side of rendering.
    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template(_))
    }
}
