//! Domain types for slide plans and rendered decks.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed filename offered for a rendered deck.
pub const OUTPUT_FILENAME: &str = "generated_presentation.pptx";

/// MIME type of a rendered deck.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// One slide of a plan: a title and its bullet points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    /// Short slide title.
    #[serde(default)]
    pub title: String,

    /// Bullet points, in display order.
    #[serde(rename = "content", default)]
    pub bullets: Vec<String>,
}

impl SlideSpec {
    /// Create a slide spec from a title and bullets.
    pub fn new<I, S>(title: impl Into<String>, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            bullets: bullets.into_iter().map(Into::into).collect(),
        }
    }

    /// First bullet, if it is present and non-empty.
    pub fn first_bullet(&self) -> Option<&str> {
        self.bullets
            .first()
            .map(String::as_str)
            .filter(|b| !b.is_empty())
    }
}

/// An ordered, non-empty list of slides.
///
/// The first slide is always rendered as the title slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutlinePlan {
    slides: Vec<SlideSpec>,
}

impl OutlinePlan {
    /// Build a plan, rejecting an empty slide list.
    pub fn new(slides: Vec<SlideSpec>) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::EmptyPlan);
        }
        Ok(Self { slides })
    }

    /// The title slide.
    pub fn title_slide(&self) -> &SlideSpec {
        &self.slides[0]
    }

    /// Every slide after the title slide.
    pub fn content_slides(&self) -> &[SlideSpec] {
        &self.slides[1..]
    }

    /// All slides in presentation order.
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    /// Number of slides, title slide included.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Never true for a constructed plan.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slide titles in presentation order.
    pub fn titles(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.title.as_str()).collect()
    }
}

impl<'de> Deserialize<'de> for OutlinePlan {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let slides = Vec::<SlideSpec>::deserialize(deserializer)?;
        OutlinePlan::new(slides).map_err(serde::de::Error::custom)
    }
}

/// The model backend used to build the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    /// All providers, in menu order.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Gemini];

    /// Human-readable provider name, used in status and error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Google Gemini",
        }
    }

    /// Environment variable conventionally holding this provider's API key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google-gemini" | "google gemini" => Ok(Self::Gemini),
            other => Err(format!(
                "unknown provider '{}' (expected openai, anthropic or gemini)",
                other
            )),
        }
    }
}

/// A finished presentation ready to hand to the caller.
#[derive(Debug, Clone)]
pub struct RenderedDeck {
    /// Serialized `.pptx` archive.
    pub bytes: Vec<u8>,

    /// Number of slides in the deck, template slides included.
    pub slide_count: usize,
}

impl RenderedDeck {
    /// Filename to offer for download.
    pub fn filename(&self) -> &'static str {
        OUTPUT_FILENAME
    }

    /// MIME type to offer for download.
    pub fn mime_type(&self) -> &'static str {
        PPTX_MIME_TYPE
    }
}
