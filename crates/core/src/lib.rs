//! Core domain types and error taxonomy for turning free text into a
//! presentation deck.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{OutlinePlan, Provider, RenderedDeck, SlideSpec, OUTPUT_FILENAME, PPTX_MIME_TYPE};
