//! PPTX (Office Open XML) deck renderer and reader.
//!
//! A `.pptx` is a ZIP archive of XML parts tied together by relationship
//! parts. The renderer opens a template, clones its layouts into new slides
//! filled from an [`autodeck_core::OutlinePlan`] and writes the archive back
//! out. The reader extracts the text of an existing deck.

pub mod layout;
pub mod package;
pub mod presentation;
pub mod reader;
pub mod renderer;
pub mod slide;
mod xml;

pub use layout::{
    find_layout_index, resolve_layouts, LayoutChoice, Placeholder, PlaceholderKind, SlideLayout,
    CONTENT_LAYOUT_NAME, TITLE_LAYOUT_NAME,
};
pub use package::Package;
pub use reader::{DeckReader, ShapeText, SlideContent};
pub use renderer::{render, DeckRenderer, DEFAULT_SUBTITLE, DEFAULT_TITLE};
pub use slide::{find_body_shape, is_body_shape_name, Shape, SlideDraft, TextFrame};
