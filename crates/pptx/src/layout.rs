//! Slide layouts of a template and the name-based lookups that pick them.
//!
//! Templates are authored by third parties, so layouts are found by name
//! (case-insensitive exact match) with a fixed index as fallback, and
//! placeholders are described only as far as new slides need them.

use crate::package::{resolve_target, Package};
use crate::presentation::first_master_rel_id;
use crate::xml::{attr, local_name, prefixed_attr, xml_err};
use autodeck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Name of the layout used for the first slide.
pub const TITLE_LAYOUT_NAME: &str = "Title Slide";

/// Name of the layout used for every other slide.
pub const CONTENT_LAYOUT_NAME: &str = "Title and Content";

/// Fallback index of the title layout.
pub const TITLE_LAYOUT_FALLBACK: usize = 0;

/// Fallback index of the content layout.
pub const CONTENT_LAYOUT_FALLBACK: usize = 1;

/// Placeholder types (`p:ph/@type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    SlideImage,
    Picture,
    Date,
    Footer,
    Header,
    SlideNumber,
}

impl PlaceholderKind {
    /// Parse `p:ph/@type`; a missing type means `obj`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => Self::Title,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "clipArt" => Self::ClipArt,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "sldImg" => Self::SlideImage,
            "pic" => Self::Picture,
            "dt" => Self::Date,
            "ftr" => Self::Footer,
            "hdr" => Self::Header,
            "sldNum" => Self::SlideNumber,
            _ => Self::Object,
        }
    }

    /// Value for `p:ph/@type`, or `None` for the default (`obj`).
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::Title => Some("title"),
            Self::CenterTitle => Some("ctrTitle"),
            Self::Subtitle => Some("subTitle"),
            Self::Body => Some("body"),
            Self::Object => None,
            Self::Chart => Some("chart"),
            Self::Table => Some("tbl"),
            Self::ClipArt => Some("clipArt"),
            Self::Diagram => Some("dgm"),
            Self::Media => Some("media"),
            Self::SlideImage => Some("sldImg"),
            Self::Picture => Some("pic"),
            Self::Date => Some("dt"),
            Self::Footer => Some("ftr"),
            Self::Header => Some("hdr"),
            Self::SlideNumber => Some("sldNum"),
        }
    }

    /// Base of the shape name given to a cloned placeholder.
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Title | Self::CenterTitle => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Text Placeholder",
            Self::Object => "Content Placeholder",
            Self::Chart => "Chart Placeholder",
            Self::Table => "Table Placeholder",
            Self::ClipArt => "Picture",
            Self::Diagram => "SmartArt Placeholder",
            Self::Media => "Media Placeholder",
            Self::SlideImage => "Slide Image Placeholder",
            Self::Picture => "Picture Placeholder",
            Self::Date => "Date Placeholder",
            Self::Footer => "Footer Placeholder",
            Self::Header => "Header Placeholder",
            Self::SlideNumber => "Slide Number Placeholder",
        }
    }

    pub fn is_title(self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Whether a cloned placeholder of this kind gets a text frame.
    pub fn has_text_frame(self) -> bool {
        matches!(
            self,
            Self::Title | Self::CenterTitle | Self::Subtitle | Self::Body | Self::Object
        )
    }

    /// Date, footer and slide-number placeholders stay on the layout.
    pub fn is_cloned_to_slides(self) -> bool {
        !matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }
}

/// A placeholder as declared on a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub orient: Option<String>,
    pub sz: Option<String>,
}

impl Placeholder {
    pub fn new(kind: PlaceholderKind, idx: u32) -> Self {
        Self {
            kind,
            idx,
            orient: None,
            sz: None,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.orient.as_deref() == Some("vert")
    }

    fn from_element(e: &BytesStart<'_>) -> Self {
        Self {
            kind: PlaceholderKind::from_attr(attr(e, b"type").as_deref()),
            idx: attr(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0),
            orient: attr(e, b"orient"),
            sz: attr(e, b"sz"),
        }
    }
}

/// One slide layout of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideLayout {
    /// `p:cSld/@name`, empty when absent.
    pub name: String,

    /// Package path of the layout part.
    pub part_name: String,

    /// Top-level placeholders, in tree order.
    pub placeholders: Vec<Placeholder>,
}

/// Layout indices chosen for a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChoice {
    pub title: usize,
    pub content: usize,
}

/// Index of the first layout whose name equals `wanted`, ignoring case.
pub fn find_layout_index<S: AsRef<str>>(names: &[S], wanted: &str) -> Option<usize> {
    let wanted = wanted.to_lowercase();
    names
        .iter()
        .position(|name| name.as_ref().to_lowercase() == wanted)
}

/// Pick the title and content layouts by name, falling back to indices 0
/// and 1.
pub fn resolve_layouts<S: AsRef<str>>(names: &[S]) -> Result<LayoutChoice> {
    let title = match find_layout_index(names, TITLE_LAYOUT_NAME) {
        Some(idx) => idx,
        None => {
            log::debug!(
                "No '{}' layout, using layout {}",
                TITLE_LAYOUT_NAME,
                TITLE_LAYOUT_FALLBACK
            );
            TITLE_LAYOUT_FALLBACK
        }
    };
    let content = match find_layout_index(names, CONTENT_LAYOUT_NAME) {
        Some(idx) => idx,
        None => {
            log::debug!(
                "No '{}' layout, using layout {}",
                CONTENT_LAYOUT_NAME,
                CONTENT_LAYOUT_FALLBACK
            );
            CONTENT_LAYOUT_FALLBACK
        }
    };

    if title >= names.len() {
        return Err(Error::Template("template has no slide layouts".to_string()));
    }
    if content >= names.len() {
        return Err(Error::Template(format!(
            "no layout named '{}' and no layout at index {} (template has {} layout{})",
            CONTENT_LAYOUT_NAME,
            CONTENT_LAYOUT_FALLBACK,
            names.len(),
            if names.len() == 1 { "" } else { "s" }
        )));
    }

    Ok(LayoutChoice { title, content })
}

/// Layouts of the first slide master, in `p:sldLayoutIdLst` order.
pub fn load_layouts(package: &Package, main_part: &str) -> Result<Vec<SlideLayout>> {
    let presentation_rels = package.relationships(main_part)?;
    let master_rel_id = first_master_rel_id(package.xml_part(main_part)?)?;

    let master_rel = match master_rel_id {
        Some(id) => presentation_rels.by_id(&id),
        None => presentation_rels.first_of("slideMaster"),
    }
    .ok_or_else(|| Error::Template("template has no slide master".to_string()))?;
    let master_part = resolve_target(main_part, &master_rel.target);

    let master_rels = package.relationships(&master_part)?;
    let layout_rel_ids = layout_rel_ids(package.xml_part(&master_part)?)?;

    let layout_parts: Vec<String> = if layout_rel_ids.is_empty() {
        master_rels
            .iter()
            .filter(|r| r.is("slideLayout"))
            .map(|r| resolve_target(&master_part, &r.target))
            .collect()
    } else {
        layout_rel_ids
            .iter()
            .filter_map(|id| {
                let rel = master_rels.by_id(id);
                if rel.is_none() {
                    log::warn!("Layout relationship '{}' missing from {}", id, master_part);
                }
                rel
            })
            .map(|r| resolve_target(&master_part, &r.target))
            .collect()
    };

    layout_parts
        .into_iter()
        .map(|part_name| {
            let (name, placeholders) = parse_layout(package.xml_part(&part_name)?)?;
            log::debug!("Layout '{}' at {}", name, part_name);
            Ok(SlideLayout {
                name,
                part_name,
                placeholders,
            })
        })
        .collect()
}

/// Relationship ids listed in a master's `p:sldLayoutIdLst`.
fn layout_rel_ids(master_xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(master_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if local_name(e.name().as_ref()) == b"sldLayoutId" =>
            {
                if let Some(id) = prefixed_attr(e, b"id") {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// Layout name and its top-level placeholders.
fn parse_layout(layout_xml: &str) -> Result<(String, Vec<Placeholder>)> {
    let mut reader = Reader::from_str(layout_xml);
    reader.trim_text(true);

    let mut name = String::new();
    let mut placeholders = Vec::new();
    let mut group_depth = 0usize;
    let mut in_shape = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(ref e) => match local_name(e.name().as_ref()) {
                b"cSld" => name = attr(e, b"name").unwrap_or_default(),
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => in_shape = true,
                b"ph" if in_shape => placeholders.push(Placeholder::from_element(e)),
                _ => {}
            },
            Event::Empty(ref e) => match local_name(e.name().as_ref()) {
                b"cSld" => name = attr(e, b"name").unwrap_or_default(),
                b"ph" if in_shape => placeholders.push(Placeholder::from_element(e)),
                _ => {}
            },
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"sp" if group_depth == 0 => in_shape = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((name, placeholders))
}
