//! Reads the text back out of a `.pptx`: titles and body paragraphs of
//! every slide, in presentation order.

use crate::layout::PlaceholderKind;
use crate::package::{resolve_target, Package};
use crate::presentation::{main_part_name, slide_refs};
use crate::slide::is_body_shape_name;
use crate::xml::{attr, local_name, xml_err};
use autodeck_core::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Text of one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeText {
    /// `p:cNvPr/@name`.
    pub name: String,

    /// Placeholder type, when the shape is a placeholder.
    pub placeholder: Option<PlaceholderKind>,

    /// `p:ph/@idx`, 0 when absent.
    pub idx: u32,

    /// One entry per paragraph; line breaks appear as `\n`.
    pub paragraphs: Vec<String>,
}

impl ShapeText {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    fn is_title(&self) -> bool {
        self.placeholder.is_some_and(PlaceholderKind::is_title)
    }
}

/// Text content of one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideContent {
    /// 1-based position in the deck.
    pub number: usize,

    /// Package path of the slide part.
    pub part_name: String,

    /// Shapes with a text body, in tree order.
    pub shapes: Vec<ShapeText>,
}

impl SlideContent {
    /// Text of the title placeholder, if any.
    pub fn title(&self) -> Option<String> {
        self.shapes.iter().find(|s| s.is_title()).map(ShapeText::text)
    }

    /// Text of the subtitle: the placeholder with `idx = 1`, or a
    /// `subTitle` placeholder.
    pub fn subtitle(&self) -> Option<String> {
        self.shapes
            .iter()
            .find(|s| {
                !s.is_title()
                    && (s.idx == 1 || s.placeholder == Some(PlaceholderKind::Subtitle))
            })
            .map(ShapeText::text)
    }

    /// Paragraphs of the first body-like shape, empty when there is none.
    pub fn bullets(&self) -> &[String] {
        self.shapes
            .iter()
            .find(|s| !s.is_title() && is_body_shape_name(&s.name))
            .map(|s| s.paragraphs.as_slice())
            .unwrap_or(&[])
    }
}

/// Reader for `.pptx` decks.
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    /// Read every slide listed in `p:sldIdLst`.
    pub fn read(&self, bytes: &[u8]) -> Result<Vec<SlideContent>> {
        let package = Package::open(bytes)?;
        let main_part = main_part_name(&package)?;
        let rels = package.relationships(&main_part)?;

        let mut slides = Vec::new();
        for slide_ref in slide_refs(package.xml_part(&main_part)?)? {
            let Some(rel) = rels.by_id(&slide_ref.rel_id) else {
                log::warn!("Slide relationship '{}' not found, skipping", slide_ref.rel_id);
                continue;
            };
            let part_name = resolve_target(&main_part, &rel.target);
            let shapes = extract_shapes(package.xml_part(&part_name)?)?;
            slides.push(SlideContent {
                number: slides.len() + 1,
                part_name,
                shapes,
            });
        }

        log::debug!("Read {} slides", slides.len());
        Ok(slides)
    }
}

impl Default for DeckReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Shapes that carry a text body, with their paragraphs.
fn extract_shapes(xml_content: &str) -> Result<Vec<ShapeText>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut current_shape: Option<ShapeText> = None;
    let mut has_text_body = false;
    let mut in_text_body = false;
    let mut in_paragraph = false;
    let mut in_run_text = false;
    // Whether the last paragraph has neither properties nor runs.
    let mut bare_paragraph = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(ref e) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current_shape = Some(ShapeText::default());
                    has_text_body = false;
                }
                b"txBody" if current_shape.is_some() => {
                    in_text_body = true;
                    has_text_body = true;
                }
                b"p" if in_text_body => {
                    in_paragraph = true;
                    bare_paragraph = true;
                    if let Some(shape) = current_shape.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"pPr" | b"r" | b"fld" if in_paragraph => bare_paragraph = false,
                b"t" if in_paragraph => in_run_text = true,
                b"cNvPr" => set_name(&mut current_shape, attr(e, b"name")),
                b"ph" => set_placeholder(&mut current_shape, e),
                _ => {}
            },
            Event::Empty(ref e) => match local_name(e.name().as_ref()) {
                b"p" if in_text_body => {
                    bare_paragraph = true;
                    if let Some(shape) = current_shape.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"pPr" | b"r" if in_paragraph => bare_paragraph = false,
                b"br" if in_paragraph => {
                    bare_paragraph = false;
                    if let Some(text) = last_paragraph(&mut current_shape) {
                        text.push('\n');
                    }
                }
                b"cNvPr" => set_name(&mut current_shape, attr(e, b"name")),
                b"ph" => set_placeholder(&mut current_shape, e),
                _ => {}
            },
            Event::Text(ref e) if in_run_text => {
                let text = e.unescape().map_err(xml_err)?;
                if let Some(paragraph) = last_paragraph(&mut current_shape) {
                    paragraph.push_str(&text);
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(mut shape) = current_shape.take() {
                        // A lone bare `<a:p/>` is an empty text body.
                        if bare_paragraph
                            && shape.paragraphs.len() == 1
                            && shape.paragraphs[0].is_empty()
                        {
                            shape.paragraphs.clear();
                        }
                        if has_text_body {
                            shapes.push(shape);
                        }
                    }
                    in_text_body = false;
                    in_paragraph = false;
                    in_run_text = false;
                }
                b"txBody" => in_text_body = false,
                b"p" => in_paragraph = false,
                b"t" => in_run_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

fn last_paragraph(shape: &mut Option<ShapeText>) -> Option<&mut String> {
    shape.as_mut().and_then(|s| s.paragraphs.last_mut())
}

fn set_name(shape: &mut Option<ShapeText>, name: Option<String>) {
    if let (Some(shape), Some(name)) = (shape.as_mut(), name) {
        if shape.name.is_empty() {
            shape.name = name;
        }
    }
}

fn set_placeholder(shape: &mut Option<ShapeText>, e: &BytesStart<'_>) {
    if let Some(shape) = shape.as_mut() {
        shape.placeholder = Some(PlaceholderKind::from_attr(attr(e, b"type").as_deref()));
        shape.idx = attr(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0);
    }
}
