//! In-memory slide built from a layout, and its `p:sld` serialization.

use crate::layout::{Placeholder, SlideLayout};
use crate::xml::{sanitize_text, XmlOut, NS_A, NS_P, NS_R};
use autodeck_core::Result;

/// Name prefixes (lower-case) identifying the shape that takes the bullets.
pub const BODY_SHAPE_PREFIXES: &[&str] = &["content", "body", "text"];

/// One paragraph of a text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// Outline level; `None` leaves `a:pPr` out and inherits the layout's.
    pub level: Option<u8>,
}

/// Text body of a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every paragraph.
    pub fn clear(&mut self) {
        self.paragraphs.clear();
    }

    /// Replace the content with `text`, one paragraph per line.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                text: line.to_string(),
                level: None,
            })
            .collect();
    }

    pub fn add_paragraph(&mut self, text: &str, level: Option<u8>) {
        self.paragraphs.push(Paragraph {
            text: text.to_string(),
            level,
        });
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A placeholder shape on a new slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    pub placeholder: Placeholder,
    pub text_frame: Option<TextFrame>,
}

impl Shape {
    /// Clone a layout placeholder under the given shape id.
    fn from_placeholder(placeholder: &Placeholder, id: u32) -> Self {
        let vertical = if placeholder.is_vertical() {
            "Vertical "
        } else {
            ""
        };
        Self {
            id,
            name: format!("{}{} {}", vertical, placeholder.kind.base_name(), id - 1),
            placeholder: placeholder.clone(),
            text_frame: placeholder.kind.has_text_frame().then(TextFrame::new),
        }
    }

    pub fn has_text_frame(&self) -> bool {
        self.text_frame.is_some()
    }
}

/// Whether a shape name marks the bullet body.
pub fn is_body_shape_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    BODY_SHAPE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Index of the first shape that takes the bullets: a body-like name and a
/// text frame.
pub fn find_body_shape(shapes: &[Shape]) -> Option<usize> {
    shapes
        .iter()
        .position(|s| s.has_text_frame() && is_body_shape_name(&s.name))
}

/// A slide waiting to be written into the package.
#[derive(Debug, Clone)]
pub struct SlideDraft {
    layout_part: String,
    shapes: Vec<Shape>,
}

impl SlideDraft {
    /// New slide with the layout's placeholders cloned onto it.
    pub fn from_layout(layout: &SlideLayout) -> Self {
        let shapes = layout
            .placeholders
            .iter()
            .filter(|ph| ph.kind.is_cloned_to_slides())
            .zip(2u32..)
            .map(|(ph, id)| Shape::from_placeholder(ph, id))
            .collect();
        Self {
            layout_part: layout.part_name.clone(),
            shapes,
        }
    }

    /// Package path of the layout this slide uses.
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Text frame of the title placeholder, if the layout has one.
    pub fn title_mut(&mut self) -> Option<&mut TextFrame> {
        self.shapes
            .iter_mut()
            .find(|s| s.placeholder.kind.is_title())
            .and_then(|s| s.text_frame.as_mut())
    }

    /// The placeholder with `idx = 1`, else the second placeholder in tree
    /// order.
    pub fn second_placeholder_mut(&mut self) -> Option<&mut Shape> {
        let pos = self
            .shapes
            .iter()
            .position(|s| s.placeholder.idx == 1)
            .or_else(|| (self.shapes.len() > 1).then_some(1))?;
        self.shapes.get_mut(pos)
    }

    /// Text frame of the shape that takes the bullets.
    pub fn body_mut(&mut self) -> Option<&mut TextFrame> {
        let pos = find_body_shape(&self.shapes)?;
        self.shapes[pos].text_frame.as_mut()
    }

    /// Serialize as a `p:sld` part.
    pub fn to_xml(&self) -> Result<String> {
        let mut out = XmlOut::document()?;
        out.start(
            "p:sld",
            &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
        )?;
        out.start("p:cSld", &[])?;
        out.start("p:spTree", &[])?;

        out.start("p:nvGrpSpPr", &[])?;
        out.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
        out.empty("p:cNvGrpSpPr", &[])?;
        out.empty("p:nvPr", &[])?;
        out.end("p:nvGrpSpPr")?;
        out.empty("p:grpSpPr", &[])?;

        for shape in &self.shapes {
            write_shape(&mut out, shape)?;
        }

        out.end("p:spTree")?;
        out.end("p:cSld")?;
        out.start("p:clrMapOvr", &[])?;
        out.empty("a:masterClrMapping", &[])?;
        out.end("p:clrMapOvr")?;
        out.end("p:sld")?;
        out.into_string()
    }
}

fn write_shape(out: &mut XmlOut, shape: &Shape) -> Result<()> {
    let id = shape.id.to_string();
    let ph = &shape.placeholder;
    let idx = ph.idx.to_string();

    let mut ph_attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(kind) = ph.kind.as_attr() {
        ph_attrs.push(("type", kind));
    }
    if let Some(orient) = ph.orient.as_deref().filter(|o| *o != "horz") {
        ph_attrs.push(("orient", orient));
    }
    if let Some(sz) = ph.sz.as_deref().filter(|s| *s != "full") {
        ph_attrs.push(("sz", sz));
    }
    if ph.idx != 0 {
        ph_attrs.push(("idx", idx.as_str()));
    }

    out.start("p:sp", &[])?;
    out.start("p:nvSpPr", &[])?;
    out.empty("p:cNvPr", &[("id", id.as_str()), ("name", shape.name.as_str())])?;
    out.start("p:cNvSpPr", &[])?;
    out.empty("a:spLocks", &[("noGrp", "1")])?;
    out.end("p:cNvSpPr")?;
    out.start("p:nvPr", &[])?;
    out.empty("p:ph", &ph_attrs)?;
    out.end("p:nvPr")?;
    out.end("p:nvSpPr")?;
    out.empty("p:spPr", &[])?;

    if let Some(frame) = &shape.text_frame {
        write_text_frame(out, frame)?;
    }

    out.end("p:sp")
}

fn write_text_frame(out: &mut XmlOut, frame: &TextFrame) -> Result<()> {
    out.start("p:txBody", &[])?;
    out.empty("a:bodyPr", &[])?;
    out.empty("a:lstStyle", &[])?;

    // A text body needs at least one paragraph.
    if frame.paragraphs().is_empty() {
        out.empty("a:p", &[])?;
    }
    for paragraph in frame.paragraphs() {
        write_paragraph(out, paragraph)?;
    }

    out.end("p:txBody")
}

fn write_paragraph(out: &mut XmlOut, paragraph: &Paragraph) -> Result<()> {
    // Split on soft breaks before sanitizing, which would drop the vertical tab.
    let lines: Vec<String> = paragraph
        .text
        .split(['\n', '\u{b}'])
        .map(sanitize_text)
        .collect();
    if paragraph.level.is_none() && lines.len() == 1 && lines[0].is_empty() {
        return out.empty("a:p", &[]);
    }

    out.start("a:p", &[])?;
    if let Some(level) = paragraph.level {
        out.empty("a:pPr", &[("lvl", level.to_string().as_str())])?;
    }

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.empty("a:br", &[])?;
        }
        if line.is_empty() {
            continue;
        }
        out.start("a:r", &[])?;
        out.empty("a:rPr", &[("lang", "en-US"), ("dirty", "0")])?;
        out.text_element("a:t", line)?;
        out.end("a:r")?;
    }

    out.end("a:p")
}
