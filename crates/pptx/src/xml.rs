//! Small helpers around `quick-xml` shared by the package, slide and reader
//! code.

use autodeck_core::Error;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;

/// PresentationML main namespace.
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
/// DrawingML main namespace.
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// Office document relationships namespace (used for `r:id`).
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Map any XML-layer failure to our error type.
pub(crate) fn xml_err<E: Display>(e: E) -> Error {
    Error::XmlError(e.to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Prefix of a qualified name, including the colon (`"p:"`), or `""`.
pub(crate) fn prefix_of(name: &[u8]) -> String {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => String::from_utf8_lossy(&name[..=pos]).into_owned(),
        None => String::new(),
    }
}

/// Unescaped value of the attribute whose full (qualified) key is `key`.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Unescaped value of the first attribute with local name `local` that
/// carries a namespace prefix (e.g. `r:id`).
pub(crate) fn prefixed_attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Drop characters that cannot appear in an XML 1.0 document.
pub(crate) fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || !c.is_control())
        .collect()
}

/// Convenience wrapper around `quick_xml::Writer` for generated parts.
pub(crate) struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    /// Start a standalone UTF-8 document.
    pub(crate) fn document() -> Result<Self, Error> {
        let mut out = Self {
            writer: Writer::new(Vec::new()),
        };
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(out)
    }

    pub(crate) fn event(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.writer.write_event(event).map_err(xml_err)
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), Error> {
        self.event(Event::Start(element(name, attrs)))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), Error> {
        self.event(Event::Empty(element(name, attrs)))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), Error> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<(), Error> {
        self.event(Event::Text(BytesText::new(text)))
    }

    /// `<name>text</name>`
    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    pub(crate) fn into_string(self) -> Result<String, Error> {
        String::from_utf8(self.into_bytes()).map_err(xml_err)
    }
}

fn element<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &(key, value) in attrs {
        start.push_attribute(Attribute::from((key, value)));
    }
    start
}
