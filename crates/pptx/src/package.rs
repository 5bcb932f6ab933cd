//! OPC package access: ZIP parts, relationships and content types.
//!
//! A `.pptx` is a ZIP archive of XML parts wired together by relationship
//! parts (`_rels/*.rels`) and typed by `[Content_Types].xml`. The whole
//! archive is held in memory; parts keep their original order so the
//! rewritten archive stays close to the template.

use crate::xml::{attr, local_name, xml_err, XmlOut};
use autodeck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the content-types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Relationships of the package itself.
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

/// Upper bound on the buffer reserved up front for one part.
const MAX_PREALLOCATION: usize = 1 << 20;

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// One file inside the archive.
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An in-memory OPC package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Read every part of a ZIP archive.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read every part from a seekable reader.
    pub fn from_reader<R: Read + std::io::Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(preallocation_for(file.size()));
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.push(Part { name, data });
        }

        Ok(Self { parts })
    }

    /// Whether a part with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// A part decoded as UTF-8 XML text.
    pub fn xml_part(&self, name: &str) -> Result<&str> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", name)))?;
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::XmlError(format!("'{}' is not UTF-8: {}", name, e)))?;
        Ok(text.trim_start_matches('\u{feff}'))
    }

    /// Replace a part, or append it when it does not exist yet.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Names of all parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Relationships of `source_part`, empty when it has none.
    pub fn relationships(&self, source_part: &str) -> Result<Relationships> {
        let path = rels_path_for(source_part);
        if !self.contains(&path) {
            return Ok(Relationships::default());
        }
        Relationships::parse(self.xml_part(&path)?)
    }

    /// Write the relationships of `source_part`.
    pub fn set_relationships(&mut self, source_part: &str, rels: &Relationships) -> Result<()> {
        let xml = rels.to_xml()?;
        self.set_part(&rels_path_for(source_part), xml.into_bytes());
        Ok(())
    }

    /// Parsed `[Content_Types].xml`.
    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(self.xml_part(CONTENT_TYPES_PART)?)
    }

    pub fn set_content_types(&mut self, types: &ContentTypes) -> Result<()> {
        let xml = types.to_xml()?;
        self.set_part(CONTENT_TYPES_PART, xml.into_bytes());
        Ok(())
    }

    /// Serialize the package back into a ZIP archive.
    ///
    /// `[Content_Types].xml` is always written first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            writer
                .start_file(part.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
            writer.write_all(&part.data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Buffer size to reserve for an entry; the declared size is not trusted
/// beyond [`MAX_PREALLOCATION`].
fn preallocation_for(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION as u64) as usize
}

/// Path of the relationships part for `part` (`a/b.xml` -> `a/_rels/b.xml.rels`).
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it.
///
/// Absolute targets (`/ppt/...`) are taken from the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute.split('/'));
    }
    let base = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize_path(base.split('/').chain(target.split('/')))
}

/// Relative target from `source_part` to `target_part`, both package paths.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();
    let (target_dir, target_file) = target.split_at(target.len() - 1);

    let common = source_dir
        .iter()
        .zip(target_dir)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; source_dir.len() - common];
    segments.extend(&target_dir[common..]);
    segments.extend(target_file);
    segments.join("/")
}

fn normalize_path<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// One entry of a relationships part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the type URI ends with `/{kind}` (e.g. `slideLayout`).
    pub fn is(&self, kind: &str) -> bool {
        self.rel_type
            .rsplit_once('/')
            .is_some_and(|(_, last)| last == kind)
    }
}

/// Contents of a relationships part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    items.push(Relationship {
                        id: attr(e, b"Id").unwrap_or_default(),
                        rel_type: attr(e, b"Type").unwrap_or_default(),
                        target: attr(e, b"Target").unwrap_or_default(),
                        external: attr(e, b"TargetMode").is_some_and(|m| m == "External"),
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { items })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// First relationship of the given kind (see [`Relationship::is`]).
    pub fn first_of(&self, kind: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.is(kind))
    }

    /// Append an internal relationship and return its new id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut out = XmlOut::document()?;
        out.start("Relationships", &[("xmlns", RELS_NS)])?;
        for rel in &self.items {
            let mut attrs = vec![
                ("Id", rel.id.as_str()),
                ("Type", rel.rel_type.as_str()),
                ("Target", rel.target.as_str()),
            ];
            if rel.external {
                attrs.push(("TargetMode", "External"));
            }
            out.empty("Relationship", &attrs)?;
        }
        out.end("Relationships")?;
        out.into_string()
    }
}

/// Contents of `[Content_Types].xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Empty(ref e) | Event::Start(ref e) => match local_name(e.name().as_ref()) {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) = (attr(e, b"Extension"), attr(e, b"ContentType"))
                        {
                            types.defaults.push((ext, ct));
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) = (attr(e, b"PartName"), attr(e, b"ContentType"))
                        {
                            types.overrides.push((part, ct));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(types)
    }

    /// Content type of a part (package path without a leading slash).
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part);
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&part_name))
        {
            return Some(ct);
        }
        let ext = part.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    /// Set the override for a part, replacing an existing one.
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part);
        match self
            .overrides
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&part_name))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((part_name, content_type.to_string())),
        }
    }

    /// Add a default for an extension unless one exists.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self
            .defaults
            .iter()
            .any(|(e, _)| e.eq_ignore_ascii_case(extension))
        {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut out = XmlOut::document()?;
        out.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
        for (ext, ct) in &self.defaults {
            out.empty("Default", &[("Extension", ext.as_str()), ("ContentType", ct.as_str())])?;
        }
        for (part, ct) in &self.overrides {
            out.empty(
                "Override",
                &[("PartName", part.as_str()), ("ContentType", ct.as_str())],
            )?;
        }
        out.end("Types")?;
        out.into_string()
    }
}
