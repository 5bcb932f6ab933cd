//! The main presentation part: locating it, reading its slide list and
//! appending slides to it.

use crate::package::{resolve_target, Package, Relationships, PACKAGE_RELS_PART};
use crate::xml::{attr, local_name, prefix_of, prefixed_attr, xml_err, NS_R};
use autodeck_core::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Content type of the main part of a `.pptx`.
pub const PRESENTATION_MAIN_CT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Main-part content types that can be turned into a plain presentation.
pub const CONVERTIBLE_MAIN_CTS: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml",
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml",
];

/// Smallest legal `p:sldId/@id`.
const MIN_SLIDE_ID: u32 = 256;

/// Largest legal `p:sldId/@id`.
const MAX_SLIDE_ID: u32 = 2_147_483_647;

/// Children of `p:presentation` that must come after `p:sldIdLst`.
const AFTER_SLIDE_ID_LIST: &[&[u8]] = &[
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// A `p:sldId` entry: numeric slide id and relationship id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    pub id: u32,
    pub rel_id: String,
}

/// Package path of the main presentation part, from `_rels/.rels`.
pub fn main_part_name(package: &Package) -> Result<String> {
    let rels = Relationships::parse(package.xml_part(PACKAGE_RELS_PART)?)?;
    let rel = rels
        .first_of("officeDocument")
        .ok_or_else(|| Error::Template("package has no main presentation part".to_string()))?;
    Ok(resolve_target("", &rel.target))
}

/// The `p:sldId` entries of a presentation, in presentation order.
pub fn slide_refs(presentation_xml: &str) -> Result<Vec<SlideRef>> {
    let mut refs = Vec::new();
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                let id = attr(e, b"id").and_then(|v| v.parse().ok()).unwrap_or(0);
                if let Some(rel_id) = prefixed_attr(e, b"id") {
                    refs.push(SlideRef { id, rel_id });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(refs)
}

/// Relationship id of the first slide master.
pub fn first_master_rel_id(presentation_xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if local_name(e.name().as_ref()) == b"sldMasterId" =>
            {
                return Ok(prefixed_attr(e, b"id"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Next free slide ids, above every id already in use.
///
/// Fails when the legal id range has no room left for `count` slides.
pub fn next_slide_ids(existing: &[SlideRef], count: usize) -> Result<Vec<u32>> {
    let start = existing
        .iter()
        .map(|r| u64::from(r.id) + 1)
        .max()
        .unwrap_or(u64::from(MIN_SLIDE_ID))
        .max(u64::from(MIN_SLIDE_ID));
    let last = start + count as u64;
    if last > u64::from(MAX_SLIDE_ID) + 1 {
        return Err(Error::Template(format!(
            "no free slide ids left for {} new slides (highest id in use is {})",
            count,
            start - 1
        )));
    }
    Ok((start..last).map(|id| id as u32).collect())
}

/// Return `presentation_xml` with `new_refs` appended to `p:sldIdLst`.
///
/// The list is created in its schema position when the presentation has
/// none. Everything else in the part is copied through unchanged.
pub fn append_slide_refs(presentation_xml: &str, new_refs: &[SlideRef]) -> Result<String> {
    let mut reader = Reader::from_str(presentation_xml);
    let mut writer = Writer::new(Vec::new());

    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut rel_prefix: Option<String> = None;
    let mut inserted = false;

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        match &event {
            Event::Start(e) | Event::Empty(e) if depth == 0 => {
                prefix = prefix_of(e.name().as_ref());
                rel_prefix = namespace_prefix(e, NS_R);
            }
            Event::Start(e) | Event::Empty(e)
                if depth == 1 && local_name(e.name().as_ref()) == b"sldIdLst" =>
            {
                if matches!(event, Event::Empty(_)) {
                    write_slide_id_list(&mut writer, &prefix, rel_prefix.as_deref(), new_refs)?;
                    inserted = true;
                    continue;
                }
                let list_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                writer.write_event(event.clone()).map_err(xml_err)?;
                // Copy the existing entries, then add ours before the end tag.
                loop {
                    let inner = reader.read_event().map_err(xml_err)?;
                    match inner {
                        Event::End(ref end) if end.name().as_ref() == list_name.as_bytes() => {
                            write_slide_ids(&mut writer, &prefix, rel_prefix.as_deref(), new_refs)?;
                            writer.write_event(inner.clone()).map_err(xml_err)?;
                            break;
                        }
                        Event::Eof => {
                            return Err(Error::XmlError("unterminated sldIdLst".to_string()))
                        }
                        other => writer.write_event(other).map_err(xml_err)?,
                    }
                }
                inserted = true;
                continue;
            }
            Event::Start(e) | Event::Empty(e)
                if depth == 1
                    && !inserted
                    && AFTER_SLIDE_ID_LIST.contains(&local_name(e.name().as_ref())) =>
            {
                write_slide_id_list(&mut writer, &prefix, rel_prefix.as_deref(), new_refs)?;
                inserted = true;
            }
            Event::End(_) if depth == 1 && !inserted => {
                write_slide_id_list(&mut writer, &prefix, rel_prefix.as_deref(), new_refs)?;
                inserted = true;
            }
            Event::Eof => break,
            _ => {}
        }

        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        writer.write_event(event).map_err(xml_err)?;
    }

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

/// Prefix (without colon) bound to `namespace` on this element, if any.
fn namespace_prefix(e: &BytesStart<'_>, namespace: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let key = a.key.as_ref();
        let prefix = key.strip_prefix(b"xmlns:")?;
        let value = a.unescape_value().ok()?;
        (value == namespace).then(|| String::from_utf8_lossy(prefix).into_owned())
    })
}

fn write_slide_id_list(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    rel_prefix: Option<&str>,
    refs: &[SlideRef],
) -> Result<()> {
    let name = format!("{}sldIdLst", prefix);
    writer
        .write_event(Event::Start(BytesStart::new(name.as_str())))
        .map_err(xml_err)?;
    write_slide_ids(writer, prefix, rel_prefix, refs)?;
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(xml_err)?;
    Ok(())
}

fn write_slide_ids(
    writer: &mut Writer<Vec<u8>>,
    prefix: &str,
    rel_prefix: Option<&str>,
    refs: &[SlideRef],
) -> Result<()> {
    let name = format!("{}sldId", prefix);
    let rel_key = format!("{}:id", rel_prefix.unwrap_or("r"));
    for slide in refs {
        let id = slide.id.to_string();
        let mut element = BytesStart::new(name.as_str());
        if rel_prefix.is_none() {
            element.push_attribute(("xmlns:r", NS_R));
        }
        element.push_attribute(("id", id.as_str()));
        element.push_attribute((rel_key.as_str(), slide.rel_id.as_str()));
        writer.write_event(Event::Empty(element)).map_err(xml_err)?;
    }
    Ok(())
}
