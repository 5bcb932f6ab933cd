//! In-memory template decks for the rendering tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_DECL: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.presentationml";

pub const PPTX_MAIN_CT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const POTX_MAIN_CT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

/// A layout placeholder: `(type, idx)`; an empty type means `obj`.
pub type Ph = (&'static str, u32);

pub const TITLE: Ph = ("title", 0);
pub const CENTER_TITLE: Ph = ("ctrTitle", 0);
pub const SUBTITLE: Ph = ("subTitle", 1);
pub const CONTENT: Ph = ("", 1);
pub const BODY: Ph = ("body", 1);
pub const PICTURE: Ph = ("pic", 1);
pub const DATE: Ph = ("dt", 10);
pub const SLIDE_NUMBER: Ph = ("sldNum", 12);

/// Builder for a minimal but well-formed template.
pub struct TemplateBuilder {
    layouts: Vec<(String, Vec<Ph>)>,
    main_content_type: &'static str,
    existing_slides: Vec<String>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            layouts: Vec::new(),
            main_content_type: PPTX_MAIN_CT,
            existing_slides: Vec::new(),
        }
    }

    /// The usual three layouts of a default theme.
    pub fn standard() -> Self {
        Self::new()
            .layout("Title Slide", &[CENTER_TITLE, SUBTITLE, DATE, SLIDE_NUMBER])
            .layout("Title and Content", &[TITLE, CONTENT, DATE, SLIDE_NUMBER])
            .layout("Blank", &[DATE])
    }

    pub fn layout(mut self, name: &str, placeholders: &[Ph]) -> Self {
        self.layouts.push((name.to_string(), placeholders.to_vec()));
        self
    }

    pub fn potx(mut self) -> Self {
        self.main_content_type = POTX_MAIN_CT;
        self
    }

    /// Add a slide that already exists in the template.
    pub fn existing_slide(mut self, title: &str) -> Self {
        self.existing_slides.push(title.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, content: String| {
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        add("[Content_Types].xml", self.content_types());
        add(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        );
        add("ppt/presentation.xml", self.presentation());
        add("ppt/_rels/presentation.xml.rels", self.presentation_rels());
        add("ppt/slideMasters/slideMaster1.xml", self.master());
        add("ppt/slideMasters/_rels/slideMaster1.xml.rels", self.master_rels());

        for (i, (name, placeholders)) in self.layouts.iter().enumerate() {
            let n = i + 1;
            add(
                &format!("ppt/slideLayouts/slideLayout{}.xml", n),
                layout_xml(name, placeholders),
            );
            add(
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            );
        }

        for (i, title) in self.existing_slides.iter().enumerate() {
            let n = i + 1;
            add(&format!("ppt/slides/slide{}.xml", n), existing_slide_xml(title));
            add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
            );
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{}"/>"#,
            self.main_content_type
        ));
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{}.slideMaster+xml"/>"#,
            CT_BASE
        ));
        for n in 1..=self.layouts.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="{}.slideLayout+xml"/>"#,
                n, CT_BASE
            ));
        }
        for n in 1..=self.existing_slides.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}.slide+xml"/>"#,
                n, CT_BASE
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn presentation(&self) -> String {
        let mut slide_ids = String::new();
        if !self.existing_slides.is_empty() {
            slide_ids.push_str("<p:sldIdLst>");
            for i in 0..self.existing_slides.len() {
                slide_ids.push_str(&format!(
                    r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                    256 + i,
                    i + 2
                ));
            }
            slide_ids.push_str("</p:sldIdLst>");
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            NS_DECL, slide_ids
        )
    }

    fn presentation_rels(&self) -> String {
        let mut entries = vec![(
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for i in 0..self.existing_slides.len() {
            entries.push((
                format!("rId{}", i + 2),
                "slide",
                format!("slides/slide{}.xml", i + 1),
            ));
        }
        let borrowed: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        rels(&borrowed)
    }

    fn master(&self) -> String {
        let ids: String = (0..self.layouts.len())
            .map(|i| {
                format!(
                    r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                    2147483649u64 + i as u64,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#,
            NS_DECL, ids
        )
    }

    /// Listed in reverse so that only `p:sldLayoutIdLst` gives the order.
    fn master_rels(&self) -> String {
        let entries: Vec<(String, String)> = (0..self.layouts.len())
            .rev()
            .map(|i| {
                (
                    format!("rId{}", i + 1),
                    format!("../slideLayouts/slideLayout{}.xml", i + 1),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(id, target)| (id.as_str(), "slideLayout", target.as_str()))
            .collect();
        rels(&borrowed)
    }
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        let rel_type = if *kind == "officeDocument" {
            format!("{}/officeDocument", REL_BASE)
        } else {
            format!("{}/{}", REL_BASE, kind)
        };
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn layout_xml(name: &str, placeholders: &[Ph]) -> String {
    let shapes: String = placeholders
        .iter()
        .enumerate()
        .map(|(i, (kind, idx))| {
            let mut ph = String::from("<p:ph");
            if !kind.is_empty() {
                ph.push_str(&format!(r#" type="{}""#, kind));
            }
            if *idx != 0 {
                ph.push_str(&format!(r#" idx="{}""#, idx));
            }
            ph.push_str("/>");
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Layout shape {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>Click to edit</a:t></a:r></a:p></p:txBody></p:sp>"#,
                i + 2,
                i + 1,
                ph
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {} preserve="1"><p:cSld name="{}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        NS_DECL, name, shapes
    )
}

fn existing_slide_xml(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
        NS_DECL, title
    )
}
