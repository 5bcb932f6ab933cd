//! Deck renderer: turns an [`OutlinePlan`] into a `.pptx` built on a
//! template's layouts.

use crate::layout::{load_layouts, resolve_layouts, SlideLayout};
use crate::package::{relative_target, Package, Relationships};
use crate::presentation::{
    append_slide_refs, main_part_name, next_slide_ids, slide_refs, SlideRef,
    CONVERTIBLE_MAIN_CTS, PRESENTATION_MAIN_CT,
};
use crate::slide::SlideDraft;
use autodeck_core::{Error, OutlinePlan, RenderedDeck, Result, SlideSpec};

/// Title used when the plan's first slide has none.
pub const DEFAULT_TITLE: &str = "Presentation Title";

/// Subtitle used when the plan's first slide has no bullet.
pub const DEFAULT_SUBTITLE: &str = "Generated with AI";

const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const SLIDE_LAYOUT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const SLIDE_CT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const RELS_CT: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Renders slide plans onto a template.
///
/// Each call works on a fresh copy of the template, so one renderer can be
/// reused for any number of decks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeckRenderer;

impl DeckRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render `plan` onto the template in `template` (`.pptx` or `.potx`).
    ///
    /// The first slide uses the "Title Slide" layout, every other slide the
    /// "Title and Content" layout. Slides already in the template are kept
    /// ahead of the generated ones.
    pub fn render(&self, plan: &OutlinePlan, template: &[u8]) -> Result<RenderedDeck> {
        let package = Package::open(template).map_err(template_err)?;
        let main_part = main_part_name(&package).map_err(template_err)?;
        let layouts = load_layouts(&package, &main_part).map_err(template_err)?;

        let names: Vec<&str> = layouts.iter().map(|l| l.name.as_str()).collect();
        let choice = resolve_layouts(&names)?;
        let title_layout = &layouts[choice.title];
        let content_layout = &layouts[choice.content];
        log::debug!(
            "Using layouts '{}' and '{}'",
            title_layout.name,
            content_layout.name
        );

        let mut drafts = Vec::with_capacity(plan.len());
        drafts.push(title_slide(title_layout, plan.title_slide()));
        for (i, spec) in plan.content_slides().iter().enumerate() {
            drafts.push(content_slide(content_layout, spec, i + 2));
        }

        write_deck(package, &main_part, &drafts).map_err(render_err)
    }
}

/// Render with a default [`DeckRenderer`].
pub fn render(plan: &OutlinePlan, template: &[u8]) -> Result<RenderedDeck> {
    DeckRenderer::new().render(plan, template)
}

fn title_slide(layout: &SlideLayout, spec: &SlideSpec) -> SlideDraft {
    let mut draft = SlideDraft::from_layout(layout);

    let title = if spec.title.trim().is_empty() {
        DEFAULT_TITLE
    } else {
        spec.title.as_str()
    };
    match draft.title_mut() {
        Some(frame) => frame.set_text(title),
        None => log::debug!("Layout '{}' has no title placeholder", layout.name),
    }

    let subtitle = spec.first_bullet().unwrap_or(DEFAULT_SUBTITLE);
    match draft.second_placeholder_mut() {
        Some(shape) => match shape.text_frame.as_mut() {
            Some(frame) => frame.set_text(subtitle),
            None => log::debug!("Placeholder '{}' takes no text", shape.name),
        },
        None => log::debug!("Layout '{}' has no subtitle placeholder", layout.name),
    }

    draft
}

fn content_slide(layout: &SlideLayout, spec: &SlideSpec, number: usize) -> SlideDraft {
    let mut draft = SlideDraft::from_layout(layout);

    if let Some(frame) = draft.title_mut() {
        frame.set_text(&spec.title);
    }

    match draft.body_mut() {
        Some(body) => {
            body.clear();
            for bullet in &spec.bullets {
                body.add_paragraph(bullet, Some(0));
            }
        }
        None => log::debug!(
            "Slide {} ('{}') has no body placeholder, rendering title only",
            number,
            spec.title
        ),
    }

    draft
}

/// Add the drafts to the package and serialize it.
fn write_deck(mut package: Package, main_part: &str, drafts: &[SlideDraft]) -> Result<RenderedDeck> {
    let presentation_xml = package.xml_part(main_part)?.to_string();
    let existing = slide_refs(&presentation_xml)?;
    let ids = next_slide_ids(&existing, drafts.len())?;

    let mut presentation_rels = package.relationships(main_part)?;
    let mut types = package.content_types()?;
    let slides_dir = match main_part.rsplit_once('/') {
        Some((dir, _)) => format!("{}/slides/", dir),
        None => "slides/".to_string(),
    };
    let mut number = next_slide_number(&package, &slides_dir);

    let mut new_refs = Vec::with_capacity(drafts.len());
    for (draft, id) in drafts.iter().zip(ids) {
        let part_name = format!("{}slide{}.xml", slides_dir, number);
        number += 1;

        package.set_part(&part_name, draft.to_xml()?.into_bytes());

        let mut slide_rels = Relationships::default();
        slide_rels.add(
            SLIDE_LAYOUT_REL,
            &relative_target(&part_name, draft.layout_part()),
        );
        package.set_relationships(&part_name, &slide_rels)?;

        let rel_id = presentation_rels.add(SLIDE_REL, &relative_target(main_part, &part_name));
        types.set_override(&part_name, SLIDE_CT);
        new_refs.push(SlideRef { id, rel_id });
    }

    types.ensure_default("rels", RELS_CT);
    if types
        .content_type_of(main_part)
        .is_some_and(|ct| CONVERTIBLE_MAIN_CTS.contains(&ct))
    {
        log::debug!("Converting template main part to a presentation");
        types.set_override(main_part, PRESENTATION_MAIN_CT);
    }

    package.set_relationships(main_part, &presentation_rels)?;
    package.set_part(
        main_part,
        append_slide_refs(&presentation_xml, &new_refs)?.into_bytes(),
    );
    package.set_content_types(&types)?;

    let slide_count = existing.len() + new_refs.len();
    log::info!(
        "Rendered {} slides ({} from template)",
        slide_count,
        existing.len()
    );

    Ok(RenderedDeck {
        bytes: package.to_bytes()?,
        slide_count,
    })
}

/// First `N` such that no `slideN.xml` or higher exists in `slides_dir`.
fn next_slide_number(package: &Package, slides_dir: &str) -> u32 {
    package
        .part_names()
        .filter_map(|name| name.strip_prefix(slides_dir))
        .filter_map(|file| file.strip_prefix("slide")?.strip_suffix(".xml"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

fn template_err(e: Error) -> Error {
    match e {
        Error::Template(_) => e,
        other => Error::Template(other.to_string()),
    }
}

fn render_err(e: Error) -> Error {
    match e {
        Error::Template(_) | Error::Render(_) => e,
        other => Error::Render(other.to_string()),
    }
}
