mod common;

use autodeck_core::{OutlinePlan, SlideSpec};
use autodeck_pptx::{render, DeckReader, Package, SlideContent, DEFAULT_SUBTITLE};
use common::*;

fn plan(slides: Vec<SlideSpec>) -> OutlinePlan {
    OutlinePlan::new(slides).unwrap()
}

fn sample_plan() -> OutlinePlan {
    plan(vec![
        SlideSpec::new("Quarterly Review", ["Q3 2024"]),
        SlideSpec::new("Highlights", ["Revenue up 12%", "Two new markets"]),
        SlideSpec::new("Next Steps", ["Hire", "Ship", "Measure"]),
    ])
}

fn read(bytes: &[u8]) -> Vec<SlideContent> {
    DeckReader::new().read(bytes).unwrap()
}

/// Layout part each slide of the deck points at.
fn layout_targets(bytes: &[u8], slides: &[SlideContent]) -> Vec<String> {
    let package = Package::open(bytes).unwrap();
    slides
        .iter()
        .map(|slide| {
            let rels = package.relationships(&slide.part_name).unwrap();
            rels.first_of("slideLayout").unwrap().target.clone()
        })
        .collect()
}

#[test]
fn test_renders_one_slide_per_plan_entry() {
    let deck = render(&sample_plan(), &TemplateBuilder::standard().build()).unwrap();
    assert_eq!(deck.slide_count, 3);

    let slides = read(&deck.bytes);
    assert_eq!(slides.len(), 3);
    let titles: Vec<String> = slides.iter().map(|s| s.title().unwrap()).collect();
    assert_eq!(titles, vec!["Quarterly Review", "Highlights", "Next Steps"]);
    assert_eq!(slides[1].bullets(), ["Revenue up 12%", "Two new markets"]);
    assert_eq!(slides[2].bullets(), ["Hire", "Ship", "Measure"]);
}

#[test]
fn test_title_slide_subtitle() {
    let deck = render(&sample_plan(), &TemplateBuilder::standard().build()).unwrap();
    let slides = read(&deck.bytes);
    assert_eq!(slides[0].subtitle().as_deref(), Some("Q3 2024"));

    let bare = plan(vec![SlideSpec::new("Only a title", Vec::<String>::new())]);
    let deck = render(&bare, &TemplateBuilder::standard().build()).unwrap();
    let slides = read(&deck.bytes);
    assert_eq!(deck.slide_count, 1);
    assert_eq!(slides[0].subtitle().as_deref(), Some(DEFAULT_SUBTITLE));
}

#[test]
fn test_empty_title_gets_placeholder_text() {
    let untitled = plan(vec![SlideSpec::new("", ["Intro"])]);
    let deck = render(&untitled, &TemplateBuilder::standard().build()).unwrap();
    assert_eq!(
        read(&deck.bytes)[0].title().as_deref(),
        Some("Presentation Title")
    );
}

#[test]
fn test_empty_bullets_leave_body_empty() {
    let deck = render(
        &plan(vec![
            SlideSpec::new("Deck", ["x"]),
            SlideSpec::new("Nothing here", Vec::<String>::new()),
        ]),
        &TemplateBuilder::standard().build(),
    )
    .unwrap();
    let slides = read(&deck.bytes);
    assert_eq!(slides[1].title().as_deref(), Some("Nothing here"));
    assert!(slides[1].bullets().is_empty());
}

#[test]
fn test_lone_empty_bullet_survives() {
    let deck = render(
        &plan(vec![
            SlideSpec::new("Deck", ["x"]),
            SlideSpec::new("Blank bullet", [""]),
        ]),
        &TemplateBuilder::standard().build(),
    )
    .unwrap();
    let slides = read(&deck.bytes);
    assert_eq!(slides[1].bullets(), [""]);
}

#[test]
fn test_layouts_resolved_by_name() {
    let template = TemplateBuilder::new()
        .layout("Blank", &[DATE])
        .layout("title and content", &[TITLE, CONTENT])
        .layout("TITLE SLIDE", &[CENTER_TITLE, SUBTITLE])
        .build();
    let deck = render(&sample_plan(), &template).unwrap();
    let slides = read(&deck.bytes);

    assert_eq!(
        layout_targets(&deck.bytes, &slides),
        vec![
            "../slideLayouts/slideLayout3.xml",
            "../slideLayouts/slideLayout2.xml",
            "../slideLayouts/slideLayout2.xml",
        ]
    );
    assert_eq!(slides[2].bullets(), ["Hire", "Ship", "Measure"]);
}

#[test]
fn test_layouts_fall_back_to_index() {
    let template = TemplateBuilder::new()
        .layout("Cover", &[CENTER_TITLE, SUBTITLE])
        .layout("Body", &[TITLE, BODY])
        .layout("Title Only", &[TITLE])
        .build();
    let deck = render(&sample_plan(), &template).unwrap();
    let slides = read(&deck.bytes);

    assert_eq!(
        layout_targets(&deck.bytes, &slides),
        vec![
            "../slideLayouts/slideLayout1.xml",
            "../slideLayouts/slideLayout2.xml",
            "../slideLayouts/slideLayout2.xml",
        ]
    );
    // A `body` placeholder is cloned as "Text Placeholder N".
    assert_eq!(slides[1].bullets(), ["Revenue up 12%", "Two new markets"]);
}

#[test]
fn test_single_layout_template_fails() {
    let template = TemplateBuilder::new()
        .layout("Title Slide", &[CENTER_TITLE, SUBTITLE])
        .build();
    let err = render(&sample_plan(), &template).unwrap_err();
    assert!(err.is_template());
}

#[test]
fn test_content_layout_without_body_is_title_only() {
    let template = TemplateBuilder::new()
        .layout("Title Slide", &[CENTER_TITLE, SUBTITLE])
        .layout("Title Only", &[TITLE, PICTURE])
        .build();
    let deck = render(&sample_plan(), &template).unwrap();
    let slides = read(&deck.bytes);

    assert_eq!(deck.slide_count, 3);
    assert_eq!(slides[1].title().as_deref(), Some("Highlights"));
    assert!(slides[1].bullets().is_empty());
}

#[test]
fn test_footer_placeholders_not_cloned() {
    let deck = render(&sample_plan(), &TemplateBuilder::standard().build()).unwrap();
    let package = Package::open(&deck.bytes).unwrap();
    let xml = package.xml_part("ppt/slides/slide2.xml").unwrap();
    assert!(!xml.contains(r#"type="dt""#));
    assert!(!xml.contains(r#"type="sldNum""#));
    assert_eq!(xml.matches(r#"<a:pPr lvl="0"/>"#).count(), 2);
}

#[test]
fn test_potx_becomes_pptx() {
    let template = TemplateBuilder::standard().potx().build();
    let deck = render(&sample_plan(), &template).unwrap();

    let package = Package::open(&deck.bytes).unwrap();
    let types = package.content_types().unwrap();
    assert_eq!(types.content_type_of("ppt/presentation.xml"), Some(PPTX_MAIN_CT));
    assert_eq!(
        types.content_type_of("ppt/slides/slide1.xml"),
        Some("application/vnd.openxmlformats-officedocument.presentationml.slide+xml")
    );
}

#[test]
fn test_existing_slides_kept_first() {
    let template = TemplateBuilder::standard()
        .existing_slide("Welcome")
        .existing_slide("Agenda")
        .build();
    let deck = render(&sample_plan(), &template).unwrap();
    assert_eq!(deck.slide_count, 5);

    let slides = read(&deck.bytes);
    let titles: Vec<String> = slides.iter().map(|s| s.title().unwrap()).collect();
    assert_eq!(
        titles,
        vec!["Welcome", "Agenda", "Quarterly Review", "Highlights", "Next Steps"]
    );
    assert_eq!(slides[2].part_name, "ppt/slides/slide3.xml");
}

#[test]
fn test_text_is_escaped() {
    let tricky = plan(vec![
        SlideSpec::new("R&D <2025>", ["\"quoted\" & 'single'"]),
        SlideSpec::new("Tabs\tand\u{0}nulls", ["a < b", "c > d"]),
    ]);
    let deck = render(&tricky, &TemplateBuilder::standard().build()).unwrap();
    let slides = read(&deck.bytes);

    assert_eq!(slides[0].title().as_deref(), Some("R&D <2025>"));
    assert_eq!(slides[0].subtitle().as_deref(), Some("\"quoted\" & 'single'"));
    assert_eq!(slides[1].title().as_deref(), Some("Tabs\tandnulls"));
    assert_eq!(slides[1].bullets(), ["a < b", "c > d"]);
}

#[test]
fn test_template_is_not_modified() {
    let template = TemplateBuilder::standard().build();
    let copy = template.clone();
    let first = render(&sample_plan(), &template).unwrap();
    let second = render(&sample_plan(), &template).unwrap();
    assert_eq!(template, copy);
    assert_eq!(first.slide_count, second.slide_count);
}

#[test]
fn test_invalid_template_is_template_error() {
    let err = render(&sample_plan(), b"PK but not really").unwrap_err();
    assert!(err.is_template());
}
