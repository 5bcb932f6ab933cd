//! Turning a raw backend reply into an [`OutlinePlan`].
//!
//! Backends are asked for a bare JSON array, but some wrap it in an object
//! with a single key (`{"slides": [...]}`). Exactly one level of such a
//! wrapper is removed; anything else must already be the array.

use autodeck_core::{Error, OutlinePlan, Provider, Result, SlideSpec};
use serde::Deserialize;
use serde_json::Value;

/// One array element as sent by the backend.
#[derive(Debug, Deserialize)]
struct RawSlide {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<Vec<String>>,
}

impl From<RawSlide> for SlideSpec {
    fn from(raw: RawSlide) -> Self {
        SlideSpec {
            title: raw.title.unwrap_or_default(),
            bullets: raw.content.unwrap_or_default(),
        }
    }
}

/// Unwrap a single-key object to its value; return anything else unchanged.
pub fn unwrap_single_key(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((key, inner)) => {
                log::debug!("Unwrapping slide plan from key '{}'", key);
                inner
            }
            None => Value::Null,
        },
        other => other,
    }
}

/// Parse a backend reply into a slide plan.
///
/// Errors name `provider` so the caller can show them directly.
pub fn parse_plan(provider: Provider, raw: &str) -> Result<OutlinePlan> {
    let name = provider.display_name();

    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| Error::malformed(name, e.to_string()))?;

    let slides = match unwrap_single_key(value) {
        Value::Array(items) => items,
        other => {
            return Err(Error::malformed(
                name,
                format!("expected a JSON array of slides, got {}", json_kind(&other)),
            ))
        }
    };

    let slides = slides
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<RawSlide>(item)
                .map(SlideSpec::from)
                .map_err(|e| Error::malformed(name, format!("slide {}: {}", idx + 1, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    OutlinePlan::new(slides).map_err(|_| Error::malformed(name, "the reply contains no slides"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARRAY: &str = r#"[
        {"title": "Quarterly Review", "content": ["Q3 results"]},
        {"title": "Revenue", "content": ["Up 12%", "Driven by renewals"]},
        {"title": "Next Steps"}
    ]"#;

    #[test]
    fn test_parse_top_level_array() {
        let plan = parse_plan(Provider::OpenAi, ARRAY).unwrap();
        assert_eq!(plan.titles(), vec!["Quarterly Review", "Revenue", "Next Steps"]);
        assert_eq!(plan.slides()[1].bullets, vec!["Up 12%", "Driven by renewals"]);
        assert!(plan.slides()[2].bullets.is_empty());
    }

    #[test]
    fn test_wrapped_array_matches_top_level() {
        let wrapped = format!(r#"{{"slides": {}}}"#, ARRAY);
        let direct = parse_plan(Provider::OpenAi, ARRAY).unwrap();
        let unwrapped = parse_plan(Provider::OpenAi, &wrapped).unwrap();
        assert_eq!(direct, unwrapped);
    }

    #[test]
    fn test_reparsing_a_plan_is_stable() {
        let plan = parse_plan(Provider::Gemini, ARRAY).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(parse_plan(Provider::Gemini, &json).unwrap(), plan);
    }

    #[test]
    fn test_any_single_key_is_unwrapped() {
        let raw = r#"{"presentation": [{"title": "Only", "content": []}]}"#;
        let plan = parse_plan(Provider::Anthropic, raw).unwrap();
        assert_eq!(plan.titles(), vec!["Only"]);
    }

    #[test]
    fn test_only_one_level_is_unwrapped() {
        let raw = r#"{"a": {"slides": [{"title": "x"}]}}"#;
        let err = parse_plan(Provider::Gemini, raw).unwrap_err();
        assert!(matches!(err, Error::MalformedPlan { .. }));
        assert!(err.to_string().contains("got an object"));
    }

    #[test]
    fn test_multi_key_object_rejected() {
        let raw = r#"{"title": "x", "content": ["y"]}"#;
        assert!(matches!(
            parse_plan(Provider::OpenAi, raw),
            Err(Error::MalformedPlan { .. })
        ));
    }

    #[test]
    fn test_plain_text_names_provider() {
        let err = parse_plan(Provider::Anthropic, "Here is your deck: slide one...").unwrap_err();
        assert!(matches!(err, Error::MalformedPlan { .. }));
        assert!(err.to_string().contains("Anthropic"));
    }

    #[test]
    fn test_null_content_and_missing_title() {
        let plan = parse_plan(Provider::OpenAi, r#"[{"content": null}]"#).unwrap();
        assert_eq!(plan.title_slide().title, "");
        assert!(plan.title_slide().bullets.is_empty());
    }

    #[test]
    fn test_empty_array_rejected() {
        let err = parse_plan(Provider::OpenAi, r#"{"slides": []}"#).unwrap_err();
        assert!(err.to_string().contains("no slides"));
    }

    #[test]
    fn test_bad_element_reports_position() {
        let err = parse_plan(Provider::OpenAi, r#"[{"title": "ok"}, 42]"#).unwrap_err();
        assert!(err.to_string().contains("slide 2"));
    }

    #[test]
    fn test_unwrap_single_key_leaves_arrays() {
        let value = serde_json::json!([{"slides": []}]);
        assert_eq!(unwrap_single_key(value.clone()), value);
    }
}
