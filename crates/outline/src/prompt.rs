//! Instruction text sent to every backend.

/// System instruction for backends that accept one and return a JSON object.
pub const JSON_OBJECT_SYSTEM_PROMPT: &str =
    "You are an expert presentation creator that only outputs valid JSON.";

/// System instruction for backends that return free text.
pub const JSON_ARRAY_SYSTEM_PROMPT: &str = "You are an expert presentation creator. \
     Your only output must be the requested JSON array of slides.";

/// Build the user prompt embedding the optional guidance and the source text.
///
/// The wording is fixed; only `guidance` and `text` vary. The reply is
/// expected to be a JSON array of `{"title": ..., "content": [...]}` objects.
pub fn build_prompt(guidance: &str, text: &str) -> String {
    format!(
        r#"You are an expert presentation creator. Analyze the following text and optional guidance
and produce a structured plan for a PowerPoint presentation. Choose a reasonable number of
slides for the length and content of the text.

Your output MUST be a valid JSON array of objects. Each object describes one slide and must have
two keys: "title" and "content". "title" is a short, engaging string for the slide title.
"content" is an array of strings, each one a concise bullet point for the slide body.

User Guidance: "{guidance}"

Text to Analyze:
---
{text}
---
"#
    )
}
