//! Prompt assets and reply-normalization helpers.
//!
//! Models are asked for bare JSON or bare source code, but routinely wrap
//! replies in markdown fences anyway; everything that consumes a reply goes
//! through the strippers here first.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::LlmError;

/// System prompt for dimension extraction.
pub const DIMENSIONS_PROMPT: &str = include_str!("../prompts/dimensions.md");

/// System prompt for design-brief synthesis.
pub const DESIGN_BRIEF_PROMPT: &str = include_str!("../prompts/design_brief.md");

/// System prompt template for CAD program generation. Placeholders:
/// `{docs_and_exs}`, `{dimensions}`, `{design_instructions}`.
pub const CAD_GENERATION_PROMPT: &str = include_str!("../prompts/cad_generation.md");

fn opening_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("static pattern"))
}

fn closing_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?[ \t]*```$").expect("static pattern"))
}

/// Remove one leading and one trailing markdown code fence, if present.
pub fn strip_markdown_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let without_open = opening_fence().replace(trimmed, "");
    let without_close = closing_fence().replace(&without_open, "");
    without_close.trim().to_string()
}

/// Decode a JSON payload from a model reply, tolerating markdown fences.
pub fn parse_json_payload<T: DeserializeOwned>(reply: &str) -> Result<T, LlmError> {
    let cleaned = strip_markdown_code_fences(reply);
    serde_json::from_str(&cleaned).map_err(|err| LlmError::Parse(err.to_string()))
}

/// Render steps as a numbered list for prompt inclusion.
pub fn numbered(steps: &[String]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_python_fence() {
        let reply = "```python\nmodel = cq.Workplane()\n```";
        assert_eq!(strip_markdown_code_fences(reply), "model = cq.Workplane()");
    }

    #[test]
    fn test_strip_json_fence() {
        let reply = "```json\n{\"object_type\": \"screw\"}\n```";
        assert_eq!(
            strip_markdown_code_fences(reply),
            "{\"object_type\": \"screw\"}"
        );
    }

    #[test]
    fn test_strip_bare_fence_and_whitespace() {
        let reply = "  ```\nx = 1\n```  ";
        assert_eq!(strip_markdown_code_fences(reply), "x = 1");
    }

    #[test]
    fn test_unfenced_text_is_untouched() {
        let reply = "model = cq.Workplane()\ncq.exporters.export(model, \"object.stl\")";
        assert_eq!(strip_markdown_code_fences(reply), reply);
    }

    #[test]
    fn test_inner_backticks_survive() {
        let reply = "```python\ns = \"```\"\nmodel = 1\n```";
        let stripped = strip_markdown_code_fences(reply);
        assert!(stripped.starts_with("s = "));
        assert!(stripped.ends_with("model = 1"));
    }

    #[test]
    fn test_parse_json_payload_with_fences() {
        #[derive(serde::Deserialize)]
        struct Dims {
            object_type: String,
        }
        let reply = "```json\n{\"object_type\": \"cube\", \"side\": 20}\n```";
        let dims: Dims = parse_json_payload(reply).expect("parse");
        assert_eq!(dims.object_type, "cube");
    }

    #[test]
    fn test_parse_json_payload_rejects_garbage() {
        let err = parse_json_payload::<serde_json::Value>("not json at all {")
            .expect_err("must fail");
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_numbered_list() {
        let steps = vec!["sketch a circle".to_string(), "extrude 20mm".to_string()];
        assert_eq!(numbered(&steps), "1. sketch a circle\n2. extrude 20mm");
    }

    #[test]
    fn test_generation_template_has_placeholders() {
        assert!(CAD_GENERATION_PROMPT.contains("{docs_and_exs}"));
        assert!(CAD_GENERATION_PROMPT.contains("{dimensions}"));
        assert!(CAD_GENERATION_PROMPT.contains("{design_instructions}"));
    }
}
