//! Tolerant JSON extraction from free-form model text.
//!
//! Models asked for "JSON only" still wrap output in code fences or prose
//! often enough that strict parsing would waste retry budget. The fallback
//! order is fixed: fenced code block, then the first brace-matched top-level
//! object span, then hard failure. This is deliberately not a markdown
//! parser.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use dealscope_shared::{DealscopeError, Result};

/// Extract and parse the JSON object embedded in `text`.
pub fn extract_json(text: &str) -> Result<Value> {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid regex"));

    // Preferred: a fenced block. If its payload doesn't parse, fall through —
    // the brace matcher below will find the object inside the fence anyway.
    if let Some(caps) = FENCE_RE.captures(text) {
        if let Ok(value) = serde_json::from_str::<Value>(caps[1].trim()) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    let span = brace_matched_span(text)
        .ok_or_else(|| DealscopeError::parse("no JSON object found in model response"))?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| DealscopeError::parse(format!("invalid JSON in model response: {e}")))?;

    if !value.is_object() {
        return Err(DealscopeError::parse(
            "model response JSON is not an object",
        ));
    }

    Ok(value)
}

/// The first top-level `{...}` span in `text`, found by depth counting.
/// String literals (including escaped quotes) are skipped so braces inside
/// values don't unbalance the scan.
fn brace_matched_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object() {
        let value = extract_json(r#"{"score": 72, "grade": "B"}"#).unwrap();
        assert_eq!(value["score"], 72);
    }

    #[test]
    fn prefers_fenced_block() {
        let text = "Here is the analysis:\n```json\n{\"grade\": \"A\"}\n```\nDone.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["grade"], "A");
    }

    #[test]
    fn fence_without_language_tag() {
        let text = "```\n{\"grade\": \"C\"}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["grade"], "C");
    }

    #[test]
    fn falls_back_to_brace_span_in_prose() {
        let text = "Sure! The result is {\"summary\": \"ok\"} — let me know.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"summary": "uses {curly} notation", "nested": {"a": 1}}"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["nested"]["a"], 1);
        assert_eq!(value["summary"], "uses {curly} notation");
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"quote": "she said \"hi\" {not a brace}"}"#;
        let value = extract_json(text).unwrap();
        assert!(value["quote"].as_str().unwrap().contains("hi"));
    }

    #[test]
    fn no_json_is_a_parse_error() {
        let err = extract_json("I could not produce an analysis.").unwrap_err();
        assert!(matches!(err, DealscopeError::Parse { .. }));
    }

    #[test]
    fn unbalanced_braces_are_a_parse_error() {
        let err = extract_json(r#"{"summary": "truncated"#).unwrap_err();
        assert!(matches!(err, DealscopeError::Parse { .. }));
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = extract_json(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, DealscopeError::Parse { .. }));
    }

    #[test]
    fn broken_fence_payload_falls_back_to_brace_span() {
        // The fence holds trailing junk after the object; the brace matcher
        // still isolates the object itself.
        let text = "```json\n{\"grade\": \"B\"} trailing junk\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["grade"], "B");
    }
}
