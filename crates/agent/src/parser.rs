//! Action parser: recover one structured [`Action`] from free-form model text.
//!
//! The model is asked to write `Action:` followed by a single JSON object
//! `{"name": ..., "arguments": {...}}`. The parser is the lenient boundary
//! between generated text and the typed action the loop needs, so it never
//! fails hard: every problem becomes `None`.
//!
//! Brace matching is a plain depth count. Braces inside JSON string literals
//! are not special-cased, so an argument such as `"}"` can cut the object
//! short; the decode then fails and the turn yields no action.

use std::ops::Range;

use actloop_core::Action;
use tracing::debug;

/// Literal that introduces an action in model output.
pub const ACTION_MARKER: &str = "Action:";

/// Literal after which the model would start inventing tool output.
pub const OBSERVATION_MARKER: &str = "Observation:";

/// Find the outermost `{...}` object starting at or after byte offset `from`.
///
/// Returns the byte range of the object including both braces, or `None`
/// if there is no `{` or the braces never balance before the text ends.
pub fn find_object_span(text: &str, from: usize) -> Option<Range<usize>> {
    let start = from + text.get(from..)?.find('{')?;

    let mut depth = 0usize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte range of the object following the first action marker.
fn action_span(text: &str) -> Option<Range<usize>> {
    let marker = text.find(ACTION_MARKER)?;
    find_object_span(text, marker + ACTION_MARKER.len())
}

/// True once the text holds the marker and a complete, balanced object.
///
/// The loop uses this to stop reading the stream early.
pub fn action_ready(text: &str) -> bool {
    action_span(text).is_some()
}

/// Extract the action from a model turn, if it contains a usable one.
pub fn extract_action(text: &str) -> Option<Action> {
    let span = action_span(text)?;
    let raw = &text[span];

    match serde_json::from_str::<Action>(raw) {
        Ok(action) if action.name.trim().is_empty() => {
            debug!(raw = %raw, "Action has an empty name");
            None
        }
        Ok(action) => Some(action),
        Err(e) => {
            debug!(raw = %raw, error = %e, "Failed to decode action");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- find_object_span ---

    #[test]
    fn span_simple_object() {
        let text = r#"x {"a": 1} y"#;
        assert_eq!(find_object_span(text, 0), Some(2..10));
    }

    #[test]
    fn span_nested_object() {
        let text = r#"{"a": {"b": {"c": 1}}} tail"#;
        let span = find_object_span(text, 0).unwrap();
        assert_eq!(&text[span], r#"{"a": {"b": {"c": 1}}}"#);
    }

    #[test]
    fn span_truncated_is_none() {
        assert_eq!(find_object_span(r#"{"a": {"b": 1}"#, 0), None);
    }

    #[test]
    fn span_absent_is_none() {
        assert_eq!(find_object_span("no braces here", 0), None);
        assert_eq!(find_object_span("{}", 5), None);
    }

    #[test]
    fn span_respects_start_offset() {
        let text = r#"{"skip": 1} {"take": 2}"#;
        let span = find_object_span(text, 1).unwrap();
        assert_eq!(&text[span], r#"{"take": 2}"#);
    }

    #[test]
    fn span_with_multibyte_text() {
        let text = "思考 {\"a\": \"值\"} 完成";
        let span = find_object_span(text, 0).unwrap();
        assert_eq!(&text[span], "{\"a\": \"值\"}");
    }

    // --- extract_action ---

    #[test]
    fn extracts_name_and_arguments() {
        let text = r#"I should write the file.
Action:
{
  "name": "write_file",
  "arguments": {"file_path": "foo.txt", "content": "bar"}
}"#;
        let action = extract_action(text).unwrap();
        assert_eq!(action.name, "write_file");
        assert_eq!(
            serde_json::Value::Object(action.arguments),
            json!({"file_path": "foo.txt", "content": "bar"})
        );
    }

    #[test]
    fn extracts_nested_arguments() {
        let text = r#"Action: {"name": "create_echarts_visualization", "arguments": {"data": {"A": {"x": 1}}, "chart_type": "bar"}}"#;
        let action = extract_action(text).unwrap();
        assert_eq!(action.argument("data"), Some(&json!({"A": {"x": 1}})));
    }

    #[test]
    fn round_trips_encoded_action() {
        let encoded = json!({
            "name": "execute_code",
            "arguments": {"code": "print(1)", "n": 3, "flag": true, "list": [1, 2]}
        });
        let text = format!("Thought: run it\nAction:\n{encoded}\n");
        let action = extract_action(&text).unwrap();
        assert_eq!(serde_json::to_value(&action).unwrap(), encoded);
    }

    #[test]
    fn unbalanced_is_none() {
        let text = r#"Action: {"name": "write_file", "arguments": {"file_path": "a.txt", "content": "b"}"#;
        assert!(extract_action(text).is_none());
        assert!(!action_ready(text));
    }

    #[test]
    fn no_marker_is_none_even_with_valid_json() {
        let text = r#"{"name": "write_file", "arguments": {"file_path": "a.txt"}}"#;
        assert!(extract_action(text).is_none());
    }

    #[test]
    fn marker_without_object_is_none() {
        assert!(extract_action("Action: I will think more").is_none());
    }

    #[test]
    fn object_before_marker_is_ignored() {
        let text = r#"{"name": "early"} Action: {"name": "late", "arguments": {}}"#;
        assert_eq!(extract_action(text).unwrap().name, "late");
    }

    #[test]
    fn first_marker_wins() {
        let text = r#"Action: {"name": "first"} Action: {"name": "second"}"#;
        assert_eq!(extract_action(text).unwrap().name, "first");
    }

    #[test]
    fn missing_arguments_default_to_empty() {
        let action = extract_action(r#"Action: {"name": "list_files"}"#).unwrap();
        assert!(action.arguments.is_empty());
    }

    #[test]
    fn malformed_json_is_none() {
        assert!(extract_action(r#"Action: {name: write_file}"#).is_none());
    }

    #[test]
    fn empty_name_is_none() {
        assert!(extract_action(r#"Action: {"name": "  ", "arguments": {}}"#).is_none());
    }

    #[test]
    fn brace_in_string_literal_is_a_known_limitation() {
        let text = r#"Action: {"name": "write_file", "arguments": {"content": "}"}}"#;
        assert!(extract_action(text).is_none());
    }

    #[test]
    fn trailing_text_after_object_is_ignored() {
        let text = "Action: {\"name\": \"read_file\", \"arguments\": {\"file_path\": \"a\"}}\nObservation: made up";
        assert_eq!(extract_action(text).unwrap().name, "read_file");
    }

    #[test]
    fn action_ready_tracks_completion() {
        assert!(!action_ready("Thinking..."));
        assert!(!action_ready("Action:"));
        assert!(!action_ready("Action: {\"name\": \"x\""));
        assert!(action_ready("Action: {\"name\": \"x\"}"));
    }
}
