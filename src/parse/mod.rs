//! JSON recovery for model replies.
//!
//! Models asked for "only a JSON object" frequently wrap it in prose, leave a
//! trailing sentence, or stop one brace short. These helpers recover the
//! embedded value:
//! - [`parse_json_strict`]: the whole text must be one JSON value
//! - [`parse_json_garbage`]: the first JSON value starting at the first `{` or `[`
//! - [`last_tool_call_args_json`]: arguments of the most recent tool call on a message
//!
//! # Examples
//!
//! ```
//! use tool_calling_llm::parse::parse_json_garbage;
//! use serde_json::json;
//!
//! let value = parse_json_garbage(r#"noise noise {"a":1} trailing"#).unwrap();
//! assert_eq!(value, json!({"a": 1}));
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::types::message::Message;
use crate::{Error, Result};

/// Parse `text` as exactly one JSON value (surrounding whitespace allowed).
pub fn parse_json_strict(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::InvalidJson {
        content: text.to_string(),
        reason: e.to_string(),
    })
}

/// Recover a JSON value embedded in surrounding non-JSON text.
///
/// Anchors on the first `{` or `[` and parses the first complete value from
/// there, ignoring whatever follows it. Output that ends before the value is
/// closed gets one retry with a `}` appended.
pub fn parse_json_garbage(text: &str) -> Result<Value> {
    let start = text
        .find(|c: char| c == '{' || c == '[')
        .ok_or_else(|| Error::NoJsonFound {
            content: text.to_string(),
        })?;
    let candidate = &text[start..];

    match first_value(candidate) {
        Ok(value) => Ok(value),
        Err(e) if e.is_eof() => {
            let patched = format!("{}}}", candidate);
            first_value(&patched).map_err(|retry| invalid_json(text, &retry))
        }
        Err(e) => Err(invalid_json(text, &e)),
    }
}

/// JSON text of the arguments of the last tool call on an assistant message.
///
/// Some models return cumulative or corrected call lists, so only the final
/// entry is authoritative.
pub fn last_tool_call_args_json(message: &Message) -> Result<String> {
    match message {
        Message::Assistant(assistant) => {
            let call = assistant
                .tool_calls
                .last()
                .ok_or_else(|| Error::MissingToolCalls {
                    message: format!("{:?}", assistant),
                })?;
            Ok(serde_json::to_string(&call.args)?)
        }
        other => Err(Error::NotAnAssistantMessage {
            message: format!("{:?}", other),
        }),
    }
}

// Deserialize one value without requiring end of input.
fn first_value(text: &str) -> std::result::Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    Value::deserialize(&mut de)
}

fn invalid_json(text: &str, err: &serde_json::Error) -> Error {
    Error::InvalidJson {
        content: text.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::message::AssistantMessage;
    use crate::types::tool::ToolCall;
    use serde_json::json;

    #[test]
    fn test_strict_round_trip() {
        let value = json!({
            "tool": "weather",
            "tool_input": {"query": "SF", "days": 3, "units": null, "flags": [true, false]}
        });
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(parse_json_strict(&text).unwrap(), value);
    }

    #[test]
    fn test_strict_rejects_trailing_text() {
        let err = parse_json_strict(r#"{"a":1} trailing"#).unwrap_err();
        assert!(matches!(err, Error::InvalidJson { .. }));
    }

    #[test]
    fn test_garbage_with_leading_and_trailing_noise() {
        let value = parse_json_garbage(r#"noise noise {"a":1} trailing"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_garbage_inside_markdown_fence() {
        let text = "Here you go:\n```json\n{\"tool\": \"weather\", \"tool_input\": {\"query\": \"SF\"}}\n```";
        let value = parse_json_garbage(text).unwrap();
        assert_eq!(value["tool"], "weather");
    }

    #[test]
    fn test_garbage_anchors_on_array() {
        let value = parse_json_garbage("result: [1, 2, 3] done").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_garbage_without_braces() {
        let err = parse_json_garbage("no braces here").unwrap_err();
        match err {
            Error::NoJsonFound { content } => assert_eq!(content, "no braces here"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_invalid_after_anchor() {
        let err = parse_json_garbage("the set {a, b} is small").unwrap_err();
        assert!(matches!(err, Error::InvalidJson { .. }));
        assert_eq!(err.raw_content(), Some("the set {a, b} is small"));
    }

    #[test]
    fn test_garbage_repairs_missing_closing_brace() {
        let text = r#"{"tool": "weather", "tool_input": {"query": "SF"}"#;
        let value = parse_json_garbage(text).unwrap();
        assert_eq!(value["tool_input"]["query"], "SF");
    }

    #[test]
    fn test_last_tool_call_args_uses_last_entry() {
        let message = Message::Assistant(AssistantMessage {
            content: String::new(),
            tool_calls: vec![
                ToolCall {
                    id: "call_1".into(),
                    name: "extract".into(),
                    args: json!({"setup": "draft"}),
                },
                ToolCall {
                    id: "call_2".into(),
                    name: "extract".into(),
                    args: json!({"setup": "final"}),
                },
            ],
        });
        assert_eq!(
            last_tool_call_args_json(&message).unwrap(),
            r#"{"setup":"final"}"#
        );
    }

    #[test]
    fn test_last_tool_call_args_requires_tool_calls() {
        let err = last_tool_call_args_json(&Message::assistant("4")).unwrap_err();
        assert!(matches!(err, Error::MissingToolCalls { .. }));
    }

    #[test]
    fn test_last_tool_call_args_requires_assistant() {
        let err = last_tool_call_args_json(&Message::user("hi")).unwrap_err();
        assert!(matches!(err, Error::NotAnAssistantMessage { .. }));
    }
}
