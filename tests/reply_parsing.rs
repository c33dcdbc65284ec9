//! Reply parsing and interpretation through the public API.

use serde_json::json;
use tool_calling_llm::prompt::{PromptTemplate, DEFAULT_SYSTEM_TEMPLATE};
use tool_calling_llm::{
    compose_turn, interpret_response, last_tool_call_args_json, parse_json_garbage,
    parse_json_strict, AssistantMessage, Error, InterpretOptions, Message, ToolCall,
    ToolDeclaration,
};

fn weather() -> ToolDeclaration {
    ToolDeclaration::new(
        "weather",
        "Call to get the current weather for a location.",
        json!({"type": "object", "properties": {"query": {"type": "string"}}}),
    )
}

#[test]
fn test_strict_parse_round_trips_mappings() {
    let values = [
        json!({}),
        json!({"tool": "weather", "tool_input": {"query": "SF"}}),
        json!({"nested": {"list": [1, 2.5, "three", null, {"deep": true}]}, "unicode": "héllo ✓"}),
    ];
    for value in values {
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(parse_json_strict(&text).unwrap(), value);
    }
}

#[test]
fn test_garbage_recovery() {
    assert_eq!(
        parse_json_garbage(r#"noise noise {"a":1} trailing"#).unwrap(),
        json!({"a": 1})
    );
    assert!(matches!(
        parse_json_garbage("no braces here"),
        Err(Error::NoJsonFound { .. })
    ));
}

#[test]
fn test_llama_style_reply_with_preamble() {
    let turn = compose_turn(
        &[weather()],
        &PromptTemplate::new(DEFAULT_SYSTEM_TEMPLATE).unwrap(),
    )
    .unwrap();
    let raw = "Here is the JSON response:\n\n{\n  \"tool\": \"weather\",\n  \"tool_input\": {\n    \"query\": \"San Francisco\"\n  }\n}";

    let message = interpret_response(raw, &turn.tool_set, &InterpretOptions::new("llama3")).unwrap();
    assert_eq!(message.tool_calls.len(), 1);
    assert_eq!(message.tool_calls[0].args["query"], "San Francisco");
}

#[test]
fn test_unparseable_reply_without_braces() {
    let turn = compose_turn(&[weather()], &PromptTemplate::new(DEFAULT_SYSTEM_TEMPLATE).unwrap())
        .unwrap();
    let err = interpret_response("It is sunny.", &turn.tool_set, &InterpretOptions::new("llama3"))
        .unwrap_err();
    match err {
        Error::UnparseableModelReply { model, content } => {
            assert_eq!(model, "llama3");
            assert_eq!(content, "It is sunny.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_last_call_arguments_win() {
    let message = Message::from(AssistantMessage {
        content: String::new(),
        tool_calls: vec![
            ToolCall {
                id: "call_a".into(),
                name: "extract".into(),
                args: json!({"rating": 3}),
            },
            ToolCall {
                id: "call_b".into(),
                name: "extract".into(),
                args: json!({"rating": 9}),
            },
        ],
    });
    assert_eq!(last_tool_call_args_json(&message).unwrap(), r#"{"rating":9}"#);
}
