//! End-to-end turns through ToolCallingModel with a scripted in-memory model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;
use tool_calling_llm::prompt::CONVERSATIONAL_RESPONSE_TOOL;
use tool_calling_llm::{
    AssistantMessage, AssistantMessageChunk, BoxStream, CallOptions, ChatModel, Error, Message,
    MessageRole, MissingResponsePolicy, ToolCallingModel, ToolCallingModelBuilder, ToolDeclaration,
};

/// Replays canned replies; streams them in small fragments.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
    fragment_len: usize,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            fragment_len: 5,
        }
    }

    fn next_reply(&self, messages: &[Message]) -> String {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies.lock().unwrap().pop_front().unwrap_or_default()
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted-llama"
    }

    async fn generate(
        &self,
        messages: &[Message],
        _options: &CallOptions,
    ) -> tool_calling_llm::Result<AssistantMessage> {
        Ok(AssistantMessage::text(self.next_reply(messages)))
    }

    async fn stream(
        &self,
        messages: &[Message],
        _options: &CallOptions,
    ) -> tool_calling_llm::Result<BoxStream<'static, AssistantMessageChunk>> {
        let reply: Vec<char> = self.next_reply(messages).chars().collect();
        let fragments: Vec<tool_calling_llm::Result<AssistantMessageChunk>> = reply
            .chunks(self.fragment_len)
            .map(|piece| Ok(AssistantMessageChunk::text(piece.iter().collect::<String>())))
            .collect();
        Ok(Box::pin(tokio_stream::iter(fragments)))
    }
}

fn weather_tool() -> ToolDeclaration {
    ToolDeclaration::new(
        "weather",
        "Call to get the current weather for a location.",
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "The query to use in your search."}
            },
            "required": ["query"]
        }),
    )
}

fn user(text: &str) -> Vec<Message> {
    vec![Message::user(text)]
}

#[tokio::test]
async fn test_invoke_selects_bound_tool() {
    let model = Arc::new(ScriptedModel::new(&[
        r#"{"tool": "weather", "tool_input": {"query": "San Francisco"}}"#,
    ]));
    let llm = ToolCallingModel::new(Arc::clone(&model))
        .unwrap()
        .bind_tools([weather_tool()]);

    let reply = llm
        .invoke(&user("What is weather in San Francisco?"), &CallOptions::new())
        .await
        .unwrap();

    assert!(reply.content.is_empty());
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].name, "weather");
    assert_eq!(reply.tool_calls[0].args, json!({"query": "San Francisco"}));
    assert!(reply.tool_calls[0].id.starts_with("call_"));
}

#[tokio::test]
async fn test_invoke_prepends_tool_system_prompt() {
    let model = Arc::new(ScriptedModel::new(&[r#"{"response": "4"}"#]));
    let llm = ToolCallingModel::new(Arc::clone(&model))
        .unwrap()
        .bind_tools([weather_tool()]);

    llm.invoke(&user("What is 2 + 2?"), &CallOptions::new())
        .await
        .unwrap();

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role(), MessageRole::System);
    assert!(sent[0].content().contains("\"name\": \"weather\""));
    assert!(sent[0].content().contains(CONVERSATIONAL_RESPONSE_TOOL));
    assert_eq!(sent[1], Message::user("What is 2 + 2?"));
}

#[tokio::test]
async fn test_default_response_without_tools() {
    let raw = format!(
        r#"{{"tool": "{}", "tool_input": {{"response": "2 + 2 = 4"}}}}"#,
        CONVERSATIONAL_RESPONSE_TOOL
    );
    let model = ScriptedModel::new(&[raw.as_str()]);
    let llm = ToolCallingModel::new(model).unwrap();

    let reply = llm
        .invoke(&user("What is 2 + 2?"), &CallOptions::new())
        .await
        .unwrap();

    assert!(reply.tool_calls.is_empty());
    assert!(reply.content.contains('4'));
}

#[tokio::test]
async fn test_stream_drains_before_interpreting() {
    let model = ScriptedModel::new(&[
        r#"Sure. {"tool": "weather", "tool_input": {"query": "San Franscisco"}} Hope that helps!"#,
    ]);
    let llm = ToolCallingModel::new(model)
        .unwrap()
        .bind_tools([weather_tool()]);

    let replies: Vec<_> = llm
        .stream(&user("What is the weather in San Franscisco?"), &CallOptions::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(replies.len(), 1);
    let reply = replies.into_iter().next().unwrap().unwrap();
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].name, "weather");
}

#[tokio::test]
async fn test_stream_with_no_fragments_fails() {
    let model = ScriptedModel::new(&[""]);
    let llm = ToolCallingModel::new(model).unwrap();

    let mut replies = llm
        .stream(&user("hello"), &CallOptions::new())
        .await
        .unwrap();
    let err = replies.next().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::EmptyStream { ref model } if model == "scripted-llama"));
}

#[tokio::test]
async fn test_unparseable_reply_surfaces_model_and_content() {
    let model = ScriptedModel::new(&["The weather is lovely today."]);
    let llm = ToolCallingModel::new(model)
        .unwrap()
        .bind_tools([weather_tool()]);

    let err = llm
        .invoke(&user("weather?"), &CallOptions::new())
        .await
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("scripted-llama"));
    assert!(text.contains("The weather is lovely today."));
}

#[tokio::test]
async fn test_missing_response_policy_branches() {
    let raw = r#"{"tool": "search", "tool_input": {"query": "news"}}"#;

    let strict = ToolCallingModel::new(ScriptedModel::new(&[raw])).unwrap();
    let err = strict
        .invoke(&user("news?"), &CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnparseableModelReply { .. }));

    let lenient = ToolCallingModelBuilder::new()
        .ignore_env()
        .missing_response(MissingResponsePolicy::PassThrough)
        .build(ScriptedModel::new(&[raw]))
        .unwrap();
    let reply = lenient
        .invoke(&user("news?"), &CallOptions::new())
        .await
        .unwrap();
    assert_eq!(reply.content, raw);
    assert!(reply.tool_calls.is_empty());
}

#[tokio::test]
async fn test_rebinding_does_not_touch_existing_handle() {
    let base = ToolCallingModel::new(ScriptedModel::new(&[])).unwrap();
    let with_weather = base.bind_tools([weather_tool()]);

    assert!(base.bound_tools().is_empty());
    assert_eq!(with_weather.bound_tools().len(), 1);

    let first = with_weather.compose().unwrap();
    let second = with_weather.compose().unwrap();
    assert_eq!(first.tool_set.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_custom_template_and_id_prefix() {
    let llm = ToolCallingModelBuilder::new()
        .ignore_env()
        .system_template("Tools:\n{tools}\nReply with {{\"tool\": .., \"tool_input\": ..}}")
        .call_id_prefix("tc_")
        .tools([weather_tool()])
        .build(ScriptedModel::new(&[r#"{"tool":"weather","tool_input":{"query":"Oslo"}}"#]))
        .unwrap();

    let turn = llm.compose().unwrap();
    assert!(turn.system_message.content().starts_with("Tools:\n["));
    assert!(turn
        .system_message
        .content()
        .ends_with("Reply with {\"tool\": .., \"tool_input\": ..}"));

    let reply = llm.invoke(&user("Oslo?"), &CallOptions::new()).await.unwrap();
    assert!(reply.tool_calls[0].id.starts_with("tc_"));
}

#[test]
fn test_invalid_template_is_rejected_at_build() {
    let result = ToolCallingModelBuilder::new()
        .ignore_env()
        .system_template("no placeholder here")
        .build(ScriptedModel::new(&[]));
    assert!(matches!(result, Err(Error::Template { .. })));
}

#[test]
fn test_wrapper_is_itself_a_chat_model() {
    let llm = ToolCallingModel::new(ScriptedModel::new(&[
        r#"{"tool": "weather", "tool_input": {"query": "Lima"}}"#,
    ]))
    .unwrap()
    .bind_tools([weather_tool()]);
    assert_eq!(llm.model_name(), "scripted-llama");
    assert_eq!(llm.llm_type(), "Tool Calling LLM");

    let stacked: Arc<dyn ChatModel> = Arc::new(llm);
    let chunks: Vec<_> = tokio_test::block_on(async {
        stacked
            .stream(&user("Lima?"), &CallOptions::new())
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await
    });
    assert_eq!(chunks.len(), 1);
    let message = chunks.into_iter().next().unwrap().unwrap().into_message();
    assert_eq!(message.tool_calls[0].name, "weather");
    assert_eq!(
        tool_calling_llm::last_tool_call_args_json(&Message::from(message)).unwrap(),
        r#"{"query":"Lima"}"#
    );
}
