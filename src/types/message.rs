//! Conversation messages exchanged with the wrapped model.

use serde::{Deserialize, Serialize};

use crate::types::tool::{ToolCall, ToolCallChunk};

/// A role-tagged conversation message.
///
/// System and user messages are opaque text and pass through unchanged; the
/// assistant variant is what a tool-calling turn produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant(AssistantMessage),
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Message::System {
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Message::User {
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant(AssistantMessage::text(text))
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Message::System { .. } => MessageRole::System,
            Message::User { .. } => MessageRole::User,
            Message::Assistant(_) => MessageRole::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System { content } | Message::User { content } => content,
            Message::Assistant(m) => &m.content,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Message::Assistant(m) => Some(m),
            _ => None,
        }
    }
}

impl From<AssistantMessage> for Message {
    fn from(message: AssistantMessage) -> Self {
        Message::Assistant(message)
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assistant output: text content, tool calls, or (from native models) both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantMessage {
    /// Conversational reply with no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Tool invocation: empty content plus exactly one call.
    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            content: String::new(),
            tool_calls: vec![call],
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One streamed fragment of an assistant message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessageChunk {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_call_chunks: Vec<ToolCallChunk>,
}

impl AssistantMessageChunk {
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            content: delta.into(),
            tool_call_chunks: Vec::new(),
        }
    }

    pub fn tool_call_delta(chunk: ToolCallChunk) -> Self {
        Self {
            content: String::new(),
            tool_call_chunks: vec![chunk],
        }
    }

    /// Convert an assembled chunk into a complete message.
    ///
    /// Accumulated argument text is parsed leniently; text that still is not
    /// JSON is kept as a raw string value.
    pub fn into_message(self) -> AssistantMessage {
        let tool_calls = self
            .tool_call_chunks
            .into_iter()
            .map(ToolCallChunk::into_tool_call)
            .collect();
        AssistantMessage {
            content: self.content,
            tool_calls,
        }
    }
}

/// A complete message as a single fragment.
impl From<AssistantMessage> for AssistantMessageChunk {
    fn from(message: AssistantMessage) -> Self {
        Self {
            content: message.content,
            tool_call_chunks: message
                .tool_calls
                .into_iter()
                .zip(0u32..)
                .map(|(call, index)| ToolCallChunk::from_tool_call(index, call))
                .collect(),
        }
    }
}
