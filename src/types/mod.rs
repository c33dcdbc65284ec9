//! Core data types: conversation messages, tool schemas and tool calls.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Role-tagged conversation message (system, user, assistant) |
//! | [`AssistantMessage`] | Assistant output carrying text or tool calls |
//! | [`AssistantMessageChunk`] | One streamed fragment of an assistant message |
//! | [`ToolDeclaration`] | Tool as bound by the caller |
//! | [`ToolDefinition`] | Canonical function-tool schema |
//! | [`ToolCall`] | Tool invocation selected by the model |
//!
//! ## Example
//!
//! ```rust
//! use tool_calling_llm::types::{Message, ToolDeclaration};
//!
//! let user = Message::user("What's the weather in San Francisco?");
//!
//! let tool = ToolDeclaration::new(
//!     "weather",
//!     "Call to get the current weather for a location.",
//!     serde_json::json!({
//!         "type": "object",
//!         "properties": {
//!             "query": {"type": "string"}
//!         }
//!     }),
//! );
//! assert_eq!(tool.to_definition().name(), "weather");
//! ```

pub mod message;
pub mod tool;

pub use message::{AssistantMessage, AssistantMessageChunk, Message, MessageRole};
pub use tool::{FunctionDefinition, ToolCall, ToolCallChunk, ToolDeclaration, ToolDefinition};
