//! # tool-calling-llm
//!
//! Prompt-based tool calling for chat models that only return text.
//!
//! ## Overview
//!
//! Many model back-ends have no native function calling. This crate adds it
//! with nothing but a system prompt and a fault-tolerant reply parser:
//!
//! 1. The bound tools, plus a `__conversational_response` pseudo-tool, are
//!    rendered as JSON into a system instruction asking for
//!    `{"tool": .., "tool_input": ..}`.
//! 2. The wrapped model is called (single-shot, or streamed and fully drained).
//! 3. The reply is parsed strictly, then with garbage-tolerant recovery, and
//!    mapped onto either one [`ToolCall`] or a plain text answer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tool_calling_llm::{CallOptions, ChatModel, Message, ToolCallingModel, ToolDeclaration};
//!
//! async fn run<M: ChatModel + 'static>(model: M) -> tool_calling_llm::Result<()> {
//!     let weather = ToolDeclaration::new(
//!         "weather",
//!         "Call to get the current weather for a location.",
//!         serde_json::json!({
//!             "type": "object",
//!             "properties": {"query": {"type": "string"}},
//!             "required": ["query"]
//!         }),
//!     );
//!
//!     let llm = ToolCallingModel::new(model)?.bind_tools([weather]);
//!     let reply = llm
//!         .invoke(&[Message::user("What is the weather in San Francisco?")], &CallOptions::new())
//!         .await?;
//!
//!     for call in &reply.tool_calls {
//!         println!("{} {}", call.name, call.args);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Messages, tool declarations, tool calls |
//! | [`prompt`] | Template rendering and turn composition |
//! | [`parse`] | Strict and garbage-tolerant JSON recovery |
//! | [`interpret`] | Reply interpretation and call-id generation |
//! | [`pipeline`] | Stream fragment accumulation |
//! | [`client`] | `ChatModel` seam and the `ToolCallingModel` wrapper |
//! | [`config`] | YAML configuration and environment overrides |

pub mod client;
pub mod config;
pub mod interpret;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod types;

// Re-export main types for convenience
pub use client::{CallOptions, ChatModel, ToolCallingModel, ToolCallingModelBuilder};
pub use config::ToolCallingConfig;
pub use interpret::{interpret_response, InterpretOptions, MissingResponsePolicy};
pub use parse::{last_tool_call_args_json, parse_json_garbage, parse_json_strict};
pub use prompt::{compose_turn, ComposedTurn, PromptTemplate, ToolSet};
pub use types::{
    message::{AssistantMessage, AssistantMessageChunk, Message, MessageRole},
    tool::{ToolCall, ToolDeclaration, ToolDefinition},
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
