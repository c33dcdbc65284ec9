//! Response interpretation: turn a raw model reply into either a tool call or
//! a conversational answer.
//!
//! The reply is parsed strictly first, then with garbage-tolerant recovery
//! (see [`crate::parse`]). The recovered value is read as
//! `{"tool": .., "tool_input": ..}`; a reply naming the conversational
//! pseudo-tool, or naming nothing the tool set knows, is an answer taken from
//! `tool_input.response` or a top-level `response`.
//!
//! # Examples
//!
//! ```
//! use tool_calling_llm::interpret::{interpret_response, InterpretOptions};
//! use tool_calling_llm::prompt::ToolSet;
//! use tool_calling_llm::types::ToolDeclaration;
//! use serde_json::json;
//!
//! let tools = ToolSet::new(&[ToolDeclaration::new("weather", "Weather lookup", json!({"type": "object"}))]);
//! let reply = r#"{"tool": "weather", "tool_input": {"query": "SF"}}"#;
//!
//! let message = interpret_response(reply, &tools, &InterpretOptions::default()).unwrap();
//! assert_eq!(message.tool_calls[0].name, "weather");
//! assert!(message.content.is_empty());
//! ```

pub mod ids;

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::parse::{parse_json_garbage, parse_json_strict};
use crate::prompt::ToolSet;
use crate::types::message::AssistantMessage;
use crate::types::tool::ToolCall;
use crate::{Error, Result};

pub use ids::{CallIdGenerator, UuidCallIdGenerator};

/// Name some models use to wrap an invocation under a generic key.
const GENERIC_FUNCTION_TOOL: &str = "function";
/// Name substituted for [`GENERIC_FUNCTION_TOOL`] when the wrapper is empty.
const EXTRACT_TOOL: &str = "extract";

/// What to do with a conversational reply that carries no `response` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingResponsePolicy {
    /// Fail with [`Error::UnparseableModelReply`].
    #[default]
    Strict,
    /// Return the raw reply unchanged as the assistant's text.
    #[serde(alias = "pass_through")]
    PassThrough,
}

impl MissingResponsePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingResponsePolicy::Strict => "strict",
            MissingResponsePolicy::PassThrough => "passthrough",
        }
    }
}

impl std::fmt::Display for MissingResponsePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingResponsePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(MissingResponsePolicy::Strict),
            "passthrough" | "pass_through" | "pass-through" => Ok(MissingResponsePolicy::PassThrough),
            other => Err(format!("Unknown missing-response policy: {}", other)),
        }
    }
}

/// Settings for one interpretation.
#[derive(Debug, Clone)]
pub struct InterpretOptions {
    /// Reported in errors so a bad reply can be traced to its model.
    pub model_name: String,
    pub missing_response: MissingResponsePolicy,
    pub ids: Arc<dyn CallIdGenerator>,
}

impl InterpretOptions {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    pub fn missing_response(mut self, policy: MissingResponsePolicy) -> Self {
        self.missing_response = policy;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn CallIdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            model_name: "unknown model".to_string(),
            missing_response: MissingResponsePolicy::default(),
            ids: Arc::new(UuidCallIdGenerator::new()),
        }
    }
}

/// A recovered reply, classified against the tool set.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    ToolInvocation { tool: String, tool_input: Value },
    Conversational(String),
    /// Conversational, but neither `tool_input.response` nor `response` exists.
    MissingResponse,
}

impl ParsedReply {
    pub fn classify(value: &Value, tool_set: &ToolSet) -> Self {
        match value.get("tool").and_then(Value::as_str) {
            Some(name) if tool_set.is_callable(name) => {
                let tool_input = match value.get("tool_input") {
                    None | Some(Value::Null) => json!({}),
                    Some(input) => input.clone(),
                };
                ParsedReply::ToolInvocation {
                    tool: name.to_string(),
                    tool_input,
                }
            }
            _ => value
                .get("tool_input")
                .and_then(|input| input.get("response"))
                .or_else(|| value.get("response"))
                .map(|response| ParsedReply::Conversational(response_text(response)))
                .unwrap_or(ParsedReply::MissingResponse),
        }
    }
}

/// Interpret a complete model reply against the turn's tool set.
pub fn interpret_response(
    content: &str,
    tool_set: &ToolSet,
    options: &InterpretOptions,
) -> Result<AssistantMessage> {
    let value = parse_reply(content).map_err(|err| {
        warn!(model = %options.model_name, error = %err, "no JSON recoverable from model reply");
        unparseable(content, options)
    })?;

    match ParsedReply::classify(&value, tool_set) {
        ParsedReply::ToolInvocation { tool, tool_input } => {
            let name = if tool == GENERIC_FUNCTION_TOOL && tool_input.get("function").is_none() {
                EXTRACT_TOOL.to_string()
            } else {
                tool
            };
            let call = ToolCall {
                id: options.ids.next_id(),
                name,
                args: tool_input,
            };
            debug!(tool = %call.name, id = %call.id, "model selected a tool");
            Ok(AssistantMessage::tool_call(call))
        }
        ParsedReply::Conversational(text) => {
            debug!(len = text.len(), "model answered conversationally");
            Ok(AssistantMessage::text(text))
        }
        ParsedReply::MissingResponse => match options.missing_response {
            MissingResponsePolicy::Strict => Err(unparseable(content, options)),
            MissingResponsePolicy::PassThrough => {
                warn!(
                    model = %options.model_name,
                    "reply has no response text; passing raw content through"
                );
                Ok(AssistantMessage::text(content))
            }
        },
    }
}

fn parse_reply(content: &str) -> Result<Value> {
    parse_json_strict(content).or_else(|_| {
        debug!("reply is not strict JSON; trying garbage-tolerant recovery");
        parse_json_garbage(content)
    })
}

fn response_text(response: &Value) -> String {
    match response {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn unparseable(content: &str, options: &InterpretOptions) -> Error {
    Error::UnparseableModelReply {
        model: options.model_name.clone(),
        content: content.to_string(),
    }
}
