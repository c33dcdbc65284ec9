//! Tool declarations, canonical tool schemas and tool calls.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::parse::parse_json_garbage;

/// Canonical tool schema (OpenAI function-tool shape).
///
/// This is the form rendered into the system prompt and looked up by name
/// when a reply is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub parameters: Value, // JSON Schema
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// A tool as bound by the caller, before canonicalisation.
///
/// Deserialises from any of the three accepted shapes, tried in order:
/// a canonical `{"type": "function", "function": {..}}` object, a
/// `{"name", "description", "schema"}` object, or a bare function object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolDeclaration {
    Definition(ToolDefinition),
    Schema {
        name: String,
        #[serde(default)]
        description: String,
        schema: Value,
    },
    Function(FunctionDefinition),
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        ToolDeclaration::Schema {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    /// Declare a tool whose parameters are described by a Rust type.
    pub fn from_type<T: schemars::JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut schema = serde_json::to_value(schemars::schema_for!(T))
            .unwrap_or_else(|_| empty_object_schema());
        if let Value::Object(map) = &mut schema {
            map.remove("$schema");
            map.remove("title");
        }
        Self::new(name, description, schema)
    }

    pub fn name(&self) -> &str {
        match self {
            ToolDeclaration::Definition(def) => def.name(),
            ToolDeclaration::Schema { name, .. } => name,
            ToolDeclaration::Function(f) => &f.name,
        }
    }

    /// Canonical form. Idempotent: a `Definition` converts to itself.
    pub fn to_definition(&self) -> ToolDefinition {
        match self {
            ToolDeclaration::Definition(def) => def.clone(),
            ToolDeclaration::Schema {
                name,
                description,
                schema,
            } => ToolDefinition::function(name.clone(), description.clone(), schema.clone()),
            ToolDeclaration::Function(f) => ToolDefinition {
                tool_type: "function".to_string(),
                function: f.clone(),
            },
        }
    }
}

impl From<ToolDefinition> for ToolDeclaration {
    fn from(def: ToolDefinition) -> Self {
        ToolDeclaration::Definition(def)
    }
}

impl From<FunctionDefinition> for ToolDeclaration {
    fn from(f: FunctionDefinition) -> Self {
        ToolDeclaration::Function(f)
    }
}

/// Tool call (invocation selected by the model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(alias = "arguments")]
    pub args: Value,
}

/// Partial tool call carried by a streamed fragment.
///
/// Fragments sharing an `index` belong to the same call; their string fields
/// are concatenated in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>, // Partial JSON string
}

impl ToolCallChunk {
    /// A complete call expressed as a single delta at `index`.
    pub fn from_tool_call(index: u32, call: ToolCall) -> Self {
        Self {
            index: Some(index),
            id: Some(call.id),
            name: Some(call.name),
            args: Some(call.args.to_string()),
        }
    }

    pub(crate) fn into_tool_call(self) -> ToolCall {
        let args = match self.args.as_deref().map(str::trim) {
            None | Some("") => json!({}),
            Some(text) => serde_json::from_str(text)
                .or_else(|_| parse_json_garbage(text))
                .unwrap_or_else(|_| Value::String(text.to_string())),
        };
        ToolCall {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            args,
        }
    }
}
