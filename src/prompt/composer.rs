use serde_json::json;
use tracing::{debug, warn};

use crate::prompt::template::PromptTemplate;
use crate::types::message::Message;
use crate::types::tool::{ToolDeclaration, ToolDefinition};
use crate::{Error, ErrorContext, Result};

/// Reserved name of the "answer in plain text" pseudo-tool.
pub const CONVERSATIONAL_RESPONSE_TOOL: &str = "__conversational_response";

/// The fallback pseudo-tool that lets the model answer without calling anything.
pub fn conversational_response_tool() -> ToolDefinition {
    ToolDefinition::function(
        CONVERSATIONAL_RESPONSE_TOOL,
        "Respond conversationally if no other tools should be called for a given query.",
        json!({
            "type": "object",
            "properties": {
                "response": {
                    "type": "string",
                    "description": "Conversational response to the user."
                }
            },
            "required": ["response"]
        }),
    )
}

/// Canonical tools offered for one turn, fallback pseudo-tool last.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSet {
    tools: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Build from a snapshot of bound tools. The input is never modified.
    pub fn new(bound: &[ToolDeclaration]) -> Self {
        let mut tools = Vec::with_capacity(bound.len() + 1);
        for decl in bound {
            if decl.name() == CONVERSATIONAL_RESPONSE_TOOL {
                warn!(
                    tool = CONVERSATIONAL_RESPONSE_TOOL,
                    "bound tool uses the reserved fallback name; replacing it"
                );
                continue;
            }
            tools.push(decl.to_definition());
        }
        tools.push(conversational_response_tool());
        Self { tools }
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// True when `name` is a caller tool, i.e. known and not the fallback.
    pub fn is_callable(&self, name: &str) -> bool {
        name != CONVERSATIONAL_RESPONSE_TOOL && self.get(name).is_some()
    }

    /// Pretty-printed JSON list, as embedded in the system prompt.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tools)?)
    }
}

/// Output of [`compose_turn`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTurn {
    pub system_message: Message,
    pub tool_set: ToolSet,
}

/// Build the tool-describing system message and the tool set for one turn.
pub fn compose_turn(bound: &[ToolDeclaration], template: &PromptTemplate) -> Result<ComposedTurn> {
    let tool_set = ToolSet::new(bound);
    let rendered = tool_set.to_pretty_json()?;
    let system_prompt = template.format(&[("tools", rendered.as_str())])?;

    debug!(
        tools = tool_set.len(),
        prompt_len = system_prompt.len(),
        "composed tool-calling system prompt"
    );

    Ok(ComposedTurn {
        system_message: Message::system(system_prompt),
        tool_set,
    })
}

/// Validate a template for use as the tool system prompt: it must embed
/// `{tools}` and use no other placeholder.
pub fn validate_system_template(template: &PromptTemplate) -> Result<()> {
    let mut has_tools = false;
    for name in template.placeholders() {
        if name != "tools" {
            return Err(Error::template_with_context(
                "system template only supports the {tools} placeholder",
                ErrorContext::new()
                    .with_details(format!("{{{}}}", name))
                    .with_source("system_template"),
            ));
        }
        has_tools = true;
    }
    if !has_tools {
        return Err(Error::template_with_context(
            "system template must contain the {tools} placeholder",
            ErrorContext::new().with_source("system_template"),
        ));
    }
    Ok(())
}
