//! Prompt composition: the system instruction that describes the available
//! tools and the JSON reply shape the model must produce.

pub mod composer;
pub mod template;

pub use composer::{
    compose_turn, conversational_response_tool, validate_system_template, ComposedTurn, ToolSet,
    CONVERSATIONAL_RESPONSE_TOOL,
};
pub use template::PromptTemplate;

/// Default tool system prompt. `{tools}` receives the pretty-printed tool list.
pub const DEFAULT_SYSTEM_TEMPLATE: &str = r#"You have access to the following tools:

{tools}

You must always select one of the above tools and respond with only a JSON object matching the following schema:

{{
  "tool": <name of the selected tool>,
  "tool_input": <parameters for the selected tool, matching the tool's JSON schema>
}}"#;
