//! Tool-calling configuration.
//!
//! Loaded from YAML (or JSON, which YAML accepts) and optionally overridden by
//! environment variables:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `TOOL_CALLING_MISSING_RESPONSE` | `strict` or `passthrough` |
//! | `TOOL_CALLING_TEMPLATE_PATH` | file whose contents replace `system_template` |
//! | `TOOL_CALLING_CALL_ID_PREFIX` | prefix for generated tool-call ids |
//!
//! ```
//! use tool_calling_llm::config::ToolCallingConfig;
//! use tool_calling_llm::interpret::MissingResponsePolicy;
//!
//! let config = ToolCallingConfig::from_yaml_str("missing_response: passthrough").unwrap();
//! assert_eq!(config.missing_response, MissingResponsePolicy::PassThrough);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::interpret::{MissingResponsePolicy, UuidCallIdGenerator};
use crate::prompt::{validate_system_template, PromptTemplate, DEFAULT_SYSTEM_TEMPLATE};
use crate::{Error, ErrorContext, Result};

pub const ENV_MISSING_RESPONSE: &str = "TOOL_CALLING_MISSING_RESPONSE";
pub const ENV_TEMPLATE_PATH: &str = "TOOL_CALLING_TEMPLATE_PATH";
pub const ENV_CALL_ID_PREFIX: &str = "TOOL_CALLING_CALL_ID_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolCallingConfig {
    /// System prompt template; must contain `{tools}` and no other placeholder.
    pub system_template: String,
    pub missing_response: MissingResponsePolicy,
    pub call_id_prefix: String,
}

impl Default for ToolCallingConfig {
    fn default() -> Self {
        Self {
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            missing_response: MissingResponsePolicy::default(),
            call_id_prefix: UuidCallIdGenerator::DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ToolCallingConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Yaml(inner) => Error::configuration_with_context(
                inner.to_string(),
                ErrorContext::new()
                    .with_details(path.as_ref().display().to_string())
                    .with_source("config_loader"),
            ),
            other => other,
        })
    }

    /// Parsed and validated system template.
    pub fn system_template(&self) -> Result<PromptTemplate> {
        let template = PromptTemplate::new(self.system_template.as_str())?;
        validate_system_template(&template)?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<()> {
        self.system_template().map(|_| ())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(policy) = lookup(ENV_MISSING_RESPONSE) {
            self.missing_response = policy.parse().map_err(|msg: String| {
                Error::configuration_with_context(
                    msg,
                    ErrorContext::new()
                        .with_field_path(ENV_MISSING_RESPONSE)
                        .with_source("env"),
                )
            })?;
        }
        if let Some(path) = lookup(ENV_TEMPLATE_PATH) {
            self.system_template = std::fs::read_to_string(&path).map_err(|e| {
                Error::configuration_with_context(
                    format!("cannot read template file: {}", e),
                    ErrorContext::new()
                        .with_field_path(ENV_TEMPLATE_PATH)
                        .with_details(path.clone())
                        .with_source("env"),
                )
            })?;
        }
        if let Some(prefix) = lookup(ENV_CALL_ID_PREFIX) {
            self.call_id_prefix = prefix;
        }
        self.validate()?;
        Ok(self)
    }
}
