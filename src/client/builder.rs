use std::sync::Arc;

use crate::client::core::ToolCallingModel;
use crate::client::model::ChatModel;
use crate::config::ToolCallingConfig;
use crate::interpret::{CallIdGenerator, InterpretOptions, MissingResponsePolicy, UuidCallIdGenerator};
use crate::types::tool::ToolDeclaration;
use crate::Result;

/// Builder for [`ToolCallingModel`].
///
/// Environment overrides (see [`crate::config`]) are applied at `build` time
/// unless [`ignore_env`](Self::ignore_env) is called.
pub struct ToolCallingModelBuilder {
    config: ToolCallingConfig,
    tools: Vec<ToolDeclaration>,
    ids: Option<Arc<dyn CallIdGenerator>>,
    read_env: bool,
}

impl ToolCallingModelBuilder {
    pub fn new() -> Self {
        Self {
            config: ToolCallingConfig::default(),
            tools: Vec::new(),
            ids: None,
            read_env: true,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ToolCallingConfig) -> Self {
        self.config = config;
        self
    }

    /// Custom system prompt; must contain `{tools}`. Validated in `build`.
    pub fn system_template(mut self, template: impl Into<String>) -> Self {
        self.config.system_template = template.into();
        self
    }

    pub fn missing_response(mut self, policy: MissingResponsePolicy) -> Self {
        self.config.missing_response = policy;
        self
    }

    pub fn call_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.call_id_prefix = prefix.into();
        self
    }

    /// Use a custom id source; takes precedence over `call_id_prefix`.
    pub fn call_id_generator(mut self, ids: Arc<dyn CallIdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn tools<I, T>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ToolDeclaration>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Skip environment overrides.
    pub fn ignore_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    pub fn build<M: ChatModel + 'static>(self, model: M) -> Result<ToolCallingModel<M>> {
        let config = if self.read_env {
            self.config.apply_env()?
        } else {
            self.config
        };
        let template = config.system_template()?;

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UuidCallIdGenerator::with_prefix(config.call_id_prefix.clone())));
        let interpret = InterpretOptions::new(model.model_name())
            .missing_response(config.missing_response)
            .ids(ids);

        Ok(ToolCallingModel {
            model: Arc::new(model),
            tools: self.tools.into(),
            template: Arc::new(template),
            interpret,
        })
    }
}

impl Default for ToolCallingModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
