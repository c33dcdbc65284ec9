use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.system_template")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the offending placeholder)
    pub details: Option<String>,
    /// Source of the error (e.g., "prompt_template", "config_loader")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for prompt composition, reply interpretation and model turns.
///
/// Every variant produced while reading a model reply carries the raw text, so a
/// malformed reply can always be diagnosed from the error alone.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No JSON object or array found in model output: {content}")]
    NoJsonFound { content: String },

    #[error("Invalid JSON in model output ({reason}): {content}")]
    InvalidJson { content: String, reason: String },

    #[error("Failed to parse a response from {model} output: {content}")]
    UnparseableModelReply { model: String, content: String },

    #[error("\"tool_calls\" missing from assistant message: {message}")]
    MissingToolCalls { message: String },

    #[error("Message is not an assistant message: {message}")]
    NotAnAssistantMessage { message: String },

    #[error("Failed to process base stream: {model} produced no output")]
    EmptyStream { model: String },

    #[error("Model error from {model}: {message}")]
    Model { model: String, message: String },

    #[error("Prompt template error: {message}{}", format_context(.context))]
    Template {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Failure reported by the wrapped model client.
    pub fn model(model: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Model {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn template_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Template {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Template { context, .. } | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The raw model output attached to this error, if any.
    pub fn raw_content(&self) -> Option<&str> {
        match self {
            Error::NoJsonFound { content }
            | Error::InvalidJson { content, .. }
            | Error::UnparseableModelReply { content, .. } => Some(content),
            _ => None,
        }
    }
}
