//! The seam to the underlying chat model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::message::{AssistantMessage, AssistantMessageChunk, Message};
use crate::{BoxStream, Error, Result};

/// Generation options passed through to the model untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    /// Provider-specific settings (e.g. `{"format": "json"}` for Ollama).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }

    pub fn extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// A chat model: a list of messages in, an assistant message (or a stream of
/// fragments) out.
///
/// Implementations own transport, retries, cancellation and timeouts.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identity used in logs and error messages.
    fn model_name(&self) -> &str;

    async fn generate(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<AssistantMessage>;

    /// Stream the reply as fragments.
    ///
    /// The default implementation generates the full reply and emits it as a
    /// single fragment.
    async fn stream(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<BoxStream<'static, AssistantMessageChunk>> {
        let chunk = AssistantMessageChunk::from(self.generate(messages, options).await?);
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, Error>(chunk)
        })))
    }
}

#[async_trait]
impl<T: ChatModel + ?Sized> ChatModel for Arc<T> {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn generate(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<AssistantMessage> {
        (**self).generate(messages, options).await
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<BoxStream<'static, AssistantMessageChunk>> {
        (**self).stream(messages, options).await
    }
}
