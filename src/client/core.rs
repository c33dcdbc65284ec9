use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::info;

use crate::client::builder::ToolCallingModelBuilder;
use crate::client::model::{CallOptions, ChatModel};
use crate::interpret::{interpret_response, InterpretOptions};
use crate::pipeline::drain_stream;
use crate::prompt::{compose_turn, ComposedTurn, PromptTemplate};
use crate::types::message::{AssistantMessage, AssistantMessageChunk, Message};
use crate::types::tool::ToolDeclaration;
use crate::{BoxStream, Result};

/// Adds prompt-based tool calling to a model that only produces text.
///
/// Each turn prepends a system message describing the bound tools, calls the
/// wrapped model, and interprets its JSON reply as either a tool call or a
/// plain answer. Bound tools are an immutable snapshot: [`bind_tools`]
/// returns a new handle and leaves `self` untouched, so concurrent turns never
/// observe a half-updated tool list.
///
/// [`bind_tools`]: ToolCallingModel::bind_tools
pub struct ToolCallingModel<M> {
    pub(crate) model: Arc<M>,
    pub(crate) tools: Arc<[ToolDeclaration]>,
    pub(crate) template: Arc<PromptTemplate>,
    pub(crate) interpret: InterpretOptions,
}

impl<M> Clone for ToolCallingModel<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            tools: Arc::clone(&self.tools),
            template: Arc::clone(&self.template),
            interpret: self.interpret.clone(),
        }
    }
}

impl<M> std::fmt::Debug for ToolCallingModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCallingModel")
            .field("model", &self.interpret.model_name)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("missing_response", &self.interpret.missing_response)
            .finish()
    }
}

impl<M: ChatModel + 'static> ToolCallingModel<M> {
    /// Wrap `model` with the default template and strict reply handling.
    pub fn new(model: M) -> Result<Self> {
        ToolCallingModelBuilder::new().ignore_env().build(model)
    }

    /// A handle with `tools` bound, replacing any previously bound tools.
    pub fn bind_tools<I, T>(&self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ToolDeclaration>,
    {
        Self {
            tools: tools.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    pub fn bound_tools(&self) -> &[ToolDeclaration] {
        &self.tools
    }

    pub fn inner(&self) -> &M {
        &self.model
    }

    pub fn llm_type(&self) -> &'static str {
        "Tool Calling LLM"
    }

    pub fn model_type(&self) -> &'static str {
        "Tool Calling Model"
    }

    /// System message and tool set for the next turn.
    pub fn compose(&self) -> Result<ComposedTurn> {
        compose_turn(&self.tools, &self.template)
    }

    /// Run one single-shot turn.
    pub async fn invoke(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<AssistantMessage> {
        let ComposedTurn {
            system_message,
            tool_set,
        } = self.compose()?;
        let request = with_system_message(system_message, messages);

        info!(
            model = self.model.model_name(),
            tools = tool_set.len(),
            messages = request.len(),
            "tool-calling turn"
        );
        let reply = self.model.generate(&request, options).await?;
        interpret_response(&reply.content, &tool_set, &self.interpret)
    }

    /// Run one streamed turn.
    ///
    /// The wrapped model's fragments are drained completely before the reply
    /// is interpreted, so the returned stream yields exactly one message.
    pub async fn stream(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<BoxStream<'static, AssistantMessage>> {
        let ComposedTurn {
            system_message,
            tool_set,
        } = self.compose()?;
        let request = with_system_message(system_message, messages);

        info!(
            model = self.model.model_name(),
            tools = tool_set.len(),
            messages = request.len(),
            "tool-calling streamed turn"
        );
        let fragments = self.model.stream(&request, options).await?;
        let interpret = self.interpret.clone();

        let turn = async move {
            let assembled = drain_stream(fragments, &interpret.model_name).await?;
            interpret_response(&assembled.content, &tool_set, &interpret)
        };
        Ok(Box::pin(futures::stream::once(turn)))
    }
}

/// A tool-calling model is itself a chat model, so it can be stacked behind
/// anything that consumes [`ChatModel`].
#[async_trait]
impl<M: ChatModel + 'static> ChatModel for ToolCallingModel<M> {
    fn model_name(&self) -> &str {
        self.model.model_name()
    }

    async fn generate(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<AssistantMessage> {
        self.invoke(messages, options).await
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &CallOptions,
    ) -> Result<BoxStream<'static, AssistantMessageChunk>> {
        let replies = ToolCallingModel::stream(self, messages, options).await?;
        Ok(Box::pin(
            replies.map(|reply| reply.map(AssistantMessageChunk::from)),
        ))
    }
}

fn with_system_message(system: Message, messages: &[Message]) -> Vec<Message> {
    let mut request = Vec::with_capacity(messages.len() + 1);
    request.push(system);
    request.extend_from_slice(messages);
    request
}
