use futures::{Stream, StreamExt};
use tracing::debug;

use crate::types::message::AssistantMessageChunk;
use crate::types::tool::ToolCallChunk;
use crate::{Error, Result};

/// Folds streamed fragments into one assembled message.
///
/// Content deltas are appended. Tool-call deltas with the same `index` are
/// merged (name and argument text concatenated, first non-empty id kept);
/// deltas without an index start a new call.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    merged: Option<AssistantMessageChunk>,
    fragments: usize,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: AssistantMessageChunk) {
        self.fragments += 1;
        if let Some(merged) = self.merged.as_mut() {
            merged.content.push_str(&chunk.content);
            merge_tool_call_chunks(&mut merged.tool_call_chunks, chunk.tool_call_chunks);
        } else {
            self.merged = Some(chunk);
        }
    }

    /// Number of fragments pushed so far.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// The assembled message, or `None` if nothing was pushed.
    pub fn finish(self) -> Option<AssistantMessageChunk> {
        self.merged
    }
}

fn merge_tool_call_chunks(existing: &mut Vec<ToolCallChunk>, incoming: Vec<ToolCallChunk>) {
    for chunk in incoming {
        let slot = chunk
            .index
            .and_then(|index| existing.iter_mut().find(|c| c.index == Some(index)));
        match slot {
            Some(slot) => {
                if slot.id.as_deref().map_or(true, str::is_empty) {
                    slot.id = chunk.id;
                }
                append(&mut slot.name, chunk.name);
                append(&mut slot.args, chunk.args);
            }
            None => existing.push(chunk),
        }
    }
}

fn append(target: &mut Option<String>, fragment: Option<String>) {
    if let Some(fragment) = fragment {
        target.get_or_insert_with(String::new).push_str(&fragment);
    }
}

/// Drain a fragment stream to completion and return the assembled message.
///
/// The first stream error is returned as-is; an empty stream is
/// [`Error::EmptyStream`].
pub async fn drain_stream<S>(stream: S, model_name: &str) -> Result<AssistantMessageChunk>
where
    S: Stream<Item = Result<AssistantMessageChunk>>,
{
    futures::pin_mut!(stream);
    let mut accumulator = MessageAccumulator::new();
    while let Some(chunk) = stream.next().await {
        accumulator.push(chunk?);
    }
    debug!(
        model = model_name,
        fragments = accumulator.fragments(),
        "drained model stream"
    );
    accumulator.finish().ok_or_else(|| Error::EmptyStream {
        model: model_name.to_string(),
    })
}
