//! Stream assembly for incremental model output.
//!
//! Fragments are only reduced here; nothing is interpreted until the stream
//! has been drained completely.

pub mod accumulate;

pub use accumulate::{drain_stream, MessageAccumulator};
