//! Tool-calling client over a text-only chat model.
//!
//! Keep the public surface small: [`ChatModel`] is the seam to the underlying
//! model, [`ToolCallingModel`] runs turns through it.

pub mod builder;
pub mod core;
pub mod model;

pub use builder::ToolCallingModelBuilder;
pub use core::ToolCallingModel;
pub use model::{CallOptions, ChatModel};
