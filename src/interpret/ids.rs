//! Synthetic tool-call identifiers.

use uuid::Uuid;

/// Source of unique tool-call ids.
pub trait CallIdGenerator: Send + Sync + std::fmt::Debug {
    fn next_id(&self) -> String;
}

/// `call_` followed by a v4 UUID in simple (hyphen-free) form.
#[derive(Debug, Clone)]
pub struct UuidCallIdGenerator {
    prefix: String,
}

impl UuidCallIdGenerator {
    pub const DEFAULT_PREFIX: &'static str = "call_";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidCallIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CallIdGenerator for UuidCallIdGenerator {
    fn next_id(&self) -> String {
        format!("{}{}", self.prefix, Uuid::new_v4().simple())
    }
}
