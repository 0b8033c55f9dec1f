use rustc_hash::FxHashMap;

use crate::value::Value;

/// String metadata attached to a message, queried with `meta()`.
pub type Metadata = FxHashMap<String, String>;

/// The per-message execution environment threaded through every evaluation.
///
/// Owned by the caller and borrowed for the duration of a single `exec`
/// call; the evaluator never mutates it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'a> {
    value: Option<&'a Value>,
    metadata: Option<&'a Metadata>,
    index: usize,
}

impl<'a> Context<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: &'a Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_metadata(mut self, metadata: &'a Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the message's index within its batch.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    pub fn metadata(&self) -> Option<&'a Metadata> {
        self.metadata
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
