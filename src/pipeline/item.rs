use crate::path::ConcretePath;
use crate::record::Record;
use serde_json::Value;

/// One leaf value travelling through a modifier chain.
///
/// Created right before the chain runs for a concrete path and discarded
/// after write-back. `value` is free to change; the path and the record
/// reference are read-only context.
pub struct PipelinedItem<'r> {
    pub value: Value,
    path: ConcretePath,
    record: &'r dyn Record,
}

impl<'r> PipelinedItem<'r> {
    pub fn new(value: Value, path: ConcretePath, record: &'r dyn Record) -> Self {
        PipelinedItem {
            value,
            path,
            record,
        }
    }

    /// The concrete path as a dotted string, e.g. `items.0.name`
    pub fn field(&self) -> String {
        self.path.to_string()
    }

    pub fn path(&self) -> &ConcretePath {
        &self.path
    }

    /// The record the value was read from, as it was before this chain ran
    pub fn record(&self) -> &'r dyn Record {
        self.record
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Shorthand for string leaves
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

impl std::fmt::Debug for PipelinedItem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelinedItem")
            .field("value", &self.value)
            .field("path", &self.field())
            .finish()
    }
}
