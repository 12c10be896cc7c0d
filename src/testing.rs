//! Test support for code that configures preprocessors
//!
//! A [`Spy`] is a handler that records every invocation and then forwards
//! unchanged. Put one into a modifier chain or transformer list and assert
//! on what it saw, instead of inspecting the preprocessor's internals.
//!
//! ```rust
//! use request_preprocessor::testing::Spy;
//! use request_preprocessor::{modifier, ModifierMap, Preprocessor};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let spy = Spy::new();
//! let modifiers = ModifierMap::new().with("items.*.name", [modifier(spy.clone())])?;
//! let mut record = json!({"items": [{"name": "a"}, {"name": " "}]});
//!
//! Preprocessor::new(&mut record).with_modifiers(&modifiers).apply()?;
//! assert_eq!(spy.fields(), vec!["items.0.name"]);
//! # Ok(())
//! # }
//! ```

use crate::pipeline::{Handler, Next, PipelinedItem};
use crate::record::Record;
use anyhow::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum SpyCall {
    /// A modifier call: the concrete path and the value received
    Field { field: String, value: Value },
    /// A transformer call, with a snapshot of the record
    Record(Value),
}

/// Handler that records its invocations. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Spy {
    calls: Rc<RefCell<Vec<SpyCall>>>,
}

impl Spy {
    pub fn new() -> Self {
        Spy::default()
    }

    pub fn calls(&self) -> Vec<SpyCall> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self) -> bool {
        !self.calls.borrow().is_empty()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Concrete paths seen by modifier calls, in call order
    pub fn fields(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SpyCall::Field { field, .. } => Some(field.clone()),
                SpyCall::Record(_) => None,
            })
            .collect()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl<'r> Handler<PipelinedItem<'r>> for Spy {
    fn name(&self) -> &str {
        "spy"
    }

    fn handle(
        &self,
        item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        self.calls.borrow_mut().push(SpyCall::Field {
            field: item.field(),
            value: item.value.clone(),
        });
        next.run(item)
    }
}

impl<'r, R: Record> Handler<&'r mut R> for Spy {
    fn name(&self) -> &str {
        "spy"
    }

    fn handle(&self, record: &'r mut R, next: Next<'_, &'r mut R>) -> Result<&'r mut R> {
        self.calls
            .borrow_mut()
            .push(SpyCall::Record(record.all().clone()));
        next.run(record)
    }
}
