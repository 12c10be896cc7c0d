//! # Request Preprocessor - Normalize Untrusted Nested Data
//!
//! Cleans request-like JSON records before validation. Two stages run
//! against one mutable record:
//!
//! - **transformers**: whole-record handlers that derive, rename or drop fields
//! - **modifiers**: per-field handler chains keyed by dotted field specs such
//!   as `items.*.name`, where `*` is expanded against the record's actual shape
//!
//! Both stages use the same onion-style middleware chain: every handler gets
//! the payload plus a continuation, and decides whether to forward.
//!
//! ## Modules
//!
//! - **path**: field specs, wildcard expansion, in-place get/set by path
//! - **pipeline**: the [`Handler`] trait and chain executor
//! - **preprocess**: field/record processors and the [`Preprocessor`]
//! - **builtin**: ready-made modifiers and transformers
//! - **plan**: JSON plans naming built-in handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use request_preprocessor::builtin::{Concat, Trim};
//! use request_preprocessor::{modifier, transformer, JsonRecord, ModifierMap, Preprocessor};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut record = JsonRecord::from_value(json!({
//!     "first_name": "John",
//!     "last_name": " Doe ",
//!     "items": [{"name": "  Foo "}, {"name": "  Bar "}]
//! }));
//!
//! let modifiers = ModifierMap::new()
//!     .with("last_name", [modifier(Trim)])?
//!     .with("items.*.name", [modifier(Trim)])?;
//! let transformers = vec![transformer(Concat::new(["first_name", "last_name"], "full_name"))];
//!
//! Preprocessor::make(&mut record, &modifiers, &transformers).apply()?;
//!
//! assert_eq!(record.input("items.1.name"), "Bar");
//! // transformers run first, so full_name saw the untrimmed last name
//! assert_eq!(record.input("full_name"), "John  Doe ");
//! # Ok(())
//! # }
//! ```
//!
//! Handlers run synchronously on the caller's thread. Wildcard expansion
//! recurses once per spec segment; bounding the depth of incoming data is
//! left to the caller.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::{BufRead, Write};

pub mod error;
pub mod path;
pub mod record;
pub mod pipeline;
pub mod preprocess;
pub mod builtin;
pub mod plan;
pub mod testing;

// Re-export commonly used types for convenience
pub use error::PreprocessError;
pub use path::{ConcretePath, FieldSpec};
pub use pipeline::{modifier, transformer, Handler, Modifier, Next, PipelinedItem, Transformer};
pub use preprocess::{ApplyStats, ModifierMap, Preprocessor};
pub use plan::{CompiledPlan, PreprocessPlan};
pub use record::{JsonRecord, Record};

/// Main entry point: preprocess a newline-delimited JSON stream.
///
/// Each non-blank line is one record. Records are written back one per line
/// in the same order. Returns the number of records processed.
pub fn preprocess_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    plan: &CompiledPlan<Value>,
) -> Result<usize> {
    let mut count = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        let mut record: Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;

        plan.apply(&mut record)
            .with_context(|| format!("Failed to preprocess record on line {}", line_no + 1))?;

        serde_json::to_writer(&mut *writer, &record).context("Failed to serialize record")?;
        writeln!(writer).context("Failed to write record")?;
        count += 1;
    }

    Ok(count)
}
