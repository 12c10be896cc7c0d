//! Record preprocessing
//!
//! A [`Preprocessor`] runs two stages against one record:
//!
//! 1. the transformer list, over the whole record ([`RecordProcessor`])
//! 2. every modifier chain in the [`ModifierMap`], once per concrete path its
//!    field spec expands to ([`FieldProcessor`])

pub mod field_processor;
pub mod record_processor;
pub mod preprocessor;

pub use field_processor::{is_blank, FieldOutcome, FieldProcessor};
pub use record_processor::RecordProcessor;
pub use preprocessor::{ApplyStats, ModifierMap, Preprocessor};
