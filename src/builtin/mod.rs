//! Built-in modifiers and transformers
//!
//! These cover the common normalizations and let a plan file refer to
//! handlers by name. Application-specific handlers implement
//! [`Handler`](crate::pipeline::Handler) directly.

pub mod modifiers;
pub mod transformers;

pub use modifiers::{
    modifier_by_name, CollapseWhitespace, DigitsOnly, Lowercase, MapValue, NullIfEmpty, Trim,
    TrimEnd, TrimStart, Uppercase, MODIFIER_NAMES,
};
pub use transformers::{transformer_by_name, Concat, Remove, Rename, Set, TRANSFORMER_NAMES};
