//! Field specifiers, concrete paths and wildcard expansion
//!
//! A [`FieldSpec`] is what callers configure (`items.*.name`). Expansion turns
//! it into [`ConcretePath`]s that address exactly one node each, and the
//! access helpers read and write those nodes in place.

pub mod types;
pub mod access;
pub mod expander;

pub use types::{ConcretePath, FieldSpec, PathSegment, Segment, SEPARATOR, WILDCARD};
pub use access::{assign, lookup, lookup_mut};
pub use expander::expand;
