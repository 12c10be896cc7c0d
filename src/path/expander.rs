//! Wildcard expansion of field specifiers against a concrete record
//!
//! Expansion walks the spec left to right. Literal segments extend the
//! current prefix without consulting the record; a wildcard reads the node at
//! the current prefix and branches once per child, in the record's own
//! iteration order. Branches that land on a missing or scalar node simply
//! produce nothing.
//!
//! Recursion depth is bounded by the number of spec segments, so very deep
//! records are only a concern when the spec itself is very deep.

use crate::path::access::lookup;
use crate::path::types::{ConcretePath, FieldSpec, PathSegment, Segment};
use serde_json::Value;

/// Resolve `spec` into every concrete path it names in `record`.
///
/// A spec without wildcards expands to itself without looking at the record.
pub fn expand(record: &Value, spec: &FieldSpec) -> Vec<ConcretePath> {
    if let Some(path) = spec.to_concrete() {
        return vec![path];
    }

    let mut paths = Vec::new();
    expand_from(record, spec.segments(), ConcretePath::root(), &mut paths);
    paths
}

/// Depth-first expansion of `remaining` below `prefix`
fn expand_from(
    record: &Value,
    remaining: &[PathSegment],
    prefix: ConcretePath,
    paths: &mut Vec<ConcretePath>,
) {
    let Some((segment, rest)) = remaining.split_first() else {
        // Only reachable when a spec ends in a wildcard
        paths.push(prefix);
        return;
    };

    match segment {
        PathSegment::Literal(key) => {
            let next = prefix.child(Segment::Key(key.clone()));
            if rest.is_empty() {
                paths.push(next);
            } else {
                expand_from(record, rest, next, paths);
            }
        }
        PathSegment::Wildcard => match lookup(record, &prefix) {
            Some(Value::Array(arr)) => {
                for index in 0..arr.len() {
                    expand_from(record, rest, prefix.child(Segment::Index(index)), paths);
                }
            }
            Some(Value::Object(map)) => {
                for key in map.keys() {
                    expand_from(record, rest, prefix.child(Segment::Key(key.clone())), paths);
                }
            }
            _ => {
                // Not a container: nothing to expand on this branch
            }
        },
    }
}
