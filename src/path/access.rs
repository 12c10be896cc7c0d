//! Get and set by structural path into a tree of mappings and sequences
//!
//! These helpers walk the nested `Value` directly instead of flattening the
//! record into a single dotted map and rebuilding it afterwards, so a mapping
//! key that happens to look numeric is never mistaken for a sequence index.

use crate::error::PreprocessError;
use crate::path::types::{ConcretePath, Segment};
use anyhow::Result;
use serde_json::Value;

/// Step from `node` into one child
fn child<'a>(node: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Array(arr), Segment::Index(index)) => arr.get(*index),
        (Value::Array(arr), Segment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|index| arr.get(index))
        }
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
        (Value::Array(arr), Segment::Index(index)) => arr.get_mut(*index),
        (Value::Array(arr), Segment::Key(key)) => match key.parse::<usize>() {
            Ok(index) => arr.get_mut(index),
            Err(_) => None,
        },
        _ => None,
    }
}

/// Read the node at `path`, or `None` when any step is missing
pub fn lookup<'a>(root: &'a Value, path: &ConcretePath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| child(node, segment))
}

pub fn lookup_mut<'a>(root: &'a mut Value, path: &ConcretePath) -> Option<&'a mut Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| child_mut(node, segment))
}

/// Replace the node at `path` with `value`, leaving every sibling untouched.
///
/// Only the final mapping key may be absent (it is inserted). Missing
/// intermediate nodes and out of range indices are reported as
/// [`PreprocessError::PathNotFound`].
pub fn assign(root: &mut Value, path: &ConcretePath, value: Value) -> Result<()> {
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return Ok(());
    };

    let not_found = || PreprocessError::PathNotFound(path.to_string());

    let parent = parents
        .iter()
        .try_fold(root, |node, segment| child_mut(node, segment))
        .ok_or_else(not_found)?;

    match (parent, last) {
        (Value::Object(map), Segment::Key(key)) => {
            map.insert(key.clone(), value);
        }
        (Value::Array(arr), Segment::Index(index)) => {
            let slot = arr.get_mut(*index).ok_or_else(not_found)?;
            *slot = value;
        }
        (Value::Array(arr), Segment::Key(key)) => {
            let index = key.parse::<usize>().map_err(|_| not_found())?;
            let slot = arr.get_mut(index).ok_or_else(not_found)?;
            *slot = value;
        }
        _ => return Err(not_found().into()),
    }

    Ok(())
}
