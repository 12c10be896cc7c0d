//! Ready-made whole-record transformers
//!
//! Each transformer reads what it needs from the record, changes it in
//! place and forwards. Fields they write are top-level keys, the same way a
//! request merge works.

use crate::error::PreprocessError;
use crate::path::{lookup_mut, ConcretePath, Segment};
use crate::pipeline::{transformer, Handler, Next, Transformer};
use crate::record::Record;
use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Operation names accepted by [`transformer_by_name`]
pub const TRANSFORMER_NAMES: &[&str] = &["concat", "set", "rename", "remove"];

fn merge_one<R: Record>(record: &mut R, key: &str, value: Value) {
    let mut partial = Map::new();
    partial.insert(key.to_string(), value);
    record.merge(partial);
}

/// Join several fields into a new one, e.g. `full_name` from first and last.
///
/// Absent and null fields are left out. Nothing is written when every
/// source field is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct Concat {
    pub fields: Vec<String>,
    pub into: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    String::from(" ")
}

impl Concat {
    pub fn new<I, S>(fields: I, into: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Concat {
            fields: fields.into_iter().map(Into::into).collect(),
            into: into.into(),
            separator: default_separator(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn joined(&self, record: &dyn Record) -> Option<String> {
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter_map(|field| match record.get(field) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(&self.separator))
        }
    }
}

impl<'r, R: Record> Handler<&'r mut R> for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn handle(&self, record: &'r mut R, next: Next<'_, &'r mut R>) -> Result<&'r mut R> {
        if let Some(joined) = self.joined(&*record) {
            merge_one(record, &self.into, Value::String(joined));
        }
        next.run(record)
    }
}

/// Set a top-level field to a fixed value
#[derive(Debug, Clone, Deserialize)]
pub struct Set {
    pub field: String,
    pub value: Value,
}

impl Set {
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Set {
            field: field.into(),
            value,
        }
    }
}

impl<'r, R: Record> Handler<&'r mut R> for Set {
    fn name(&self) -> &str {
        "set"
    }

    fn handle(&self, record: &'r mut R, next: Next<'_, &'r mut R>) -> Result<&'r mut R> {
        merge_one(record, &self.field, self.value.clone());
        next.run(record)
    }
}

/// Move a top-level field to a new key. A missing source is a no-op.
#[derive(Debug, Clone, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl Rename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Rename {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl<'r, R: Record> Handler<&'r mut R> for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn handle(&self, record: &'r mut R, next: Next<'_, &'r mut R>) -> Result<&'r mut R> {
        let moved = record
            .all_mut()
            .as_object_mut()
            .and_then(|map| map.shift_remove(&self.from));
        if let Some(value) = moved {
            merge_one(record, &self.to, value);
        }
        next.run(record)
    }
}

/// Drop a field, addressed by dotted path
#[derive(Debug, Clone, Deserialize)]
pub struct Remove {
    pub field: String,
}

impl Remove {
    pub fn new(field: impl Into<String>) -> Self {
        Remove {
            field: field.into(),
        }
    }
}

impl<'r, R: Record> Handler<&'r mut R> for Remove {
    fn name(&self) -> &str {
        "remove"
    }

    fn handle(&self, record: &'r mut R, next: Next<'_, &'r mut R>) -> Result<&'r mut R> {
        let path = ConcretePath::from_dotted(&self.field);
        if let Some((Segment::Key(last), parents)) = path.segments().split_last() {
            let parent = ConcretePath::from(parents.to_vec());
            match lookup_mut(record.all_mut(), &parent) {
                Some(Value::Object(map)) => {
                    map.shift_remove(last);
                }
                Some(Value::Array(arr)) => {
                    if let Ok(index) = last.parse::<usize>() {
                        if index < arr.len() {
                            arr.remove(index);
                        }
                    }
                }
                _ => {}
            }
        }
        next.run(record)
    }
}

/// Build a built-in transformer from its operation name and parameters
pub fn transformer_by_name<R>(op: &str, params: Value) -> Result<Box<Transformer<R>>, PreprocessError>
where
    R: Record + 'static,
{
    fn parse<T: for<'de> Deserialize<'de>>(op: &str, params: Value) -> Result<T, PreprocessError> {
        serde_json::from_value(params)
            .map_err(|e| PreprocessError::InvalidPlan(format!("transformer '{}': {}", op, e)))
    }

    let handler = match op {
        "concat" => transformer::<R, _>(parse::<Concat>(op, params)?),
        "set" => transformer::<R, _>(parse::<Set>(op, params)?),
        "rename" => transformer::<R, _>(parse::<Rename>(op, params)?),
        "remove" => transformer::<R, _>(parse::<Remove>(op, params)?),
        other => return Err(PreprocessError::UnknownTransformer(other.to_string())),
    };
    Ok(handler)
}
