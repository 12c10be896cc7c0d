//! The mutable record being preprocessed
//!
//! Any type that can hand out its whole `serde_json::Value` tree can be
//! preprocessed. Path reads, merges and replacements are provided on top of
//! those two accessors.

use crate::path::{lookup, ConcretePath};
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// A mutable, arbitrarily nested data container
pub trait Record {
    /// The whole record
    fn all(&self) -> &Value;

    fn all_mut(&mut self) -> &mut Value;

    /// Read a value by dotted path. Integer-like segments address sequence
    /// elements.
    fn get(&self, path: &str) -> Option<&Value> {
        lookup(self.all(), &ConcretePath::from_dotted(path))
    }

    /// Overwrite top-level keys with the entries of `partial`.
    ///
    /// A record whose root is not a mapping is replaced by an empty mapping
    /// before merging.
    fn merge(&mut self, partial: Map<String, Value>) {
        let root = self.all_mut();
        if !root.is_object() {
            *root = Value::Object(Map::new());
        }
        if let Value::Object(map) = root {
            map.extend(partial);
        }
    }

    fn replace(&mut self, data: Value) {
        *self.all_mut() = data;
    }
}

// `Value::get` is an inherent method and shadows `Record::get` on plain
// values; call `Record::get(&value, path)` for dotted lookups.
impl Record for Value {
    fn all(&self) -> &Value {
        self
    }

    fn all_mut(&mut self) -> &mut Value {
        self
    }
}

/// Request-like record wrapper around a JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRecord {
    data: Value,
}

impl JsonRecord {
    /// An empty record
    pub fn new() -> Self {
        JsonRecord {
            data: Value::Object(Map::new()),
        }
    }

    pub fn from_value(data: Value) -> Self {
        JsonRecord { data }
    }

    pub fn into_value(self) -> Value {
        self.data
    }

    /// Read a field by dotted path, `Null` when absent
    pub fn input(&self, path: &str) -> &Value {
        self.get(path).unwrap_or(&NULL)
    }
}

impl Default for JsonRecord {
    fn default() -> Self {
        JsonRecord::new()
    }
}

impl From<Value> for JsonRecord {
    fn from(data: Value) -> Self {
        JsonRecord::from_value(data)
    }
}

impl Record for JsonRecord {
    fn all(&self) -> &Value {
        &self.data
    }

    fn all_mut(&mut self) -> &mut Value {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_by_dotted_path() {
        let record = JsonRecord::from_value(json!({"user": {"tags": ["a", "b"]}}));
        assert_eq!(record.get("user.tags.1").unwrap(), "b");
        assert!(record.get("user.missing").is_none());
        assert_eq!(record.input("user.missing"), &Value::Null);
    }

    #[test]
    fn test_merge_overwrites_top_level() {
        let mut record = JsonRecord::from_value(json!({"a": 1, "b": {"c": 2}}));
        let partial = json!({"b": 3, "d": 4});
        if let Value::Object(map) = partial {
            record.merge(map);
        }
        assert_eq!(record.into_value(), json!({"a": 1, "b": 3, "d": 4}));
    }

    #[test]
    fn test_merge_into_non_object_root() {
        let mut record = json!(["x"]);
        let mut partial = Map::new();
        partial.insert("k".to_string(), json!("v"));
        record.merge(partial);
        assert_eq!(record, json!({"k": "v"}));
    }

    #[test]
    fn test_replace() {
        let mut record = JsonRecord::new();
        record.replace(json!({"fresh": true}));
        assert_eq!(record.all(), &json!({"fresh": true}));
    }
}
