//! Runs the whole record through the transformer chain

use crate::pipeline::{Handler, Pipeline, Transformer};
use crate::record::Record;
use anyhow::Result;

pub struct RecordProcessor;

impl RecordProcessor {
    /// Send `record` through `transformers` in order.
    ///
    /// Transformers work on the record in place; one that wants to swap in a
    /// completely new record does so with [`Record::replace`]. The terminal
    /// step hands the record back untouched.
    pub fn process<'a, R: Record>(
        record: &'a mut R,
        transformers: &[Box<Transformer<R>>],
    ) -> Result<&'a mut R> {
        let mut stages: Vec<&dyn Handler<&'a mut R>> = Vec::with_capacity(transformers.len());
        for transformer in transformers {
            stages.push(&**transformer);
        }

        Pipeline::new(&stages).run(record, Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transformer_fn;
    use crate::record::JsonRecord;
    use serde_json::{json, Map, Value};

    fn add(key: &'static str, value: Value) -> Box<Transformer<JsonRecord>> {
        transformer_fn("add", move |record: &mut JsonRecord, next| {
            let mut partial = Map::new();
            partial.insert(key.to_string(), value.clone());
            record.merge(partial);
            next.run(record)
        })
    }

    #[test]
    fn test_transformers_run_in_order() {
        let copy_a_into_b = transformer_fn("copy", |record: &mut JsonRecord, next| {
            let a = record.input("a").clone();
            let mut partial = Map::new();
            partial.insert("b".to_string(), a);
            record.merge(partial);
            next.run(record)
        });

        let mut record = JsonRecord::new();
        RecordProcessor::process(&mut record, &[add("a", json!(1)), copy_a_into_b]).unwrap();
        assert_eq!(record.into_value(), json!({"a": 1, "b": 1}));
    }

    #[test]
    fn test_empty_list_is_noop() {
        let mut record = JsonRecord::from_value(json!({"x": 1}));
        RecordProcessor::process(&mut record, &[]).unwrap();
        assert_eq!(record.into_value(), json!({"x": 1}));
    }

    #[test]
    fn test_replace_swaps_whole_record() {
        let reset = transformer_fn("reset", |record: &mut JsonRecord, next| {
            record.replace(json!({"fresh": true}));
            next.run(record)
        });
        let mut record = JsonRecord::from_value(json!({"old": 1}));
        RecordProcessor::process(&mut record, &[reset, add("later", json!(2))]).unwrap();
        assert_eq!(record.into_value(), json!({"fresh": true, "later": 2}));
    }

    #[test]
    fn test_short_circuit_stops_later_transformers() {
        let stop = transformer_fn("stop", |record: &mut JsonRecord, _next| Ok(record));
        let mut record = JsonRecord::new();
        RecordProcessor::process(&mut record, &[add("a", json!(1)), stop, add("b", json!(2))])
            .unwrap();
        assert_eq!(record.into_value(), json!({"a": 1}));
    }
}
