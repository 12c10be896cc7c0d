//! Runs one concrete leaf through its modifier chain

use crate::path::{assign, lookup, ConcretePath};
use crate::pipeline::{Handler, Modifier, Pipeline, PipelinedItem};
use crate::record::Record;
use anyhow::Result;
use serde_json::Value;
use std::cell::Cell;

/// What happened to a single concrete path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The chain reached its end and the final value was written back
    Written,
    /// The value was absent, null or blank; no modifier ran
    Skipped,
    /// A modifier returned without forwarding; nothing was written
    ShortCircuited,
}

/// Values that are never handed to modifiers
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub struct FieldProcessor;

impl FieldProcessor {
    /// Read the leaf at `path`, run it through `modifiers` and write the
    /// result back in place.
    ///
    /// The value written is the one the item carried when the end of the
    /// chain was reached. Handlers that keep changing the item after `next`
    /// returns do not affect the record.
    pub fn process<R: Record>(
        record: &mut R,
        path: &ConcretePath,
        modifiers: &[Box<Modifier>],
    ) -> Result<FieldOutcome> {
        let value = match lookup(record.all(), path) {
            Some(value) if !is_blank(value) => value.clone(),
            _ => {
                tracing::trace!(field = %path, "skipping blank field");
                return Ok(FieldOutcome::Skipped);
            }
        };

        let written: Cell<Option<Value>> = Cell::new(None);
        {
            let mut stages: Vec<&dyn Handler<PipelinedItem<'_>>> =
                Vec::with_capacity(modifiers.len());
            for modifier in modifiers {
                stages.push(&**modifier);
            }

            let item = PipelinedItem::new(value, path.clone(), &*record);
            Pipeline::new(&stages).run(item, |item| {
                written.set(Some(item.value.clone()));
                Ok(item)
            })?;
        }

        match written.into_inner() {
            Some(value) => {
                assign(record.all_mut(), path, value)?;
                Ok(FieldOutcome::Written)
            }
            None => {
                tracing::trace!(field = %path, "modifier chain short-circuited");
                Ok(FieldOutcome::ShortCircuited)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::modifier_fn;
    use serde_json::json;
    use std::rc::Rc;

    fn set_to(value: &'static str) -> Box<Modifier> {
        modifier_fn("set", move |mut item, next| {
            item.value = json!(value);
            next.run(item)
        })
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!(" \t\n ")));
        assert!(!is_blank(&json!(" x ")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!([])));
    }

    #[test]
    fn test_writes_final_value() {
        let mut record = json!({"a": {"b": "old"}, "c": 1});
        let outcome =
            FieldProcessor::process(&mut record, &ConcretePath::from_dotted("a.b"), &[set_to("new")])
                .unwrap();
        assert_eq!(outcome, FieldOutcome::Written);
        assert_eq!(record, json!({"a": {"b": "new"}, "c": 1}));
    }

    #[test]
    fn test_blank_values_never_reach_modifiers() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let counting = modifier_fn("count", move |item, next| {
            counter.set(counter.get() + 1);
            next.run(item)
        });
        let chain = vec![counting, set_to("changed")];

        let mut record = json!({"blank": "  ", "null": null});
        for field in ["blank", "null", "absent"] {
            let outcome =
                FieldProcessor::process(&mut record, &ConcretePath::from_dotted(field), &chain)
                    .unwrap();
            assert_eq!(outcome, FieldOutcome::Skipped);
        }

        assert_eq!(calls.get(), 0);
        assert_eq!(record, json!({"blank": "  ", "null": null}));
    }

    #[test]
    fn test_empty_chain_writes_original() {
        let mut record = json!({"a": " keep "});
        let outcome =
            FieldProcessor::process(&mut record, &ConcretePath::from_dotted("a"), &[]).unwrap();
        assert_eq!(outcome, FieldOutcome::Written);
        assert_eq!(record, json!({"a": " keep "}));
    }

    #[test]
    fn test_short_circuit_leaves_record_alone() {
        let stop = modifier_fn("stop", |mut item, _next| {
            item.value = json!("ignored");
            Ok(item)
        });
        let mut record = json!({"a": "original"});
        let outcome = FieldProcessor::process(
            &mut record,
            &ConcretePath::from_dotted("a"),
            &[stop, set_to("never")],
        )
        .unwrap();

        assert_eq!(outcome, FieldOutcome::ShortCircuited);
        assert_eq!(record, json!({"a": "original"}));
    }

    #[test]
    fn test_changes_after_next_are_not_written() {
        let late = modifier_fn("late", |item, next| {
            let mut item = next.run(item)?;
            item.value = json!("too late");
            Ok(item)
        });
        let mut record = json!({"a": "x"});
        FieldProcessor::process(
            &mut record,
            &ConcretePath::from_dotted("a"),
            &[late, set_to("in time")],
        )
        .unwrap();
        assert_eq!(record, json!({"a": "in time"}));
    }

    #[test]
    fn test_modifier_sees_record_context() {
        let prefix = modifier_fn("prefix", |mut item, next| {
            let country = item
                .record()
                .get("country")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let phone = item.as_str().unwrap_or_default().to_string();
            item.value = json!(format!("{}-{}", country, phone));
            next.run(item)
        });
        let mut record = json!({"country": "44", "phone": "1234"});
        FieldProcessor::process(&mut record, &ConcretePath::from_dotted("phone"), &[prefix])
            .unwrap();
        assert_eq!(record["phone"], "44-1234");
    }

    #[test]
    fn test_handler_error_propagates() {
        let fail = modifier_fn("fail", |_item, _next| Err(anyhow::anyhow!("rejected")));
        let mut record = json!({"a": "x"});
        let err = FieldProcessor::process(&mut record, &ConcretePath::from_dotted("a"), &[fail])
            .unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        assert_eq!(record, json!({"a": "x"}));
    }
}
