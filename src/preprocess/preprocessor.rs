//! The orchestrator tying both stages together

use crate::path::{expand, FieldSpec};
use crate::pipeline::{Modifier, Transformer};
use crate::preprocess::field_processor::{FieldOutcome, FieldProcessor};
use crate::preprocess::record_processor::RecordProcessor;
use crate::record::Record;
use anyhow::Result;
use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

/// Field specifiers mapped to their modifier chains.
///
/// Specs are parsed when they are inserted, so a malformed spec is reported
/// while the map is being built rather than during `apply()`. Chains run in
/// the order their specs were inserted; inserting a spec twice replaces its
/// chain.
#[derive(Default)]
pub struct ModifierMap {
    fields: IndexMap<FieldSpec, Vec<Box<Modifier>>>,
}

impl ModifierMap {
    pub fn new() -> Self {
        ModifierMap::default()
    }

    pub fn insert<I>(&mut self, spec: &str, modifiers: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Box<Modifier>>,
    {
        let spec = FieldSpec::parse(spec)?;
        self.fields.insert(spec, modifiers.into_iter().collect());
        Ok(self)
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with<I>(mut self, spec: &str, modifiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Box<Modifier>>,
    {
        self.insert(spec, modifiers)?;
        Ok(self)
    }

    pub fn get(&self, spec: &str) -> Option<&[Box<Modifier>]> {
        self.fields
            .iter()
            .find(|(key, _)| key.as_str() == spec)
            .map(|(_, chain)| chain.as_slice())
    }

    pub fn contains(&self, spec: &str) -> bool {
        self.get(spec).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSpec, &[Box<Modifier>])> {
        self.fields.iter().map(|(spec, chain)| (spec, chain.as_slice()))
    }

    pub fn field_specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for ModifierMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (spec, chain) in &self.fields {
            let names: Vec<&str> = chain.iter().map(|m| m.name()).collect();
            map.entry(&spec.as_str(), &names);
        }
        map.finish()
    }
}

/// Counters collected during one `apply()` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Transformers configured for the run
    pub transformers: usize,
    /// Concrete paths whose chain finished and were written back
    pub written: usize,
    /// Concrete paths skipped because their value was absent or blank
    pub skipped: usize,
    /// Concrete paths whose chain was cut short by a modifier
    pub short_circuited: usize,
    /// Wildcard specs that expanded to no paths at all
    pub unmatched_specs: usize,
}

/// Normalizes one record with a transformer list and a modifier map.
///
/// Transformers always run first so that modifiers see any fields they add.
///
/// # Example
///
/// ```rust
/// use request_preprocessor::{modifier, ModifierMap, Preprocessor, JsonRecord};
/// use request_preprocessor::builtin::{Lowercase, Trim};
/// use serde_json::json;
///
/// # fn main() -> anyhow::Result<()> {
/// let modifiers = ModifierMap::new().with("email", [modifier(Trim), modifier(Lowercase)])?;
/// let mut record = JsonRecord::from_value(json!({"email": "  Joe.DOE@eXample.com "}));
///
/// Preprocessor::make(&mut record, &modifiers, &[]).apply()?;
/// assert_eq!(record.into_value(), json!({"email": "joe.doe@example.com"}));
/// # Ok(())
/// # }
/// ```
pub struct Preprocessor<'a, R: Record> {
    record: &'a mut R,
    modifiers: Option<&'a ModifierMap>,
    transformers: &'a [Box<Transformer<R>>],
}

impl<'a, R: Record> Preprocessor<'a, R> {
    /// A preprocessor with no modifiers and no transformers
    pub fn new(record: &'a mut R) -> Self {
        Preprocessor {
            record,
            modifiers: None,
            transformers: &[],
        }
    }

    pub fn make(
        record: &'a mut R,
        modifiers: &'a ModifierMap,
        transformers: &'a [Box<Transformer<R>>],
    ) -> Self {
        Preprocessor::new(record)
            .with_modifiers(modifiers)
            .with_transformers(transformers)
    }

    pub fn with_modifiers(mut self, modifiers: &'a ModifierMap) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn with_transformers(mut self, transformers: &'a [Box<Transformer<R>>]) -> Self {
        self.transformers = transformers;
        self
    }

    pub fn modifiers(&self) -> Option<&ModifierMap> {
        self.modifiers
    }

    pub fn transformers(&self) -> &[Box<Transformer<R>>] {
        self.transformers
    }

    pub fn record(&self) -> &R {
        self.record
    }

    /// Run the transformer stage, then every modifier chain.
    ///
    /// The first handler error aborts the call. Fields processed before the
    /// failure keep their new values; nothing is rolled back.
    pub fn apply(&mut self) -> Result<ApplyStats> {
        let mut stats = ApplyStats {
            transformers: self.transformers.len(),
            ..ApplyStats::default()
        };

        if !self.transformers.is_empty() {
            debug!(count = self.transformers.len(), "applying transformers");
            RecordProcessor::process(&mut *self.record, self.transformers)?;
        }

        let Some(modifiers) = self.modifiers else {
            return Ok(stats);
        };

        for (spec, chain) in modifiers.iter() {
            let paths = expand(self.record.all(), spec);
            if paths.is_empty() {
                debug!(spec = %spec, "field spec matched nothing");
                stats.unmatched_specs += 1;
                continue;
            }

            debug!(spec = %spec, paths = paths.len(), modifiers = chain.len(), "applying modifiers");
            for path in &paths {
                match FieldProcessor::process(&mut *self.record, path, chain)? {
                    FieldOutcome::Written => stats.written += 1,
                    FieldOutcome::Skipped => stats.skipped += 1,
                    FieldOutcome::ShortCircuited => stats.short_circuited += 1,
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreprocessError;
    use crate::pipeline::{modifier_fn, transformer_fn};
    use crate::record::JsonRecord;
    use serde_json::{json, Map};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn trim() -> Box<Modifier> {
        modifier_fn("trim", |mut item, next| {
            if let Some(s) = item.as_str() {
                item.value = json!(s.trim());
            }
            next.run(item)
        })
    }

    #[test]
    fn test_map_rejects_bad_spec() {
        let err = ModifierMap::new().with("a..b", [trim()]).unwrap_err();
        let err = err.downcast_ref::<PreprocessError>().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_map_lookup() {
        let map = ModifierMap::new()
            .with("email", [trim()])
            .unwrap()
            .with("items.*.name", [trim(), trim()])
            .unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.contains("email"));
        assert_eq!(map.get("items.*.name").unwrap().len(), 2);
        assert!(map.get("missing").is_none());
        let specs: Vec<&str> = map.field_specs().map(|s| s.as_str()).collect();
        assert_eq!(specs, vec!["email", "items.*.name"]);
    }

    #[test]
    fn test_transformers_run_before_modifiers() {
        let add_name = transformer_fn("add_name", |record: &mut JsonRecord, next| {
            let mut partial = Map::new();
            partial.insert("name".to_string(), json!("  Added  "));
            record.merge(partial);
            next.run(record)
        });
        let transformers = vec![add_name];
        let modifiers = ModifierMap::new().with("name", [trim()]).unwrap();

        let mut record = JsonRecord::new();
        let stats = Preprocessor::make(&mut record, &modifiers, &transformers)
            .apply()
            .unwrap();

        assert_eq!(record.input("name"), "Added");
        assert_eq!(stats.transformers, 1);
        assert_eq!(stats.written, 1);
    }

    #[test]
    fn test_stats_distinguish_unmatched_from_skipped() {
        let modifiers = ModifierMap::new()
            .with("items.*.name", [trim()])
            .unwrap()
            .with("blank", [trim()])
            .unwrap();
        let mut record = JsonRecord::from_value(json!({"items": [], "blank": " "}));

        let stats = Preprocessor::new(&mut record)
            .with_modifiers(&modifiers)
            .apply()
            .unwrap();

        assert_eq!(stats.unmatched_specs, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.written, 0);
    }

    #[test]
    fn test_failure_stops_later_specs() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let record_and_forward = modifier_fn("log", move |item, next| {
            log.borrow_mut().push(item.field());
            next.run(item)
        });
        let fail = modifier_fn("fail", |_item, _next| Err(anyhow::anyhow!("invalid")));

        let modifiers = ModifierMap::new()
            .with("a", [trim()])
            .unwrap()
            .with("b", [fail])
            .unwrap()
            .with("c", [record_and_forward])
            .unwrap();
        let mut record = JsonRecord::from_value(json!({"a": " a ", "b": "b", "c": "c"}));

        let err = Preprocessor::new(&mut record)
            .with_modifiers(&modifiers)
            .apply()
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid");
        assert!(seen.borrow().is_empty());
        // work done before the failure is kept
        assert_eq!(record.into_value(), json!({"a": "a", "b": "b", "c": "c"}));
    }

    #[test]
    fn test_accessors() {
        let modifiers = ModifierMap::new().with("x", [trim()]).unwrap();
        let mut record = JsonRecord::new();
        let preprocessor = Preprocessor::make(&mut record, &modifiers, &[]);
        assert!(preprocessor.modifiers().unwrap().contains("x"));
        assert!(preprocessor.transformers().is_empty());
        assert_eq!(preprocessor.record(), &JsonRecord::new());
    }

    #[test]
    fn test_debug_lists_handler_names() {
        let map = ModifierMap::new().with("email", [trim()]).unwrap();
        assert_eq!(format!("{:?}", map), r#"{"email": ["trim"]}"#);
    }
}
