//! Preprocessing plans loaded from JSON
//!
//! A plan names built-in handlers instead of holding them, so it can live in
//! a configuration file:
//!
//! ```json
//! {
//!   "transformers": [
//!     {"op": "concat", "fields": ["first_name", "last_name"], "into": "full_name"}
//!   ],
//!   "modifiers": {
//!     "email": ["trim", "lowercase"],
//!     "items.*.name": ["trim", "collapse_whitespace"]
//!   }
//! }
//! ```
//!
//! Every name and field spec is resolved by [`PreprocessPlan::compile`], so a
//! bad plan fails before any record is touched.

use crate::builtin::{modifier_by_name, transformer_by_name};
use crate::error::PreprocessError;
use crate::pipeline::{Modifier, Transformer};
use crate::preprocess::{ApplyStats, ModifierMap, Preprocessor};
use crate::record::Record;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// One transformer entry: an operation name plus its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerEntry {
    pub op: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Declarative description of a preprocessing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreprocessPlan {
    #[serde(default)]
    pub transformers: Vec<TransformerEntry>,

    /// Field spec to modifier names, in execution order
    #[serde(default)]
    pub modifiers: IndexMap<String, Vec<String>>,
}

impl PreprocessPlan {
    pub fn from_reader<T: Read>(reader: T) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| PreprocessError::InvalidPlan(e.to_string()).into())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open plan: {}", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to load plan: {}", path.display()))
    }

    /// Resolve every handler name and field spec
    pub fn compile<R>(&self) -> Result<CompiledPlan<R>>
    where
        R: Record + 'static,
    {
        let mut transformers = Vec::with_capacity(self.transformers.len());
        for entry in &self.transformers {
            transformers.push(transformer_by_name::<R>(
                &entry.op,
                Value::Object(entry.params.clone()),
            )?);
        }

        let mut modifiers = ModifierMap::new();
        for (spec, names) in &self.modifiers {
            let chain = names
                .iter()
                .map(|name| modifier_by_name(name))
                .collect::<Result<Vec<Box<Modifier>>, PreprocessError>>()?;
            modifiers.insert(spec, chain)?;
        }

        Ok(CompiledPlan {
            modifiers,
            transformers,
        })
    }
}

impl FromStr for PreprocessPlan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| PreprocessError::InvalidPlan(e.to_string()).into())
    }
}

/// A plan with every handler built, reusable across records
pub struct CompiledPlan<R: Record> {
    modifiers: ModifierMap,
    transformers: Vec<Box<Transformer<R>>>,
}

impl<R: Record> CompiledPlan<R> {
    pub fn modifiers(&self) -> &ModifierMap {
        &self.modifiers
    }

    pub fn transformers(&self) -> &[Box<Transformer<R>>] {
        &self.transformers
    }

    /// A preprocessor for one record, borrowing this plan's handlers
    pub fn preprocessor<'a>(&'a self, record: &'a mut R) -> Preprocessor<'a, R> {
        Preprocessor::make(record, &self.modifiers, &self.transformers)
    }

    pub fn apply(&self, record: &mut R) -> Result<ApplyStats> {
        self.preprocessor(record).apply()
    }
}
