//! Ready-made per-field modifiers
//!
//! String modifiers leave non-string values untouched and always forward.

use crate::error::PreprocessError;
use crate::pipeline::{modifier, Handler, Modifier, Next, PipelinedItem};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D+").unwrap());

/// Names accepted by [`modifier_by_name`]
pub const MODIFIER_NAMES: &[&str] = &[
    "trim",
    "ltrim",
    "rtrim",
    "lowercase",
    "uppercase",
    "collapse_whitespace",
    "digits_only",
    "null_if_empty",
];

/// Replace a string value with `f(value)`
fn map_str(value: &mut Value, f: impl FnOnce(&str) -> String) {
    if let Value::String(s) = value {
        *s = f(s.as_str());
    }
}

/// Remove surrounding whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl<'r> Handler<PipelinedItem<'r>> for Trim {
    fn name(&self) -> &str {
        "trim"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, |s| s.trim().to_string());
        next.run(item)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrimStart;

impl<'r> Handler<PipelinedItem<'r>> for TrimStart {
    fn name(&self) -> &str {
        "ltrim"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, |s| s.trim_start().to_string());
        next.run(item)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrimEnd;

impl<'r> Handler<PipelinedItem<'r>> for TrimEnd {
    fn name(&self) -> &str {
        "rtrim"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, |s| s.trim_end().to_string());
        next.run(item)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl<'r> Handler<PipelinedItem<'r>> for Lowercase {
    fn name(&self) -> &str {
        "lowercase"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, str::to_lowercase);
        next.run(item)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl<'r> Handler<PipelinedItem<'r>> for Uppercase {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, str::to_uppercase);
        next.run(item)
    }
}

/// Squash every run of whitespace into a single space
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseWhitespace;

impl<'r> Handler<PipelinedItem<'r>> for CollapseWhitespace {
    fn name(&self) -> &str {
        "collapse_whitespace"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, |s| WHITESPACE_RUN.replace_all(s, " ").into_owned());
        next.run(item)
    }
}

/// Keep only digits, e.g. for phone numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitsOnly;

impl<'r> Handler<PipelinedItem<'r>> for DigitsOnly {
    fn name(&self) -> &str {
        "digits_only"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        map_str(&mut item.value, |s| NON_DIGIT.replace_all(s, "").into_owned());
        next.run(item)
    }
}

/// Turn a string that earlier modifiers emptied into `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIfEmpty;

impl<'r> Handler<PipelinedItem<'r>> for NullIfEmpty {
    fn name(&self) -> &str {
        "null_if_empty"
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        if matches!(&item.value, Value::String(s) if s.trim().is_empty()) {
            item.value = Value::Null;
        }
        next.run(item)
    }
}

/// Apply a fallible function to the value, then forward
pub struct MapValue<F> {
    name: &'static str,
    func: F,
}

impl<F> MapValue<F>
where
    F: Fn(Value) -> Result<Value>,
{
    pub fn new(name: &'static str, func: F) -> Self {
        MapValue { name, func }
    }
}

impl<'r, F> Handler<PipelinedItem<'r>> for MapValue<F>
where
    F: Fn(Value) -> Result<Value>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn handle(
        &self,
        mut item: PipelinedItem<'r>,
        next: Next<'_, PipelinedItem<'r>>,
    ) -> Result<PipelinedItem<'r>> {
        let value = std::mem::take(&mut item.value);
        item.value = (self.func)(value)?;
        next.run(item)
    }
}

/// Look up a built-in modifier by its configuration name
pub fn modifier_by_name(name: &str) -> Result<Box<Modifier>, PreprocessError> {
    let handler = match name {
        "trim" => modifier(Trim),
        "ltrim" => modifier(TrimStart),
        "rtrim" => modifier(TrimEnd),
        "lowercase" => modifier(Lowercase),
        "uppercase" => modifier(Uppercase),
        "collapse_whitespace" => modifier(CollapseWhitespace),
        "digits_only" => modifier(DigitsOnly),
        "null_if_empty" => modifier(NullIfEmpty),
        other => return Err(PreprocessError::UnknownModifier(other.to_string())),
    };
    Ok(handler)
}
