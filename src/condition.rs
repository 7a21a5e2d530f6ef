use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::errors::{ConditionError, PredicateError, Result};

/// Trait for checks computed from the effective context.
///
/// The returned value is coerced with [`truthy`], so a predicate may return
/// any JSON value, not just a boolean.
pub trait Predicate: Send + Sync {
    fn test(&self, ctx: &Context) -> std::result::Result<Value, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(&Context) -> std::result::Result<Value, PredicateError> + Send + Sync,
{
    fn test(&self, ctx: &Context) -> std::result::Result<Value, PredicateError> {
        self(ctx)
    }
}

/// What a condition checks: a fixed value or a predicate over the context.
#[derive(Clone)]
pub enum Check {
    Static(Value),
    Predicate(Arc<dyn Predicate>),
}

impl Check {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Context) -> std::result::Result<Value, PredicateError> + Send + Sync + 'static,
    {
        Check::Predicate(Arc::new(f))
    }

    /// Use a hand-written [`Predicate`] implementation.
    pub fn from_predicate<P: Predicate + 'static>(p: P) -> Self {
        Check::Predicate(Arc::new(p))
    }

    /// Infallible boolean predicate.
    pub fn when<F>(f: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        Check::predicate(move |ctx| Ok(Value::Bool(f(ctx))))
    }

    /// Resolve this check to a boolean against `ctx`.
    pub fn holds(&self, ctx: &Context) -> std::result::Result<bool, PredicateError> {
        match self {
            Check::Static(v) => Ok(truthy(v)),
            Check::Predicate(p) => p.test(ctx).map(|v| truthy(&v)),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Check::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Value> for Check {
    fn from(v: Value) -> Self {
        Check::Static(v)
    }
}

impl From<bool> for Check {
    fn from(b: bool) -> Self {
        Check::Static(Value::Bool(b))
    }
}

/// A named check.
#[derive(Clone, Debug)]
pub struct ConditionSpec {
    pub name: String,
    pub check: Check,
}

impl ConditionSpec {
    pub fn new(name: impl Into<String>, check: impl Into<Check>) -> Self {
        Self { name: name.into(), check: check.into() }
    }

    /// Validate one JSON element of a condition list.
    ///
    /// `check` only has to be present; its value becomes a static check.
    pub fn from_json(index: usize, raw: &Value) -> Result<Self> {
        let obj = raw.as_object().ok_or_else(|| {
            ConditionError::InvalidArgument(format!("Condition at index {index} must be an object"))
        })?;
        let check = obj.get("check").ok_or_else(|| missing(index, "check"))?;
        let name = obj.get("name").ok_or_else(|| missing(index, "name"))?;
        let name = match name {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Self { name, check: Check::Static(check.clone()) })
    }
}

fn missing(index: usize, prop: &str) -> ConditionError {
    ConditionError::InvalidArgument(format!(
        "Condition at index {index} missing required property '{prop}'"
    ))
}

/// Validate a whole JSON condition list, stopping at the first bad element.
pub fn parse_conditions(raw: &Value) -> Result<Vec<ConditionSpec>> {
    let items = raw
        .as_array()
        .ok_or_else(|| ConditionError::InvalidArgument("Conditions must be an array".into()))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| ConditionSpec::from_json(i, item))
        .collect()
}

/// Boolean coercion: null, false, zero and "" are false, everything else true.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
