use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use crate::condition::{parse_conditions, ConditionSpec};
use crate::context::{layer, merge_shallow, Context, EnvSource, ProcessEnv};
use crate::errors::{ConditionError, Result};

/// A matched condition: always `(true, name)`.
pub type Match = (bool, String);

/// Result of one evaluation pass.
///
/// Serializes as `[[true, "a"], ...]` or as the default value itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<'a> {
    /// At least one condition held, in condition order.
    Matched(Vec<Match>),
    /// Nothing held; this is the evaluator's stored default itself.
    Default(&'a Value),
}

impl<'a> Outcome<'a> {
    pub fn matches(&self) -> &[Match] {
        match self {
            Outcome::Matched(m) => m,
            Outcome::Default(_) => &[],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matches().iter().map(|(_, name)| name.as_str())
    }

    /// Name of the first condition that held, e.g. the environment to pick.
    pub fn first_name(&self) -> Option<&str> {
        self.names().next()
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Outcome::Default(_))
    }

    /// JSON form: `[[true, "a"], ...]`, or a copy of the default.
    pub fn to_value(&self) -> Value {
        match self {
            Outcome::Matched(m) => Value::Array(m.iter().map(|(t, n)| json!([t, n])).collect()),
            Outcome::Default(d) => (*d).clone(),
        }
    }
}

/// Evaluates a fixed list of named conditions against layered context.
///
/// Context is layered per evaluation, lowest precedence first: the
/// environment (under `env`), context accumulated with [`with_context`],
/// then the runtime context passed to [`evaluate`].
///
/// [`with_context`]: ConditionEvaluator::with_context
/// [`evaluate`]: ConditionEvaluator::evaluate
#[derive(Clone)]
pub struct ConditionEvaluator {
    conditions: Vec<ConditionSpec>,
    default: Value,
    accumulated: Context,
    env: Arc<dyn EnvSource>,
}

impl ConditionEvaluator {
    pub fn new(conditions: Vec<ConditionSpec>) -> Self {
        Self {
            conditions,
            default: Value::Array(Vec::new()),
            accumulated: Context::new(),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Build from a JSON condition list, validating its shape.
    pub fn from_json(conditions: &Value, default: Value) -> Result<Self> {
        let specs = parse_conditions(conditions)?;
        debug!(count = specs.len(), "conditions validated");
        Ok(Self::new(specs).with_default(default))
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn with_env_source<E: EnvSource + 'static>(mut self, env: E) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn conditions(&self) -> &[ConditionSpec] {
        &self.conditions
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Merge an object into the accumulated context. Non-objects are ignored.
    pub fn with_context(&mut self, ctx: Value) -> &mut Self {
        match ctx {
            Value::Object(map) => merge_shallow(&mut self.accumulated, &map),
            other => debug!(kind = kind_of(&other), "ignoring non-object context"),
        }
        self
    }

    pub fn reset_context(&mut self) -> &mut Self {
        self.accumulated.clear();
        self
    }

    /// Copy of the accumulated context.
    pub fn context(&self) -> Context {
        self.accumulated.clone()
    }

    /// Evaluate every condition in order against the layered context.
    ///
    /// A failing predicate aborts the whole pass; no partial matches are
    /// returned.
    pub fn evaluate(&self, runtime: Option<&Value>) -> Result<Outcome<'_>> {
        let runtime = match runtime {
            Some(Value::Object(map)) => Some(map),
            Some(Value::Null) | None => None,
            Some(other) => {
                debug!(kind = kind_of(other), "ignoring non-object runtime context");
                None
            }
        };
        let effective = layer(self.env.snapshot(), &self.accumulated, runtime);

        let mut matched = Vec::new();
        for spec in &self.conditions {
            let holds = spec.check.holds(&effective).map_err(|source| {
                warn!(name = %spec.name, error = %source, "condition check failed");
                ConditionError::Evaluation { name: spec.name.clone(), source }
            })?;
            trace!(name = %spec.name, holds, "condition evaluated");
            if holds {
                matched.push((true, spec.name.clone()));
            }
        }

        debug!(total = self.conditions.len(), matched = matched.len(), "evaluation done");
        if matched.is_empty() {
            Ok(Outcome::Default(&self.default))
        } else {
            Ok(Outcome::Matched(matched))
        }
    }
}

impl std::fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEvaluator")
            .field("conditions", &self.conditions)
            .field("default", &self.default)
            .field("accumulated", &self.accumulated)
            .finish_non_exhaustive()
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
