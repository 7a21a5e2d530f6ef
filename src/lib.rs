pub mod errors;
pub mod context;
pub mod condition;
pub mod engine;

use serde_json::Value;

pub use condition::{truthy, Check, ConditionSpec, Predicate};
pub use context::{Context, EnvSource, ProcessEnv, StaticEnv, ENV_KEY};
pub use engine::{ConditionEvaluator, Match, Outcome};
pub use errors::{ConditionError, PredicateError, Result};

/// Convenience: validate JSON conditions, merge `context` into the
/// accumulated layer and evaluate against the process environment.
///
/// Returns `[[true, name], ...]` or a copy of `default`.
pub fn evaluate_json(conditions: &Value, default: Value, context: Value) -> Result<Value> {
    let mut ev = ConditionEvaluator::from_json(conditions, default)?;
    ev.with_context(context);
    let out = ev.evaluate(None)?.to_value();
    Ok(out)
}
