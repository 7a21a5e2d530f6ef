use env_conditions::{Check, ConditionEvaluator, ConditionSpec, Context, StaticEnv};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// A single condition that records which value of `k` it saw by matching on it.
fn probe() -> ConditionEvaluator {
    let specs = ["runtime", "accumulated", "environment"]
        .into_iter()
        .map(|layer| {
            ConditionSpec::new(
                layer,
                Check::when(move |ctx: &Context| {
                    let k = ctx.get("k").or_else(|| ctx.get("env").and_then(|e| e.get("k")));
                    k == Some(&json!(layer))
                }),
            )
        })
        .collect();
    ConditionEvaluator::new(specs).with_env_source(StaticEnv::from_pairs([("k", "environment")]))
}

#[test]
fn test_precedence_runtime_accumulated_env() {
    let mut ev = probe();
    ev.with_context(json!({"k": "accumulated"}));
    let rt = json!({"k": "runtime"});
    assert_eq!(ev.evaluate(Some(&rt)).unwrap().first_name(), Some("runtime"));
    assert_eq!(ev.evaluate(None).unwrap().first_name(), Some("accumulated"));
    ev.reset_context();
    assert_eq!(ev.evaluate(None).unwrap().first_name(), Some("environment"));
}

#[test]
fn test_env_key_override_replaces_whole_object() {
    let ev_seen = |ctx: Value| {
        let mut ev = ConditionEvaluator::new(vec![ConditionSpec::new(
            "has_path",
            Check::when(|ctx| ctx["env"].get("PATH").is_some()),
        )])
        .with_env_source(StaticEnv::from_pairs([("PATH", "/bin")]));
        ev.with_context(ctx);
        ev.evaluate(None).unwrap().first_name().map(str::to_string)
    };
    assert_eq!(ev_seen(json!({})), Some("has_path".to_string()));
    assert_eq!(ev_seen(json!({"env": {"HOME": "/root"}})), None);
}

#[test]
fn test_reset_then_context_is_empty() {
    let mut ev = probe();
    ev.with_context(json!({"a": 1})).reset_context();
    assert_eq!(ev.context(), Context::new());
}

#[test]
fn test_context_returns_independent_copy() {
    let mut ev = probe();
    ev.with_context(json!({"k": "accumulated"}));
    let mut copy = ev.context();
    copy.insert("k".into(), json!("runtime"));
    copy.insert("extra".into(), json!(true));
    assert_eq!(Value::Object(ev.context()), json!({"k": "accumulated"}));
    assert_eq!(ev.evaluate(None).unwrap().first_name(), Some("accumulated"));
}

#[test]
fn test_evaluate_does_not_mutate_accumulated() {
    let mut ev = probe();
    ev.with_context(json!({"k": "accumulated"}));
    let before = ev.context();
    ev.evaluate(Some(&json!({"k": "runtime", "other": 1}))).unwrap();
    assert_eq!(ev.context(), before);
}

#[test]
fn test_instances_do_not_share_context() {
    let mut a = probe();
    let b = probe();
    a.with_context(json!({"k": "accumulated"}));
    assert!(b.context().is_empty());
}
