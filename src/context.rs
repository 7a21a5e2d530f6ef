use serde_json::{Map, Value};

/// Key-value mapping handed to predicate checks.
pub type Context = Map<String, Value>;

/// Reserved key under which environment variables are exposed.
pub const ENV_KEY: &str = "env";

/// Supplies the lowest-precedence context layer.
///
/// The evaluator asks for a fresh snapshot on every evaluation.
pub trait EnvSource: Send + Sync {
    fn snapshot(&self) -> Context;
}

/// Reads the live process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn snapshot(&self) -> Context {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    Value::String(v.to_string_lossy().into_owned()),
                )
            })
            .collect()
    }
}

/// A fixed environment, useful in tests or when embedding.
#[derive(Clone, Debug, Default)]
pub struct StaticEnv {
    vars: Context,
}

impl StaticEnv {
    pub fn new(vars: Context) -> Self {
        Self { vars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds from string pairs, e.g. `[("STAGE", "prod")]`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { vars }
    }
}

impl EnvSource for StaticEnv {
    fn snapshot(&self) -> Context {
        self.vars.clone()
    }
}

/// Merge `layer` into `base`, replacing whole values on key conflicts.
pub(crate) fn merge_shallow(base: &mut Context, layer: &Context) {
    for (k, v) in layer {
        base.insert(k.clone(), v.clone());
    }
}

/// Builds the context a single evaluation sees: env < accumulated < runtime.
pub(crate) fn layer(env: Context, accumulated: &Context, runtime: Option<&Context>) -> Context {
    let mut effective = Context::new();
    effective.insert(ENV_KEY.to_string(), Value::Object(env));
    merge_shallow(&mut effective, accumulated);
    if let Some(rt) = runtime {
        merge_shallow(&mut effective, rt);
    }
    effective
}
