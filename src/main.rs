use std::process;

use clap::Parser;
use env_conditions::{ConditionEvaluator, Outcome, StaticEnv};
use itertools::Itertools;
use serde_json::Value;
use tracing::Level;

/// Evaluate JSON conditions and print which ones hold.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON array of {"check": ..., "name": ...} objects, or @file to read it from
    conditions: String,
    /// Context object to accumulate (repeatable, later wins)
    #[arg(long = "context")]
    contexts: Vec<String>,
    /// Runtime context object, highest precedence
    #[arg(long)]
    runtime: Option<String>,
    /// Fallback JSON returned when nothing matches
    #[arg(long)]
    default: Option<String>,
    /// Do not expose the process environment under `env`
    #[arg(long)]
    no_env: bool,
    /// Print only the first matched name
    #[arg(long)]
    first: bool,
    /// Print matched names comma-joined
    #[arg(long, conflicts_with = "first")]
    names: bool,
    /// Log level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let raw = read_conditions(&args.conditions).unwrap_or_else(|e| fail(&e));
    let conditions = parse_json("conditions", &raw);
    let default = parse_default(args.default.as_deref());

    let mut ev = ConditionEvaluator::from_json(&conditions, default)
        .unwrap_or_else(|e| fail(&e.to_string()));
    if args.no_env {
        ev = ev.with_env_source(StaticEnv::empty());
    }
    for ctx in &args.contexts {
        ev.with_context(parse_json("context", ctx));
    }
    let runtime = args.runtime.as_deref().map(|r| parse_json("runtime", r));

    let out = ev.evaluate(runtime.as_ref()).unwrap_or_else(|e| fail(&e.to_string()));

    match render(&out, args.first, args.names) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(&format!("Cannot render output: {e}")),
    }
}

/// Inline JSON, or the contents of the file named after a leading `@`.
fn read_conditions(arg: &str) -> Result<String, String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("Cannot read {path}: {e}")),
        None => Ok(arg.to_string()),
    }
}

// Like the library default, a missing fallback is an empty array.
fn parse_default(arg: Option<&str>) -> Value {
    match arg {
        Some(d) => serde_json::from_str(d).unwrap_or_else(|_| Value::String(d.to_string())),
        None => Value::Array(Vec::new()),
    }
}

/// `--first` and `--names` only shape matches; a default is printed as-is.
fn render(out: &Outcome<'_>, first: bool, names: bool) -> serde_json::Result<String> {
    match (out, first, names) {
        (Outcome::Matched(_), true, _) => serde_json::to_string_pretty(&out.first_name()),
        (Outcome::Matched(_), _, true) => serde_json::to_string_pretty(&out.names().join(",")),
        _ => serde_json::to_string_pretty(out),
    }
}

fn parse_json(what: &str, s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|e| fail(&format!("Invalid {what} JSON: {e}")))
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}
