//! memogate — probe a memoized endpoint from the command line
//!
//! Runs one templated call N times and reports status, latency and cache
//! counters, which makes the hit/miss behaviour of a TTL easy to see.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use memogate::{
    CallArgs, CallStats, Flavor, JsonResponse, MemoizedCall, Method, Response, Session,
    SessionConfig,
};
use serde_json::Value;

/// Memoized HTTP call probe
#[derive(Parser)]
#[command(name = "memogate")]
#[command(version)]
#[command(about = "Invoke a memoized HTTP endpoint and report cache behaviour")]
struct Args {
    /// Path template, e.g. "delay/{n}" or "status/{}"
    template: String,

    /// Positional values for `{}` / `{0}` placeholders
    values: Vec<String>,

    /// Config file (default: $MEMOGATE_CONFIG, ~/.memogate/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL; skips config file lookup when given
    #[arg(short, long, env = "MEMOGATE_BASE_URL")]
    base_url: Option<String>,

    /// Cache TTL in seconds (overrides the config; 0 disables caching)
    #[arg(short, long)]
    ttl: Option<u64>,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    method: Method,

    /// Send a JSON body and decode the response as JSON
    #[arg(long)]
    json: bool,

    /// Number of invocations
    #[arg(short = 'n', long, default_value_t = 1)]
    repeat: u32,

    /// Named argument (key=value); values parse as JSON when they can
    #[arg(short = 'a', long = "arg", value_parser = parse_key_value)]
    named: Vec<(String, String)>,

    /// Query parameter (key=value)
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Bust the entry before the first invocation
    #[arg(long)]
    bust: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Interpret a CLI value as JSON when it parses, else as a plain string.
fn cli_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let session = match &args.base_url {
        Some(base_url) => {
            let ttl = Duration::from_secs(args.ttl.unwrap_or(0));
            Session::builder(base_url.as_str()).cache_ttl(ttl).build()?
        }
        None => {
            let mut config = SessionConfig::load(args.config.as_deref())?;
            if let Some(ttl) = args.ttl {
                config.cache_ttl_secs = ttl;
            }
            Session::from_config(&config)?
        }
    };

    let mut call_args = CallArgs::new();
    for value in &args.values {
        call_args = call_args.arg(cli_value(value));
    }
    for (name, value) in &args.named {
        call_args = call_args.named(name.as_str(), cli_value(value));
    }
    for (key, value) in &args.params {
        call_args = call_args.param(key.as_str(), value);
    }

    let stats = if args.json {
        let call = session.request_json(args.method, &args.template)?;
        probe(&call, &call_args, &args, |res: &JsonResponse| {
            (res.status(), serde_json::to_string_pretty(&res.body).unwrap_or_default())
        })
        .await?
    } else {
        let call = session.request(args.method, &args.template)?;
        probe(&call, &call_args, &args, |res: &Response| {
            (res.status(), res.text().into_owned())
        })
        .await?
    };

    println!(
        "hits: {}  misses: {}  hit ratio: {:.0}%",
        stats.hits,
        stats.misses,
        stats.hit_ratio() * 100.0
    );
    Ok(())
}

/// Invoke `call` the requested number of times, printing one line per
/// invocation and the last body.
async fn probe<F: Flavor>(
    call: &MemoizedCall<F>,
    call_args: &CallArgs,
    args: &Args,
    summarize: impl Fn(&F::Output) -> (u16, String),
) -> memogate::Result<CallStats> {
    println!(
        "{} {} (ttl {}s, fingerprint {})",
        call.method(),
        call.template(),
        call.ttl().as_secs(),
        call.fingerprint(call_args)?
    );

    if args.bust {
        call.bust(call_args).await?;
    }

    let mut last_body = None;
    for i in 1..=args.repeat {
        let start = Instant::now();
        match call.invoke(call_args).await {
            Ok(output) => {
                let (status, body) = summarize(&output);
                println!("#{i}: {status} in {:.1?}", start.elapsed());
                last_body = Some(body);
            }
            Err(e) => {
                println!("#{i}: failed in {:.1?}: {e}", start.elapsed());
            }
        }
    }

    if let Some(body) = last_body {
        println!("{body}");
    }
    Ok(call.stats())
}

