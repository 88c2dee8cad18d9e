//! Rule file checker.
//!
//! Loads a YAML/JSON rules file, reports how many rules it declares and, when a
//! URL is given, runs one request through a client built from those rules.
//!
//! Usage:
//!   intercept-check rules.yaml
//!   intercept-check rules.yaml --method PUT --url http://api.test/test/ --header "Accept: text/plain"

use anyhow::Context;
use bytes::Bytes;
use clap::Parser;
use http_intercept::{load_rules, ClientError, InterceptError};
use hyper::Request;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "intercept-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rules file (.json is parsed as JSON, anything else as YAML)
    rules: PathBuf,

    /// Method of the request to dry-run
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// URL of the request to dry-run; nothing is sent without it
    #[arg(short, long)]
    url: Option<String>,

    /// Request header as "Name: value", repeatable
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    body: Option<String>,

    /// Print the recorded request as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_request(args: &Args, url: &str) -> Result<Request<Bytes>, anyhow::Error> {
    let mut builder = Request::builder().method(args.method.as_str()).uri(url);
    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header '{header}' is not in 'Name: value' form"))?;
        builder = builder.header(name.trim(), value.trim());
    }
    let body = args.body.clone().map(Bytes::from).unwrap_or_default();
    builder.body(body).context("Invalid request")
}

fn run(args: &Args) -> Result<ExitCode, anyhow::Error> {
    let options = load_rules(&args.rules)?;
    println!(
        "{}: {} rule(s), failOnUnmatched={}",
        args.rules.display(),
        options.len(),
        options.fail_on_unmatched
    );
    for (index, rule) in options.rules().iter().enumerate() {
        println!("  [{index}] {} {:?}", rule.name().unwrap_or("-"), rule.matchers());
    }

    let Some(url) = args.url.as_deref() else {
        return Ok(ExitCode::SUCCESS);
    };

    let client = options.client();
    let request = build_request(args, url)?;
    let outcome = client.execute(request);

    if args.json {
        for recorded in client.interceptor().received_requests() {
            println!("{}", serde_json::to_string_pretty(&recorded)?);
        }
    }

    match outcome {
        Ok(response) => {
            println!("{} {} -> {}", args.method, url, response.status());
            if !response.body().is_empty() {
                println!("{}", String::from_utf8_lossy(response.body()));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(ClientError::NoResponse { .. }) => {
            println!("{} {} -> no rule matched", args.method, url);
            Ok(ExitCode::SUCCESS)
        }
        Err(ClientError::Transport(err @ InterceptError::UnmatchedRequest { .. })) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
