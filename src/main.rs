// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Sessionjar CLI - Domain-Scoped Session Capture
//!
//! Drives the control protocol against a file-backed state document.

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

use sessionjar::{
    CaptureEngine, CapturePolicy, CookieJar, EngineConfig, EngineHandle, ExportDocument, FileStore,
    HeaderEntry, ObservedRequest,
};

/// Environment variable naming an extra policy JSON file
const POLICY_ENV: &str = "SESSIONJAR_POLICY";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "sessionjar=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "control" => {
            if args.len() < 4 {
                eprintln!("Usage: sessionjar control <state.json> '<request json>'");
                return ExitCode::from(1);
            }
            run_control(&args[2], &args[3]).await
        }
        "serve" => {
            if args.len() < 3 {
                eprintln!("Usage: sessionjar serve <state.json>");
                return ExitCode::from(1);
            }
            run_serve(&args[2]).await.map(|()| true)
        }
        "export" => {
            if args.len() < 3 {
                eprintln!("Usage: sessionjar export <state.json> [dir]");
                return ExitCode::from(1);
            }
            run_export(&args[2], args.get(3).map(String::as_str))
                .await
                .map(|()| true)
        }
        "policy" => run_policy().map(|()| true),
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("sessionjar {}", sessionjar::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Sessionjar - Domain-Scoped Session Capture

USAGE:
    sessionjar <COMMAND> [OPTIONS]

COMMANDS:
    control <state.json> <json>   Apply one control request and print the response
    serve <state.json>            Read JSON lines from stdin, poll cookies in the background
    export <state.json> [dir]     Print the export document, or write one file per host
    policy                        Print the effective capture policy
    help                          Show this help message
    version                       Show version information

SERVE INPUT (one JSON object per line):
    {{"action": "addDomain", "domain": "x.com"}}            control request
    {{"url": "https://x.com/", "headers": [...]}}            observed request
    {{"url": "https://x.com/", "setCookie": "ct0=abc"}}      cookie for the poller

ENVIRONMENT:
    SESSIONJAR_POLICY   JSON policy file merged over the built-in filters
    RUST_LOG            Log filter (default: sessionjar=info)

EXAMPLES:
    sessionjar control state.json '{{"action":"addDomain","domain":"https://www.x.com"}}'
    sessionjar control state.json '{{"action":"startCapture"}}'
    sessionjar export state.json ./sessions
"#
    );
}

fn load_config() -> anyhow::Result<EngineConfig> {
    let mut policy = CapturePolicy::builtin();

    if let Ok(path) = env::var(POLICY_ENV) {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading policy file {}", path))?;
        let extra = CapturePolicy::from_json(&json)
            .with_context(|| format!("parsing policy file {}", path))?;
        tracing::info!(path = %path, hosts = extra.configured_hosts().count(), "Loaded capture policy");
        policy.extend(extra);
    }

    Ok(EngineConfig::default().policy(policy))
}

fn run_policy() -> anyhow::Result<()> {
    let config = load_config()?;
    println!("{}", config.policy.to_json()?);
    Ok(())
}

async fn open_engine(state: &str, jar: CookieJar) -> anyhow::Result<EngineHandle> {
    let engine = CaptureEngine::builder(load_config()?)
        .store(Arc::new(FileStore::new(state)))
        .cookie_source(Arc::new(jar))
        .spawn()
        .await
        .context("starting capture engine")?;
    Ok(engine)
}

async fn run_control(state: &str, request: &str) -> anyhow::Result<bool> {
    let request: Value = serde_json::from_str(request).context("request is not valid JSON")?;
    let engine = open_engine(state, CookieJar::new()).await?;

    let response = engine.control_service().dispatch_json(request).await;
    engine.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response["success"] == Value::Bool(true))
}

/// One line of `serve` input that is not a control request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventLine {
    url: String,
    #[serde(default)]
    headers: Vec<HeaderEntry>,
    #[serde(default)]
    set_cookie: Option<String>,
}

async fn run_serve(state: &str) -> anyhow::Result<()> {
    let jar = CookieJar::new();
    let engine = open_engine(state, jar.clone()).await?;
    let control = engine.control_service();
    let poller = engine.spawn_poller();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Ok(value) if value.get("action").is_some() => control.dispatch_json(value).await,
            Ok(value) => handle_event(&engine, &jar, value).await,
            Err(e) => serde_json::json!({"success": false, "error": format!("invalid JSON: {}", e)}),
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    poller.stop().await;
    engine.shutdown().await?;
    Ok(())
}

async fn handle_event(engine: &EngineHandle, jar: &CookieJar, value: Value) -> Value {
    let event: EventLine = match serde_json::from_value(value) {
        Ok(event) => event,
        Err(e) => return serde_json::json!({"success": false, "error": e.to_string()}),
    };

    if let Some(header) = &event.set_cookie {
        return match Url::parse(&event.url) {
            Ok(url) if jar.add_from_header(header, &url) => {
                serde_json::json!({"success": true, "cookies": jar.len()})
            }
            Ok(_) => serde_json::json!({"success": false, "error": "unparsable Set-Cookie header"}),
            Err(e) => serde_json::json!({"success": false, "error": e.to_string()}),
        };
    }

    match engine.observe(ObservedRequest::new(event.url, event.headers)).await {
        Ok(outcome) => serde_json::json!({"success": true, "captured": outcome.is_captured()}),
        Err(e) => serde_json::json!({"success": false, "error": e.to_string()}),
    }
}

async fn run_export(state: &str, dir: Option<&str>) -> anyhow::Result<()> {
    let engine = open_engine(state, CookieJar::new()).await?;
    let sessions = engine.control_service().export().await?;
    engine.shutdown().await?;

    let document = ExportDocument::new(sessions, chrono::Utc::now());
    match dir {
        Some(dir) => {
            let written = document.write_split(Path::new(dir))?;
            println!("Wrote {} session file(s) to {}", written.len(), dir);
        }
        None => println!("{}", document.to_json()?),
    }

    Ok(())
}
