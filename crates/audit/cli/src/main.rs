//! auditctl - run audit engine requests
//!
//! Reads `{ task, context, parameters }` requests as a single JSON document or
//! as JSON lines, from a file or stdin, and prints one response per request.

use anyhow::{Context, Result};
use audit_engine::{AuditEngine, TaskKind};
use audit_types::EngineResponse;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod input;

use crate::config::CliConfig;

/// auditctl CLI
#[derive(Parser)]
#[command(name = "auditctl")]
#[command(about = "Audit risk, materiality and sampling engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AUDIT_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides config; `RUST_LOG` wins over both)
    #[arg(long, env = "AUDIT_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "AUDIT_LOG_JSON", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run requests and print responses
    Run {
        /// Input file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Treat input as JSON lines, one request per line
        #[arg(long)]
        batch: bool,

        /// Pretty-print responses
        #[arg(long)]
        pretty: bool,
    },

    /// List supported tasks
    Tasks,

    /// Print the effective ruleset
    Ruleset,
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    // stdout carries responses; logs go to stderr.
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn emit<T: Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn run(engine: &AuditEngine, source: &str, batch: bool, pretty: bool) -> Result<bool> {
    let text = input::read_source(source)?;
    let responses: Vec<EngineResponse> = if batch {
        input::parse_lines(&text)
            .into_iter()
            .map(|parsed| match parsed {
                Ok(request) => engine.handle(&request),
                Err(failure) => failure,
            })
            .collect()
    } else {
        engine.handle_batch(&input::parse_document(&text)?)
    };

    let failed = responses.iter().filter(|r| !r.success).count();
    info!(requests = responses.len(), failed, "requests processed");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for response in &responses {
        emit(&mut out, response, pretty)?;
    }
    out.flush()?;
    Ok(failed == 0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level, cli.json_logs || config.logging.json);

    let engine = AuditEngine::new(config.ruleset).context("invalid ruleset")?;
    info!(version = %engine.ruleset().version, "audit engine ready");

    match cli.command {
        Commands::Run {
            input,
            batch,
            pretty,
        } => {
            if !run(&engine, &input, batch, pretty)? {
                std::process::exit(2);
            }
        }
        Commands::Tasks => {
            for kind in TaskKind::ALL {
                println!("{:<30} {}", kind.as_str(), kind.summary());
            }
        }
        Commands::Ruleset => {
            let stdout = std::io::stdout();
            emit(&mut stdout.lock(), engine.ruleset(), true)?;
        }
    }

    Ok(())
}
