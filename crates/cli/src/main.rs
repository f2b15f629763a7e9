// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tg - dependency-aware workflow orchestrator for a Slurm-class scheduler

mod color;
mod commands;
mod exit_error;
mod table;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use commands::{expert, run, task};
use exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "tg",
    version,
    about = "Dependency-aware workflow orchestrator for a Slurm-class scheduler"
)]
struct Cli {
    /// Log level: trace, debug, info, warn, error (overrides RUST_LOG)
    #[arg(long = "message-level", global = true)]
    message_level: Option<String>,

    /// Virtualenv to source in generated submission scripts
    #[arg(long, global = true)]
    virtualenv: Option<String>,

    /// Path to the `tg` binary invoked by generated submission scripts
    #[arg(long, default_value = "tg", global = true)]
    tg_binary: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scheduler-invoked runner entry points (job, task-init, task-next)
    Run(run::RunArgs),
    /// Build, inspect, and restart a Flow
    Task(task::TaskArgs),
    /// Low-level operator escape hatches
    Expert(expert::ExpertArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

async fn run_cli() -> anyhow::Result<()> {
    let cli = match Cli::command().styles(color::styles()).try_get_matches() {
        Ok(matches) => Cli::from_arg_matches(&matches)?,
        Err(e) => e.exit(),
    };

    init_logging(cli.message_level.as_deref());

    match cli.command {
        Commands::Run(args) => run::handle(args, cli.virtualenv, cli.tg_binary).await?,
        Commands::Task(args) => task::handle(args, cli.virtualenv, cli.tg_binary).await?,
        Commands::Expert(args) => expert::handle(args, cli.virtualenv, cli.tg_binary)?,
    }
    Ok(())
}

/// Resolve the subscriber's level from (in order) `-m/--message-level`,
/// `RUST_LOG`, then a built-in `info` default (§4.J).
fn init_logging(message_level: Option<&str>) {
    let filter = message_level
        .map(|level| level.to_string())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

/// Format an anyhow error, deduplicating the chain when the top-level
/// message already contains every cause's text.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}
