//! f1ctl - F1 25 telemetry capture CLI
//!
//! Listens to live UDP telemetry, records it to replay logs, replays logs with
//! their original timing and summarises recorded sessions.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Context, InfoArgs, ListenArgs, RecordArgs, ReplayArgs};

#[derive(Parser)]
#[command(name = "f1ctl")]
#[command(about = "F1 25 telemetry CLI - capture, record and replay UDP telemetry")]
#[command(version)]
#[command(long_about = "
f1ctl receives EA F1 25 UDP telemetry (packet format 2025), decodes every
packet by its header, and can tee the raw datagrams into a replay log.
Replay logs are played back with the original inter-packet timing.

Options are read from an optional YAML file (--config), then from the
F1_TELEMETRY_* environment variables, then from command-line flags.
Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// YAML capture options file
    #[arg(long, global = true, env = "F1CTL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode live telemetry and print one line per packet
    Listen(ListenArgs),

    /// Record live telemetry to a replay log
    Record(RecordArgs),

    /// Replay a log with its original timing
    Replay(ReplayArgs),

    /// Summarise a replay log
    Info(InfoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        config: cli.config.clone(),
        json: cli.json,
    };
    match execute_command(&cli.command, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(error::exit_code(&e))
        }
    }
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step from warn.
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "f1ctl={log_level},f1_telemetry_capture={log_level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn execute_command(command: &Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Listen(args) => commands::listen::execute(args, ctx),
        Commands::Record(args) => commands::record::execute(args, ctx),
        Commands::Replay(args) => commands::replay::execute(args, ctx),
        Commands::Info(args) => commands::info::execute(args, ctx),
    }
}
