//! Command implementations for f1ctl CLI

pub mod info;
pub mod listen;
pub mod record;
pub mod replay;

use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use f1_telemetry_capture::{CaptureError, CaptureOptions, PacketSource};
use tracing::{debug, warn};

use crate::output::{self, SessionSummary, StopReason};

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Socket options for commands that listen on UDP.
#[derive(Args, Debug, Clone, Default)]
pub struct BindArgs {
    /// Interface to listen on [default: 0.0.0.0]
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<IpAddr>,

    /// UDP port [default: 20777]
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl BindArgs {
    fn apply(&self, options: &mut CaptureOptions) {
        if let Some(bind) = self.bind {
            options.bind_address = Some(bind);
        }
        if let Some(port) = self.port {
            options.port = Some(port);
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListenArgs {
    #[command(flatten)]
    pub bind: BindArgs,

    /// Also record every datagram to a replay log
    #[arg(long)]
    pub record: bool,

    /// Directory for replay logs [default: telemetry_data]
    #[arg(long, value_name = "DIR", requires = "record")]
    pub record_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    #[command(flatten)]
    pub bind: BindArgs,

    /// Directory for the replay log [default: telemetry_data]
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Replay log to play back
    pub file: PathBuf,

    /// Playback speed multiplier, 0.1 to 10 [default: 1.0]
    #[arg(short, long)]
    pub speed: Option<f64>,

    /// Skip records stamped before this many seconds
    #[arg(long, value_name = "SECS")]
    pub start_at: Option<f64>,

    /// Start over at the end of the log until interrupted
    #[arg(long = "loop")]
    pub repeat: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Replay log to summarise
    pub file: PathBuf,
}

/// Capture options from the config file (if any), then the environment.
///
/// # Errors
///
/// Unreadable or invalid config file, or an invalid environment value.
pub fn load_options(config: Option<&Path>) -> Result<CaptureOptions> {
    let mut options = match config {
        Some(path) => {
            debug!(path = %path.display(), "loading capture options");
            CaptureOptions::from_yaml_file(path)?
        }
        None => CaptureOptions::default(),
    };
    options.apply_env()?;
    Ok(options)
}

/// Pull and print packets until the source ends or is closed.
///
/// Undecodable datagrams are counted, logged and skipped.
///
/// # Errors
///
/// Transport and log failures, and output write failures.
pub fn pump<S: PacketSource>(
    source: &mut S,
    out: &mut impl Write,
    json: bool,
    summary: &mut SessionSummary,
) -> Result<StopReason> {
    loop {
        match source.next_packet() {
            Ok(Some(packet)) => {
                summary.packets += 1;
                output::write_packet(out, &packet, json)?;
            }
            Ok(None) => return Ok(StopReason::EndOfStream),
            Err(CaptureError::Closed) => return Ok(StopReason::Interrupted),
            Err(err) if err.is_decode() => {
                summary.decode_errors += 1;
                warn!(error = %err, "skipping undecodable datagram");
            }
            Err(err) => return Err(err.into()),
        }
    }
}
