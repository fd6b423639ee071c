//! `f1ctl replay`: play a log back with its original timing.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use f1_telemetry_capture::{ReplaySource, SourceConfig};
use f1_telemetry_protocol::PacketRegistry;
use tracing::{debug, info, warn};

use crate::commands::{Context, ReplayArgs, load_options, pump};
use crate::error::CliError;
use crate::output::{self, SessionSummary, StopReason};
use crate::shutdown::Shutdown;

pub fn execute(args: &ReplayArgs, ctx: &Context) -> Result<()> {
    let mut options = load_options(ctx.config.as_deref())?;
    options.replay_file = Some(args.file.clone());
    if let Some(speed) = args.speed {
        options.replay_speed = speed;
    }
    let SourceConfig::Replay { path, speed } = options.resolve()? else {
        return Err(CliError::InvalidArgument("replay needs a log file".to_owned()).into());
    };
    if let Some(start) = args.start_at {
        if !start.is_finite() || start < 0.0 {
            return Err(CliError::InvalidArgument(format!(
                "--start-at must be a non-negative number of seconds, got {start}"
            ))
            .into());
        }
    }

    let registry = Arc::new(PacketRegistry::f1_25());
    let shutdown = Shutdown::install()?;
    let mut out = output::stdout();
    let mut summary = SessionSummary::new("replay");
    let started = Instant::now();
    info!(path = %path.display(), speed, "replaying telemetry");

    let mut loops = 0u64;
    let stop = loop {
        let mut replay = ReplaySource::open(&path)?
            .with_registry(Arc::clone(&registry))
            .with_speed(speed);
        if let Some(start) = args.start_at {
            replay
                .seek_to(start)
                .with_context(|| format!("failed to seek to {start}s"))?;
        }
        shutdown.watch(replay.close_handle());

        let stop = pump(&mut replay, &mut out, ctx.json, &mut summary)?;
        loops += 1;
        if replay.truncated_tail() {
            warn!(path = %path.display(), "replay log ends with a truncated record");
        }
        // Nothing to play means looping would spin.
        if stop != StopReason::EndOfStream || !args.repeat || replay.records_read() == 0 {
            break stop;
        }
        debug!(loops, "restarting replay from the beginning");
    };

    summary.stopped_by = stop;
    summary.loops = args.repeat.then_some(loops);
    summary.elapsed_seconds = started.elapsed().as_secs_f64();
    output::write_session_summary(&mut io::stderr().lock(), &summary, ctx.json)
}
