//! `f1ctl record`: write live traffic to a replay log without decoding it.

use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use f1_telemetry_capture::{CaptureError, CloseHandle, LiveSource, Recorder, SourceConfig};
use tracing::info;

use crate::commands::{Context, RecordArgs, load_options};
use crate::error::CliError;
use crate::output::{self, SessionSummary, StopReason};
use crate::shutdown::Shutdown;

pub fn execute(args: &RecordArgs, ctx: &Context) -> Result<()> {
    let mut options = load_options(ctx.config.as_deref())?;
    args.bind.apply(&mut options);
    options.record = true;
    if let Some(dir) = &args.out_dir {
        options.record_dir = dir.clone();
    }
    let SourceConfig::Live {
        addr,
        recording: Some(recording),
    } = options.resolve()?
    else {
        return Err(CliError::InvalidArgument("record needs a live UDP source".to_owned()).into());
    };

    let live = LiveSource::bind(addr)?;
    let mut recorder =
        Recorder::create_in(live, &recording.dir)?.with_flush_policy(recording.flush);
    let shutdown = Shutdown::install()?;
    shutdown.watch(recorder.close_handle());
    let _timer = args
        .duration
        .map(|secs| close_after(Duration::from_secs(secs), recorder.close_handle()));
    info!(%addr, duration_secs = ?args.duration, "recording telemetry");

    let started = Instant::now();
    let stop = loop {
        match recorder.receive() {
            Ok(_) => {}
            Err(CaptureError::Closed) if shutdown.is_requested() => break StopReason::Interrupted,
            Err(CaptureError::Closed) => break StopReason::Duration,
            Err(err) => return Err(err.into()),
        }
    };

    let mut summary = SessionSummary::new("recording");
    summary.packets = recorder.records_written();
    summary.bytes_written = Some(recorder.bytes_written());
    summary.recording = recorder.path().map(Path::to_path_buf);
    summary.stopped_by = stop;
    recorder.close()?;
    summary.elapsed_seconds = started.elapsed().as_secs_f64();

    output::write_session_summary(&mut output::stdout(), &summary, ctx.json)
}

/// Close the recording once `duration` has elapsed.
fn close_after(duration: Duration, handle: CloseHandle) -> JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(duration);
        handle.close();
    })
}
