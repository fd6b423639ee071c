//! `f1ctl listen`: decode live traffic, optionally recording it.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use f1_telemetry_capture::{PacketSource, Source};
use f1_telemetry_protocol::PacketRegistry;
use tracing::info;

use crate::commands::{Context, ListenArgs, load_options, pump};
use crate::output::{self, SessionSummary};
use crate::shutdown::Shutdown;

pub fn execute(args: &ListenArgs, ctx: &Context) -> Result<()> {
    let mut options = load_options(ctx.config.as_deref())?;
    args.bind.apply(&mut options);
    if args.record {
        options.record = true;
    }
    if let Some(dir) = &args.record_dir {
        options.record_dir = dir.clone();
    }
    let config = options.resolve()?;

    let mut source = Source::open(&config, Arc::new(PacketRegistry::f1_25()))?;
    let shutdown = Shutdown::install()?;
    shutdown.watch(source.close_handle());
    info!(source = source.kind(), "listening for telemetry");

    let started = Instant::now();
    let mut summary = SessionSummary::new(source.kind());
    let stop = pump(&mut source, &mut output::stdout(), ctx.json, &mut summary)?;
    summary.stopped_by = stop;
    if let Source::Recording(recorder) = &source {
        summary.recording = recorder.path().map(Path::to_path_buf);
        summary.bytes_written = Some(recorder.bytes_written());
    }
    source.close()?;
    summary.elapsed_seconds = started.elapsed().as_secs_f64();

    output::write_session_summary(&mut io::stderr().lock(), &summary, ctx.json)
}
