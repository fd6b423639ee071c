//! `f1ctl info`: summarise a replay log.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context as _, Result};
use f1_telemetry_capture::LogSummary;
use f1_telemetry_protocol::PacketRegistry;
use tracing::warn;

use crate::commands::{Context, InfoArgs};
use crate::output;

pub fn execute(args: &InfoArgs, ctx: &Context) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open replay log {}", args.file.display()))?;
    let summary = LogSummary::scan(BufReader::new(file), &PacketRegistry::f1_25())
        .with_context(|| format!("failed to read replay log {}", args.file.display()))?;
    if summary.decode_errors > 0 {
        warn!(
            path = %args.file.display(),
            decode_errors = summary.decode_errors,
            "some records did not decode"
        );
    }

    output::write_log_summary(&mut output::stdout(), &args.file, &summary, ctx.json)
}
