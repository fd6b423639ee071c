//! Output formatting for CLI responses

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Error;
use colored::*;
use f1_telemetry_capture::LogSummary;
use f1_telemetry_protocol::Packet;
use serde::Serialize;
use serde_json::json;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "causes": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// One-line description of a packet: frame, session time, kind, key and a
/// short detail for the kinds that have an obvious one.
pub fn packet_line(packet: &Packet) -> String {
    let header = packet.header();
    let mut line = format!(
        "{:>8} {:>10.3}s  {:<22} {}",
        header.frame_identifier,
        header.session_time,
        packet.kind().name(),
        header.registry_key(),
    );
    let detail = match packet {
        Packet::CarTelemetry(telemetry) => telemetry.player().map(|p| {
            format!(
                "speed={} km/h gear={} rpm={}",
                p.speed, p.gear, p.engine_rpm
            )
        }),
        Packet::Event(event) => Some(event.event_string_code.clone()),
        Packet::Participants(participants) => {
            Some(format!("{} active cars", participants.num_active_cars))
        }
        Packet::ScriptStartup(startup) => Some(format!("note={:?}", startup.note)),
        _ => None,
    };
    if let Some(detail) = detail {
        line.push_str("  ");
        line.push_str(&detail);
    }
    line
}

/// Print a decoded packet as a line of text or a JSON line.
///
/// # Errors
///
/// Write failures (for example a closed pipe) and serialization failures.
pub fn write_packet(out: &mut impl Write, packet: &Packet, json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, packet)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", packet_line(packet))?;
    }
    Ok(())
}

/// Why a capture loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndOfStream,
    Interrupted,
    Duration,
}

/// End-of-command statistics for `listen`, `record` and `replay`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub source: &'static str,
    pub packets: u64,
    pub decode_errors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loops: Option<u64>,
    pub stopped_by: StopReason,
}

impl SessionSummary {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            packets: 0,
            decode_errors: 0,
            bytes_written: None,
            elapsed_seconds: 0.0,
            recording: None,
            loops: None,
            stopped_by: StopReason::EndOfStream,
        }
    }
}

/// # Errors
///
/// Write and serialization failures.
pub fn write_session_summary(
    out: &mut impl Write,
    summary: &SessionSummary,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &json!({ "success": true, "summary": summary }))?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", "Session summary:".bold())?;
    writeln!(out, "  Source:        {}", summary.source)?;
    writeln!(out, "  Packets:       {}", summary.packets)?;
    if summary.decode_errors > 0 {
        writeln!(
            out,
            "  Decode errors: {}",
            summary.decode_errors.to_string().yellow()
        )?;
    }
    if let Some(bytes) = summary.bytes_written {
        writeln!(out, "  Bytes written: {bytes}")?;
    }
    if let Some(path) = &summary.recording {
        writeln!(out, "  Recording:     {}", path.display())?;
    }
    if let Some(loops) = summary.loops {
        writeln!(out, "  Loops:         {loops}")?;
    }
    writeln!(out, "  Elapsed:       {:.1}s", summary.elapsed_seconds)?;
    writeln!(out, "  Stopped by:    {}", stop_reason_label(summary.stopped_by))?;
    Ok(())
}

fn stop_reason_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::EndOfStream => "end of log",
        StopReason::Interrupted => "interrupt",
        StopReason::Duration => "duration elapsed",
    }
}

/// Print the `info` report for a replay log.
///
/// # Errors
///
/// Write and serialization failures.
pub fn write_log_summary(
    out: &mut impl Write,
    path: &Path,
    summary: &LogSummary,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let report = json!({
            "success": true,
            "path": path,
            "duration_seconds": summary.duration(),
            "summary": summary,
        });
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{} {}", "Replay log:".bold(), path.display())?;
    writeln!(out, "  Records:       {}", summary.records)?;
    match (summary.first_timestamp, summary.last_timestamp) {
        (Some(first), Some(last)) => {
            writeln!(out, "  First:         {first:.3}s")?;
            writeln!(out, "  Last:          {last:.3}s")?;
        }
        _ => writeln!(out, "  First/Last:    {}", "n/a".dimmed())?,
    }
    writeln!(out, "  Duration:      {:.3}s", summary.duration())?;
    writeln!(out, "  Payload bytes: {}", summary.payload_bytes)?;
    if summary.decode_errors > 0 {
        writeln!(
            out,
            "  Decode errors: {}",
            summary.decode_errors.to_string().yellow()
        )?;
    }
    if summary.truncated_tail {
        writeln!(out, "  {}", "Log ends with a truncated record".yellow())?;
    }
    if !summary.kinds.is_empty() {
        writeln!(out, "  {}", "Packets by kind:".bold())?;
        for (kind, count) in &summary.kinds {
            writeln!(out, "    {kind:<22} {count}")?;
        }
    }
    Ok(())
}

/// Standard output, locked for the lifetime of a command.
pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use f1_telemetry_protocol::fixtures::{self, PlayerTelemetry};
    use f1_telemetry_protocol::{PacketHeader, PacketKind, PacketRegistry};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn decode(raw: &[u8]) -> Result<Packet, Box<dyn std::error::Error>> {
        Ok(PacketRegistry::f1_25().decode(raw)?)
    }

    #[test]
    fn car_telemetry_line_shows_player_inputs() -> TestResult {
        let header = PacketHeader {
            frame_identifier: 12_345_678,
            session_time: 61.5,
            ..PacketHeader::f1_25(6)
        };
        let raw = fixtures::car_telemetry_packet(
            &header,
            &PlayerTelemetry {
                speed_kmh: 287,
                gear: 7,
                engine_rpm: 11_250,
                ..PlayerTelemetry::default()
            },
        )?;
        insta::assert_snapshot!(
            packet_line(&decode(&raw)?),
            @"12345678     61.500s  car_telemetry          2025/1/6  speed=287 km/h gear=7 rpm=11250"
        );
        Ok(())
    }

    #[test]
    fn kinds_without_detail_print_header_only() -> TestResult {
        let line = packet_line(&decode(&fixtures::f1_25_packet(PacketKind::Motion)?)?);
        assert!(line.ends_with("2025/1/0"), "{line}");
        Ok(())
    }

    #[test]
    fn json_packet_is_one_line() -> TestResult {
        let mut out = Vec::new();
        let packet = decode(&fixtures::f1_25_packet(PacketKind::Event)?)?;
        write_packet(&mut out, &packet, true)?;
        let text = String::from_utf8(out)?;
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value.get("kind").and_then(|k| k.as_str()), Some("event"));
        Ok(())
    }

    #[test]
    fn json_session_summary_omits_unset_fields() -> TestResult {
        let mut out = Vec::new();
        let mut summary = SessionSummary::new("replay");
        summary.packets = 3;
        summary.stopped_by = StopReason::Interrupted;
        write_session_summary(&mut out, &summary, true)?;
        let value: serde_json::Value = serde_json::from_slice(&out)?;
        let inner = value.get("summary").ok_or("no summary")?;
        assert_eq!(inner.get("stopped_by").and_then(|v| v.as_str()), Some("interrupted"));
        assert!(inner.get("loops").is_none());
        assert!(inner.get("recording").is_none());
        Ok(())
    }
}
