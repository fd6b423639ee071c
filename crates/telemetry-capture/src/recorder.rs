//! Recorder: tees every live datagram into a replay log.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use f1_telemetry_protocol::PacketRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::close::CloseHandle;
use crate::error::CaptureError;
use crate::live::LiveSource;
use crate::log::LogWriter;
use crate::source::PacketSource;

/// Extension of files created by [`Recorder::create_in`].
pub const LOG_EXTENSION: &str = "tlm";

/// When recorded frames reach the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Flush after every frame; a crash loses at most the frame in flight.
    #[default]
    EveryRecord,
    /// Flush only when the buffer fills and on close.
    Buffered,
}

/// File name for a recording started now, e.g.
/// `telemetry_replay_20250614_153012.tlm`.
pub fn log_file_name() -> String {
    chrono::Local::now()
        .format("telemetry_replay_%Y%m%d_%H%M%S.tlm")
        .to_string()
}

/// Wraps a [`LiveSource`] and appends each received datagram to a log.
///
/// Timestamps are seconds since the first datagram this recorder captured,
/// measured on a monotonic clock. Payloads are written unaltered, before the
/// datagram is handed to the caller.
#[derive(Debug)]
pub struct Recorder<W: Write = BufWriter<File>> {
    live: LiveSource,
    writer: LogWriter<W>,
    path: Option<PathBuf>,
    flush: FlushPolicy,
    first_packet: Option<Instant>,
    /// Set once a write or flush fails; nothing is appended after that.
    failed: bool,
}

impl<W: Write> Recorder<W> {
    /// Record into an arbitrary sink.
    pub fn new(live: LiveSource, writer: W) -> Self {
        Self {
            live,
            writer: LogWriter::new(writer),
            path: None,
            flush: FlushPolicy::default(),
            first_packet: None,
            failed: false,
        }
    }

    pub fn with_flush_policy(mut self, flush: FlushPolicy) -> Self {
        self.flush = flush;
        self
    }

    /// Receive one datagram, append it to the log, then return it.
    ///
    /// # Errors
    ///
    /// Anything [`LiveSource::receive`] returns, plus [`CaptureError::Log`]
    /// when the frame cannot be written. A failed write may leave a partial
    /// frame in the sink, so the recorder stops there: the socket is released
    /// and every later call returns [`CaptureError::Closed`].
    pub fn receive(&mut self) -> Result<&[u8], CaptureError> {
        if self.failed {
            self.live.close();
            return Err(CaptureError::Closed);
        }
        let payload = self.live.receive()?;
        let now = Instant::now();
        let first = *self.first_packet.get_or_insert(now);
        let timestamp = now.duration_since(first).as_secs_f64();

        let written = self.writer.append(timestamp, payload).and_then(|()| {
            if self.flush == FlushPolicy::EveryRecord {
                self.writer.flush()
            } else {
                Ok(())
            }
        });
        if let Err(source) = written {
            self.failed = true;
            warn!(
                path = ?self.path,
                records = self.writer.records_written(),
                error = %source,
                "recording stopped after log write failure"
            );
            return Err(CaptureError::log(self.path.as_deref(), source));
        }
        trace!(timestamp, len = payload.len(), "frame recorded");
        Ok(payload)
    }

    /// Log file path, when recording to a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn records_written(&self) -> u64 {
        self.writer.records_written()
    }

    /// Bytes written including frame prefixes.
    pub fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }

    /// True once a log write has failed.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn flush_policy(&self) -> FlushPolicy {
        self.flush
    }

    pub fn live(&self) -> &LiveSource {
        &self.live
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.live.close_handle()
    }

    /// Flush the log and release the socket.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] if the final flush fails; the socket is
    /// released either way. A recorder whose writes already failed is not
    /// flushed again.
    pub fn close(&mut self) -> Result<(), CaptureError> {
        self.live.close();
        if self.failed {
            return Ok(());
        }
        if let Err(source) = self.writer.flush() {
            self.failed = true;
            return Err(CaptureError::log(self.path.as_deref(), source));
        }
        info!(
            path = ?self.path,
            records = self.writer.records_written(),
            bytes = self.writer.bytes_written(),
            "recording closed"
        );
        Ok(())
    }
}

impl Recorder<BufWriter<File>> {
    /// Record into a new file at `path`; fails if it already exists.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] if the file cannot be created.
    pub fn create(live: LiveSource, path: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let path = path.into();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| CaptureError::log(Some(&path), source))?;
        info!(path = %path.display(), "recording started");
        let mut recorder = Self::new(live, BufWriter::new(file));
        recorder.path = Some(path);
        Ok(recorder)
    }

    /// Record into `dir/telemetry_replay_YYYYMMDD_HHMMSS.tlm`, creating the
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] if the directory or file cannot be created.
    pub fn create_in(live: LiveSource, dir: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| CaptureError::log(Some(dir), source))?;
        let path = unused_path(dir, &log_file_name());
        Self::create(live, path)
    }
}

/// `dir/name`, or `dir/stem_N.ext` when a recording with that name exists.
fn unused_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}.{LOG_EXTENSION}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

impl<W: Write> Drop for Recorder<W> {
    fn drop(&mut self) {
        if self.failed {
            return;
        }
        if let Err(err) = self.writer.flush() {
            debug!(error = %err, "flush on drop failed");
        }
    }
}

impl<W: Write> PacketSource for Recorder<W> {
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, CaptureError> {
        self.receive().map(Some)
    }

    fn registry(&self) -> &Arc<PacketRegistry> {
        self.live.registry()
    }

    fn close_handle(&self) -> CloseHandle {
        Recorder::close_handle(self)
    }
}
