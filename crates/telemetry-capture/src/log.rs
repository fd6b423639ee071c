//! Replay log codec.
//!
//! A log is a flat sequence of frames with no file header or footer:
//!
//! | Bytes | Field |
//! |-------|-------|
//! | 8 | timestamp, `f64` LE, seconds since the first recorded packet |
//! | 4 | payload length, `u32` LE |
//! | n | payload, the datagram exactly as received |
//!
//! A trailing frame that is cut short (fewer than 12 header bytes, or fewer
//! payload bytes than declared) marks the end of the log rather than an
//! error, so a log from a crashed recorder still replays up to its last
//! complete frame.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use f1_telemetry_protocol::PacketRegistry;
use serde::Serialize;

/// Size of the timestamp plus length prefix.
pub const FRAME_HEADER_LEN: usize = 12;

/// One complete frame read from a log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: f64,
    pub payload: Vec<u8>,
}

// ── Writer ───────────────────────────────────────────────────────────────────

/// Appends frames to any [`Write`] sink.
#[derive(Debug)]
pub struct LogWriter<W: Write> {
    inner: W,
    records_written: u64,
    bytes_written: u64,
}

impl<W: Write> LogWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Write one frame. Does not flush.
    ///
    /// # Errors
    ///
    /// Fails if the payload does not fit a `u32` length or the sink fails.
    pub fn append(&mut self, timestamp: f64, payload: &[u8]) -> io::Result<()> {
        let len = u32::try_from(payload.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("payload of {} bytes exceeds frame limit", payload.len()),
            )
        })?;
        let mut prefix = [0u8; FRAME_HEADER_LEN];
        let (ts, length) = prefix.split_at_mut(8);
        ts.copy_from_slice(&timestamp.to_le_bytes());
        length.copy_from_slice(&len.to_le_bytes());

        self.inner.write_all(&prefix)?;
        self.inner.write_all(payload)?;
        self.records_written += 1;
        self.bytes_written += (FRAME_HEADER_LEN + payload.len()) as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes written including frame prefixes.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Reads frames sequentially from any [`Read`] source.
#[derive(Debug)]
pub struct LogReader<R: Read> {
    inner: R,
    exhausted: bool,
    truncated_tail: bool,
}

impl<R: Read> LogReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            exhausted: false,
            truncated_tail: false,
        }
    }

    /// Read the next frame's payload into `buf`, returning its timestamp.
    ///
    /// `Ok(None)` is end-of-log, including a cut-short final frame; once
    /// returned, every later call returns it too.
    ///
    /// # Errors
    ///
    /// Only I/O failures from the underlying reader.
    pub fn read_into(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<f64>> {
        buf.clear();
        if self.exhausted {
            return Ok(None);
        }

        let mut prefix = [0u8; FRAME_HEADER_LEN];
        let got = read_full(&mut self.inner, &mut prefix)?;
        if got < FRAME_HEADER_LEN {
            self.exhausted = true;
            self.truncated_tail = got > 0;
            return Ok(None);
        }
        let (ts, length) = prefix.split_at(8);
        let timestamp = f64::from_le_bytes(ts.try_into().unwrap_or_default());
        let len = u32::from_le_bytes(length.try_into().unwrap_or_default());

        // `take` grows the buffer as bytes arrive instead of trusting the
        // declared length for the allocation.
        self.inner.by_ref().take(u64::from(len)).read_to_end(buf)?;
        if (buf.len() as u64) < u64::from(len) {
            buf.clear();
            self.exhausted = true;
            self.truncated_tail = true;
            return Ok(None);
        }
        Ok(Some(timestamp))
    }

    /// Owned variant of [`LogReader::read_into`].
    ///
    /// # Errors
    ///
    /// Only I/O failures from the underlying reader.
    pub fn next_record(&mut self) -> io::Result<Option<LogRecord>> {
        let mut payload = Vec::new();
        Ok(self
            .read_into(&mut payload)?
            .map(|timestamp| LogRecord { timestamp, payload }))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// True when the log ended in the middle of a frame.
    pub fn truncated_tail(&self) -> bool {
        self.truncated_tail
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = io::Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Fill `buf` as far as the reader allows; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Whole-log statistics, as printed by `f1ctl info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogSummary {
    pub records: u64,
    pub first_timestamp: Option<f64>,
    pub last_timestamp: Option<f64>,
    /// Payload bytes, excluding frame prefixes.
    pub payload_bytes: u64,
    /// Records per packet kind name.
    pub kinds: BTreeMap<String, u64>,
    /// Records whose payload did not decode.
    pub decode_errors: u64,
    pub truncated_tail: bool,
}

impl LogSummary {
    /// Scan a whole log, decoding every payload with `registry`.
    ///
    /// # Errors
    ///
    /// Only I/O failures; decode failures are counted.
    pub fn scan<R: Read>(reader: R, registry: &PacketRegistry) -> io::Result<Self> {
        let mut log = LogReader::new(reader);
        let mut summary = LogSummary::default();
        let mut buf = Vec::new();
        while let Some(timestamp) = log.read_into(&mut buf)? {
            summary.records += 1;
            summary.payload_bytes += buf.len() as u64;
            summary.first_timestamp.get_or_insert(timestamp);
            summary.last_timestamp = Some(timestamp);
            match registry.decode(&buf) {
                Ok(packet) => {
                    *summary
                        .kinds
                        .entry(packet.kind().name().to_owned())
                        .or_default() += 1;
                }
                Err(_) => summary.decode_errors += 1,
            }
        }
        summary.truncated_tail = log.truncated_tail();
        Ok(summary)
    }

    /// Seconds between the first and last record.
    pub fn duration(&self) -> f64 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => (last - first).max(0.0),
            _ => 0.0,
        }
    }
}
