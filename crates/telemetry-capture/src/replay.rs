//! Replay: reads a log and re-emits frames with their recorded spacing.
//!
//! The first pull anchors the replay epoch. Frame *i* with timestamp `t_i` is
//! never returned before `epoch + t_i / speed`; a frame that is already due
//! is returned at once, so a slow consumer catches up instead of drifting.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use f1_telemetry_protocol::PacketRegistry;
use tracing::{debug, info, trace};

use crate::close::{CloseHandle, CloseSignal};
use crate::error::CaptureError;
use crate::log::LogReader;
use crate::source::PacketSource;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;

/// Clamp a playback speed into `MIN_SPEED..=MAX_SPEED`; NaN means real time.
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        1.0
    } else {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    }
}

/// Timed reader over a replay log.
#[derive(Debug)]
pub struct ReplaySource<R: Read = BufReader<File>> {
    reader: LogReader<R>,
    path: Option<PathBuf>,
    buf: Vec<u8>,
    /// Frame already read by `seek_to` but not yet returned.
    pending: Option<f64>,
    epoch: Option<Instant>,
    /// Log time that maps to the epoch.
    origin: f64,
    speed: f64,
    records_read: u64,
    registry: Arc<PacketRegistry>,
    close: CloseSignal,
}

impl ReplaySource<BufReader<File>> {
    /// Open a log file for replay.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CaptureError::log(Some(path), source))?;
        info!(path = %path.display(), "replay log opened");
        let mut source = Self::from_reader(BufReader::new(file));
        source.path = Some(path.to_path_buf());
        Ok(source)
    }
}

impl<R: Read> ReplaySource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: LogReader::new(reader),
            path: None,
            buf: Vec::new(),
            pending: None,
            epoch: None,
            origin: 0.0,
            speed: 1.0,
            records_read: 0,
            registry: Arc::new(PacketRegistry::f1_25()),
            close: CloseSignal::for_timer(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<PacketRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Playback speed factor, clamped to `0.1..=10.0`.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.set_speed(speed);
        self
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Skip frames stamped before `seconds`; the first frame at or after it
    /// becomes due immediately on the next pull.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] on read failure, [`CaptureError::Closed`] once
    /// closed.
    pub fn seek_to(&mut self, seconds: f64) -> Result<(), CaptureError> {
        self.close.check()?;
        let mut skipped = 0u64;
        let found = loop {
            let timestamp = match self.pending.take() {
                Some(timestamp) => timestamp,
                None => match self.read_frame()? {
                    Some(timestamp) => timestamp,
                    None => break None,
                },
            };
            if timestamp >= seconds {
                break Some(timestamp);
            }
            skipped += 1;
        };
        self.pending = found;
        self.origin = found.unwrap_or(seconds);
        self.epoch = None;
        debug!(target_secs = seconds, skipped, "replay seek");
        Ok(())
    }

    /// Frames returned so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True once the end of the log has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none() && self.reader.is_exhausted()
    }

    /// True when the log ended part-way through a frame.
    pub fn truncated_tail(&self) -> bool {
        self.reader.truncated_tail()
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.handle()
    }

    pub fn close(&mut self) {
        if !self.close.is_closed() {
            self.close.mark_closed();
            info!(path = ?self.path, records = self.records_read, "replay closed");
        }
    }

    /// Next frame, held back until it is due.
    ///
    /// `Ok(None)` is end-of-stream and is returned for every later call.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] on read failure, [`CaptureError::Closed`] when
    /// closed before or during the wait.
    pub fn next_frame(&mut self) -> Result<Option<&[u8]>, CaptureError> {
        self.close.check()?;
        let epoch = *self.epoch.get_or_insert_with(Instant::now);

        let timestamp = match self.pending.take() {
            Some(timestamp) => timestamp,
            None => match self.read_frame()? {
                Some(timestamp) => timestamp,
                None => return Ok(None),
            },
        };

        if let Some(deadline) = self.deadline(epoch, timestamp) {
            self.close.sleep_until(deadline)?;
        }

        self.records_read += 1;
        trace!(timestamp, len = self.buf.len(), "frame replayed");
        Ok(Some(self.buf.as_slice()))
    }

    /// Instant at which a frame stamped `timestamp` is due, or `None` when it
    /// is due immediately. Stamps that are not finite, not after the origin,
    /// or too far out for the clock to represent fall in the latter group.
    fn deadline(&self, epoch: Instant, timestamp: f64) -> Option<Instant> {
        let secs = (timestamp - self.origin) / self.speed;
        if !(secs.is_finite() && secs > 0.0) {
            return None;
        }
        let delay = Duration::try_from_secs_f64(secs).ok()?;
        epoch.checked_add(delay)
    }

    fn read_frame(&mut self) -> Result<Option<f64>, CaptureError> {
        let was_exhausted = self.reader.is_exhausted();
        let frame = self
            .reader
            .read_into(&mut self.buf)
            .map_err(|source| CaptureError::log(self.path.as_deref(), source))?;
        if frame.is_none() && !was_exhausted {
            debug!(
                records = self.records_read,
                truncated_tail = self.reader.truncated_tail(),
                "replay log exhausted"
            );
        }
        Ok(frame)
    }
}

impl<R: Read> PacketSource for ReplaySource<R> {
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, CaptureError> {
        self.next_frame()
    }

    fn registry(&self) -> &Arc<PacketRegistry> {
        &self.registry
    }

    fn close_handle(&self) -> CloseHandle {
        ReplaySource::close_handle(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogWriter;
    use std::io::Cursor;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn log_bytes(frames: &[(f64, &[u8])]) -> Result<Vec<u8>, std::io::Error> {
        let mut writer = LogWriter::new(Vec::new());
        for (timestamp, payload) in frames {
            writer.append(*timestamp, payload)?;
        }
        Ok(writer.into_inner())
    }

    #[test]
    fn speed_is_clamped() {
        assert!((clamp_speed(100.0) - MAX_SPEED).abs() < f64::EPSILON);
        assert!((clamp_speed(0.0) - MIN_SPEED).abs() < f64::EPSILON);
        assert!((clamp_speed(f64::NAN) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_speed(2.5) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn seek_skips_earlier_frames_and_is_due_immediately() -> TestResult {
        let bytes = log_bytes(&[
            (0.0, &[1][..]),
            (5.0, &[2][..]),
            (30.0, &[3][..]),
            (30.2, &[4][..]),
        ])?;
        let mut replay = ReplaySource::from_reader(Cursor::new(bytes));
        replay.seek_to(30.0)?;

        let started = Instant::now();
        assert_eq!(replay.next_frame()?, Some(&[3u8][..]));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(replay.next_frame()?, Some(&[4u8][..]));
        assert!(started.elapsed() >= Duration::from_millis(190));
        assert_eq!(replay.next_frame()?, None);
        assert_eq!(replay.records_read(), 2);
        Ok(())
    }

    #[test]
    fn seek_past_end_exhausts() -> TestResult {
        let bytes = log_bytes(&[(0.0, &[1][..])])?;
        let mut replay = ReplaySource::from_reader(Cursor::new(bytes));
        replay.seek_to(60.0)?;
        assert!(replay.is_exhausted());
        assert_eq!(replay.next_frame()?, None);
        Ok(())
    }

    #[test]
    fn non_finite_and_negative_timestamps_emit_immediately() -> TestResult {
        let bytes = log_bytes(&[
            (f64::NAN, &[1][..]),
            (-3.0, &[2][..]),
            (f64::INFINITY, &[3][..]),
        ])?;
        let mut replay = ReplaySource::from_reader(Cursor::new(bytes));
        let started = Instant::now();
        while replay.next_frame()?.is_some() {}
        assert_eq!(replay.records_read(), 3);
        assert!(started.elapsed() < Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn timestamps_beyond_the_clock_range_emit_immediately() -> TestResult {
        let bytes = log_bytes(&[(1.0e19, &[1][..]), (f64::MAX, &[2][..])])?;
        let mut replay = ReplaySource::from_reader(Cursor::new(bytes));
        let started = Instant::now();
        assert_eq!(replay.next_frame()?, Some(&[1u8][..]));
        assert_eq!(replay.next_frame()?, Some(&[2u8][..]));
        assert_eq!(replay.next_frame()?, None);
        assert!(started.elapsed() < Duration::from_secs(5));

        let bytes = log_bytes(&[(1.0e18, &[3][..])])?;
        let mut slow = ReplaySource::from_reader(Cursor::new(bytes)).with_speed(0.1);
        assert_eq!(slow.next_frame()?, Some(&[3u8][..]));
        Ok(())
    }

    #[test]
    fn faster_speed_shortens_waits() -> TestResult {
        let bytes = log_bytes(&[(0.0, &[1][..]), (1.0, &[2][..])])?;
        let mut replay = ReplaySource::from_reader(Cursor::new(bytes)).with_speed(10.0);
        let started = Instant::now();
        while replay.next_frame()?.is_some() {}
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(900));
        Ok(())
    }

    #[test]
    fn closed_replay_refuses_pulls() -> TestResult {
        let bytes = log_bytes(&[(0.0, &[1][..])])?;
        let mut replay = ReplaySource::from_reader(Cursor::new(bytes));
        replay.close();
        assert!(matches!(replay.next_frame(), Err(CaptureError::Closed)));
        Ok(())
    }
}
