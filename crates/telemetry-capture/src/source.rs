//! Unified pull interface over live, recording and replay sources.

use std::sync::Arc;

use f1_telemetry_protocol::{Packet, PacketRegistry};
use tracing::info;

use crate::close::CloseHandle;
use crate::config::SourceConfig;
use crate::error::CaptureError;
use crate::live::LiveSource;
use crate::recorder::Recorder;
use crate::replay::ReplaySource;

/// "Get the next packet", regardless of where packets come from.
///
/// Results follow one convention everywhere:
///
/// * `Ok(Some(_))`: a datagram or packet.
/// * `Ok(None)`: end of stream (replay only; live sources never end).
/// * `Err(_)`: a hard error. Decode errors leave the source usable.
pub trait PacketSource {
    /// Raw bytes of the next datagram, valid until the next pull.
    ///
    /// # Errors
    ///
    /// Transport, log, timeout and close failures.
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, CaptureError>;

    /// Registry used by [`PacketSource::next_packet`].
    fn registry(&self) -> &Arc<PacketRegistry>;

    /// Handle that closes this source from another thread.
    fn close_handle(&self) -> CloseHandle;

    /// Pull and decode the next packet.
    ///
    /// # Errors
    ///
    /// As [`PacketSource::next_datagram`], plus [`CaptureError::Decode`].
    fn next_packet(&mut self) -> Result<Option<Packet>, CaptureError> {
        let registry = Arc::clone(self.registry());
        match self.next_datagram()? {
            Some(datagram) => Ok(Some(registry.decode(datagram)?)),
            None => Ok(None),
        }
    }

    /// Iterator over decoded packets.
    ///
    /// Decode errors are yielded and iteration continues; iteration stops
    /// after end of stream or any other error.
    fn packets(&mut self) -> Packets<'_, Self>
    where
        Self: Sized,
    {
        Packets {
            source: self,
            done: false,
        }
    }
}

/// Iterator returned by [`PacketSource::packets`].
#[derive(Debug)]
pub struct Packets<'a, S> {
    source: &'a mut S,
    done: bool,
}

impl<S: PacketSource> Iterator for Packets<'_, S> {
    type Item = Result<Packet, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = !err.is_decode();
                Some(Err(err))
            }
        }
    }
}

/// The closed set of sources a configuration can produce.
#[derive(Debug)]
pub enum Source {
    Live(LiveSource),
    Recording(Recorder),
    Replay(ReplaySource),
}

impl Source {
    /// Build the source selected by `config`.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Bind`] when the socket cannot be bound,
    /// [`CaptureError::Log`] when the log cannot be opened or created.
    pub fn open(config: &SourceConfig, registry: Arc<PacketRegistry>) -> Result<Self, CaptureError> {
        match config {
            SourceConfig::Live {
                addr,
                recording: None,
            } => Ok(Source::Live(LiveSource::bind_with_registry(*addr, registry)?)),
            SourceConfig::Live {
                addr,
                recording: Some(recording),
            } => {
                let live = LiveSource::bind_with_registry(*addr, registry)?;
                let recorder =
                    Recorder::create_in(live, &recording.dir)?.with_flush_policy(recording.flush);
                Ok(Source::Recording(recorder))
            }
            SourceConfig::Replay { path, speed } => Ok(Source::Replay(
                ReplaySource::open(path)?
                    .with_registry(registry)
                    .with_speed(*speed),
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Source::Live(_) => "live",
            Source::Recording(_) => "recording",
            Source::Replay(_) => "replay",
        }
    }

    /// Release the socket or file.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Log`] if a recording cannot be flushed.
    pub fn close(&mut self) -> Result<(), CaptureError> {
        info!(source = self.kind(), "closing packet source");
        match self {
            Source::Live(live) => {
                live.close();
                Ok(())
            }
            Source::Recording(recorder) => recorder.close(),
            Source::Replay(replay) => {
                replay.close();
                Ok(())
            }
        }
    }
}

impl PacketSource for Source {
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, CaptureError> {
        match self {
            Source::Live(live) => live.next_datagram(),
            Source::Recording(recorder) => recorder.next_datagram(),
            Source::Replay(replay) => replay.next_datagram(),
        }
    }

    fn registry(&self) -> &Arc<PacketRegistry> {
        match self {
            Source::Live(live) => live.registry(),
            Source::Recording(recorder) => recorder.registry(),
            Source::Replay(replay) => replay.registry(),
        }
    }

    fn close_handle(&self) -> CloseHandle {
        match self {
            Source::Live(live) => live.close_handle(),
            Source::Recording(recorder) => recorder.close_handle(),
            Source::Replay(replay) => replay.close_handle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogWriter;
    use f1_telemetry_protocol::{PacketKind, fixtures};
    use std::io::Cursor;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn packets_iterator_yields_decode_errors_and_continues() -> TestResult {
        let telemetry = fixtures::f1_25_packet(PacketKind::CarTelemetry)?;
        let mut writer = LogWriter::new(Vec::new());
        writer.append(0.0, &telemetry)?;
        writer.append(0.0, &[0xAA; 8])?;
        writer.append(0.0, &telemetry)?;

        let mut replay = ReplaySource::from_reader(Cursor::new(writer.into_inner()));
        let results: Vec<_> = replay.packets().collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(results.first(), Some(Ok(p)) if p.kind() == PacketKind::CarTelemetry));
        assert!(matches!(results.get(1), Some(Err(e)) if e.is_decode()));
        assert!(matches!(results.get(2), Some(Ok(_))));
        Ok(())
    }

    #[test]
    fn packets_iterator_stops_after_close() -> TestResult {
        let mut replay = ReplaySource::from_reader(Cursor::new(Vec::new()));
        replay.close_handle().close();
        let results: Vec<_> = replay.packets().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results.first(), Some(Err(CaptureError::Closed))));
        Ok(())
    }
}
