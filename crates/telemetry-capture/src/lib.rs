//! Live capture, recording and timed replay of EA F1 25 UDP telemetry.
//!
//! Every source implements [`PacketSource`]: pull the next datagram or
//! decoded [`Packet`](f1_telemetry_protocol::Packet), blocking until one is
//! available. Sources are synchronous and single-owner; the only
//! cross-thread operation is [`CloseHandle::close`].
//!
//! * [`LiveSource`] receives one datagram per pull from a UDP socket.
//! * [`Recorder`] wraps a live source and appends every datagram to a
//!   replay log before returning it.
//! * [`ReplaySource`] reads a replay log back with the original spacing.
//! * [`Source`] is the closed set of the above, built from a
//!   [`SourceConfig`].

#![deny(static_mut_refs)]

pub mod close;
pub mod config;
pub mod error;
pub mod live;
pub mod log;
pub mod recorder;
pub mod replay;
pub mod source;

pub use close::CloseHandle;
pub use config::{CaptureOptions, ConfigError, RecordingConfig, SourceConfig};
pub use error::CaptureError;
pub use live::{DEFAULT_BIND_ADDR, DEFAULT_PORT, LiveSource, MAX_DATAGRAM_LEN};
pub use log::{FRAME_HEADER_LEN, LogReader, LogRecord, LogSummary, LogWriter};
pub use recorder::{FlushPolicy, Recorder};
pub use replay::ReplaySource;
pub use source::{PacketSource, Packets, Source};

pub use f1_telemetry_protocol as protocol;
