//! Capture-side errors: transport, log file and decode failures.

use std::borrow::Cow;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use f1_telemetry_protocol::DecodeError;

/// Failure while pulling from a packet source.
///
/// Nothing here is retried by the source itself. After a transport error the
/// instance should be dropped; after a decode error the caller may keep
/// pulling.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("UDP receive failed: {0}")]
    Transport(#[source] io::Error),

    /// `path` is `None` for logs held in memory or behind a caller's reader.
    #[error("replay log I/O failed for {}: {source}", log_target(path.as_deref()))]
    Log {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("timed out waiting for a datagram")]
    Timeout,

    #[error("source closed")]
    Closed,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl CaptureError {
    /// True for socket and file failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CaptureError::Bind { .. } | CaptureError::Transport(_) | CaptureError::Log { .. }
        )
    }

    /// True when the bytes arrived but could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, CaptureError::Decode(_))
    }

    pub(crate) fn log(path: Option<&Path>, source: io::Error) -> Self {
        CaptureError::Log {
            path: path.map(Path::to_path_buf),
            source,
        }
    }
}

fn log_target(path: Option<&Path>) -> Cow<'_, str> {
    match path {
        Some(path) => path.to_string_lossy(),
        None => Cow::Borrowed("<memory>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_helpers() {
        let transport = CaptureError::Transport(io::Error::other("boom"));
        assert!(transport.is_transport());
        assert!(!transport.is_decode());

        let decode = CaptureError::from(DecodeError::Truncated {
            needed: 29,
            available: 3,
        });
        assert!(decode.is_decode());
        assert!(!decode.is_transport());

        assert!(!CaptureError::Closed.is_transport());
        assert!(!CaptureError::Timeout.is_decode());
    }

    #[test]
    fn decode_error_text_is_forwarded() {
        let err = CaptureError::from(DecodeError::Truncated {
            needed: 29,
            available: 3,
        });
        insta::assert_snapshot!(err.to_string(), @"truncated input: need 29 bytes, have 3");
    }

    #[test]
    fn log_error_names_file_or_memory() {
        let on_disk = CaptureError::log(
            Some(Path::new("logs/session.tlm")),
            io::Error::other("disk full"),
        );
        insta::assert_snapshot!(on_disk.to_string(), @"replay log I/O failed for logs/session.tlm: disk full");

        let in_memory = CaptureError::log(None, io::Error::other("disk full"));
        insta::assert_snapshot!(in_memory.to_string(), @"replay log I/O failed for <memory>: disk full");
        assert!(in_memory.is_transport());
    }
}
