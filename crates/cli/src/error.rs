//! Error types and exit codes for f1ctl

use std::io;

use f1_telemetry_capture::{CaptureError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Process exit code for a failed command.
///
/// * 2: usage error (reported by clap before any command runs)
/// * 3: log file not found
/// * 4: invalid configuration or argument
/// * 5: socket bind or transport failure
/// * 1: anything else
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return match cli {
                CliError::InvalidArgument(_) => 4,
                CliError::Signal(_) => 1,
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return 4;
        }
        if let Some(capture) = cause.downcast_ref::<CaptureError>() {
            return match capture {
                CaptureError::Log { source, .. } if source.kind() == io::ErrorKind::NotFound => 3,
                CaptureError::Bind { .. } | CaptureError::Transport(_) => 5,
                _ => 1,
            };
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::NotFound {
                return 3;
            }
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn config_errors_map_to_four() {
        let err = anyhow::Error::from(ConfigError::InvalidValue {
            field: "replay_speed",
            value: "50".to_owned(),
            reason: "out of range".to_owned(),
        });
        assert_eq!(exit_code(&err), 4);
    }

    #[test]
    fn missing_log_through_context_maps_to_three() {
        let result: Result<(), io::Error> = Err(io::ErrorKind::NotFound.into());
        let err = result.context("failed to open replay log").err();
        assert_eq!(err.as_ref().map(exit_code), Some(3));
    }

    #[test]
    fn transport_errors_map_to_five() {
        let err = anyhow::Error::from(CaptureError::Transport(io::ErrorKind::ConnectionReset.into()));
        assert_eq!(exit_code(&err), 5);
    }

    #[test]
    fn closed_source_is_generic_failure() {
        assert_eq!(exit_code(&anyhow::Error::from(CaptureError::Closed)), 1);
    }
}
