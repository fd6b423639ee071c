//! Construction-time configuration.
//!
//! [`CaptureOptions`] is what users write (YAML file, environment, CLI
//! flags); [`SourceConfig`] is the validated result with exactly one mode
//! selected.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::live::DEFAULT_PORT;
use crate::recorder::FlushPolicy;
use crate::replay::{MAX_SPEED, MIN_SPEED};

pub const ENV_BIND_ADDRESS: &str = "F1_TELEMETRY_BIND_ADDRESS";
pub const ENV_UDP_PORT: &str = "F1_TELEMETRY_UDP_PORT";
pub const ENV_RECORD_DIR: &str = "F1_TELEMETRY_RECORD_DIR";
pub const ENV_REPLAY_FILE: &str = "F1_TELEMETRY_REPLAY_FILE";

pub const DEFAULT_RECORD_DIR: &str = "telemetry_data";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("replay_file {} cannot be combined with {conflicting}", replay_file.display())]
    ConflictingModes {
        replay_file: PathBuf,
        /// The live-mode option that was also set.
        conflicting: &'static str,
    },

    #[error("invalid value for {field}: {value:?} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// User-facing capture options. Unset fields take their defaults in
/// [`CaptureOptions::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureOptions {
    /// Interface to listen on; `0.0.0.0` when unset.
    pub bind_address: Option<IpAddr>,
    /// UDP port; 20777 when unset.
    pub port: Option<u16>,
    /// Tee live traffic into a replay log.
    pub record: bool,
    pub record_dir: PathBuf,
    pub flush: FlushPolicy,
    /// Replay this log instead of listening.
    pub replay_file: Option<PathBuf>,
    pub replay_speed: f64,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            bind_address: None,
            port: None,
            record: false,
            record_dir: PathBuf::from(DEFAULT_RECORD_DIR),
            flush: FlushPolicy::EveryRecord,
            replay_file: None,
            replay_speed: 1.0,
        }
    }
}

/// Where recorded frames go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingConfig {
    pub dir: PathBuf,
    pub flush: FlushPolicy,
}

/// Validated choice of packet source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Live {
        addr: SocketAddr,
        recording: Option<RecordingConfig>,
    },
    Replay {
        path: PathBuf,
        speed: f64,
    },
}

impl CaptureOptions {
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed YAML or unknown keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file is unreadable, [`ConfigError::Parse`]
    /// if it is not valid.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Apply `F1_TELEMETRY_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for unparsable values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for unparsable values.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_BIND_ADDRESS) {
            self.bind_address = Some(value.trim().parse().map_err(|err| {
                invalid(ENV_BIND_ADDRESS, &value, err)
            })?);
        }
        if let Some(value) = lookup(ENV_UDP_PORT) {
            self.port = Some(value.trim().parse().map_err(|err| invalid(ENV_UDP_PORT, &value, err))?);
        }
        if let Some(value) = lookup(ENV_RECORD_DIR) {
            self.record_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_REPLAY_FILE) {
            self.replay_file = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Select exactly one mode.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ConflictingModes`] when a replay file is set together
    /// with recording or an explicit bind address or port;
    /// [`ConfigError::InvalidValue`] for a speed outside `0.1..=10.0` or
    /// port 0.
    pub fn resolve(&self) -> Result<SourceConfig, ConfigError> {
        if let Some(path) = &self.replay_file {
            let conflicting = if self.record {
                Some("record")
            } else if self.bind_address.is_some() {
                Some("bind_address")
            } else if self.port.is_some() {
                Some("port")
            } else {
                None
            };
            if let Some(conflicting) = conflicting {
                return Err(ConfigError::ConflictingModes {
                    replay_file: path.clone(),
                    conflicting,
                });
            }
            if !(MIN_SPEED..=MAX_SPEED).contains(&self.replay_speed) {
                return Err(ConfigError::InvalidValue {
                    field: "replay_speed",
                    value: self.replay_speed.to_string(),
                    reason: format!("must be between {MIN_SPEED} and {MAX_SPEED}"),
                });
            }
            return Ok(SourceConfig::Replay {
                path: path.clone(),
                speed: self.replay_speed,
            });
        }

        let port = self.port.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                value: port.to_string(),
                reason: "must be between 1 and 65535".to_owned(),
            });
        }
        let ip = self.bind_address.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Ok(SourceConfig::Live {
            addr: SocketAddr::new(ip, port),
            recording: self.record.then(|| RecordingConfig {
                dir: self.record_dir.clone(),
                flush: self.flush,
            }),
        })
    }
}

fn invalid(field: &'static str, value: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        value: value.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn defaults_resolve_to_live_on_20777() -> TestResult {
        let config = CaptureOptions::default().resolve()?;
        assert_eq!(
            config,
            SourceConfig::Live {
                addr: "0.0.0.0:20777".parse()?,
                recording: None,
            }
        );
        Ok(())
    }

    #[test]
    fn yaml_fields_map_onto_options() -> TestResult {
        let options = CaptureOptions::from_yaml_str(
            "bind_address: 127.0.0.1\nport: 20800\nrecord: true\nrecord_dir: laps\nflush: buffered\n",
        )?;
        assert_eq!(
            options.resolve()?,
            SourceConfig::Live {
                addr: "127.0.0.1:20800".parse()?,
                recording: Some(RecordingConfig {
                    dir: PathBuf::from("laps"),
                    flush: FlushPolicy::Buffered,
                }),
            }
        );
        Ok(())
    }

    #[test]
    fn unknown_yaml_key_is_rejected() {
        let result = CaptureOptions::from_yaml_str("prot: 20777\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn replay_with_record_conflicts() {
        let options = CaptureOptions {
            replay_file: Some(PathBuf::from("session.tlm")),
            record: true,
            ..CaptureOptions::default()
        };
        assert!(matches!(
            options.resolve(),
            Err(ConfigError::ConflictingModes {
                conflicting: "record",
                ..
            })
        ));
    }

    #[test]
    fn replay_with_explicit_port_conflicts() {
        let options = CaptureOptions {
            replay_file: Some(PathBuf::from("session.tlm")),
            port: Some(20777),
            ..CaptureOptions::default()
        };
        assert!(matches!(
            options.resolve(),
            Err(ConfigError::ConflictingModes {
                conflicting: "port",
                ..
            })
        ));
    }

    #[test]
    fn replay_speed_out_of_range_is_invalid() {
        let options = CaptureOptions {
            replay_file: Some(PathBuf::from("session.tlm")),
            replay_speed: 25.0,
            ..CaptureOptions::default()
        };
        assert!(matches!(
            options.resolve(),
            Err(ConfigError::InvalidValue {
                field: "replay_speed",
                ..
            })
        ));
    }

    #[test]
    fn env_overrides_apply() -> TestResult {
        let mut options = CaptureOptions::default();
        options.apply_env_from(|name| match name {
            ENV_UDP_PORT => Some("30000".to_owned()),
            ENV_REPLAY_FILE => Some("race.tlm".to_owned()),
            _ => None,
        })?;
        assert_eq!(options.port, Some(30000));
        assert_eq!(options.replay_file, Some(PathBuf::from("race.tlm")));
        // Port from the environment is explicit, so replay now conflicts.
        assert!(matches!(
            options.resolve(),
            Err(ConfigError::ConflictingModes { .. })
        ));
        Ok(())
    }

    #[test]
    fn bad_env_port_is_invalid_value() {
        let mut options = CaptureOptions::default();
        let result = options.apply_env_from(|name| {
            (name == ENV_UDP_PORT).then(|| "not-a-port".to_owned())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: ENV_UDP_PORT,
                ..
            })
        ));
    }

    #[test]
    fn conflict_message_names_both_options() {
        let err = ConfigError::ConflictingModes {
            replay_file: PathBuf::from("race.tlm"),
            conflicting: "bind_address",
        };
        insta::assert_snapshot!(err.to_string(), @"replay_file race.tlm cannot be combined with bind_address");
    }
}
