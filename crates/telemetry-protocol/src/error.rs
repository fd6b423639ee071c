//! Decode errors for the F1 telemetry wire protocol.

use crate::registry::RegistryKey;

/// Errors produced while turning raw datagram bytes into typed packets.
///
/// Every variant is a hard failure: the decoder never skips or repairs input.
/// Callers decide whether to continue with the next datagram or abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes were available than a fixed-size structure requires.
    #[error("truncated input: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required by the structure being decoded
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    /// No decoder is registered for the header's `(format, version, id)`.
    #[error("unknown packet type {0}")]
    UnknownPacketType(RegistryKey),

    /// The buffer length does not match the size declared for a known packet type.
    #[error("malformed packet {key}: expected {expected} bytes, got {actual}")]
    Malformed {
        /// Registry key of the packet type
        key: RegistryKey,
        /// Size declared for the packet type
        expected: usize,
        /// Size of the buffer received
        actual: usize,
    },
}

impl DecodeError {
    /// Registry key involved in the failure, if the header was decoded.
    pub fn key(&self) -> Option<RegistryKey> {
        match self {
            DecodeError::Truncated { .. } => None,
            DecodeError::UnknownPacketType(key) | DecodeError::Malformed { key, .. } => Some(*key),
        }
    }

    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        DecodeError::Truncated { needed, available }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_exposed_for_registry_failures() {
        let key = RegistryKey::new(2025, 1, 42);
        assert_eq!(DecodeError::UnknownPacketType(key).key(), Some(key));
        let malformed = DecodeError::Malformed {
            key,
            expected: 45,
            actual: 44,
        };
        assert_eq!(malformed.key(), Some(key));
        assert_eq!(DecodeError::truncated(29, 3).key(), None);
    }
}
