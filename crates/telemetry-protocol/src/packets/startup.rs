//! Script startup marker (id 99).
//!
//! Not sent by the game. Capture tooling emits it to mark the start of a
//! recording; the payload after the header is free-form text.

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, PacketHeader};

/// Packet id reserved for the startup marker.
pub const SCRIPT_STARTUP_PACKET_ID: u8 = 99;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptStartupPacket {
    pub header: PacketHeader,
    /// Payload decoded lossily as UTF-8, trailing NULs removed.
    pub note: String,
}

impl ScriptStartupPacket {
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let payload = raw.get(HEADER_SIZE..).unwrap_or_default();
        let note = String::from_utf8_lossy(payload)
            .trim_end_matches('\0')
            .to_owned();
        Ok(Self { header, note })
    }

    /// Wire encoding of a startup marker carrying `note`.
    pub fn encode(header: &PacketHeader, note: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + note.len());
        header.write_to(&mut out);
        out.extend_from_slice(note.as_bytes());
        out
    }
}
