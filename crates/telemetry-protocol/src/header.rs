//! The 29-byte header present at the start of every F1 25 UDP packet.

use serde::Serialize;

use crate::error::DecodeError;
use crate::reader::ByteReader;
use crate::registry::RegistryKey;

/// Size of the packet header in bytes (identical for formats 2023 to 2025).
pub const HEADER_SIZE: usize = 29;

/// Packet format value sent by F1 25.
pub const PACKET_FORMAT_2025: u16 = 2025;

/// Grid size; per-car arrays always carry this many entries.
pub const NUM_CARS: usize = 22;

/// Decoded packet header.
///
/// | Offset | Field |
/// |--------|-------|
/// | 0  | `packet_format` (u16) |
/// | 2  | `game_year` (u8) |
/// | 3  | `game_major_version` (u8) |
/// | 4  | `game_minor_version` (u8) |
/// | 5  | `packet_version` (u8) |
/// | 6  | `packet_id` (u8) |
/// | 7  | `session_uid` (u64) |
/// | 15 | `session_time` (f32) |
/// | 19 | `frame_identifier` (u32) |
/// | 23 | `overall_frame_identifier` (u32) |
/// | 27 | `player_car_index` (u8) |
/// | 28 | `secondary_player_car_index` (u8) |
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PacketHeader {
    pub packet_format: u16,
    pub game_year: u8,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_id: u8,
    pub session_uid: u64,
    /// Seconds since the session started.
    pub session_time: f32,
    pub frame_identifier: u32,
    /// Frame counter that does not go back after flashbacks.
    pub overall_frame_identifier: u32,
    pub player_car_index: u8,
    /// 255 when there is no second local player.
    pub secondary_player_car_index: u8,
}

impl PacketHeader {
    /// Decode the header from the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// Trailing payload bytes are ignored; their length is validated by the
    /// registry, not here.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::truncated(HEADER_SIZE, buf.len()));
        }
        let mut r = ByteReader::new(buf);
        Ok(Self {
            packet_format: r.u16_le()?,
            game_year: r.u8()?,
            game_major_version: r.u8()?,
            game_minor_version: r.u8()?,
            packet_version: r.u8()?,
            packet_id: r.u8()?,
            session_uid: r.u64_le()?,
            session_time: r.f32_le()?,
            frame_identifier: r.u32_le()?,
            overall_frame_identifier: r.u32_le()?,
            player_car_index: r.u8()?,
            secondary_player_car_index: r.u8()?,
        })
    }

    /// Key used to select the payload decoder.
    pub fn registry_key(&self) -> RegistryKey {
        RegistryKey::new(self.packet_format, self.packet_version, self.packet_id)
    }

    /// Append the wire encoding of this header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.packet_format.to_le_bytes());
        out.push(self.game_year);
        out.push(self.game_major_version);
        out.push(self.game_minor_version);
        out.push(self.packet_version);
        out.push(self.packet_id);
        out.extend_from_slice(&self.session_uid.to_le_bytes());
        out.extend_from_slice(&self.session_time.to_le_bytes());
        out.extend_from_slice(&self.frame_identifier.to_le_bytes());
        out.extend_from_slice(&self.overall_frame_identifier.to_le_bytes());
        out.push(self.player_car_index);
        out.push(self.secondary_player_car_index);
    }

    /// Header for an F1 25 packet with the given id; all other fields zeroed.
    pub fn f1_25(packet_id: u8) -> Self {
        Self {
            packet_format: PACKET_FORMAT_2025,
            game_year: 25,
            game_major_version: 1,
            game_minor_version: 0,
            packet_version: 1,
            packet_id,
            session_uid: 0,
            session_time: 0.0,
            frame_identifier: 0,
            overall_frame_identifier: 0,
            player_car_index: 0,
            secondary_player_car_index: 255,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn write_to_emits_exactly_header_size_bytes() {
        let mut buf = Vec::new();
        PacketHeader::f1_25(6).write_to(&mut buf);
        assert_eq!(buf.len(), HEADER_SIZE);
    }

    #[test]
    fn decode_reads_fields_at_fixed_offsets() -> TestResult {
        let header = PacketHeader {
            session_uid: 0x0102_0304_0506_0708,
            session_time: 12.5,
            frame_identifier: 4321,
            overall_frame_identifier: 4400,
            player_car_index: 19,
            secondary_player_car_index: 3,
            ..PacketHeader::f1_25(7)
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf);

        assert_eq!(buf.get(6).copied(), Some(7));
        assert_eq!(buf.get(27).copied(), Some(19));
        assert_eq!(PacketHeader::decode(&buf)?, header);
        Ok(())
    }

    #[test]
    fn decode_ignores_trailing_payload() -> TestResult {
        let mut buf = Vec::new();
        PacketHeader::f1_25(3).write_to(&mut buf);
        buf.extend_from_slice(b"SSTA");
        let header = PacketHeader::decode(&buf)?;
        assert_eq!(header.packet_id, 3);
        Ok(())
    }

    #[test]
    fn decode_short_buffer_is_truncated() {
        assert_eq!(
            PacketHeader::decode(&[0u8; 28]),
            Err(DecodeError::Truncated {
                needed: HEADER_SIZE,
                available: 28
            })
        );
    }
}
