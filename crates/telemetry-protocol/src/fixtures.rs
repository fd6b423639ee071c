//! Builders for synthetic packets, used by tests and tooling.
//!
//! Every builder produces bytes that the registry accepts: the header comes
//! first and the buffer has exactly the length registered for its key.

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, PacketHeader};
use crate::packet::PacketKind;
use crate::packets::car::CAR_TELEMETRY_ENTRY_SIZE;
use crate::registry::{PacketRegistry, RegistryKey};

/// Header followed by zeroes up to `len` bytes.
pub fn zeroed_packet(header: &PacketHeader, len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(len.max(HEADER_SIZE));
    header.write_to(&mut buf);
    buf.resize(len.max(HEADER_SIZE), 0);
    buf
}

/// Zeroed packet sized for the key carried by `header`.
///
/// Variable-length kinds get a header-only buffer.
pub fn packet_for(registry: &PacketRegistry, header: &PacketHeader) -> Result<Vec<u8>, DecodeError> {
    let decoder = registry.lookup(header.registry_key())?;
    Ok(zeroed_packet(
        header,
        decoder.expected_len.unwrap_or(HEADER_SIZE),
    ))
}

/// Zeroed F1 25 packet of the given kind with a default header.
pub fn f1_25_packet(kind: PacketKind) -> Result<Vec<u8>, DecodeError> {
    packet_for(&PacketRegistry::f1_25(), &PacketHeader::f1_25(kind.packet_id()))
}

/// Overwrite `buf[offset..offset + bytes.len()]`.
pub fn write_at(buf: &mut [u8], offset: usize, bytes: &[u8]) -> Result<(), DecodeError> {
    let end = offset.saturating_add(bytes.len());
    let available = buf.len();
    buf.get_mut(offset..end)
        .ok_or(DecodeError::Truncated {
            needed: end,
            available,
        })?
        .copy_from_slice(bytes);
    Ok(())
}

/// Player inputs placed into a synthetic car telemetry packet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerTelemetry {
    pub speed_kmh: u16,
    pub throttle: f32,
    pub brake: f32,
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: u8,
}

/// Full 1352-byte car telemetry packet with `sample` in the player's slot.
pub fn car_telemetry_packet(
    header: &PacketHeader,
    sample: &PlayerTelemetry,
) -> Result<Vec<u8>, DecodeError> {
    let key = RegistryKey::f1_25(PacketKind::CarTelemetry.packet_id());
    let header = PacketHeader {
        packet_format: key.packet_format,
        packet_version: key.packet_version,
        packet_id: key.packet_id,
        ..*header
    };
    let mut buf = packet_for(&PacketRegistry::f1_25(), &header)?;
    let offset = HEADER_SIZE + usize::from(header.player_car_index) * CAR_TELEMETRY_ENTRY_SIZE;

    write_at(&mut buf, offset, &sample.speed_kmh.to_le_bytes())?;
    write_at(&mut buf, offset + 2, &sample.throttle.to_le_bytes())?;
    write_at(&mut buf, offset + 10, &sample.brake.to_le_bytes())?;
    write_at(&mut buf, offset + 15, &sample.gear.to_le_bytes())?;
    write_at(&mut buf, offset + 16, &sample.engine_rpm.to_le_bytes())?;
    write_at(&mut buf, offset + 18, &[sample.drs])?;
    Ok(buf)
}
