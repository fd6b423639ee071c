//! Packet type registry: maps `(packet_format, packet_version, packet_id)` to
//! a payload decoder.
//!
//! A registry is built once and is read-only afterwards, so a single instance
//! can be shared between sources behind an `Arc` or a `&'static`.
//! Supporting another protocol revision means registering more keys; the
//! dispatch path itself never changes.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{PACKET_FORMAT_2025, PacketHeader};
use crate::packet::{Packet, PacketKind};
use crate::packets::{
    CarDamagePacket, CarSetupsPacket, CarStatusPacket, CarTelemetryPacket, EventPacket,
    FinalClassificationPacket, LapDataPacket, LapPositionsPacket, LobbyInfoPacket, MotionExPacket,
    MotionPacket, ParticipantsPacket, ScriptStartupPacket, SessionHistoryPacket, SessionPacket,
    TimeTrialPacket, TyreSetsPacket,
};

/// Packet version carried by every F1 25 packet.
pub const PACKET_VERSION_1: u8 = 1;

/// Identifies one packet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegistryKey {
    pub packet_format: u16,
    pub packet_version: u8,
    pub packet_id: u8,
}

impl RegistryKey {
    pub const fn new(packet_format: u16, packet_version: u8, packet_id: u8) -> Self {
        Self {
            packet_format,
            packet_version,
            packet_id,
        }
    }

    /// Key for an F1 25 packet of the given kind.
    pub const fn f1_25(packet_id: u8) -> Self {
        Self::new(PACKET_FORMAT_2025, PACKET_VERSION_1, packet_id)
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.packet_format, self.packet_version, self.packet_id
        )
    }
}

/// Schema decoder for a full datagram (header included).
pub type DecodeFn = fn(&[u8]) -> Result<Packet, DecodeError>;

/// Registry entry for one packet layout.
#[derive(Debug, Clone, Copy)]
pub struct PacketDecoder {
    pub kind: PacketKind,
    /// Exact datagram size, or `None` for variable-length packets.
    pub expected_len: Option<usize>,
    pub decode: DecodeFn,
}

impl PacketDecoder {
    pub const fn new(kind: PacketKind, expected_len: Option<usize>, decode: DecodeFn) -> Self {
        Self {
            kind,
            expected_len,
            decode,
        }
    }

    /// Validate the length, then run the schema decoder.
    pub fn decode(&self, key: RegistryKey, buf: &[u8]) -> Result<Packet, DecodeError> {
        match self.expected_len {
            Some(expected) if buf.len() != expected => Err(DecodeError::Malformed {
                key,
                expected,
                actual: buf.len(),
            }),
            _ => (self.decode)(buf),
        }
    }
}

/// Lookup table from [`RegistryKey`] to [`PacketDecoder`].
#[derive(Debug, Clone)]
pub struct PacketRegistry {
    decoders: HashMap<RegistryKey, PacketDecoder>,
}

fn decode_motion(buf: &[u8]) -> Result<Packet, DecodeError> {
    MotionPacket::decode(buf).map(Packet::Motion)
}

fn decode_session(buf: &[u8]) -> Result<Packet, DecodeError> {
    SessionPacket::decode(buf).map(Packet::Session)
}

fn decode_lap_data(buf: &[u8]) -> Result<Packet, DecodeError> {
    LapDataPacket::decode(buf).map(Packet::LapData)
}

fn decode_event(buf: &[u8]) -> Result<Packet, DecodeError> {
    EventPacket::decode(buf).map(Packet::Event)
}

fn decode_participants(buf: &[u8]) -> Result<Packet, DecodeError> {
    ParticipantsPacket::decode(buf).map(Packet::Participants)
}

fn decode_car_setups(buf: &[u8]) -> Result<Packet, DecodeError> {
    CarSetupsPacket::decode(buf).map(Packet::CarSetups)
}

fn decode_car_telemetry(buf: &[u8]) -> Result<Packet, DecodeError> {
    CarTelemetryPacket::decode(buf).map(Packet::CarTelemetry)
}

fn decode_car_status(buf: &[u8]) -> Result<Packet, DecodeError> {
    CarStatusPacket::decode(buf).map(Packet::CarStatus)
}

fn decode_final_classification(buf: &[u8]) -> Result<Packet, DecodeError> {
    FinalClassificationPacket::decode(buf).map(Packet::FinalClassification)
}

fn decode_lobby_info(buf: &[u8]) -> Result<Packet, DecodeError> {
    LobbyInfoPacket::decode(buf).map(Packet::LobbyInfo)
}

fn decode_car_damage(buf: &[u8]) -> Result<Packet, DecodeError> {
    CarDamagePacket::decode(buf).map(Packet::CarDamage)
}

fn decode_session_history(buf: &[u8]) -> Result<Packet, DecodeError> {
    SessionHistoryPacket::decode(buf).map(Packet::SessionHistory)
}

fn decode_tyre_sets(buf: &[u8]) -> Result<Packet, DecodeError> {
    TyreSetsPacket::decode(buf).map(Packet::TyreSets)
}

fn decode_motion_ex(buf: &[u8]) -> Result<Packet, DecodeError> {
    MotionExPacket::decode(buf).map(Packet::MotionEx)
}

fn decode_time_trial(buf: &[u8]) -> Result<Packet, DecodeError> {
    TimeTrialPacket::decode(buf).map(Packet::TimeTrial)
}

fn decode_lap_positions(buf: &[u8]) -> Result<Packet, DecodeError> {
    LapPositionsPacket::decode(buf).map(Packet::LapPositions)
}

fn decode_script_startup(buf: &[u8]) -> Result<Packet, DecodeError> {
    ScriptStartupPacket::decode(buf).map(Packet::ScriptStartup)
}

/// Every F1 25 layout, keyed by kind.
fn f1_25_decoders() -> [PacketDecoder; 17] {
    use PacketKind as K;
    [
        PacketDecoder::new(K::Motion, Some(MotionPacket::LEN), decode_motion),
        PacketDecoder::new(K::Session, Some(SessionPacket::LEN), decode_session),
        PacketDecoder::new(K::LapData, Some(LapDataPacket::LEN), decode_lap_data),
        PacketDecoder::new(K::Event, Some(EventPacket::LEN), decode_event),
        PacketDecoder::new(
            K::Participants,
            Some(ParticipantsPacket::LEN),
            decode_participants,
        ),
        PacketDecoder::new(K::CarSetups, Some(CarSetupsPacket::LEN), decode_car_setups),
        PacketDecoder::new(
            K::CarTelemetry,
            Some(CarTelemetryPacket::LEN),
            decode_car_telemetry,
        ),
        PacketDecoder::new(K::CarStatus, Some(CarStatusPacket::LEN), decode_car_status),
        PacketDecoder::new(
            K::FinalClassification,
            Some(FinalClassificationPacket::LEN),
            decode_final_classification,
        ),
        PacketDecoder::new(K::LobbyInfo, Some(LobbyInfoPacket::LEN), decode_lobby_info),
        PacketDecoder::new(K::CarDamage, Some(CarDamagePacket::LEN), decode_car_damage),
        PacketDecoder::new(
            K::SessionHistory,
            Some(SessionHistoryPacket::LEN),
            decode_session_history,
        ),
        PacketDecoder::new(K::TyreSets, Some(TyreSetsPacket::LEN), decode_tyre_sets),
        PacketDecoder::new(K::MotionEx, Some(MotionExPacket::LEN), decode_motion_ex),
        PacketDecoder::new(K::TimeTrial, Some(TimeTrialPacket::LEN), decode_time_trial),
        PacketDecoder::new(
            K::LapPositions,
            Some(LapPositionsPacket::LEN),
            decode_lap_positions,
        ),
        PacketDecoder::new(K::ScriptStartup, None, decode_script_startup),
    ]
}

impl PacketRegistry {
    /// Empty registry; every lookup misses.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registry covering every F1 25 packet kind (format 2025, version 1).
    pub fn f1_25() -> Self {
        let mut registry = Self::new();
        for decoder in f1_25_decoders() {
            registry.register(RegistryKey::f1_25(decoder.kind.packet_id()), decoder);
        }
        registry
    }

    /// Add or replace the decoder for `key`, returning the one it replaced.
    pub fn register(&mut self, key: RegistryKey, decoder: PacketDecoder) -> Option<PacketDecoder> {
        self.decoders.insert(key, decoder)
    }

    pub fn lookup(&self, key: RegistryKey) -> Result<&PacketDecoder, DecodeError> {
        self.decoders
            .get(&key)
            .ok_or(DecodeError::UnknownPacketType(key))
    }

    /// Exact datagram size registered for `key`, if fixed.
    pub fn expected_len(&self, key: RegistryKey) -> Option<usize> {
        self.decoders.get(&key).and_then(|d| d.expected_len)
    }

    /// Decode one datagram: header, then lookup, then the schema decoder.
    pub fn decode(&self, buf: &[u8]) -> Result<Packet, DecodeError> {
        let key = PacketHeader::decode(buf)?.registry_key();
        self.lookup(key)?.decode(key, buf)
    }

    pub fn keys(&self) -> impl Iterator<Item = RegistryKey> + '_ {
        self.decoders.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl Default for PacketRegistry {
    fn default() -> Self {
        Self::f1_25()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_displays_as_format_version_id() {
        assert_eq!(RegistryKey::new(2025, 1, 6).to_string(), "2025/1/6");
    }

    #[test]
    fn f1_25_registers_every_kind() {
        let registry = PacketRegistry::f1_25();
        assert_eq!(registry.len(), PacketKind::ALL.len());
        for kind in PacketKind::ALL {
            let key = RegistryKey::f1_25(kind.packet_id());
            assert!(
                matches!(registry.lookup(key), Ok(d) if d.kind == kind),
                "missing {kind}"
            );
        }
    }

    #[test]
    fn register_returns_replaced_decoder() {
        let mut registry = PacketRegistry::new();
        let key = RegistryKey::new(2024, 1, 6);
        let first = PacketDecoder::new(PacketKind::CarTelemetry, Some(1352), decode_car_telemetry);
        assert!(registry.register(key, first).is_none());
        let replaced = registry.register(key, PacketDecoder { expected_len: None, ..first });
        assert_eq!(replaced.and_then(|d| d.expected_len), Some(1352));
        assert_eq!(registry.expected_len(key), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_registry_misses() {
        let registry = PacketRegistry::new();
        assert!(registry.is_empty());
        let key = RegistryKey::f1_25(0);
        assert!(matches!(
            registry.lookup(key),
            Err(DecodeError::UnknownPacketType(k)) if k == key
        ));
    }
}
