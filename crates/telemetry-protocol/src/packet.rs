//! The decoded packet value: one variant per registered packet kind.

use std::fmt;

use serde::Serialize;

use crate::header::PacketHeader;
use crate::packets::{
    CarDamagePacket, CarSetupsPacket, CarStatusPacket, CarTelemetryPacket, EventPacket,
    FinalClassificationPacket, LapDataPacket, LapPositionsPacket, LobbyInfoPacket, MotionExPacket,
    MotionPacket, ParticipantsPacket, ScriptStartupPacket, SessionHistoryPacket, SessionPacket,
    TimeTrialPacket, TyreSetsPacket,
};

/// Field-less tag identifying a [`Packet`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PacketKind {
    Motion,
    Session,
    LapData,
    Event,
    Participants,
    CarSetups,
    CarTelemetry,
    CarStatus,
    FinalClassification,
    LobbyInfo,
    CarDamage,
    SessionHistory,
    TyreSets,
    MotionEx,
    TimeTrial,
    LapPositions,
    ScriptStartup,
}

impl PacketKind {
    /// Every kind, in packet id order.
    pub const ALL: [PacketKind; 17] = [
        PacketKind::Motion,
        PacketKind::Session,
        PacketKind::LapData,
        PacketKind::Event,
        PacketKind::Participants,
        PacketKind::CarSetups,
        PacketKind::CarTelemetry,
        PacketKind::CarStatus,
        PacketKind::FinalClassification,
        PacketKind::LobbyInfo,
        PacketKind::CarDamage,
        PacketKind::SessionHistory,
        PacketKind::TyreSets,
        PacketKind::MotionEx,
        PacketKind::TimeTrial,
        PacketKind::LapPositions,
        PacketKind::ScriptStartup,
    ];

    /// Packet id used by the F1 25 wire format.
    pub fn packet_id(self) -> u8 {
        match self {
            PacketKind::Motion => 0,
            PacketKind::Session => 1,
            PacketKind::LapData => 2,
            PacketKind::Event => 3,
            PacketKind::Participants => 4,
            PacketKind::CarSetups => 5,
            PacketKind::CarTelemetry => 6,
            PacketKind::CarStatus => 7,
            PacketKind::FinalClassification => 8,
            PacketKind::LobbyInfo => 9,
            PacketKind::CarDamage => 10,
            PacketKind::SessionHistory => 11,
            PacketKind::TyreSets => 12,
            PacketKind::MotionEx => 13,
            PacketKind::TimeTrial => 14,
            PacketKind::LapPositions => 15,
            PacketKind::ScriptStartup => 99,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PacketKind::Motion => "motion",
            PacketKind::Session => "session",
            PacketKind::LapData => "lap_data",
            PacketKind::Event => "event",
            PacketKind::Participants => "participants",
            PacketKind::CarSetups => "car_setups",
            PacketKind::CarTelemetry => "car_telemetry",
            PacketKind::CarStatus => "car_status",
            PacketKind::FinalClassification => "final_classification",
            PacketKind::LobbyInfo => "lobby_info",
            PacketKind::CarDamage => "car_damage",
            PacketKind::SessionHistory => "session_history",
            PacketKind::TyreSets => "tyre_sets",
            PacketKind::MotionEx => "motion_ex",
            PacketKind::TimeTrial => "time_trial",
            PacketKind::LapPositions => "lap_positions",
            PacketKind::ScriptStartup => "script_startup",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully decoded packet. Each variant owns its header and payload fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Packet {
    Motion(MotionPacket),
    Session(SessionPacket),
    LapData(LapDataPacket),
    Event(EventPacket),
    Participants(ParticipantsPacket),
    CarSetups(CarSetupsPacket),
    CarTelemetry(CarTelemetryPacket),
    CarStatus(CarStatusPacket),
    FinalClassification(FinalClassificationPacket),
    LobbyInfo(LobbyInfoPacket),
    CarDamage(CarDamagePacket),
    SessionHistory(SessionHistoryPacket),
    TyreSets(TyreSetsPacket),
    MotionEx(MotionExPacket),
    TimeTrial(TimeTrialPacket),
    LapPositions(LapPositionsPacket),
    ScriptStartup(ScriptStartupPacket),
}

impl Packet {
    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Motion(_) => PacketKind::Motion,
            Packet::Session(_) => PacketKind::Session,
            Packet::LapData(_) => PacketKind::LapData,
            Packet::Event(_) => PacketKind::Event,
            Packet::Participants(_) => PacketKind::Participants,
            Packet::CarSetups(_) => PacketKind::CarSetups,
            Packet::CarTelemetry(_) => PacketKind::CarTelemetry,
            Packet::CarStatus(_) => PacketKind::CarStatus,
            Packet::FinalClassification(_) => PacketKind::FinalClassification,
            Packet::LobbyInfo(_) => PacketKind::LobbyInfo,
            Packet::CarDamage(_) => PacketKind::CarDamage,
            Packet::SessionHistory(_) => PacketKind::SessionHistory,
            Packet::TyreSets(_) => PacketKind::TyreSets,
            Packet::MotionEx(_) => PacketKind::MotionEx,
            Packet::TimeTrial(_) => PacketKind::TimeTrial,
            Packet::LapPositions(_) => PacketKind::LapPositions,
            Packet::ScriptStartup(_) => PacketKind::ScriptStartup,
        }
    }

    pub fn header(&self) -> &PacketHeader {
        match self {
            Packet::Motion(p) => &p.header,
            Packet::Session(p) => &p.header,
            Packet::LapData(p) => &p.header,
            Packet::Event(p) => &p.header,
            Packet::Participants(p) => &p.header,
            Packet::CarSetups(p) => &p.header,
            Packet::CarTelemetry(p) => &p.header,
            Packet::CarStatus(p) => &p.header,
            Packet::FinalClassification(p) => &p.header,
            Packet::LobbyInfo(p) => &p.header,
            Packet::CarDamage(p) => &p.header,
            Packet::SessionHistory(p) => &p.header,
            Packet::TyreSets(p) => &p.header,
            Packet::MotionEx(p) => &p.header,
            Packet::TimeTrial(p) => &p.header,
            Packet::LapPositions(p) => &p.header,
            Packet::ScriptStartup(p) => &p.header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_ids_are_unique() {
        let mut ids: Vec<u8> = PacketKind::ALL.iter().map(|k| k.packet_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PacketKind::ALL.len());
    }

    #[test]
    fn display_uses_snake_case_name() {
        assert_eq!(PacketKind::CarTelemetry.to_string(), "car_telemetry");
        assert_eq!(PacketKind::MotionEx.to_string(), "motion_ex");
    }
}
