//! Event packet (id 3): a four-character code plus a 12-byte detail union.

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, PacketHeader};
use crate::reader::ByteReader;

/// Size of the event detail union on the wire.
pub const EVENT_DETAILS_SIZE: usize = 12;

/// Decoded event details, selected by the event string code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum EventDetails {
    SessionStarted,
    SessionEnded,
    FastestLap {
        vehicle_idx: u8,
        /// Seconds.
        lap_time: f32,
    },
    Retirement {
        vehicle_idx: u8,
        reason: u8,
    },
    DrsEnabled,
    DrsDisabled {
        reason: u8,
    },
    TeamMateInPits {
        vehicle_idx: u8,
    },
    ChequeredFlag,
    RaceWinner {
        vehicle_idx: u8,
    },
    Penalty {
        penalty_type: u8,
        infringement_type: u8,
        vehicle_idx: u8,
        other_vehicle_idx: u8,
        /// Seconds added, or 255 when not a time penalty.
        time: u8,
        lap_num: u8,
        places_gained: u8,
    },
    SpeedTrap {
        vehicle_idx: u8,
        /// km/h.
        speed: f32,
        is_overall_fastest_in_session: u8,
        is_driver_fastest_in_session: u8,
        fastest_vehicle_idx_in_session: u8,
        fastest_speed_in_session: f32,
    },
    StartLights {
        num_lights: u8,
    },
    LightsOut,
    DriveThroughPenaltyServed {
        vehicle_idx: u8,
    },
    StopGoPenaltyServed {
        vehicle_idx: u8,
        /// Seconds spent serving the penalty.
        stop_time: f32,
    },
    Flashback {
        flashback_frame_identifier: u32,
        flashback_session_time: f32,
    },
    Buttons {
        /// Bit flags of the buttons currently pressed.
        button_status: u32,
    },
    RedFlag,
    Overtake {
        overtaking_vehicle_idx: u8,
        being_overtaken_vehicle_idx: u8,
    },
    SafetyCar {
        safety_car_type: u8,
        event_type: u8,
    },
    Collision {
        vehicle1_idx: u8,
        vehicle2_idx: u8,
    },
    /// Code not known to this decoder; the raw union bytes are kept.
    Unknown {
        code: String,
        raw: [u8; EVENT_DETAILS_SIZE],
    },
}

impl EventDetails {
    fn decode(code: &[u8; 4], r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let details = match code {
            b"SSTA" => EventDetails::SessionStarted,
            b"SEND" => EventDetails::SessionEnded,
            b"FTLP" => EventDetails::FastestLap {
                vehicle_idx: r.u8()?,
                lap_time: r.f32_le()?,
            },
            b"RTMT" => EventDetails::Retirement {
                vehicle_idx: r.u8()?,
                reason: r.u8()?,
            },
            b"DRSE" => EventDetails::DrsEnabled,
            b"DRSD" => EventDetails::DrsDisabled { reason: r.u8()? },
            b"TMPT" => EventDetails::TeamMateInPits {
                vehicle_idx: r.u8()?,
            },
            b"CHQF" => EventDetails::ChequeredFlag,
            b"RCWN" => EventDetails::RaceWinner {
                vehicle_idx: r.u8()?,
            },
            b"PENA" => EventDetails::Penalty {
                penalty_type: r.u8()?,
                infringement_type: r.u8()?,
                vehicle_idx: r.u8()?,
                other_vehicle_idx: r.u8()?,
                time: r.u8()?,
                lap_num: r.u8()?,
                places_gained: r.u8()?,
            },
            b"SPTP" => EventDetails::SpeedTrap {
                vehicle_idx: r.u8()?,
                speed: r.f32_le()?,
                is_overall_fastest_in_session: r.u8()?,
                is_driver_fastest_in_session: r.u8()?,
                fastest_vehicle_idx_in_session: r.u8()?,
                fastest_speed_in_session: r.f32_le()?,
            },
            b"STLG" => EventDetails::StartLights {
                num_lights: r.u8()?,
            },
            b"LGOT" => EventDetails::LightsOut,
            b"DTSV" => EventDetails::DriveThroughPenaltyServed {
                vehicle_idx: r.u8()?,
            },
            b"SGSV" => EventDetails::StopGoPenaltyServed {
                vehicle_idx: r.u8()?,
                stop_time: r.f32_le()?,
            },
            b"FLBK" => EventDetails::Flashback {
                flashback_frame_identifier: r.u32_le()?,
                flashback_session_time: r.f32_le()?,
            },
            b"BUTN" => EventDetails::Buttons {
                button_status: r.u32_le()?,
            },
            b"RDFL" => EventDetails::RedFlag,
            b"OVTK" => EventDetails::Overtake {
                overtaking_vehicle_idx: r.u8()?,
                being_overtaken_vehicle_idx: r.u8()?,
            },
            b"SCAR" => EventDetails::SafetyCar {
                safety_car_type: r.u8()?,
                event_type: r.u8()?,
            },
            b"COLL" => EventDetails::Collision {
                vehicle1_idx: r.u8()?,
                vehicle2_idx: r.u8()?,
            },
            other => EventDetails::Unknown {
                code: String::from_utf8_lossy(other).into_owned(),
                raw: r.take()?,
            },
        };
        Ok(details)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPacket {
    pub header: PacketHeader,
    /// Four-character event code, e.g. `"SSTA"`.
    pub event_string_code: String,
    pub details: EventDetails,
}

impl EventPacket {
    pub const LEN: usize = HEADER_SIZE + 4 + EVENT_DETAILS_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let code: [u8; 4] = r.take()?;
        // Details are read from their own window so short members never
        // shift anything that follows the union.
        let union = r.bytes(EVENT_DETAILS_SIZE)?;
        let details = EventDetails::decode(&code, &mut ByteReader::new(union))?;
        Ok(Self {
            header,
            event_string_code: String::from_utf8_lossy(&code).into_owned(),
            details,
        })
    }
}
