//! Participants (id 4) and lobby info (id 9) packets.

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS, PacketHeader};
use crate::reader::ByteReader;

/// Width of the NUL-padded name field.
pub const NAME_WIDTH: usize = 32;
pub const PARTICIPANT_ENTRY_SIZE: usize = 57;
pub const LOBBY_INFO_ENTRY_SIZE: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiveryColour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantData {
    pub ai_controlled: u8,
    pub driver_id: u8,
    pub network_id: u8,
    pub team_id: u8,
    pub my_team: u8,
    pub race_number: u8,
    pub nationality: u8,
    pub name: String,
    /// 0 restricted, 1 public.
    pub your_telemetry: u8,
    pub show_online_names: u8,
    pub tech_level: u16,
    pub platform: u8,
    pub num_colours: u8,
    pub livery_colours: [LiveryColour; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantsPacket {
    pub header: PacketHeader,
    pub num_active_cars: u8,
    pub participants: Vec<ParticipantData>,
}

fn read_colour(r: &mut ByteReader<'_>) -> Result<LiveryColour, DecodeError> {
    Ok(LiveryColour {
        red: r.u8()?,
        green: r.u8()?,
        blue: r.u8()?,
    })
}

impl ParticipantsPacket {
    pub const LEN: usize = HEADER_SIZE + 1 + NUM_CARS * PARTICIPANT_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let num_active_cars = r.u8()?;
        let participants = r.repeat(NUM_CARS, |r| {
            Ok(ParticipantData {
                ai_controlled: r.u8()?,
                driver_id: r.u8()?,
                network_id: r.u8()?,
                team_id: r.u8()?,
                my_team: r.u8()?,
                race_number: r.u8()?,
                nationality: r.u8()?,
                name: r.fixed_str(NAME_WIDTH)?,
                your_telemetry: r.u8()?,
                show_online_names: r.u8()?,
                tech_level: r.u16_le()?,
                platform: r.u8()?,
                num_colours: r.u8()?,
                livery_colours: [
                    read_colour(r)?,
                    read_colour(r)?,
                    read_colour(r)?,
                    read_colour(r)?,
                ],
            })
        })?;
        Ok(Self {
            header,
            num_active_cars,
            participants,
        })
    }

    /// Entries for cars actually in the session.
    pub fn active(&self) -> &[ParticipantData] {
        let n = usize::from(self.num_active_cars).min(self.participants.len());
        self.participants.get(..n).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LobbyInfoData {
    pub ai_controlled: u8,
    /// 255 when no team is selected.
    pub team_id: u8,
    pub nationality: u8,
    pub platform: u8,
    pub name: String,
    pub car_number: u8,
    pub your_telemetry: u8,
    pub show_online_names: u8,
    pub tech_level: u16,
    /// 0 not ready, 1 ready, 2 spectating.
    pub ready_status: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LobbyInfoPacket {
    pub header: PacketHeader,
    pub num_players: u8,
    pub lobby_players: Vec<LobbyInfoData>,
}

impl LobbyInfoPacket {
    pub const LEN: usize = HEADER_SIZE + 1 + NUM_CARS * LOBBY_INFO_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let num_players = r.u8()?;
        let lobby_players = r.repeat(NUM_CARS, |r| {
            Ok(LobbyInfoData {
                ai_controlled: r.u8()?,
                team_id: r.u8()?,
                nationality: r.u8()?,
                platform: r.u8()?,
                name: r.fixed_str(NAME_WIDTH)?,
                car_number: r.u8()?,
                your_telemetry: r.u8()?,
                show_online_names: r.u8()?,
                tech_level: r.u16_le()?,
                ready_status: r.u8()?,
            })
        })?;
        Ok(Self {
            header,
            num_players,
            lobby_players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn packet_sizes_match_wire_format() {
        assert_eq!(ParticipantsPacket::LEN, 1284);
        assert_eq!(LobbyInfoPacket::LEN, 954);
    }

    #[test]
    fn participant_name_is_read_from_offset_seven() -> TestResult {
        let mut raw = Vec::new();
        PacketHeader::f1_25(4).write_to(&mut raw);
        raw.push(2); // numActiveCars
        raw.resize(ParticipantsPacket::LEN, 0);
        let second = HEADER_SIZE + 1 + PARTICIPANT_ENTRY_SIZE;
        raw.get_mut(second + 7..second + 14)
            .ok_or("short fixture")?
            .copy_from_slice(b"HAMILTO");

        let packet = ParticipantsPacket::decode(&raw)?;
        assert_eq!(packet.active().len(), 2);
        assert_eq!(
            packet.active().get(1).map(|p| p.name.as_str()),
            Some("HAMILTO")
        );
        Ok(())
    }
}
