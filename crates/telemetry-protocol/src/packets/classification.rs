//! Final classification (id 8) and time trial (id 14) packets.

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS, PacketHeader};
use crate::reader::ByteReader;

pub const FINAL_CLASSIFICATION_ENTRY_SIZE: usize = 46;
pub const TIME_TRIAL_DATA_SET_SIZE: usize = 24;
pub const MAX_CLASSIFICATION_STINTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalClassificationData {
    pub position: u8,
    pub num_laps: u8,
    pub grid_position: u8,
    pub points: u8,
    pub num_pit_stops: u8,
    pub result_status: u8,
    pub result_reason: u8,
    pub best_lap_time_ms: u32,
    /// Seconds, without penalties.
    pub total_race_time: f64,
    /// Seconds.
    pub penalties_time: u8,
    pub num_penalties: u8,
    pub num_tyre_stints: u8,
    pub tyre_stints_actual: [u8; MAX_CLASSIFICATION_STINTS],
    pub tyre_stints_visual: [u8; MAX_CLASSIFICATION_STINTS],
    pub tyre_stints_end_laps: [u8; MAX_CLASSIFICATION_STINTS],
}

/// Results sent once at the end of a race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalClassificationPacket {
    pub header: PacketHeader,
    pub num_cars: u8,
    pub classification_data: Vec<FinalClassificationData>,
}

impl FinalClassificationPacket {
    pub const LEN: usize = HEADER_SIZE + 1 + NUM_CARS * FINAL_CLASSIFICATION_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let num_cars = r.u8()?;
        let classification_data = r.repeat(NUM_CARS, |r| {
            Ok(FinalClassificationData {
                position: r.u8()?,
                num_laps: r.u8()?,
                grid_position: r.u8()?,
                points: r.u8()?,
                num_pit_stops: r.u8()?,
                result_status: r.u8()?,
                result_reason: r.u8()?,
                best_lap_time_ms: r.u32_le()?,
                total_race_time: r.f64_le()?,
                penalties_time: r.u8()?,
                num_penalties: r.u8()?,
                num_tyre_stints: r.u8()?,
                tyre_stints_actual: r.u8_array()?,
                tyre_stints_visual: r.u8_array()?,
                tyre_stints_end_laps: r.u8_array()?,
            })
        })?;
        Ok(Self {
            header,
            num_cars,
            classification_data,
        })
    }

    /// Entries for cars that took part.
    pub fn classified(&self) -> &[FinalClassificationData] {
        let n = usize::from(self.num_cars).min(self.classification_data.len());
        self.classification_data.get(..n).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeTrialDataSet {
    pub car_idx: u8,
    pub team_id: u8,
    pub lap_time_ms: u32,
    pub sector1_time_ms: u32,
    pub sector2_time_ms: u32,
    pub sector3_time_ms: u32,
    pub traction_control: u8,
    pub gearbox_assist: u8,
    pub anti_lock_brakes: u8,
    pub equal_car_performance: u8,
    pub custom_setup: u8,
    pub valid: u8,
}

impl TimeTrialDataSet {
    fn read(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            car_idx: r.u8()?,
            team_id: r.u8()?,
            lap_time_ms: r.u32_le()?,
            sector1_time_ms: r.u32_le()?,
            sector2_time_ms: r.u32_le()?,
            sector3_time_ms: r.u32_le()?,
            traction_control: r.u8()?,
            gearbox_assist: r.u8()?,
            anti_lock_brakes: r.u8()?,
            equal_car_performance: r.u8()?,
            custom_setup: r.u8()?,
            valid: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTrialPacket {
    pub header: PacketHeader,
    pub player_session_best: TimeTrialDataSet,
    pub personal_best: TimeTrialDataSet,
    pub rival: TimeTrialDataSet,
}

impl TimeTrialPacket {
    pub const LEN: usize = HEADER_SIZE + 3 * TIME_TRIAL_DATA_SET_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        Ok(Self {
            header,
            player_session_best: TimeTrialDataSet::read(&mut r)?,
            personal_best: TimeTrialDataSet::read(&mut r)?,
            rival: TimeTrialDataSet::read(&mut r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn packet_sizes_match_wire_format() {
        assert_eq!(FinalClassificationPacket::LEN, 1042);
        assert_eq!(TimeTrialPacket::LEN, 101);
    }

    #[test]
    fn total_race_time_is_read_as_f64() -> TestResult {
        let mut raw = Vec::new();
        PacketHeader::f1_25(8).write_to(&mut raw);
        raw.push(20);
        raw.resize(FinalClassificationPacket::LEN, 0);
        // totalRaceTime follows 7 u8 fields and the best-lap u32.
        let at = HEADER_SIZE + 1 + 11;
        raw.get_mut(at..at + 8)
            .ok_or("short fixture")?
            .copy_from_slice(&5_432.125f64.to_le_bytes());

        let packet = FinalClassificationPacket::decode(&raw)?;
        assert_eq!(packet.classified().len(), 20);
        let leader = packet.classified().first().ok_or("no entries")?;
        assert!((leader.total_race_time - 5_432.125).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn rival_set_is_the_last_24_bytes() -> TestResult {
        let mut raw = Vec::new();
        PacketHeader::f1_25(14).write_to(&mut raw);
        raw.resize(TimeTrialPacket::LEN, 0);
        let rival = HEADER_SIZE + 2 * TIME_TRIAL_DATA_SET_SIZE;
        *raw.get_mut(rival).ok_or("short fixture")? = 11;
        *raw.get_mut(TimeTrialPacket::LEN - 1).ok_or("short fixture")? = 1;

        let packet = TimeTrialPacket::decode(&raw)?;
        assert_eq!(packet.rival.car_idx, 11);
        assert_eq!(packet.rival.valid, 1);
        assert_eq!(packet.personal_best.valid, 0);
        Ok(())
    }
}
