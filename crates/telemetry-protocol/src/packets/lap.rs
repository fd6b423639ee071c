//! Lap data (id 2), session history (id 11) and lap positions (id 15).

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS, PacketHeader};
use crate::reader::ByteReader;

pub const LAP_DATA_ENTRY_SIZE: usize = 57;
pub const LAP_HISTORY_ENTRY_SIZE: usize = 14;
pub const TYRE_STINT_HISTORY_ENTRY_SIZE: usize = 3;
pub const MAX_LAP_HISTORY: usize = 100;
pub const MAX_TYRE_STINTS: usize = 8;
pub const MAX_LAP_POSITIONS_LAPS: usize = 50;

/// Split time encoded as minutes plus a millisecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitTime {
    pub ms_part: u16,
    pub minutes_part: u8,
}

impl SplitTime {
    fn read(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ms_part: r.u16_le()?,
            minutes_part: r.u8()?,
        })
    }

    /// Total milliseconds.
    pub fn total_ms(&self) -> u32 {
        u32::from(self.minutes_part) * 60_000 + u32::from(self.ms_part)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapData {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub sector1_time: SplitTime,
    pub sector2_time: SplitTime,
    pub delta_to_car_in_front: SplitTime,
    pub delta_to_race_leader: SplitTime,
    /// Metres around the current lap; may be negative before the line.
    pub lap_distance: f32,
    pub total_distance: f32,
    pub safety_car_delta: f32,
    pub car_position: u8,
    pub current_lap_num: u8,
    pub pit_status: u8,
    pub num_pit_stops: u8,
    /// 0 = sector 1, 1 = sector 2, 2 = sector 3.
    pub sector: u8,
    pub current_lap_invalid: u8,
    /// Accumulated time penalties in seconds.
    pub penalties: u8,
    pub total_warnings: u8,
    pub corner_cutting_warnings: u8,
    pub num_unserved_drive_through_pens: u8,
    pub num_unserved_stop_go_pens: u8,
    pub grid_position: u8,
    pub driver_status: u8,
    pub result_status: u8,
    pub pit_lane_timer_active: u8,
    pub pit_lane_time_in_lane_ms: u16,
    pub pit_stop_timer_ms: u16,
    pub pit_stop_should_serve_pen: u8,
    /// km/h.
    pub speed_trap_fastest_speed: f32,
    /// 255 when not set.
    pub speed_trap_fastest_lap: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapDataPacket {
    pub header: PacketHeader,
    pub lap_data: Vec<LapData>,
    /// 255 when invalid.
    pub time_trial_pb_car_idx: u8,
    pub time_trial_rival_car_idx: u8,
}

impl LapDataPacket {
    pub const LEN: usize = HEADER_SIZE + NUM_CARS * LAP_DATA_ENTRY_SIZE + 2;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let lap_data = r.repeat(NUM_CARS, |r| {
            Ok(LapData {
                last_lap_time_ms: r.u32_le()?,
                current_lap_time_ms: r.u32_le()?,
                sector1_time: SplitTime::read(r)?,
                sector2_time: SplitTime::read(r)?,
                delta_to_car_in_front: SplitTime::read(r)?,
                delta_to_race_leader: SplitTime::read(r)?,
                lap_distance: r.f32_le()?,
                total_distance: r.f32_le()?,
                safety_car_delta: r.f32_le()?,
                car_position: r.u8()?,
                current_lap_num: r.u8()?,
                pit_status: r.u8()?,
                num_pit_stops: r.u8()?,
                sector: r.u8()?,
                current_lap_invalid: r.u8()?,
                penalties: r.u8()?,
                total_warnings: r.u8()?,
                corner_cutting_warnings: r.u8()?,
                num_unserved_drive_through_pens: r.u8()?,
                num_unserved_stop_go_pens: r.u8()?,
                grid_position: r.u8()?,
                driver_status: r.u8()?,
                result_status: r.u8()?,
                pit_lane_timer_active: r.u8()?,
                pit_lane_time_in_lane_ms: r.u16_le()?,
                pit_stop_timer_ms: r.u16_le()?,
                pit_stop_should_serve_pen: r.u8()?,
                speed_trap_fastest_speed: r.f32_le()?,
                speed_trap_fastest_lap: r.u8()?,
            })
        })?;
        Ok(Self {
            header,
            lap_data,
            time_trial_pb_car_idx: r.u8()?,
            time_trial_rival_car_idx: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LapHistoryData {
    pub lap_time_ms: u32,
    pub sector1_time: SplitTime,
    pub sector2_time: SplitTime,
    pub sector3_time: SplitTime,
    /// Bit 0 lap valid, bits 1-3 sectors 1-3 valid.
    pub lap_valid_bit_flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TyreStintHistoryData {
    /// 255 for the current stint.
    pub end_lap: u8,
    pub tyre_actual_compound: u8,
    pub tyre_visual_compound: u8,
}

/// Lap and tyre-stint history for a single car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionHistoryPacket {
    pub header: PacketHeader,
    pub car_idx: u8,
    pub num_laps: u8,
    pub num_tyre_stints: u8,
    pub best_lap_time_lap_num: u8,
    pub best_sector1_lap_num: u8,
    pub best_sector2_lap_num: u8,
    pub best_sector3_lap_num: u8,
    pub lap_history_data: Vec<LapHistoryData>,
    pub tyre_stints_history_data: Vec<TyreStintHistoryData>,
}

impl SessionHistoryPacket {
    pub const LEN: usize = HEADER_SIZE
        + 7
        + MAX_LAP_HISTORY * LAP_HISTORY_ENTRY_SIZE
        + MAX_TYRE_STINTS * TYRE_STINT_HISTORY_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        Ok(Self {
            header,
            car_idx: r.u8()?,
            num_laps: r.u8()?,
            num_tyre_stints: r.u8()?,
            best_lap_time_lap_num: r.u8()?,
            best_sector1_lap_num: r.u8()?,
            best_sector2_lap_num: r.u8()?,
            best_sector3_lap_num: r.u8()?,
            lap_history_data: r.repeat(MAX_LAP_HISTORY, |r| {
                Ok(LapHistoryData {
                    lap_time_ms: r.u32_le()?,
                    sector1_time: SplitTime::read(r)?,
                    sector2_time: SplitTime::read(r)?,
                    sector3_time: SplitTime::read(r)?,
                    lap_valid_bit_flags: r.u8()?,
                })
            })?,
            tyre_stints_history_data: r.repeat(MAX_TYRE_STINTS, |r| {
                Ok(TyreStintHistoryData {
                    end_lap: r.u8()?,
                    tyre_actual_compound: r.u8()?,
                    tyre_visual_compound: r.u8()?,
                })
            })?,
        })
    }

    /// Laps recorded so far.
    pub fn laps(&self) -> &[LapHistoryData] {
        let n = usize::from(self.num_laps).min(self.lap_history_data.len());
        self.lap_history_data.get(..n).unwrap_or_default()
    }
}

/// Position of every car at the end of each lap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapPositionsPacket {
    pub header: PacketHeader,
    pub num_laps: u8,
    /// Lap number of the first row in `positions`.
    pub lap_start: u8,
    /// One row per lap, indexed by vehicle; 0 means no record.
    pub positions: Vec<[u8; NUM_CARS]>,
}

impl LapPositionsPacket {
    pub const LEN: usize = HEADER_SIZE + 2 + MAX_LAP_POSITIONS_LAPS * NUM_CARS;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        Ok(Self {
            header,
            num_laps: r.u8()?,
            lap_start: r.u8()?,
            positions: r.repeat(MAX_LAP_POSITIONS_LAPS, |r| r.u8_array())?,
        })
    }
}
