//! Per-car packets: setups (5), telemetry (6), status (7), damage (10) and
//! tyre sets (12).
//!
//! Wheel-indexed arrays are ordered RL, RR, FL, FR throughout.

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS, PacketHeader};
use crate::reader::ByteReader;

pub const CAR_SETUP_ENTRY_SIZE: usize = 50;
/// Size of one CarTelemetryData entry (60 bytes).
pub const CAR_TELEMETRY_ENTRY_SIZE: usize = 60;
/// Size of one CarStatusData entry (55 bytes).
pub const CAR_STATUS_ENTRY_SIZE: usize = 55;
pub const CAR_DAMAGE_ENTRY_SIZE: usize = 46;
pub const TYRE_SET_ENTRY_SIZE: usize = 10;
/// 13 dry sets plus 7 wet sets.
pub const NUM_TYRE_SETS: usize = 20;

// ── Car setups ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarSetupData {
    pub front_wing: u8,
    pub rear_wing: u8,
    /// Differential adjustment on throttle (percentage).
    pub on_throttle: u8,
    pub off_throttle: u8,
    pub front_camber: f32,
    pub rear_camber: f32,
    pub front_toe: f32,
    pub rear_toe: f32,
    pub front_suspension: u8,
    pub rear_suspension: u8,
    pub front_anti_roll_bar: u8,
    pub rear_anti_roll_bar: u8,
    pub front_suspension_height: u8,
    pub rear_suspension_height: u8,
    pub brake_pressure: u8,
    pub brake_bias: u8,
    pub engine_braking: u8,
    /// PSI.
    pub tyre_pressures: [f32; 4],
    pub ballast: u8,
    pub fuel_load: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarSetupsPacket {
    pub header: PacketHeader,
    pub car_setups: Vec<CarSetupData>,
    /// Value of the front wing after the next pit stop (player only).
    pub next_front_wing_value: f32,
}

impl CarSetupsPacket {
    pub const LEN: usize = HEADER_SIZE + NUM_CARS * CAR_SETUP_ENTRY_SIZE + 4;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let car_setups = r.repeat(NUM_CARS, |r| {
            Ok(CarSetupData {
                front_wing: r.u8()?,
                rear_wing: r.u8()?,
                on_throttle: r.u8()?,
                off_throttle: r.u8()?,
                front_camber: r.f32_le()?,
                rear_camber: r.f32_le()?,
                front_toe: r.f32_le()?,
                rear_toe: r.f32_le()?,
                front_suspension: r.u8()?,
                rear_suspension: r.u8()?,
                front_anti_roll_bar: r.u8()?,
                rear_anti_roll_bar: r.u8()?,
                front_suspension_height: r.u8()?,
                rear_suspension_height: r.u8()?,
                brake_pressure: r.u8()?,
                brake_bias: r.u8()?,
                engine_braking: r.u8()?,
                tyre_pressures: r.f32_le_array()?,
                ballast: r.u8()?,
                fuel_load: r.f32_le()?,
            })
        })?;
        Ok(Self {
            header,
            car_setups,
            next_front_wing_value: r.f32_le()?,
        })
    }
}

// ── Car telemetry ─────────────────────────────────────────────────────────────

/// Telemetry data for a single car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarTelemetryData {
    /// Speed in km/h.
    pub speed: u16,
    /// Throttle position 0.0–1.0.
    pub throttle: f32,
    /// Steering input −1.0–1.0.
    pub steer: f32,
    /// Brake position 0.0–1.0.
    pub brake: f32,
    /// Clutch 0–100.
    pub clutch: u8,
    /// Gear: −1 = reverse, 0 = neutral, 1–8 = forward.
    pub gear: i8,
    pub engine_rpm: u16,
    /// DRS deployed flag (0 = off, 1 = on).
    pub drs: u8,
    pub rev_lights_percent: u8,
    /// Bit 0 = leftmost LED, bit 14 = rightmost.
    pub rev_lights_bit_value: u16,
    /// °C.
    pub brakes_temperature: [u16; 4],
    pub tyres_surface_temperature: [u8; 4],
    pub tyres_inner_temperature: [u8; 4],
    pub engine_temperature: u16,
    /// PSI.
    pub tyres_pressure: [f32; 4],
    pub surface_type: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarTelemetryPacket {
    pub header: PacketHeader,
    pub car_telemetry_data: Vec<CarTelemetryData>,
    /// 255 when the MFD is closed.
    pub mfd_panel_index: u8,
    pub mfd_panel_index_secondary_player: u8,
    /// 0 when no gear is suggested.
    pub suggested_gear: i8,
}

impl CarTelemetryPacket {
    /// Header, all 22 cars and the 3-byte trailer.
    pub const LEN: usize = HEADER_SIZE + NUM_CARS * CAR_TELEMETRY_ENTRY_SIZE + 3;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let car_telemetry_data = r.repeat(NUM_CARS, |r| {
            Ok(CarTelemetryData {
                speed: r.u16_le()?,                          // 0-1
                throttle: r.f32_le()?,                       // 2-5
                steer: r.f32_le()?,                          // 6-9
                brake: r.f32_le()?,                          // 10-13
                clutch: r.u8()?,                             // 14
                gear: r.i8()?,                               // 15
                engine_rpm: r.u16_le()?,                     // 16-17
                drs: r.u8()?,                                // 18
                rev_lights_percent: r.u8()?,                 // 19
                rev_lights_bit_value: r.u16_le()?,           // 20-21
                brakes_temperature: r.u16_le_array()?,       // 22-29
                tyres_surface_temperature: r.u8_array()?,    // 30-33
                tyres_inner_temperature: r.u8_array()?,      // 34-37
                engine_temperature: r.u16_le()?,             // 38-39
                tyres_pressure: r.f32_le_array()?,           // 40-55
                surface_type: r.u8_array()?,                 // 56-59
            })
        })?;
        Ok(Self {
            header,
            car_telemetry_data,
            mfd_panel_index: r.u8()?,
            mfd_panel_index_secondary_player: r.u8()?,
            suggested_gear: r.i8()?,
        })
    }

    /// Entry for the local player's car.
    pub fn player(&self) -> Option<&CarTelemetryData> {
        self.car_telemetry_data
            .get(usize::from(self.header.player_car_index))
    }
}

// ── Car status ────────────────────────────────────────────────────────────────

/// Status data for a single car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarStatusData {
    pub traction_control: u8,
    pub anti_lock_brakes: u8,
    pub fuel_mix: u8,
    pub front_brake_bias: u8,
    /// Pit-limiter active (1 = on).
    pub pit_limiter_status: u8,
    /// Fuel remaining in kg.
    pub fuel_in_tank: f32,
    pub fuel_capacity: f32,
    /// Estimated laps of fuel remaining.
    pub fuel_remaining_laps: f32,
    pub max_rpm: u16,
    pub idle_rpm: u16,
    pub max_gears: u8,
    /// DRS allowed this lap (1 = yes).
    pub drs_allowed: u8,
    /// Metres until DRS can be used; 0 when unavailable.
    pub drs_activation_distance: u16,
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    pub tyres_age_laps: u8,
    pub vehicle_fia_flags: i8,
    /// Watts.
    pub engine_power_ice: f32,
    pub engine_power_mguk: f32,
    /// ERS store energy in Joules.
    pub ers_store_energy: f32,
    pub ers_deploy_mode: u8,
    pub ers_harvested_this_lap_mguk: f32,
    pub ers_harvested_this_lap_mguh: f32,
    pub ers_deployed_this_lap: f32,
    pub network_paused: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarStatusPacket {
    pub header: PacketHeader,
    pub car_status_data: Vec<CarStatusData>,
}

impl CarStatusPacket {
    pub const LEN: usize = HEADER_SIZE + NUM_CARS * CAR_STATUS_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let car_status_data = r.repeat(NUM_CARS, |r| {
            Ok(CarStatusData {
                traction_control: r.u8()?,            // 0
                anti_lock_brakes: r.u8()?,            // 1
                fuel_mix: r.u8()?,                    // 2
                front_brake_bias: r.u8()?,            // 3
                pit_limiter_status: r.u8()?,          // 4
                fuel_in_tank: r.f32_le()?,            // 5-8
                fuel_capacity: r.f32_le()?,           // 9-12
                fuel_remaining_laps: r.f32_le()?,     // 13-16
                max_rpm: r.u16_le()?,                 // 17-18
                idle_rpm: r.u16_le()?,                // 19-20
                max_gears: r.u8()?,                   // 21
                drs_allowed: r.u8()?,                 // 22
                drs_activation_distance: r.u16_le()?, // 23-24
                actual_tyre_compound: r.u8()?,        // 25
                visual_tyre_compound: r.u8()?,        // 26
                tyres_age_laps: r.u8()?,              // 27
                vehicle_fia_flags: r.i8()?,           // 28
                engine_power_ice: r.f32_le()?,        // 29-32
                engine_power_mguk: r.f32_le()?,       // 33-36
                ers_store_energy: r.f32_le()?,        // 37-40
                ers_deploy_mode: r.u8()?,             // 41
                ers_harvested_this_lap_mguk: r.f32_le()?, // 42-45
                ers_harvested_this_lap_mguh: r.f32_le()?, // 46-49
                ers_deployed_this_lap: r.f32_le()?,   // 50-53
                network_paused: r.u8()?,              // 54
            })
        })?;
        Ok(Self {
            header,
            car_status_data,
        })
    }

    pub fn player(&self) -> Option<&CarStatusData> {
        self.car_status_data
            .get(usize::from(self.header.player_car_index))
    }
}

// ── Car damage ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarDamageData {
    /// Percentage.
    pub tyres_wear: [f32; 4],
    pub tyres_damage: [u8; 4],
    pub brakes_damage: [u8; 4],
    pub tyre_blisters: [u8; 4],
    pub front_left_wing_damage: u8,
    pub front_right_wing_damage: u8,
    pub rear_wing_damage: u8,
    pub floor_damage: u8,
    pub diffuser_damage: u8,
    pub sidepod_damage: u8,
    pub drs_fault: u8,
    pub ers_fault: u8,
    pub gear_box_damage: u8,
    pub engine_damage: u8,
    pub engine_mguh_wear: u8,
    pub engine_es_wear: u8,
    pub engine_ce_wear: u8,
    pub engine_ice_wear: u8,
    pub engine_mguk_wear: u8,
    pub engine_tc_wear: u8,
    pub engine_blown: u8,
    pub engine_seized: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarDamagePacket {
    pub header: PacketHeader,
    pub car_damage_data: Vec<CarDamageData>,
}

impl CarDamagePacket {
    pub const LEN: usize = HEADER_SIZE + NUM_CARS * CAR_DAMAGE_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let car_damage_data = r.repeat(NUM_CARS, |r| {
            Ok(CarDamageData {
                tyres_wear: r.f32_le_array()?,
                tyres_damage: r.u8_array()?,
                brakes_damage: r.u8_array()?,
                tyre_blisters: r.u8_array()?,
                front_left_wing_damage: r.u8()?,
                front_right_wing_damage: r.u8()?,
                rear_wing_damage: r.u8()?,
                floor_damage: r.u8()?,
                diffuser_damage: r.u8()?,
                sidepod_damage: r.u8()?,
                drs_fault: r.u8()?,
                ers_fault: r.u8()?,
                gear_box_damage: r.u8()?,
                engine_damage: r.u8()?,
                engine_mguh_wear: r.u8()?,
                engine_es_wear: r.u8()?,
                engine_ce_wear: r.u8()?,
                engine_ice_wear: r.u8()?,
                engine_mguk_wear: r.u8()?,
                engine_tc_wear: r.u8()?,
                engine_blown: r.u8()?,
                engine_seized: r.u8()?,
            })
        })?;
        Ok(Self {
            header,
            car_damage_data,
        })
    }
}

// ── Tyre sets ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TyreSetData {
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    /// Percentage.
    pub wear: u8,
    pub available: u8,
    pub recommended_session: u8,
    /// Laps left in this set.
    pub life_span: u8,
    /// Maximum recommended laps.
    pub usable_life: u8,
    /// Lap delta time in ms relative to the fitted set.
    pub lap_delta_time: i16,
    pub fitted: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TyreSetsPacket {
    pub header: PacketHeader,
    pub car_idx: u8,
    pub tyre_set_data: [TyreSetData; NUM_TYRE_SETS],
    /// Index into `tyre_set_data` of the fitted set.
    pub fitted_idx: u8,
}

impl TyreSetsPacket {
    pub const LEN: usize = HEADER_SIZE + 1 + NUM_TYRE_SETS * TYRE_SET_ENTRY_SIZE + 1;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let car_idx = r.u8()?;
        let mut tyre_set_data = [TyreSetData::default(); NUM_TYRE_SETS];
        for set in tyre_set_data.iter_mut() {
            *set = TyreSetData {
                actual_tyre_compound: r.u8()?,
                visual_tyre_compound: r.u8()?,
                wear: r.u8()?,
                available: r.u8()?,
                recommended_session: r.u8()?,
                life_span: r.u8()?,
                usable_life: r.u8()?,
                lap_delta_time: r.i16_le()?,
                fitted: r.u8()?,
            };
        }
        Ok(Self {
            header,
            car_idx,
            tyre_set_data,
            fitted_idx: r.u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_sizes_match_wire_format() {
        assert_eq!(CarSetupsPacket::LEN, 1133);
        assert_eq!(CarTelemetryPacket::LEN, 1352);
        assert_eq!(CarStatusPacket::LEN, 1239);
        assert_eq!(CarDamagePacket::LEN, 1041);
        assert_eq!(TyreSetsPacket::LEN, 231);
    }
}
