//! Session packet (id 1).

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, PacketHeader};
use crate::reader::ByteReader;

pub const MAX_MARSHAL_ZONES: usize = 21;
pub const MAX_WEATHER_FORECAST_SAMPLES: usize = 64;
pub const MAX_SESSIONS_IN_WEEKEND: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarshalZone {
    /// Fraction (0..1) of the way through the lap the zone starts.
    pub zone_start: f32,
    /// -1 invalid/unknown, 0 none, 1 green, 2 blue, 3 yellow.
    pub zone_flag: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherForecastSample {
    pub session_type: u8,
    /// Minutes into the future.
    pub time_offset: u8,
    pub weather: u8,
    pub track_temperature: i8,
    pub track_temperature_change: i8,
    pub air_temperature: i8,
    pub air_temperature_change: i8,
    pub rain_percentage: u8,
}

/// Driving assists active in the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionAssists {
    pub steering_assist: u8,
    pub braking_assist: u8,
    pub gearbox_assist: u8,
    pub pit_assist: u8,
    pub pit_release_assist: u8,
    pub ers_assist: u8,
    pub drs_assist: u8,
    pub dynamic_racing_line: u8,
    pub dynamic_racing_line_type: u8,
}

/// Lobby rule settings, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionRules {
    pub equal_car_performance: u8,
    pub recovery_mode: u8,
    pub flashback_limit: u8,
    pub surface_type: u8,
    pub low_fuel_mode: u8,
    pub race_starts: u8,
    pub tyre_temperature: u8,
    pub pit_lane_tyre_sim: u8,
    pub car_damage: u8,
    pub car_damage_rate: u8,
    pub collisions: u8,
    pub collisions_off_for_first_lap_only: u8,
    pub mp_unsafe_pit_release: u8,
    pub mp_off_for_griefing: u8,
    pub corner_cutting_stringency: u8,
    pub parc_ferme_rules: u8,
    pub pit_stop_experience: u8,
    pub safety_car: u8,
    pub safety_car_experience: u8,
    pub formation_lap: u8,
    pub formation_lap_experience: u8,
    pub red_flags: u8,
    pub affects_licence_level_solo: u8,
    pub affects_licence_level_mp: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPacket {
    pub header: PacketHeader,
    pub weather: u8,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    /// Metres.
    pub track_length: u16,
    pub session_type: u8,
    /// -1 for unknown.
    pub track_id: i8,
    pub formula: u8,
    /// Seconds.
    pub session_time_left: u16,
    pub session_duration: u16,
    /// km/h.
    pub pit_speed_limit: u8,
    pub game_paused: u8,
    pub is_spectating: u8,
    pub spectator_car_index: u8,
    pub sli_pro_native_support: u8,
    /// Only the first `num_marshal_zones` entries are meaningful.
    pub num_marshal_zones: u8,
    pub marshal_zones: Vec<MarshalZone>,
    pub safety_car_status: u8,
    pub network_game: u8,
    pub num_weather_forecast_samples: u8,
    pub weather_forecast_samples: Vec<WeatherForecastSample>,
    pub forecast_accuracy: u8,
    pub ai_difficulty: u8,
    pub season_link_identifier: u32,
    pub weekend_link_identifier: u32,
    pub session_link_identifier: u32,
    pub pit_stop_window_ideal_lap: u8,
    pub pit_stop_window_latest_lap: u8,
    pub pit_stop_rejoin_position: u8,
    pub assists: SessionAssists,
    pub game_mode: u8,
    pub rule_set: u8,
    /// Minutes since midnight.
    pub time_of_day: u32,
    pub session_length: u8,
    pub speed_units_lead_player: u8,
    pub temperature_units_lead_player: u8,
    pub speed_units_secondary_player: u8,
    pub temperature_units_secondary_player: u8,
    pub num_safety_car_periods: u8,
    pub num_virtual_safety_car_periods: u8,
    pub num_red_flag_periods: u8,
    pub rules: SessionRules,
    pub num_sessions_in_weekend: u8,
    pub weekend_structure: [u8; MAX_SESSIONS_IN_WEEKEND],
    /// Metres.
    pub sector2_lap_distance_start: f32,
    pub sector3_lap_distance_start: f32,
}

impl SessionPacket {
    pub const LEN: usize = 753;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        Ok(Self {
            header,
            weather: r.u8()?,
            track_temperature: r.i8()?,
            air_temperature: r.i8()?,
            total_laps: r.u8()?,
            track_length: r.u16_le()?,
            session_type: r.u8()?,
            track_id: r.i8()?,
            formula: r.u8()?,
            session_time_left: r.u16_le()?,
            session_duration: r.u16_le()?,
            pit_speed_limit: r.u8()?,
            game_paused: r.u8()?,
            is_spectating: r.u8()?,
            spectator_car_index: r.u8()?,
            sli_pro_native_support: r.u8()?,
            num_marshal_zones: r.u8()?,
            marshal_zones: r.repeat(MAX_MARSHAL_ZONES, |r| {
                Ok(MarshalZone {
                    zone_start: r.f32_le()?,
                    zone_flag: r.i8()?,
                })
            })?,
            safety_car_status: r.u8()?,
            network_game: r.u8()?,
            num_weather_forecast_samples: r.u8()?,
            weather_forecast_samples: r.repeat(MAX_WEATHER_FORECAST_SAMPLES, |r| {
                Ok(WeatherForecastSample {
                    session_type: r.u8()?,
                    time_offset: r.u8()?,
                    weather: r.u8()?,
                    track_temperature: r.i8()?,
                    track_temperature_change: r.i8()?,
                    air_temperature: r.i8()?,
                    air_temperature_change: r.i8()?,
                    rain_percentage: r.u8()?,
                })
            })?,
            forecast_accuracy: r.u8()?,
            ai_difficulty: r.u8()?,
            season_link_identifier: r.u32_le()?,
            weekend_link_identifier: r.u32_le()?,
            session_link_identifier: r.u32_le()?,
            pit_stop_window_ideal_lap: r.u8()?,
            pit_stop_window_latest_lap: r.u8()?,
            pit_stop_rejoin_position: r.u8()?,
            assists: SessionAssists {
                steering_assist: r.u8()?,
                braking_assist: r.u8()?,
                gearbox_assist: r.u8()?,
                pit_assist: r.u8()?,
                pit_release_assist: r.u8()?,
                ers_assist: r.u8()?,
                drs_assist: r.u8()?,
                dynamic_racing_line: r.u8()?,
                dynamic_racing_line_type: r.u8()?,
            },
            game_mode: r.u8()?,
            rule_set: r.u8()?,
            time_of_day: r.u32_le()?,
            session_length: r.u8()?,
            speed_units_lead_player: r.u8()?,
            temperature_units_lead_player: r.u8()?,
            speed_units_secondary_player: r.u8()?,
            temperature_units_secondary_player: r.u8()?,
            num_safety_car_periods: r.u8()?,
            num_virtual_safety_car_periods: r.u8()?,
            num_red_flag_periods: r.u8()?,
            rules: SessionRules {
                equal_car_performance: r.u8()?,
                recovery_mode: r.u8()?,
                flashback_limit: r.u8()?,
                surface_type: r.u8()?,
                low_fuel_mode: r.u8()?,
                race_starts: r.u8()?,
                tyre_temperature: r.u8()?,
                pit_lane_tyre_sim: r.u8()?,
                car_damage: r.u8()?,
                car_damage_rate: r.u8()?,
                collisions: r.u8()?,
                collisions_off_for_first_lap_only: r.u8()?,
                mp_unsafe_pit_release: r.u8()?,
                mp_off_for_griefing: r.u8()?,
                corner_cutting_stringency: r.u8()?,
                parc_ferme_rules: r.u8()?,
                pit_stop_experience: r.u8()?,
                safety_car: r.u8()?,
                safety_car_experience: r.u8()?,
                formation_lap: r.u8()?,
                formation_lap_experience: r.u8()?,
                red_flags: r.u8()?,
                affects_licence_level_solo: r.u8()?,
                affects_licence_level_mp: r.u8()?,
            },
            num_sessions_in_weekend: r.u8()?,
            weekend_structure: r.u8_array()?,
            sector2_lap_distance_start: r.f32_le()?,
            sector3_lap_distance_start: r.f32_le()?,
        })
    }

    /// Marshal zones actually in use.
    pub fn active_marshal_zones(&self) -> &[MarshalZone] {
        let n = usize::from(self.num_marshal_zones).min(self.marshal_zones.len());
        self.marshal_zones.get(..n).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn decode_consumes_exactly_the_declared_length() -> TestResult {
        let mut raw = Vec::new();
        PacketHeader::f1_25(1).write_to(&mut raw);
        raw.resize(SessionPacket::LEN, 0);
        // sector3LapDistanceStart is the final field.
        let tail = SessionPacket::LEN - 4;
        raw.get_mut(tail..)
            .ok_or("short fixture")?
            .copy_from_slice(&4321.5f32.to_le_bytes());

        let session = SessionPacket::decode(&raw)?;
        assert!((session.sector3_lap_distance_start - 4321.5).abs() < f32::EPSILON);
        assert_eq!(session.marshal_zones.len(), MAX_MARSHAL_ZONES);
        assert_eq!(
            session.weather_forecast_samples.len(),
            MAX_WEATHER_FORECAST_SAMPLES
        );
        Ok(())
    }

    #[test]
    fn active_marshal_zones_respects_count() -> TestResult {
        let mut raw = Vec::new();
        PacketHeader::f1_25(1).write_to(&mut raw);
        raw.resize(SessionPacket::LEN, 0);
        // numMarshalZones sits 18 bytes into the payload.
        *raw.get_mut(HEADER_SIZE + 18).ok_or("short fixture")? = 3;

        let session = SessionPacket::decode(&raw)?;
        assert_eq!(session.active_marshal_zones().len(), 3);
        Ok(())
    }
}
