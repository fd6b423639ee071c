//! Motion (id 0) and extended player motion (id 13) packets.

use serde::Serialize;

use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS, PacketHeader};
use crate::reader::ByteReader;

/// Size of one [`CarMotionData`] entry.
pub const CAR_MOTION_ENTRY_SIZE: usize = 60;

/// Physics state of one car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarMotionData {
    pub world_position: [f32; 3],
    pub world_velocity: [f32; 3],
    /// Normalised forward direction, scaled to the `i16` range.
    pub world_forward_dir: [i16; 3],
    /// Normalised right direction, scaled to the `i16` range.
    pub world_right_dir: [i16; 3],
    pub g_force_lateral: f32,
    pub g_force_longitudinal: f32,
    pub g_force_vertical: f32,
    /// Radians.
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Motion data for every car on track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionPacket {
    pub header: PacketHeader,
    pub car_motion_data: Vec<CarMotionData>,
}

impl MotionPacket {
    pub const LEN: usize = HEADER_SIZE + NUM_CARS * CAR_MOTION_ENTRY_SIZE;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        let car_motion_data = r.repeat(NUM_CARS, |r| {
            Ok(CarMotionData {
                world_position: r.f32_le_array()?,
                world_velocity: r.f32_le_array()?,
                world_forward_dir: [r.i16_le()?, r.i16_le()?, r.i16_le()?],
                world_right_dir: [r.i16_le()?, r.i16_le()?, r.i16_le()?],
                g_force_lateral: r.f32_le()?,
                g_force_longitudinal: r.f32_le()?,
                g_force_vertical: r.f32_le()?,
                yaw: r.f32_le()?,
                pitch: r.f32_le()?,
                roll: r.f32_le()?,
            })
        })?;
        Ok(Self {
            header,
            car_motion_data,
        })
    }
}

/// Extended motion data for the player's car only.
///
/// Wheel arrays are ordered RL, RR, FL, FR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionExPacket {
    pub header: PacketHeader,
    pub suspension_position: [f32; 4],
    pub suspension_velocity: [f32; 4],
    pub suspension_acceleration: [f32; 4],
    pub wheel_speed: [f32; 4],
    pub wheel_slip_ratio: [f32; 4],
    pub wheel_slip_angle: [f32; 4],
    pub wheel_lat_force: [f32; 4],
    pub wheel_long_force: [f32; 4],
    pub height_of_cog_above_ground: f32,
    /// Metres per second, local space.
    pub local_velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub angular_acceleration: [f32; 3],
    /// Radians.
    pub front_wheels_angle: f32,
    pub wheel_vert_force: [f32; 4],
    pub front_aero_height: f32,
    pub rear_aero_height: f32,
    pub front_roll_angle: f32,
    pub rear_roll_angle: f32,
    pub chassis_yaw: f32,
    pub chassis_pitch: f32,
    pub wheel_camber: [f32; 4],
    pub wheel_camber_gain: [f32; 4],
}

impl MotionExPacket {
    pub const LEN: usize = HEADER_SIZE + 61 * 4;

    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let header = PacketHeader::decode(raw)?;
        let mut r = ByteReader::at(raw, HEADER_SIZE);
        Ok(Self {
            header,
            suspension_position: r.f32_le_array()?,
            suspension_velocity: r.f32_le_array()?,
            suspension_acceleration: r.f32_le_array()?,
            wheel_speed: r.f32_le_array()?,
            wheel_slip_ratio: r.f32_le_array()?,
            wheel_slip_angle: r.f32_le_array()?,
            wheel_lat_force: r.f32_le_array()?,
            wheel_long_force: r.f32_le_array()?,
            height_of_cog_above_ground: r.f32_le()?,
            local_velocity: r.f32_le_array()?,
            angular_velocity: r.f32_le_array()?,
            angular_acceleration: r.f32_le_array()?,
            front_wheels_angle: r.f32_le()?,
            wheel_vert_force: r.f32_le_array()?,
            front_aero_height: r.f32_le()?,
            rear_aero_height: r.f32_le()?,
            front_roll_angle: r.f32_le()?,
            rear_roll_angle: r.f32_le()?,
            chassis_yaw: r.f32_le()?,
            chassis_pitch: r.f32_le()?,
            wheel_camber: r.f32_le_array()?,
            wheel_camber_gain: r.f32_le_array()?,
        })
    }
}
