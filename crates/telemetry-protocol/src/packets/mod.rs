//! Typed payload schemas, one module per packet family.

pub mod car;
pub mod classification;
pub mod event;
pub mod lap;
pub mod motion;
pub mod participants;
pub mod session;
pub mod startup;

pub use car::{
    CarDamageData, CarDamagePacket, CarSetupData, CarSetupsPacket, CarStatusData, CarStatusPacket,
    CarTelemetryData, CarTelemetryPacket, TyreSetData, TyreSetsPacket,
};
pub use classification::{
    FinalClassificationData, FinalClassificationPacket, TimeTrialDataSet, TimeTrialPacket,
};
pub use event::{EventDetails, EventPacket};
pub use lap::{
    LapData, LapDataPacket, LapHistoryData, LapPositionsPacket, SessionHistoryPacket, SplitTime,
    TyreStintHistoryData,
};
pub use motion::{CarMotionData, MotionExPacket, MotionPacket};
pub use participants::{
    LiveryColour, LobbyInfoData, LobbyInfoPacket, ParticipantData, ParticipantsPacket,
};
pub use session::{MarshalZone, SessionAssists, SessionPacket, SessionRules, WeatherForecastSample};
pub use startup::{SCRIPT_STARTUP_PACKET_ID, ScriptStartupPacket};
