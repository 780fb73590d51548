//! Core logic for the separation enforcement system: spherical geometry,
//! predictive conflict detection and resolution, arrival sweeping, and the
//! ADS-B/radar channel delay model.

pub mod arrival;
pub mod channel;
pub mod geo;
pub mod models;
pub mod separation;
pub mod standards;

pub use arrival::ArrivalSweeper;
pub use channel::{
    AdsbDelivery, AdsbStation, ChannelDelayModel, ChannelError, RadarObservation, RadarStation,
    SensorConfig,
};
pub use models::{AircraftState, Assignment, Command, ConflictRecord, Destination, Snapshot};
pub use separation::{EnforcementReport, SeparationEngine};
pub use standards::SeparationStandards;
