//! Core data models for the separation enforcement system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Latest known state of one aircraft, as delivered by the surveillance
/// snapshot. Replaced wholesale on every refresh; the engine never patches
/// individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftState {
    /// Unique callsign
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    /// Barometric altitude in feet
    pub altitude_ft: f64,
    /// True airspeed in knots
    #[serde(default)]
    pub tas_kt: f64,
    /// Ground speed in knots
    #[serde(default)]
    pub gs_kt: f64,
    /// Vertical speed in feet per minute
    #[serde(default)]
    pub vertical_speed_fpm: f64,
    /// Heading in degrees, 0-360
    #[serde(default)]
    pub heading_deg: f64,
    #[serde(default)]
    pub destination: Option<Destination>,
}

/// Resolved destination coordinates. Parsing of string destination formats
/// (ICAO codes, DMS, CSV-joined lat/lon) happens upstream of the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Destination {
    pub lat: f64,
    pub lon: f64,
}

impl AircraftState {
    /// Whether the kinematic fields are all usable numbers. Records failing
    /// this are skipped for the tick rather than aborting enforcement.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.altitude_ft.is_finite()
            && self.tas_kt.is_finite()
            && self.vertical_speed_fpm.is_finite()
            && self.heading_deg.is_finite()
    }
}

/// Snapshot of the fleet as the engine sees it on one tick.
pub type Snapshot = HashMap<String, AircraftState>;

/// A predicted separation violation between two aircraft, at the lookahead
/// horizon. Created transiently per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub callsign1: String,
    pub callsign2: String,
    /// Current (not projected) altitudes, used to derive resolutions
    pub altitude1_ft: f64,
    pub altitude2_ft: f64,
    /// Predicted horizontal separation at the lookahead horizon
    pub horizontal_nm: f64,
    /// Predicted vertical separation at the lookahead horizon
    pub vertical_ft: f64,
}

/// A fire-and-forget instruction for the external command sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Assign a new cruise/level altitude
    Altitude {
        callsign: String,
        target_altitude_ft: f64,
    },
    /// Deactivate and discard the aircraft
    Remove { callsign: String },
}

impl Command {
    pub fn callsign(&self) -> &str {
        match self {
            Command::Altitude { callsign, .. } => callsign,
            Command::Remove { callsign } => callsign,
        }
    }
}

/// Altitude target issued to one callsign, tracked across ticks for
/// cooldown and convergence suppression.
#[derive(Debug, Clone, Copy)]
pub struct Assignment {
    pub target_alt_ft: f64,
    pub issued_at: DateTime<Utc>,
    /// Last tick the callsign appeared in a snapshot; stale entries are pruned
    pub last_seen: DateTime<Utc>,
}
