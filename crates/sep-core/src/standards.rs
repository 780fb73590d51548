//! Separation standards and engine thresholds.
//!
//! Defaults follow ICAO Doc 4444 / Annex 11 radar separation minima and the
//! RVSM altitude band.

use serde::{Deserialize, Serialize};

/// Configuration for the separation engine and arrival sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationStandards {
    /// Vertical separation minimum in feet
    pub vertical_min_ft: f64,
    /// Lateral separation minimum in nautical miles (radar environment)
    pub lateral_min_nm: f64,
    /// Minimum assignable altitude in feet
    pub alt_min_ft: f64,
    /// Maximum assignable altitude in feet
    pub alt_max_ft: f64,
    /// Prediction window for conflict detection in seconds
    pub lookahead_secs: i64,
    /// Minimum time between commands to the same callsign in seconds
    pub cooldown_secs: i64,
    /// Tolerance for considering an assigned altitude reached, in feet
    pub reached_tolerance_ft: f64,
    /// Arrival removal: maximum distance to destination in nautical miles
    pub removal_radius_nm: f64,
    /// Arrival removal: maximum altitude in feet
    pub removal_altitude_ft: f64,
    /// Drop an assignment after the callsign has been absent this long (seconds)
    pub assignment_timeout_secs: i64,
}

impl Default for SeparationStandards {
    fn default() -> Self {
        Self {
            vertical_min_ft: 1000.0,
            lateral_min_nm: 5.0,
            alt_min_ft: 1000.0,
            alt_max_ft: 45000.0,
            lookahead_secs: 60,
            cooldown_secs: 20,
            reached_tolerance_ft: 100.0,
            removal_radius_nm: 2.0,
            removal_altitude_ft: 1000.0,
            assignment_timeout_secs: 60,
        }
    }
}

impl SeparationStandards {
    /// Clamp a candidate altitude into the operational band.
    pub fn clamp_altitude(&self, alt_ft: f64) -> f64 {
        alt_ft.clamp(self.alt_min_ft, self.alt_max_ft)
    }
}
