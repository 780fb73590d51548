//! Arrival detection: flag aircraft that have reached their destination.

use crate::geo;
use crate::models::Snapshot;
use crate::standards::SeparationStandards;

/// Scans each snapshot for aircraft close to their destination and low
/// enough to be considered arrived. The result is a recommendation; the
/// external simulation owns the actual aircraft lifecycle.
pub struct ArrivalSweeper {
    radius_nm: f64,
    max_altitude_ft: f64,
}

impl ArrivalSweeper {
    pub fn new(radius_nm: f64, max_altitude_ft: f64) -> Self {
        Self {
            radius_nm,
            max_altitude_ft,
        }
    }

    pub fn from_standards(standards: &SeparationStandards) -> Self {
        Self::new(standards.removal_radius_nm, standards.removal_altitude_ft)
    }

    /// Callsigns to remove this tick, in sorted order. Aircraft without a
    /// resolved destination are never flagged.
    pub fn sweep(&self, snapshot: &Snapshot) -> Vec<String> {
        let mut arrived: Vec<String> = snapshot
            .values()
            .filter(|ac| ac.is_valid())
            .filter_map(|ac| {
                let dest = ac.destination?;
                let dist_nm = geo::haversine_nm(ac.lat, ac.lon, dest.lat, dest.lon);
                if dist_nm < self.radius_nm && ac.altitude_ft < self.max_altitude_ft {
                    tracing::info!(
                        callsign = %ac.callsign,
                        dist_nm,
                        altitude_ft = ac.altitude_ft,
                        "aircraft arrived at destination"
                    );
                    Some(ac.callsign.clone())
                } else {
                    None
                }
            })
            .collect();
        arrived.sort();
        arrived
    }
}

impl Default for ArrivalSweeper {
    fn default() -> Self {
        Self::from_standards(&SeparationStandards::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AircraftState, Destination};

    fn arriving(callsign: &str, dist_nm: f64, alt_ft: f64) -> AircraftState {
        // Destination offset eastward along the equator: 1 NM = 1/60 degree.
        AircraftState {
            callsign: callsign.to_string(),
            lat: 0.0,
            lon: 0.0,
            altitude_ft: alt_ft,
            tas_kt: 120.0,
            gs_kt: 120.0,
            vertical_speed_fpm: -500.0,
            heading_deg: 90.0,
            destination: Some(Destination {
                lat: 0.0,
                lon: dist_nm / 60.0,
            }),
        }
    }

    #[test]
    fn flags_close_and_low_aircraft() {
        let sweeper = ArrivalSweeper::default();
        let snapshot: Snapshot = [arriving("GLO1234", 1.5, 500.0)]
            .into_iter()
            .map(|ac| (ac.callsign.clone(), ac))
            .collect();
        assert_eq!(sweeper.sweep(&snapshot), vec!["GLO1234".to_string()]);
    }

    #[test]
    fn close_but_high_is_not_arrived() {
        let sweeper = ArrivalSweeper::default();
        let snapshot: Snapshot = [arriving("GLO1234", 1.5, 5000.0)]
            .into_iter()
            .map(|ac| (ac.callsign.clone(), ac))
            .collect();
        assert!(sweeper.sweep(&snapshot).is_empty());
    }

    #[test]
    fn low_but_distant_is_not_arrived() {
        let sweeper = ArrivalSweeper::default();
        let snapshot: Snapshot = [arriving("GLO1234", 3.5, 500.0)]
            .into_iter()
            .map(|ac| (ac.callsign.clone(), ac))
            .collect();
        assert!(sweeper.sweep(&snapshot).is_empty());
    }

    #[test]
    fn no_destination_is_skipped() {
        let sweeper = ArrivalSweeper::default();
        let mut ac = arriving("GLO1234", 0.5, 200.0);
        ac.destination = None;
        let snapshot: Snapshot = [(ac.callsign.clone(), ac)].into_iter().collect();
        assert!(sweeper.sweep(&snapshot).is_empty());
    }
}
