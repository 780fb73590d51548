//! In-memory fleet state store using DashMap.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sep_core::models::{AircraftState, Command, ConflictRecord, Snapshot};
use sep_core::{ArrivalSweeper, SeparationEngine};

/// Aircraft state together with the delivery sequence number that produced
/// it, so a report overtaken in the channel cannot clobber a newer one.
struct Tracked {
    seq: u64,
    state: AircraftState,
}

/// Result of one decision-loop tick.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub conflicts: Vec<ConflictRecord>,
    pub commands: Vec<Command>,
    pub removed: Vec<String>,
}

/// Application state - thread-safe store for aircraft and the engine.
///
/// Telemetry delivery writes into the map; the decision loop takes a
/// wholesale snapshot each tick, so the engine always works on an
/// immutable value.
pub struct AppState {
    aircraft: DashMap<String, Tracked>,
    engine: std::sync::Mutex<SeparationEngine>,
    sweeper: ArrivalSweeper,
}

impl AppState {
    pub fn new() -> Self {
        let engine = SeparationEngine::default();
        let sweeper = ArrivalSweeper::from_standards(engine.standards());
        Self {
            aircraft: DashMap::new(),
            engine: std::sync::Mutex::new(engine),
            sweeper,
        }
    }

    /// Refresh one aircraft's state (replace, not patch). `seq` orders
    /// deliveries per callsign: channel jitter can reorder reports in
    /// flight, and a stale report must not overwrite a newer state.
    pub fn update_aircraft(&self, ac: AircraftState, seq: u64) {
        match self.aircraft.entry(ac.callsign.clone()) {
            Entry::Occupied(mut entry) => {
                if seq >= entry.get().seq {
                    entry.insert(Tracked { seq, state: ac });
                } else {
                    tracing::debug!(
                        callsign = %ac.callsign,
                        seq,
                        "discarding out-of-order delivery"
                    );
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Tracked { seq, state: ac });
            }
        }
    }

    pub fn aircraft_count(&self) -> usize {
        self.aircraft.len()
    }

    /// Copy the current fleet view into an immutable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.aircraft
            .iter()
            .map(|r| (r.key().clone(), r.value().state.clone()))
            .collect()
    }

    /// Run one enforcement + arrival pass over the current snapshot.
    ///
    /// Arrived aircraft are dropped from the local view and from the
    /// engine's assignment state; the external simulation still owns the
    /// authoritative lifecycle and receives a removal command.
    pub fn run_tick(&self, now: DateTime<Utc>) -> TickOutcome {
        let snapshot = self.snapshot();

        let mut engine = match self.engine.lock() {
            Ok(engine) => engine,
            Err(poisoned) => poisoned.into_inner(),
        };
        let report = engine.enforce(&snapshot, now);
        let removed = self.sweeper.sweep(&snapshot);

        let mut commands = report.commands;
        for callsign in &removed {
            engine.forget(callsign);
            self.aircraft.remove(callsign);
            commands.push(Command::Remove {
                callsign: callsign.clone(),
            });
        }

        TickOutcome {
            conflicts: report.conflicts,
            commands,
            removed,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sep_core::models::Destination;

    fn aircraft(callsign: &str, lon: f64, alt_ft: f64) -> AircraftState {
        AircraftState {
            callsign: callsign.to_string(),
            lat: 0.0,
            lon,
            altitude_ft: alt_ft,
            tas_kt: 0.0,
            gs_kt: 0.0,
            vertical_speed_fpm: 0.0,
            heading_deg: 0.0,
            destination: None,
        }
    }

    #[test]
    fn tick_emits_altitude_commands_for_conflicts() {
        let state = AppState::new();
        state.update_aircraft(aircraft("AAL100", 0.0, 10000.0), 1);
        state.update_aircraft(aircraft("BAW200", 2.0 / 60.0, 10000.0), 2);

        let outcome = state.run_tick(Utc::now());
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.commands.len(), 2);
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn arrived_aircraft_is_removed_from_view() {
        let state = AppState::new();
        let mut ac = aircraft("GLO1234", 0.0, 500.0);
        ac.destination = Some(Destination { lat: 0.0, lon: 0.01 });
        state.update_aircraft(ac, 1);

        let outcome = state.run_tick(Utc::now());
        assert_eq!(outcome.removed, vec!["GLO1234".to_string()]);
        assert_eq!(
            outcome.commands,
            vec![Command::Remove {
                callsign: "GLO1234".into()
            }]
        );
        assert_eq!(state.aircraft_count(), 0);
    }

    #[test]
    fn overtaken_delivery_does_not_clobber_newer_state() {
        let state = AppState::new();
        state.update_aircraft(aircraft("AAL100", 0.0, 12000.0), 2);

        // An earlier report arrives late after drawing a larger delay.
        state.update_aircraft(aircraft("AAL100", 0.0, 10000.0), 1);
        let snapshot = state.snapshot();
        assert_eq!(snapshot["AAL100"].altitude_ft, 12000.0);

        // A genuinely newer report still replaces.
        state.update_aircraft(aircraft("AAL100", 0.0, 13000.0), 3);
        let snapshot = state.snapshot();
        assert_eq!(snapshot["AAL100"].altitude_ft, 13000.0);
    }
}
