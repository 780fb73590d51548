//! Predictive separation enforcement.
//!
//! On each tick the engine projects every aircraft `lookahead_secs` ahead
//! (constant heading/TAS, linear altitude), flags pairs that would violate
//! both the vertical and lateral minima at the horizon, and resolves them
//! in severity order by climbing one aircraft and descending the other.
//! Cooldown and convergence guards keep the engine from re-issuing commands
//! that are already in effect.

use crate::geo;
use crate::models::{AircraftState, Assignment, Command, ConflictRecord, Snapshot};
use crate::standards::SeparationStandards;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Resolution step applied to each aircraft of a conflicting pair, in feet.
const RESOLUTION_STEP_FT: f64 = 1000.0;

/// Result of one enforcement pass.
#[derive(Debug, Clone, Default)]
pub struct EnforcementReport {
    /// Conflicts predicted at the lookahead horizon, in resolution order
    pub conflicts: Vec<ConflictRecord>,
    /// Altitude commands to forward to the command sink
    pub commands: Vec<Command>,
}

/// Pairwise conflict detector and resolver with per-callsign command state.
///
/// The caller owns the tick loop: it passes in an immutable snapshot and the
/// current time, and forwards the returned commands to the external sink.
/// `enforce` must not be invoked concurrently with itself; resolution order
/// within a tick is significant because later pairs observe assignments
/// updated by earlier ones.
pub struct SeparationEngine {
    standards: SeparationStandards,
    assignments: HashMap<String, Assignment>,
}

impl Default for SeparationEngine {
    fn default() -> Self {
        Self::new(SeparationStandards::default())
    }
}

impl SeparationEngine {
    pub fn new(standards: SeparationStandards) -> Self {
        Self {
            standards,
            assignments: HashMap::new(),
        }
    }

    pub fn standards(&self) -> &SeparationStandards {
        &self.standards
    }

    /// Last assignment issued to a callsign, if any.
    pub fn assignment(&self, callsign: &str) -> Option<Assignment> {
        self.assignments.get(callsign).copied()
    }

    /// Drop all command state for a callsign (aircraft removed or lost).
    pub fn forget(&mut self, callsign: &str) {
        self.assignments.remove(callsign);
    }

    /// Run one detection + resolution pass over the snapshot.
    pub fn enforce(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> EnforcementReport {
        self.refresh_assignments(snapshot, now);

        // Sorted callsigns give a stable pair order, which fixes who climbs
        // and who descends for a given pair.
        let mut ids: Vec<&String> = snapshot
            .iter()
            .filter_map(|(id, ac)| {
                if ac.is_valid() {
                    Some(id)
                } else {
                    tracing::warn!(callsign = %id, "skipping aircraft with non-finite state");
                    None
                }
            })
            .collect();
        ids.sort();

        let mut conflicts = Vec::new();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let ac1 = &snapshot[ids[i]];
                let ac2 = &snapshot[ids[j]];
                if let Some(conflict) = self.evaluate_pair(ac1, ac2) {
                    tracing::warn!(
                        callsign1 = %conflict.callsign1,
                        callsign2 = %conflict.callsign2,
                        horizontal_nm = conflict.horizontal_nm,
                        vertical_ft = conflict.vertical_ft,
                        "predicted conflict"
                    );
                    conflicts.push(conflict);
                }
            }
        }

        // Tightest conflicts get first claim on cooldown slots.
        conflicts.sort_by(|a, b| {
            (a.horizontal_nm, a.vertical_ft)
                .partial_cmp(&(b.horizontal_nm, b.vertical_ft))
                .unwrap_or(Ordering::Equal)
        });

        let mut commands = Vec::new();
        for conflict in &conflicts {
            self.resolve(conflict, now, &mut commands);
        }

        EnforcementReport {
            conflicts,
            commands,
        }
    }

    /// Project both aircraft to the lookahead horizon and test the minima.
    /// A conflict requires both dimensions below minimum; either alone is
    /// sufficient protection under radar separation.
    fn evaluate_pair(&self, ac1: &AircraftState, ac2: &AircraftState) -> Option<ConflictRecord> {
        let lookahead_s = self.standards.lookahead_secs as f64;

        let (lat1, lon1) =
            geo::project_position(ac1.lat, ac1.lon, ac1.tas_kt, ac1.heading_deg, lookahead_s);
        let (lat2, lon2) =
            geo::project_position(ac2.lat, ac2.lon, ac2.tas_kt, ac2.heading_deg, lookahead_s);

        let alt1 = ac1.altitude_ft + ac1.vertical_speed_fpm * lookahead_s / 60.0;
        let alt2 = ac2.altitude_ft + ac2.vertical_speed_fpm * lookahead_s / 60.0;

        let vertical_ft = (alt1 - alt2).abs();
        let horizontal_nm = geo::haversine_nm(lat1, lon1, lat2, lon2);

        if vertical_ft < self.standards.vertical_min_ft
            && horizontal_nm < self.standards.lateral_min_nm
        {
            Some(ConflictRecord {
                callsign1: ac1.callsign.clone(),
                callsign2: ac2.callsign.clone(),
                altitude1_ft: ac1.altitude_ft,
                altitude2_ft: ac2.altitude_ft,
                horizontal_nm,
                vertical_ft,
            })
        } else {
            None
        }
    }

    /// Resolve one conflict: the first-listed aircraft climbs, the second
    /// descends. Pair order, not relative altitude, decides the direction,
    /// so command sequences are reproducible.
    fn resolve(&mut self, conflict: &ConflictRecord, now: DateTime<Utc>, out: &mut Vec<Command>) {
        let climb_to = self
            .standards
            .clamp_altitude(conflict.altitude1_ft + RESOLUTION_STEP_FT);
        let descend_to = self
            .standards
            .clamp_altitude(conflict.altitude2_ft - RESOLUTION_STEP_FT);

        self.issue(&conflict.callsign1, climb_to, conflict.altitude1_ft, now, out);
        self.issue(&conflict.callsign2, descend_to, conflict.altitude2_ft, now, out);
    }

    /// Issue an altitude command unless suppressed by the cooldown or the
    /// convergence guard.
    fn issue(
        &mut self,
        callsign: &str,
        target_alt_ft: f64,
        current_alt_ft: f64,
        now: DateTime<Utc>,
        out: &mut Vec<Command>,
    ) {
        if self.on_cooldown(callsign, now) {
            tracing::debug!(callsign, "command suppressed by cooldown");
            return;
        }
        if self.assigned_and_reached(callsign, target_alt_ft, current_alt_ft) {
            tracing::debug!(callsign, target_alt_ft, "assigned altitude already reached");
            return;
        }

        tracing::info!(callsign, target_alt_ft, "issuing altitude command");
        out.push(Command::Altitude {
            callsign: callsign.to_string(),
            target_altitude_ft: target_alt_ft,
        });
        self.assignments.insert(
            callsign.to_string(),
            Assignment {
                target_alt_ft,
                issued_at: now,
                last_seen: now,
            },
        );
    }

    fn on_cooldown(&self, callsign: &str, now: DateTime<Utc>) -> bool {
        self.assignments
            .get(callsign)
            .map(|a| now - a.issued_at < Duration::seconds(self.standards.cooldown_secs))
            .unwrap_or(false)
    }

    /// Convergence guard: the same target is already assigned and the
    /// aircraft is within tolerance of it, so the command has had its effect.
    fn assigned_and_reached(&self, callsign: &str, target_alt_ft: f64, current_alt_ft: f64) -> bool {
        match self.assignments.get(callsign) {
            Some(a) if a.target_alt_ft == target_alt_ft => {
                (current_alt_ft - target_alt_ft).abs() < self.standards.reached_tolerance_ft
            }
            _ => false,
        }
    }

    /// Track which callsigns are still present and drop assignments for
    /// aircraft that have been gone longer than the configured timeout.
    fn refresh_assignments(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) {
        let timeout = Duration::seconds(self.standards.assignment_timeout_secs);
        self.assignments.retain(|callsign, assignment| {
            if snapshot.contains_key(callsign) {
                assignment.last_seen = now;
                true
            } else if now - assignment.last_seen > timeout {
                tracing::debug!(callsign = %callsign, "dropping stale assignment");
                false
            } else {
                true
            }
        });
    }
}
