//! Fixed-period decision loop.
//!
//! Every tick: take the latest snapshot, run separation enforcement, then
//! the arrival sweep, forward the resulting commands to the sink and record
//! events. The engine itself never blocks on I/O.

use crate::events::{Event, EventLog};
use crate::sink::CommandSink;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

pub async fn run_enforcement_loop(
    state: Arc<AppState>,
    sink: CommandSink,
    events: Option<Arc<EventLog>>,
    period: Duration,
) {
    let mut ticker = interval(period);

    loop {
        ticker.tick().await;
        let now = Utc::now();
        let outcome = state.run_tick(now);

        if !outcome.conflicts.is_empty() {
            tracing::warn!("detected {} conflict(s)", outcome.conflicts.len());
        }

        if let Some(events) = &events {
            for conflict in &outcome.conflicts {
                events.record(&Event::ConflictDetected {
                    t: now,
                    conflict: conflict.clone(),
                });
            }
            for command in &outcome.commands {
                events.record(&Event::CommandIssued {
                    t: now,
                    command: command.clone(),
                });
            }
            for callsign in &outcome.removed {
                events.record(&Event::AircraftRemoved {
                    t: now,
                    callsign: callsign.clone(),
                });
            }
        }

        for command in outcome.commands {
            sink.dispatch(command);
        }
    }
}
