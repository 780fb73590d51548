//! Telemetry ingest: stdin JSONL through the surveillance channel model.
//!
//! Each line is one `AircraftState`. The ADS-B channel model decides whether
//! the report reaches the controller at all (coverage, packet loss) and how
//! late (propagation + processing + jitter); delivered reports update the
//! fleet store after their modelled delay.

use crate::state::AppState;
use rand::rngs::StdRng;
use sep_core::models::AircraftState;
use sep_core::ChannelDelayModel;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run_ingest(state: Arc<AppState>, mut model: ChannelDelayModel<StdRng>) {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    // Arrival order on the wire; the store uses it to discard reports that
    // were overtaken by a later one while delayed in the channel.
    let mut seq: u64 = 0;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("telemetry stream closed");
                return;
            }
            Err(e) => {
                tracing::error!("telemetry read failed: {e}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let ac: AircraftState = match serde_json::from_str(&line) {
            Ok(ac) => ac,
            Err(e) => {
                tracing::warn!("skipping malformed telemetry line: {e}");
                continue;
            }
        };

        let Some(delivery) = model.adsb_delay(&ac) else {
            tracing::debug!(callsign = %ac.callsign, "aircraft outside ADS-B coverage");
            continue;
        };
        if delivery.lost {
            tracing::debug!(
                callsign = %ac.callsign,
                station = %delivery.station,
                "ADS-B packet lost"
            );
            continue;
        }

        seq += 1;
        let state = state.clone();
        let delay = Duration::from_secs_f64(delivery.delay_ms / 1000.0);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.update_aircraft(ac, seq);
        });
    }
}
