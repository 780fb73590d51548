//! Separation enforcement server: telemetry in, commands out.

mod config;
mod events;
mod ingest;
mod loops;
mod sink;
mod state;

use anyhow::{Context, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::events::EventLog;
use crate::sink::CommandSink;
use crate::state::AppState;
use sep_core::{ChannelDelayModel, SensorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sep_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting separation enforcement server...");

    let config = Config::from_env();

    let sensor_config = SensorConfig::load(&config.sensor_config_path)
        .with_context(|| format!("loading sensor config from {}", config.sensor_config_path))?;
    let seed = config
        .channel_seed
        .unwrap_or_else(|| rand::rng().random());
    tracing::info!(seed, "channel model seeded");
    let model = ChannelDelayModel::seeded(sensor_config, seed);

    let events = match &config.event_log_path {
        Some(path) => Some(Arc::new(
            EventLog::open(path).with_context(|| format!("opening event log at {path}"))?,
        )),
        None => None,
    };

    let state = Arc::new(AppState::new());
    let (command_sink, command_rx) = CommandSink::bounded(256);

    tokio::spawn(sink::run_stdout_writer(command_rx));
    tokio::spawn(ingest::run_ingest(state.clone(), model));

    loops::enforcement_loop::run_enforcement_loop(
        state,
        command_sink,
        events,
        Duration::from_secs(config.tick_period_secs),
    )
    .await;

    Ok(())
}
