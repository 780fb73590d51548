//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Decision loop period in seconds
    pub tick_period_secs: u64,
    /// Path to the sensor network configuration (fatal if unreadable)
    pub sensor_config_path: String,
    /// JSONL event log destination; disabled when unset
    pub event_log_path: Option<String>,
    /// Fixed seed for the channel model's random stream; OS entropy when unset
    pub channel_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            tick_period_secs: env::var("SEP_TICK_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            sensor_config_path: env::var("SEP_SENSOR_CONFIG")
                .unwrap_or_else(|_| "config/sensors.json".to_string()),
            event_log_path: env::var("SEP_EVENT_LOG").ok(),
            channel_seed: env::var("SEP_CHANNEL_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
