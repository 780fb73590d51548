//! Surveillance channel model: ADS-B and radar delay, jitter, loss and
//! detection probability.
//!
//! The model decides when and how accurately aircraft telemetry reaches the
//! decision loop; it never calls the engine itself. All randomness (jitter,
//! packet loss, radar detection) comes from an injected RNG so delay/loss
//! scenarios replay exactly under a fixed seed.

use crate::geo;
use crate::models::AircraftState;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const METERS_PER_NM: f64 = 1852.0;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to read sensor config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed sensor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid sensor config: {0}")]
    Invalid(String),
}

/// Shared channel parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Signal propagation speed in the medium, m/s
    pub c: f64,
    /// Fixed processing delay at the controller, ms
    pub controller_proc_ms: f64,
    /// ADS-B airborne transmit interval, s
    pub adsb_air_tx_period_s: f64,
    /// Extra measurement latency on the radar channel, ms
    #[serde(default)]
    pub radar_meas_latency_ms_extra: f64,
}

/// Reference position of the controller facility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControllerSite {
    pub lat: f64,
    pub lon: f64,
}

/// An ADS-B ground receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsbStation {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Reception coverage radius, NM
    pub rx_range_nm: f64,
    /// Fixed station processing delay, ms
    pub base_delay_ms: f64,
    /// Uniform jitter bound, ms
    pub jitter_ms: f64,
    /// Packet loss probability, 0..=1
    pub loss: f64,
}

/// A surveillance radar head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarStation {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Maximum instrumented range, NM
    pub max_range_nm: f64,
    /// Antenna update period, s
    pub update_s: f64,
    /// Probability of detection per scan, 0..=1
    pub pd: f64,
    /// Plot processing delay, ms
    pub proc_ms: f64,
    /// Uniform jitter bound, ms
    pub jitter_ms: f64,
}

/// Sensor network configuration, loaded once at startup. Malformed or
/// missing configuration is fatal; the delay model cannot operate without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub channel: ChannelParams,
    pub controller: ControllerSite,
    #[serde(default)]
    pub adsb_stations: Vec<AdsbStation>,
    #[serde(default)]
    pub radars: Vec<RadarStation>,
}

impl SensorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChannelError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChannelError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ChannelError> {
        if !(self.channel.c.is_finite() && self.channel.c > 0.0) {
            return Err(ChannelError::Invalid(
                "channel.c must be a positive propagation speed".into(),
            ));
        }
        for s in &self.adsb_stations {
            if !(0.0..=1.0).contains(&s.loss) {
                return Err(ChannelError::Invalid(format!(
                    "adsb station {}: loss must be in [0, 1]",
                    s.id
                )));
            }
            if s.rx_range_nm <= 0.0 {
                return Err(ChannelError::Invalid(format!(
                    "adsb station {}: rx_range_nm must be positive",
                    s.id
                )));
            }
            // Written to also reject NaN, which would poison the jitter draw.
            if !(s.jitter_ms >= 0.0 && s.base_delay_ms >= 0.0) {
                return Err(ChannelError::Invalid(format!(
                    "adsb station {}: jitter_ms and base_delay_ms must be non-negative",
                    s.id
                )));
            }
        }
        for r in &self.radars {
            if !(0.0..=1.0).contains(&r.pd) {
                return Err(ChannelError::Invalid(format!(
                    "radar {}: pd must be in [0, 1]",
                    r.id
                )));
            }
            if r.max_range_nm <= 0.0 || r.update_s <= 0.0 {
                return Err(ChannelError::Invalid(format!(
                    "radar {}: max_range_nm and update_s must be positive",
                    r.id
                )));
            }
            if !(r.jitter_ms >= 0.0 && r.proc_ms >= 0.0) {
                return Err(ChannelError::Invalid(format!(
                    "radar {}: jitter_ms and proc_ms must be non-negative",
                    r.id
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of one ADS-B delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsbDelivery {
    /// Selected (nearest covering) ground station
    pub station: String,
    /// Total aircraft-to-controller delay, ms
    pub delay_ms: f64,
    /// Packet dropped on the link this period
    pub lost: bool,
    /// Airborne transmit interval, s
    pub period_s: f64,
}

/// Outcome of one radar look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadarObservation {
    /// Aircraft beyond the radar's instrumented range
    OutOfRange { radar_id: String },
    /// A scan happened; detection is probabilistic
    Sweep {
        radar_id: String,
        detected: bool,
        delay_ms: f64,
    },
}

/// Stochastic delay/loss model over the configured sensor network.
pub struct ChannelDelayModel<R: Rng> {
    cfg: SensorConfig,
    rng: R,
}

impl ChannelDelayModel<StdRng> {
    /// Model with a reproducible random stream.
    pub fn seeded(cfg: SensorConfig, seed: u64) -> Self {
        Self::new(cfg, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ChannelDelayModel<R> {
    pub fn new(cfg: SensorConfig, rng: R) -> Self {
        Self { cfg, rng }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.cfg
    }

    /// One-way propagation delay between two points, ms.
    fn prop_delay_ms(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let d_m = geo::haversine_nm(lat1, lon1, lat2, lon2) * METERS_PER_NM;
        1000.0 * d_m / self.cfg.channel.c
    }

    /// Model an ADS-B report: aircraft -> nearest covering station ->
    /// controller. Returns `None` when no station covers the aircraft.
    pub fn adsb_delay(&mut self, ac: &AircraftState) -> Option<AdsbDelivery> {
        let station = self
            .cfg
            .adsb_stations
            .iter()
            .map(|s| (geo::haversine_nm(ac.lat, ac.lon, s.lat, s.lon), s))
            .filter(|(dist, s)| *dist <= s.rx_range_nm)
            .min_by(|(d1, _), (d2, _)| d1.total_cmp(d2))
            .map(|(_, s)| s.clone())?;

        let air2gs = self.prop_delay_ms(ac.lat, ac.lon, station.lat, station.lon);
        let gs2ctrl = self.prop_delay_ms(
            station.lat,
            station.lon,
            self.cfg.controller.lat,
            self.cfg.controller.lon,
        );
        let base = station.base_delay_ms + self.cfg.channel.controller_proc_ms;
        let jitter = self
            .rng
            .random_range(-station.jitter_ms..=station.jitter_ms);
        let lost = self.rng.random_bool(station.loss);

        Some(AdsbDelivery {
            station: station.id,
            delay_ms: (base + air2gs + gs2ctrl + jitter).max(0.0),
            lost,
            period_s: self.cfg.channel.adsb_air_tx_period_s,
        })
    }

    /// Model one radar look at the aircraft from the nearest radar head.
    /// Returns `None` when no radar is configured or the antenna is not due
    /// for another scan yet.
    pub fn radar_observation(
        &mut self,
        ac: &AircraftState,
        last_update: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<RadarObservation> {
        let radar = self
            .cfg
            .radars
            .iter()
            .min_by(|r1, r2| {
                let d1 = geo::haversine_nm(ac.lat, ac.lon, r1.lat, r1.lon);
                let d2 = geo::haversine_nm(ac.lat, ac.lon, r2.lat, r2.lon);
                d1.total_cmp(&d2)
            })?
            .clone();

        let elapsed_s = (now - last_update).num_milliseconds() as f64 / 1000.0;
        if elapsed_s < radar.update_s {
            return None;
        }

        let range_nm = geo::haversine_nm(ac.lat, ac.lon, radar.lat, radar.lon);
        if range_nm > radar.max_range_nm {
            return Some(RadarObservation::OutOfRange { radar_id: radar.id });
        }

        let detected = self.rng.random_bool(radar.pd);
        let prop = self.prop_delay_ms(
            radar.lat,
            radar.lon,
            self.cfg.controller.lat,
            self.cfg.controller.lon,
        );
        let jitter = self.rng.random_range(-radar.jitter_ms..=radar.jitter_ms);
        let delay_ms = (radar.proc_ms + prop + self.cfg.channel.radar_meas_latency_ms_extra + jitter)
            .max(0.0);

        Some(RadarObservation::Sweep {
            radar_id: radar.id,
            detected,
            delay_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn aircraft_at(lat: f64, lon: f64) -> AircraftState {
        AircraftState {
            callsign: "TAM3342".into(),
            lat,
            lon,
            altitude_ft: 35000.0,
            tas_kt: 450.0,
            gs_kt: 440.0,
            vertical_speed_fpm: 0.0,
            heading_deg: 90.0,
            destination: None,
        }
    }

    fn test_config(loss: f64, pd: f64) -> SensorConfig {
        SensorConfig {
            channel: ChannelParams {
                c: 299_792_458.0,
                controller_proc_ms: 5.0,
                adsb_air_tx_period_s: 1.0,
                radar_meas_latency_ms_extra: 2.0,
            },
            controller: ControllerSite {
                lat: -23.0,
                lon: -46.0,
            },
            adsb_stations: vec![
                AdsbStation {
                    id: "GS-NEAR".into(),
                    lat: -23.1,
                    lon: -46.1,
                    rx_range_nm: 150.0,
                    base_delay_ms: 10.0,
                    jitter_ms: 0.0,
                    loss,
                },
                AdsbStation {
                    id: "GS-FAR".into(),
                    lat: -25.0,
                    lon: -48.0,
                    rx_range_nm: 150.0,
                    base_delay_ms: 10.0,
                    jitter_ms: 0.0,
                    loss,
                },
            ],
            radars: vec![RadarStation {
                id: "RAD1".into(),
                lat: -23.0,
                lon: -46.0,
                max_range_nm: 200.0,
                update_s: 4.0,
                pd,
                proc_ms: 20.0,
                jitter_ms: 0.0,
            }],
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn out_of_all_coverage_returns_none() {
        let mut model = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        // Opposite hemisphere, far outside every station's range.
        assert!(model.adsb_delay(&aircraft_at(40.0, 10.0)).is_none());
    }

    #[test]
    fn nearest_covering_station_wins() {
        let mut model = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        let delivery = model.adsb_delay(&aircraft_at(-23.2, -46.2)).unwrap();
        assert_eq!(delivery.station, "GS-NEAR");
        assert_eq!(delivery.period_s, 1.0);
    }

    #[test]
    fn adsb_delay_includes_processing_terms() {
        let mut model = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        let delivery = model.adsb_delay(&aircraft_at(-23.2, -46.2)).unwrap();
        // Jitter is zero, so delay is base + controller processing plus
        // strictly positive propagation time.
        assert!(delivery.delay_ms > 15.0);
        assert!(delivery.delay_ms < 20.0, "got {}", delivery.delay_ms);
    }

    #[test]
    fn loss_probability_bounds() {
        let mut never = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        let mut always = ChannelDelayModel::seeded(test_config(1.0, 1.0), 7);
        for _ in 0..20 {
            assert!(!never.adsb_delay(&aircraft_at(-23.2, -46.2)).unwrap().lost);
            assert!(always.adsb_delay(&aircraft_at(-23.2, -46.2)).unwrap().lost);
        }
    }

    #[test]
    fn seeded_streams_replay_identically() {
        let cfg = test_config(0.5, 0.7);
        let mut a = ChannelDelayModel::seeded(cfg.clone(), 42);
        let mut b = ChannelDelayModel::seeded(cfg, 42);
        for _ in 0..50 {
            let da = a.adsb_delay(&aircraft_at(-23.2, -46.2)).unwrap();
            let db = b.adsb_delay(&aircraft_at(-23.2, -46.2)).unwrap();
            assert_eq!(da.lost, db.lost);
            assert_eq!(da.delay_ms, db.delay_ms);
        }
    }

    #[test]
    fn radar_respects_update_period() {
        let mut model = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        let ac = aircraft_at(-23.2, -46.2);
        assert!(model.radar_observation(&ac, t(0), t(2)).is_none());
        assert!(model.radar_observation(&ac, t(0), t(4)).is_some());
    }

    #[test]
    fn radar_reports_out_of_range() {
        let mut model = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        let far = aircraft_at(-35.0, -60.0);
        assert_eq!(
            model.radar_observation(&far, t(0), t(10)),
            Some(RadarObservation::OutOfRange {
                radar_id: "RAD1".into()
            })
        );
    }

    #[test]
    fn radar_detection_follows_pd() {
        let mut certain = ChannelDelayModel::seeded(test_config(0.0, 1.0), 7);
        let mut blind = ChannelDelayModel::seeded(test_config(0.0, 0.0), 7);
        let ac = aircraft_at(-23.2, -46.2);
        for _ in 0..20 {
            match certain.radar_observation(&ac, t(0), t(10)).unwrap() {
                RadarObservation::Sweep {
                    detected, delay_ms, ..
                } => {
                    assert!(detected);
                    assert!(delay_ms >= 0.0);
                }
                other => panic!("unexpected {other:?}"),
            }
            match blind.radar_observation(&ac, t(0), t(10)).unwrap() {
                RadarObservation::Sweep { detected, .. } => assert!(!detected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn config_rejects_bad_probabilities_and_speed() {
        let mut cfg = test_config(1.5, 1.0);
        assert!(cfg.validate().is_err());
        cfg.adsb_stations[0].loss = 0.5;
        cfg.adsb_stations[1].loss = 0.5;
        assert!(cfg.validate().is_ok());
        cfg.channel.c = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_rejects_negative_jitter_and_delays() {
        // A negative jitter bound must fail at load time, not panic on the
        // first jitter draw mid decision loop.
        let mut cfg = test_config(0.0, 1.0);
        cfg.adsb_stations[0].jitter_ms = -5.0;
        assert!(cfg.validate().is_err());

        cfg.adsb_stations[0].jitter_ms = 3.0;
        cfg.radars[0].jitter_ms = -1.0;
        assert!(cfg.validate().is_err());

        cfg.radars[0].jitter_ms = 0.0;
        cfg.radars[0].proc_ms = -10.0;
        assert!(cfg.validate().is_err());

        cfg.radars[0].proc_ms = 20.0;
        cfg.adsb_stations[1].base_delay_ms = f64::NAN;
        assert!(cfg.validate().is_err());

        cfg.adsb_stations[1].base_delay_ms = 10.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_parses_from_json() {
        let json = r#"{
            "channel": {"c": 299792458.0, "controller_proc_ms": 5.0, "adsb_air_tx_period_s": 1.0},
            "controller": {"lat": -23.0, "lon": -46.0},
            "adsb_stations": [
                {"id": "GS1", "lat": -23.1, "lon": -46.1, "rx_range_nm": 150.0,
                 "base_delay_ms": 10.0, "jitter_ms": 3.0, "loss": 0.02}
            ],
            "radars": [
                {"id": "RAD1", "lat": -23.0, "lon": -46.0, "max_range_nm": 200.0,
                 "update_s": 4.0, "pd": 0.95, "proc_ms": 20.0, "jitter_ms": 5.0}
            ]
        }"#;
        let cfg = SensorConfig::from_json(json).unwrap();
        assert_eq!(cfg.adsb_stations.len(), 1);
        assert_eq!(cfg.radars[0].id, "RAD1");
        assert_eq!(cfg.channel.radar_meas_latency_ms_extra, 0.0);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(SensorConfig::from_json("{\"channel\": {}}").is_err());
    }
}
