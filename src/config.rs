//! System configuration parameters
//!
//! All tunable parameters for the dryer.  Compiled-in defaults match the
//! appliance as shipped; [`DryerConfig::validate`] guards any replacement.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profiles::ProfileCatalog;

/// Maximum length of a message-bus topic.
pub const MAX_TOPIC_LEN: usize = 32;

pub type Topic = heapless::String<MAX_TOPIC_LEN>;

/// Message-bus topics for inbound commands and outbound telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    /// Material name or `RESET`.
    pub filament: Topic,
    /// Heater override, `ON` / `OFF`.
    pub heater: Topic,
    /// Fan override, `ON` / `OFF`.
    pub fan: Topic,
    /// Telemetry JSON.
    pub telemetry: Topic,
}

const DEFAULT_FILAMENT_TOPIC: &str = "cmnd/dryer/filament";
const DEFAULT_HEATER_TOPIC: &str = "cmnd/dryer/heater";
const DEFAULT_FAN_TOPIC: &str = "cmnd/dryer/fan";
const DEFAULT_TELEMETRY_TOPIC: &str = "tele/dryer/state";

const _: () = assert!(
    DEFAULT_FILAMENT_TOPIC.len() <= MAX_TOPIC_LEN
        && DEFAULT_HEATER_TOPIC.len() <= MAX_TOPIC_LEN
        && DEFAULT_FAN_TOPIC.len() <= MAX_TOPIC_LEN
        && DEFAULT_TELEMETRY_TOPIC.len() <= MAX_TOPIC_LEN
);

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            filament: topic(DEFAULT_FILAMENT_TOPIC),
            heater: topic(DEFAULT_HEATER_TOPIC),
            fan: topic(DEFAULT_FAN_TOPIC),
            telemetry: topic(DEFAULT_TELEMETRY_TOPIC),
        }
    }
}

/// Build a topic, or an empty one (which `validate` rejects) if `s` does
/// not fit.  Never truncates.
fn topic(s: &str) -> Topic {
    Topic::try_from(s).unwrap_or_else(|()| {
        warn!("config: topic {} longer than {} bytes", s, MAX_TOPIC_LEN);
        Topic::new()
    })
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryerConfig {
    // --- Thresholds ---
    /// Temperature (Celsius) at or above which heater is forced off and fan on
    pub safety_ceiling_c: f32,
    /// Below this temperature (Celsius) an idle dryer stops its fan
    pub fan_cutoff_c: f32,
    /// Calibration offset added to every raw sensor temperature
    pub sensor_offset_c: f32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Publish telemetry every N control ticks
    pub telemetry_every_ticks: u32,
    /// Consecutive sensor failures before an error is logged
    pub sensor_failure_warn_threshold: u32,

    // --- Message bus ---
    pub topics: TopicConfig,
    /// Initial broker reconnect delay (seconds); doubles up to 60
    pub broker_retry_secs: u32,
}

impl Default for DryerConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            safety_ceiling_c: 80.0,
            fan_cutoff_c: 30.0,
            sensor_offset_c: -1.0,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz
            telemetry_every_ticks: 1,
            sensor_failure_warn_threshold: 5,

            // Message bus
            topics: TopicConfig::default(),
            broker_retry_secs: 5,
        }
    }
}

impl DryerConfig {
    /// Range-check every field, and check that no profile in `catalog`
    /// targets a temperature the safety ceiling would immediately cut.
    pub fn validate(&self, catalog: &ProfileCatalog) -> Result<(), ConfigError> {
        if !(40.0..=120.0).contains(&self.safety_ceiling_c) {
            return Err(ConfigError::ValidationFailed(
                "safety_ceiling_c must be 40.0–120.0",
            ));
        }
        if !(self.fan_cutoff_c < self.safety_ceiling_c) {
            return Err(ConfigError::ValidationFailed(
                "fan_cutoff_c must be below safety_ceiling_c",
            ));
        }
        if !(-10.0..=10.0).contains(&self.sensor_offset_c) {
            return Err(ConfigError::ValidationFailed(
                "sensor_offset_c must be -10.0–10.0",
            ));
        }
        if !(100..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–5000",
            ));
        }
        if self.telemetry_every_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "telemetry_every_ticks must be at least 1",
            ));
        }
        if self.topics.filament.is_empty()
            || self.topics.heater.is_empty()
            || self.topics.fan.is_empty()
            || self.topics.telemetry.is_empty()
        {
            return Err(ConfigError::ValidationFailed("topics must not be empty"));
        }
        if !(1..=60).contains(&self.broker_retry_secs) {
            return Err(ConfigError::ValidationFailed(
                "broker_retry_secs must be 1–60",
            ));
        }
        if catalog
            .iter()
            .any(|p| f32::from(p.temperature_c) >= self.safety_ceiling_c)
        {
            return Err(ConfigError::ValidationFailed(
                "profile temperature must be below safety_ceiling_c",
            ));
        }
        Ok(())
    }
}

/// Network credentials baked in at build time.
///
/// Set `FILADRY_WIFI_SSID`, `FILADRY_WIFI_PASSWORD`, `FILADRY_BROKER_URL`,
/// `FILADRY_BROKER_USER` and `FILADRY_BROKER_PASSWORD` when building the
/// firmware image.
#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    pub broker_url: &'static str,
    pub broker_user: Option<&'static str>,
    pub broker_password: Option<&'static str>,
}

impl NetworkConfig {
    pub const fn from_build_env() -> Self {
        Self {
            wifi_ssid: match option_env!("FILADRY_WIFI_SSID") {
                Some(s) => s,
                None => "",
            },
            wifi_password: match option_env!("FILADRY_WIFI_PASSWORD") {
                Some(s) => s,
                None => "",
            },
            broker_url: match option_env!("FILADRY_BROKER_URL") {
                Some(s) => s,
                None => "mqtt://192.168.1.10:1883",
            },
            broker_user: option_env!("FILADRY_BROKER_USER"),
            broker_password: option_env!("FILADRY_BROKER_PASSWORD"),
        }
    }
}
