//! Outbound application events.
//!
//! The [`DryerService`](super::service::DryerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish over MQTT.

use serde::Serialize;

use crate::controller::DryerMode;
use crate::error::{CommandError, SensorError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries initial mode).
    Started(DryerMode),

    /// The controller changed mode.
    ModeChanged { from: DryerMode, to: DryerMode },

    /// A drying profile was applied.
    ProfileApplied {
        material: &'static str,
        target_c: u8,
        duration_ms: u32,
    },

    /// The drying timer cut a running heater.
    DryingComplete,

    /// Over-temperature shutdown entered.
    SafetyShutdown { temperature_c: f32 },

    /// The sensor produced no usable reading this tick.
    SensorFault(SensorError),

    /// An inbound command was rejected.
    CommandRejected(CommandError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot for logging or publishing.
///
/// Serialises to the broker's telemetry JSON.  Heater and fan are logical
/// states; `fanState: true` means the fan is running.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryData {
    /// `null` until the first good reading.
    pub humidity: Option<f32>,
    /// `null` until the first good reading.
    pub current_temperature: Option<f32>,
    pub target_temperature: u8,
    /// Whole minutes, truncated.
    pub remaining_time: u32,
    pub heater_state: bool,
    pub fan_state: bool,
    pub mode: DryerMode,
    pub material: Option<&'static str>,
}
