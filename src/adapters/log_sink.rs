//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{Level, log};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

fn format_telemetry(t: &TelemetryData) -> String {
    let climate = match (t.current_temperature, t.humidity) {
        (Some(temp), Some(hum)) => format!("T={:.1}\u{00b0}C H={:.1}%", temp, hum),
        _ => "T=-- H=--".to_string(),
    };
    format!(
        "TELEM | mode={} | {} | target={}\u{00b0}C | remaining={}min | heater={} fan={}",
        t.mode,
        climate,
        t.target_temperature,
        t.remaining_time,
        on_off(t.heater_state),
        on_off(t.fan_state),
    )
}

/// Log level for each event.  Mode changes are already logged by the
/// controller, so the sink only echoes them at debug.
fn severity(event: &AppEvent) -> Level {
    match event {
        AppEvent::ModeChanged { .. } => Level::Debug,
        AppEvent::SafetyShutdown { .. } => Level::Error,
        AppEvent::SensorFault(_) | AppEvent::CommandRejected(_) => Level::Warn,
        AppEvent::Telemetry(_)
        | AppEvent::ProfileApplied { .. }
        | AppEvent::DryingComplete
        | AppEvent::Started(_) => Level::Info,
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let level = severity(event);
        match event {
            AppEvent::Telemetry(t) => {
                log!(level, "{}", format_telemetry(t));
            }
            AppEvent::ModeChanged { from, to } => {
                log!(level, "MODE | {} -> {}", from, to);
            }
            AppEvent::ProfileApplied {
                material,
                target_c,
                duration_ms,
            } => {
                log!(
                    level,
                    "PROFILE | {} target={}\u{00b0}C duration={}min",
                    material,
                    target_c,
                    duration_ms / 60_000
                );
            }
            AppEvent::DryingComplete => {
                log!(level, "DONE | drying cycle complete");
            }
            AppEvent::SafetyShutdown { temperature_c } => {
                log!(level, "SAFETY | shutdown at {:.1}\u{00b0}C", temperature_c);
            }
            AppEvent::SensorFault(e) => {
                log!(level, "SENSOR | {}", e);
            }
            AppEvent::CommandRejected(e) => {
                log!(level, "CMD | rejected: {}", e);
            }
            AppEvent::Started(mode) => {
                log!(level, "START | initial_mode={}", mode);
            }
        }
    }
}
