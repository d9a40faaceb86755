//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DryerService (domain)
//! ```
//!
//! Driven adapters (sensor, relays, clock, event sinks, message bus)
//! implement these traits.  The [`DryerService`](super::service::DryerService)
//! consumes them via generics, so the controller never touches hardware
//! directly.

use crate::error::SensorError;
use crate::sensors::ClimateReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    /// Acquire a fresh reading with the calibration offset already applied.
    ///
    /// A failed acquisition returns an error; the caller keeps whatever it
    /// had before.
    fn read(&mut self) -> Result<ClimateReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A single on/off output.
///
/// `set_on` / `is_on` speak *logical* intent ("heater heating", "fan
/// circulating").  How that maps onto the coil is the implementation's
/// business; [`is_energized`](Self::is_energized) exposes the physical side
/// for diagnostics only.
pub trait RelayActuator {
    /// Command the logical state.
    fn set_on(&mut self, on: bool);

    /// Last commanded logical state.
    fn is_on(&self) -> bool;

    /// Whether the relay coil is currently driven.
    fn is_energized(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Free-running millisecond clock.  Wraps at `u32::MAX`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, MQTT).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan an event out to two sinks, left first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Message bus port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Outbound publish side of the message bus.
pub trait MessageBus {
    /// Publish `payload` on `topic`.  Fire-and-forget: delivery failures are
    /// reported but never retried here.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BusError>;

    /// Subscribe to `topic`.
    fn subscribe(&mut self, topic: &str) -> Result<(), BusError>;

    /// Whether the broker session is currently up.
    fn is_connected(&self) -> bool;
}

/// Errors from [`MessageBus`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No broker session.
    NotConnected,
    /// The client rejected the request (queue full, oversize payload).
    Rejected,
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Rejected => write!(f, "rejected by client"),
        }
    }
}
