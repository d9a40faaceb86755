//! GPIO pin assignments for the Filadry controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Relays
// ---------------------------------------------------------------------------

/// PTC heater relay, normally-open contact.  Coil energised = heater on.
pub const HEATER_RELAY_GPIO: i32 = 26;
/// Circulation fan relay, normally-closed contact.
/// Coil energised = fan stopped, coil released = fan running.
pub const FAN_RELAY_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (external 10 kΩ pull-up).
pub const DHT_DATA_GPIO: i32 = 4;
