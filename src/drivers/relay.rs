//! Relay driver for the heater and fan outputs.
//!
//! Callers always speak logical intent: `set_on(true)` means "heater
//! heating" or "fan circulating".  The contact wiring decides which coil
//! level that takes:
//!
//! ```text
//!   logical on ──▶ NormallyOpen   ──▶ coil energised   (pin HIGH)
//!   logical on ──▶ NormallyClosed ──▶ coil released    (pin LOW)
//! ```
//!
//! The inversion happens in exactly one place, [`Wiring::coil_level`].
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`].  On ESP-IDF the pin is
//! a [`GpioOutput`](super::hw_init::GpioOutput); in tests it is any mock pin.

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, warn};

use crate::app::ports::RelayActuator;

/// How the load is wired to the relay contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// Load powered while the coil is energised.
    NormallyOpen,
    /// Load powered while the coil is released.
    NormallyClosed,
}

impl Wiring {
    /// Coil level (true = energised) for a logical command.
    pub const fn coil_level(self, logical_on: bool) -> bool {
        match self {
            Self::NormallyOpen => logical_on,
            Self::NormallyClosed => !logical_on,
        }
    }
}

/// Commanded state of one relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    pub commanded_on: bool,
}

pub struct Relay<P: OutputPin> {
    pin: P,
    wiring: Wiring,
    state: ActuatorState,
    name: &'static str,
}

impl<P: OutputPin> Relay<P> {
    /// Wrap an output pin.  Nothing is driven until the first `set_on`.
    pub fn new(pin: P, wiring: Wiring, name: &'static str) -> Self {
        Self {
            pin,
            wiring,
            state: ActuatorState::default(),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn wiring(&self) -> Wiring {
        self.wiring
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Borrow the underlying pin (test inspection).
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> RelayActuator for Relay<P> {
    /// Drives the pin on every call, even when the logical state is
    /// unchanged, so a glitched output is corrected on the next tick.
    fn set_on(&mut self, on: bool) {
        let level = self.wiring.coil_level(on);
        if let Err(e) = self.pin.set_state(PinState::from(level)) {
            warn!("{} relay: pin write failed: {:?}", self.name, e);
        }
        if self.state.commanded_on != on {
            debug!(
                "{} relay -> {} (coil {})",
                self.name,
                if on { "ON" } else { "OFF" },
                if level { "energised" } else { "released" }
            );
        }
        self.state.commanded_on = on;
    }

    fn is_on(&self) -> bool {
        self.state.commanded_on
    }

    fn is_energized(&self) -> bool {
        self.wiring.coil_level(self.state.commanded_on)
    }
}
