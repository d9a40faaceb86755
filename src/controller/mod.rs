//! Dryer controller — owns the control state and both relays.
//!
//! Commands (profile, reset, manual overrides) and the periodic
//! [`evaluate`](DryerController::evaluate) are the only ways state changes.
//! Both must be called from the same tick context; nothing here locks.
//!
//! All decisions are in logical terms.  The NC fan inversion lives in the
//! relay driver, never here.

pub mod rules;
pub mod state;

use log::{error, info};

use crate::app::ports::RelayActuator;
use crate::error::{CommandError, SensorError};
use crate::profiles::{Profile, ProfileCatalog};

use rules::{Decision, Thresholds, TickInputs};
pub use state::{ControllerState, DryerMode};

pub struct DryerController<H: RelayActuator, F: RelayActuator> {
    state: ControllerState,
    catalog: ProfileCatalog,
    limits: Thresholds,
    heater: H,
    fan: F,
}

impl<H: RelayActuator, F: RelayActuator> DryerController<H, F> {
    /// Take ownership of both relays and drive them to the startup state:
    /// heater off, fan off, target 0 °C, timer disarmed.
    pub fn new(catalog: ProfileCatalog, limits: Thresholds, mut heater: H, mut fan: F) -> Self {
        heater.set_on(false);
        fan.set_on(false);
        Self {
            state: ControllerState::default(),
            catalog,
            limits,
            heater,
            fan,
        }
    }

    // ── Commands ──────────────────────────────────────────────

    /// Select a drying profile by material name (case-insensitive).
    ///
    /// On a hit: target and timer come from the profile, manual override is
    /// cleared, and heater and fan start immediately.  On a miss nothing
    /// changes.
    pub fn apply_profile(&mut self, name: &str, now_ms: u32) -> Result<&'static Profile, CommandError> {
        let profile = self
            .catalog
            .lookup(name)
            .ok_or(CommandError::UnknownMaterial)?;

        self.state.target_temperature_c = profile.temperature_c;
        self.state.timer.arm(profile.duration_ms, now_ms);
        self.state.manual_override = false;
        self.state.material = Some(profile.material);
        self.fan.set_on(true);
        self.heater.set_on(true);
        self.set_mode(DryerMode::Heating);

        info!(
            "Profile {}: target {}°C for {} min",
            profile.material,
            profile.temperature_c,
            profile.duration_ms / 60_000
        );
        Ok(profile)
    }

    /// Back to idle: override cleared, heater and fan off, timer at zero.
    /// The last target temperature is kept.
    pub fn reset(&mut self, now_ms: u32) {
        self.state.manual_override = false;
        self.heater.set_on(false);
        self.fan.set_on(false);
        self.state.timer.arm(0, now_ms);
        self.state.material = None;
        self.set_mode(DryerMode::Idle);
        info!("Reset: heater OFF, fan OFF, timer cleared");
    }

    /// Manual heater override.  The fan follows the heater, matching the
    /// automatic pairing (heating ⇒ circulating).
    pub fn set_manual_heater(&mut self, on: bool) {
        self.state.manual_override = true;
        self.heater.set_on(on);
        self.fan.set_on(on);
        self.set_mode(DryerMode::Manual);
        info!("Manual: heater {} fan {}", on_off(on), on_off(on));
    }

    /// Manual fan override.  The heater is left as it is.
    pub fn set_manual_fan(&mut self, on: bool) {
        self.state.manual_override = true;
        self.fan.set_on(on);
        self.set_mode(DryerMode::Manual);
        info!("Manual: fan {}", on_off(on));
    }

    // ── Periodic evaluation ───────────────────────────────────

    /// Run the control rules once.
    ///
    /// A NaN temperature is rejected before any rule runs; relays and state
    /// are left exactly as they were.  For a fixed `(temperature_c, now_ms)`
    /// a second call changes nothing.
    pub fn evaluate(&mut self, temperature_c: f32, now_ms: u32) -> Result<Decision, SensorError> {
        if temperature_c.is_nan() {
            return Err(SensorError::InvalidReading);
        }

        let inputs = TickInputs {
            temperature_c,
            target_c: self.state.target_temperature_c,
            manual_override: self.state.manual_override,
            heater_on: self.heater.is_on(),
            timer_elapsed: self.state.timer.is_elapsed(now_ms),
        };
        let decision = rules::decide(&inputs, &self.limits);

        if let Some(on) = decision.heater {
            self.heater.set_on(on);
        }
        if let Some(on) = decision.fan {
            self.fan.set_on(on);
        }
        if decision.drying_complete {
            info!("Drying complete: heater OFF");
        }
        self.set_mode(decision.mode);

        Ok(decision)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn mode(&self) -> DryerMode {
        self.state.mode
    }

    pub fn target_temperature_c(&self) -> u8 {
        self.state.target_temperature_c
    }

    pub fn manual_override(&self) -> bool {
        self.state.manual_override
    }

    pub fn remaining_ms(&self, now_ms: u32) -> u32 {
        self.state.timer.remaining(now_ms)
    }

    pub fn remaining_minutes(&self, now_ms: u32) -> u32 {
        self.state.timer.remaining_minutes(now_ms)
    }

    pub fn heater_on(&self) -> bool {
        self.heater.is_on()
    }

    /// Logical fan state: true = fan circulating, regardless of wiring.
    pub fn fan_on(&self) -> bool {
        self.fan.is_on()
    }

    pub fn heater(&self) -> &H {
        &self.heater
    }

    pub fn fan(&self) -> &F {
        &self.fan
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn thresholds(&self) -> Thresholds {
        self.limits
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_mode(&mut self, to: DryerMode) {
        let from = self.state.mode;
        if from == to {
            return;
        }
        match (from, to) {
            (_, DryerMode::SafetyShutdown) => {
                error!("MODE: {} -> {} (over-temperature)", from, to);
            }
            (DryerMode::SafetyShutdown, _) => {
                info!("MODE: {} -> {} (temperature back below ceiling)", from, to);
            }
            _ => info!("MODE: {} -> {}", from, to),
        }
        self.state.mode = to;
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
