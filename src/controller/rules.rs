//! Priority-ordered control rules.
//!
//! [`decide`] is a pure function of one tick's inputs.  It returns what to
//! change; the controller applies it.  Priority, highest first:
//!
//! ```text
//!   1  temp ≥ ceiling               → SafetyShutdown   heater off, fan on
//!   2  manual override              → Manual           no change
//!   3  temp < cut-off, heater off   → Idle             fan off
//!   4  temp ≥ target                → HoldingAtTarget  heater off, fan on
//!   5  temp < target                → Heating          heater on,  fan on
//!   6  after 3–5: timer elapsed and heater on
//!                                   → heater off; below cut-off also fan off
//! ```
//!
//! Only one of 3–5 fires per tick.  Rule 6 is the single place the drying
//! timer and the fan cut-off interact.

use super::state::DryerMode;
use crate::config::DryerConfig;

/// Temperature thresholds, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub safety_ceiling_c: f32,
    pub fan_cutoff_c: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&DryerConfig::default())
    }
}

impl From<&DryerConfig> for Thresholds {
    fn from(c: &DryerConfig) -> Self {
        Self {
            safety_ceiling_c: c.safety_ceiling_c,
            fan_cutoff_c: c.fan_cutoff_c,
        }
    }
}

/// One tick's view of the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInputs {
    pub temperature_c: f32,
    pub target_c: u8,
    pub manual_override: bool,
    pub heater_on: bool,
    pub timer_elapsed: bool,
}

/// What the tick decided.  `None` leaves that relay untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub mode: DryerMode,
    pub heater: Option<bool>,
    pub fan: Option<bool>,
    /// The heater was running and the timer cut it this tick.
    pub drying_complete: bool,
}

pub fn decide(inputs: &TickInputs, limits: &Thresholds) -> Decision {
    let temp = inputs.temperature_c;

    // 1
    if temp >= limits.safety_ceiling_c {
        return Decision {
            mode: DryerMode::SafetyShutdown,
            heater: Some(false),
            fan: Some(true),
            drying_complete: false,
        };
    }

    // 2
    if inputs.manual_override {
        return Decision {
            mode: DryerMode::Manual,
            heater: None,
            fan: None,
            drying_complete: false,
        };
    }

    // 3–5
    let mut d = if temp < limits.fan_cutoff_c && !inputs.heater_on {
        Decision {
            mode: DryerMode::Idle,
            heater: None,
            fan: Some(false),
            drying_complete: false,
        }
    } else if temp >= f32::from(inputs.target_c) {
        Decision {
            mode: DryerMode::HoldingAtTarget,
            heater: Some(false),
            fan: Some(true),
            drying_complete: false,
        }
    } else {
        Decision {
            mode: DryerMode::Heating,
            heater: Some(true),
            fan: Some(true),
            drying_complete: false,
        }
    };

    // 6
    let heater_after = d.heater.unwrap_or(inputs.heater_on);
    if inputs.timer_elapsed && heater_after {
        d.heater = Some(false);
        d.drying_complete = inputs.heater_on;
        if temp < limits.fan_cutoff_c {
            d.fan = Some(false);
            d.mode = DryerMode::Idle;
        } else {
            d.mode = DryerMode::Complete;
        }
    }

    d
}
