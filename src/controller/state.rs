//! Controller mode and owned state.

use core::fmt;

use serde::Serialize;

use crate::timer::DryCycleTimer;

/// What the controller is doing this tick.
///
/// ```text
///                 applyProfile
///   ┌──────┐ ──────────────────▶ ┌─────────┐  temp ≥ target  ┌─────────────────┐
///   │ Idle │                     │ Heating │ ──────────────▶ │ HoldingAtTarget │
///   └──────┘ ◀─── reset ──────── └─────────┘ ◀────────────── └─────────────────┘
///       ▲                             │ timer elapsed
///       │         temp < cut-off      ▼
///       └──────────────────────── Complete
///
///   any ── temp ≥ ceiling ──▶ SafetyShutdown      any ── override ──▶ Manual
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DryerMode {
    /// No heat, fan stopped.
    Idle,
    /// Heater and fan on, working toward target.
    Heating,
    /// Target reached; heater off, fan circulating.
    HoldingAtTarget,
    /// Timer elapsed; heater held off, fan circulating until the chamber
    /// cools below the fan cut-off.
    Complete,
    /// Operator override; automatic rules suspended.
    Manual,
    /// Over-temperature; heater forced off, fan forced on.
    SafetyShutdown,
}

impl DryerMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Heating => "Heating",
            Self::HoldingAtTarget => "HoldingAtTarget",
            Self::Complete => "Complete",
            Self::Manual => "Manual",
            Self::SafetyShutdown => "SafetyShutdown",
        }
    }
}

impl fmt::Display for DryerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the controller owns apart from its two relays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub target_temperature_c: u8,
    pub timer: DryCycleTimer,
    pub manual_override: bool,
    pub mode: DryerMode,
    /// Material of the last applied profile, cleared by reset.
    pub material: Option<&'static str>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            target_temperature_c: 0,
            timer: DryCycleTimer::new(),
            manual_override: false,
            mode: DryerMode::Idle,
            material: None,
        }
    }
}
