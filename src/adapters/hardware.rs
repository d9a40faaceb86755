//! Hardware adapter — bridges the climate sensor to the domain.
//!
//! Owns the [`SensorHub`] and exposes it through [`SensorPort`].  The relays
//! are handed straight to the controller, which owns them exclusively.  On
//! non-espidf targets the underlying driver uses cfg-gated simulation stubs.

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::sensors::{ClimateReading, SensorHub};

pub struct HardwareAdapter {
    sensor_hub: SensorHub,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub) -> Self {
        Self { sensor_hub }
    }

    pub fn sensor_hub(&self) -> &SensorHub {
        &self.sensor_hub
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        self.sensor_hub.read()
    }
}
