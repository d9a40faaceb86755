//! Sensor subsystem — the DHT22 driver and the [`SensorHub`] that wraps it.
//!
//! The hub turns raw driver results into what the control loop wants: a
//! fresh reading or an error, with failure streaks counted and logged so a
//! flaky sensor is visible without flooding the console.

pub mod dht;

pub use dht::ClimateReading;

use log::{error, info, warn};

use crate::error::SensorError;
use dht::DhtSensor;

pub struct SensorHub {
    pub dht: DhtSensor,
    consecutive_failures: u32,
    warn_threshold: u32,
}

impl SensorHub {
    /// `warn_threshold` consecutive failures raise one error-level log.
    pub fn new(dht: DhtSensor, warn_threshold: u32) -> Self {
        Self {
            dht,
            consecutive_failures: 0,
            warn_threshold,
        }
    }

    /// Read the climate sensor once.
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let result = self.dht.read();
        self.record(result)
    }

    /// Failures in a row since the last good reading.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn record(
        &mut self,
        result: Result<ClimateReading, SensorError>,
    ) -> Result<ClimateReading, SensorError> {
        match result {
            Ok(reading) => {
                if self.consecutive_failures >= self.warn_threshold {
                    info!(
                        "DHT recovered after {} failed reads",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                warn!("DHT read failed: {}", e);
                if self.consecutive_failures == self.warn_threshold {
                    error!(
                        "DHT: {} consecutive failures, controller holding last decision",
                        self.consecutive_failures
                    );
                }
            }
        }
        result
    }
}
