//! Mock hardware for integration tests.
//!
//! Relays are the real [`Relay`] driver over a [`MockPin`] that records
//! every level written, so tests see exactly what the coil saw.

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use filadry::app::events::AppEvent;
use filadry::app::ports::{EventSink, SensorPort};
use filadry::drivers::relay::{Relay, Wiring};
use filadry::error::SensorError;
use filadry::sensors::ClimateReading;

// ── Output pin ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockPin {
    /// Every level written, oldest first.  `true` = coil energised.
    pub levels: Vec<bool>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn last(&self) -> Option<bool> {
        self.levels.last().copied()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

pub type MockRelay = Relay<MockPin>;

/// Heater on a normally-open relay, fan on a normally-closed one.
pub fn relays() -> (MockRelay, MockRelay) {
    (
        Relay::new(MockPin::default(), Wiring::NormallyOpen, "heater"),
        Relay::new(MockPin::default(), Wiring::NormallyClosed, "fan"),
    )
}

// ── Sensor ────────────────────────────────────────────────────

/// Replays queued results, then repeats the last good reading.
pub struct ScriptedSensor {
    script: VecDeque<Result<ClimateReading, SensorError>>,
    last: ClimateReading,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn steady(temperature_c: f32) -> Self {
        Self {
            script: VecDeque::new(),
            last: reading(temperature_c),
        }
    }

    pub fn set(&mut self, temperature_c: f32) {
        self.last = reading(temperature_c);
    }

    pub fn then(mut self, result: Result<ClimateReading, SensorError>) -> Self {
        self.script.push_back(result);
        self
    }
}

impl SensorPort for ScriptedSensor {
    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        match self.script.pop_front() {
            Some(Ok(r)) => {
                self.last = r;
                Ok(r)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last),
        }
    }
}

pub fn reading(temperature_c: f32) -> ClimateReading {
    ClimateReading {
        temperature_c,
        humidity_pct: 20.0,
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
