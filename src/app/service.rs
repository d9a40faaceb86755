//! Application service — the hexagonal core.
//!
//! [`DryerService`] owns the controller, the command router and the last
//! good sensor reading.  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │      DryerService      │
//!  (topic, msg) ─▶│ Router · Controller    │ ──▶ RelayActuator ×2
//!                 └────────────────────────┘
//! ```
//!
//! One tick, always in this order:
//!
//! 1. [`refresh_sensors`](DryerService::refresh_sensors)
//! 2. [`handle_message`](DryerService::handle_message) for each queued message
//! 3. [`control`](DryerService::control)
//! 4. [`report`](DryerService::report)

use log::{debug, info, warn};

use crate::config::DryerConfig;
use crate::controller::rules::Thresholds;
use crate::controller::{DryerController, DryerMode};
use crate::error::{CommandError, ConfigError};
use crate::inbox::InboundMessage;
use crate::profiles::ProfileCatalog;
use crate::sensors::ClimateReading;

use super::commands::{CommandRouter, DryerCommand};
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, RelayActuator, SensorPort};

// ───────────────────────────────────────────────────────────────
// DryerService
// ───────────────────────────────────────────────────────────────

pub struct DryerService<H: RelayActuator, F: RelayActuator> {
    controller: DryerController<H, F>,
    router: CommandRouter,
    telemetry_every_ticks: u32,
    /// Last good reading; `None` until the sensor first answers.
    reading: Option<ClimateReading>,
    /// Whether `reading` came from this tick's refresh.
    fresh: bool,
    tick_count: u64,
}

impl<H: RelayActuator, F: RelayActuator> DryerService<H, F> {
    /// Validate `config` and build the service.  The relays are driven to
    /// their startup state (both off) immediately.
    pub fn new(
        config: &DryerConfig,
        catalog: ProfileCatalog,
        heater: H,
        fan: F,
    ) -> Result<Self, ConfigError> {
        config.validate(&catalog)?;
        Ok(Self {
            controller: DryerController::new(catalog, Thresholds::from(config), heater, fan),
            router: CommandRouter::new(config.topics.clone()),
            telemetry_every_ticks: config.telemetry_every_ticks,
            reading: None,
            fresh: false,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let mode = self.controller.mode();
        sink.emit(&AppEvent::Started(mode));
        info!("DryerService started in {}", mode);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full tick with the messages that arrived since the last one.
    pub fn tick(
        &mut self,
        sensors: &mut impl SensorPort,
        inbound: impl IntoIterator<Item = InboundMessage>,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) {
        self.refresh_sensors(sensors, sink);
        for msg in inbound {
            if self
                .handle_message(msg.topic.as_str(), &msg.payload, now_ms, sink)
                .is_err()
            {
                debug!("tick: message on {} ignored", msg.topic);
            }
        }
        self.control(now_ms, sink);
        self.report(now_ms, sink);
    }

    /// Step 1: take a reading.  On failure the previous reading is kept for
    /// telemetry but this tick's [`control`](Self::control) will not act.
    pub fn refresh_sensors(&mut self, sensors: &mut impl SensorPort, sink: &mut impl EventSink) {
        match sensors.read() {
            Ok(reading) => {
                self.reading = Some(reading);
                self.fresh = true;
            }
            Err(e) => {
                self.fresh = false;
                sink.emit(&AppEvent::SensorFault(e));
            }
        }
    }

    /// Step 3: evaluate the control rules against this tick's reading.
    ///
    /// Returns the mode after evaluation, or `None` when there was no fresh
    /// reading and nothing was evaluated.
    pub fn control(&mut self, now_ms: u32, sink: &mut impl EventSink) -> Option<DryerMode> {
        if !self.fresh {
            return None;
        }
        self.fresh = false;
        let temperature_c = self.reading?.temperature_c;

        let from = self.controller.mode();
        match self.controller.evaluate(temperature_c, now_ms) {
            Ok(decision) => {
                if decision.drying_complete {
                    sink.emit(&AppEvent::DryingComplete);
                }
                if decision.mode == DryerMode::SafetyShutdown && from != DryerMode::SafetyShutdown {
                    sink.emit(&AppEvent::SafetyShutdown { temperature_c });
                }
                emit_mode_change(from, decision.mode, sink);
                Some(decision.mode)
            }
            Err(e) => {
                warn!("Control skipped: {}", e);
                sink.emit(&AppEvent::SensorFault(e));
                None
            }
        }
    }

    /// Step 4: publish telemetry every `telemetry_every_ticks` ticks.
    pub fn report(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.tick_count += 1;
        if self.tick_count % u64::from(self.telemetry_every_ticks) == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(now_ms)));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Decode and apply one broker message.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Result<(), CommandError> {
        let result = match self.router.route(topic, payload) {
            Ok(cmd) => self.handle_command(cmd, now_ms, sink),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Rejected message on {}: {}", topic, e);
            sink.emit(&AppEvent::CommandRejected(e));
        }
        result
    }

    /// Apply an already-decoded command.  A rejected command changes nothing.
    pub fn handle_command(
        &mut self,
        cmd: DryerCommand,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Result<(), CommandError> {
        let from = self.controller.mode();
        match cmd {
            DryerCommand::SelectProfile(name) => {
                let p = self.controller.apply_profile(name.as_str(), now_ms)?;
                sink.emit(&AppEvent::ProfileApplied {
                    material: p.material,
                    target_c: p.temperature_c,
                    duration_ms: p.duration_ms,
                });
            }
            DryerCommand::Reset => self.controller.reset(now_ms),
            DryerCommand::Heater(on) => self.controller.set_manual_heater(on),
            DryerCommand::Fan(on) => self.controller.set_manual_fan(on),
        }
        emit_mode_change(from, self.controller.mode(), sink);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self, now_ms: u32) -> TelemetryData {
        let state = self.controller.state();
        TelemetryData {
            humidity: self.reading.map(|r| r.humidity_pct),
            current_temperature: self.reading.map(|r| r.temperature_c),
            target_temperature: state.target_temperature_c,
            remaining_time: self.controller.remaining_minutes(now_ms),
            heater_state: self.controller.heater_on(),
            fan_state: self.controller.fan_on(),
            mode: state.mode,
            material: state.material,
        }
    }

    pub fn controller(&self) -> &DryerController<H, F> {
        &self.controller
    }

    pub fn mode(&self) -> DryerMode {
        self.controller.mode()
    }

    pub fn last_reading(&self) -> Option<ClimateReading> {
        self.reading
    }

    /// Ticks reported since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }
}

fn emit_mode_change(from: DryerMode, to: DryerMode, sink: &mut impl EventSink) {
    if from != to {
        sink.emit(&AppEvent::ModeChanged { from, to });
    }
}
