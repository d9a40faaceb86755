//! Integration tests for the DryerService → controller → relays pipeline.
//!
//! Messages go in the way the broker delivers them (topic + raw payload)
//! and come out as events and relay coil levels.

use filadry::app::events::AppEvent;
use filadry::app::service::DryerService;
use filadry::config::DryerConfig;
use filadry::controller::DryerMode;
use filadry::error::{CommandError, SensorError};
use filadry::inbox::InboundMessage;
use filadry::profiles::{ProfileCatalog, hours_to_ms};

use crate::mock_hw::{MockRelay, RecordingSink, ScriptedSensor, reading, relays};

type Service = DryerService<MockRelay, MockRelay>;

fn make_service() -> (Service, RecordingSink) {
    let (heater, fan) = relays();
    let mut svc = DryerService::new(&DryerConfig::default(), ProfileCatalog::builtin(), heater, fan)
        .unwrap();
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, sink)
}

fn msg(topic: &str, payload: &str) -> InboundMessage {
    InboundMessage::new(topic, payload.as_bytes()).unwrap()
}

fn none() -> [InboundMessage; 0] {
    []
}

fn filament(payload: &str) -> InboundMessage {
    msg("cmnd/dryer/filament", payload)
}

fn last_telemetry(sink: &RecordingSink) -> &filadry::app::events::TelemetryData {
    sink.events
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t),
            _ => None,
        })
        .expect("no telemetry emitted")
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_reports_idle() {
    let (svc, sink) = make_service();
    assert_eq!(svc.mode(), DryerMode::Idle);
    assert!(matches!(sink.events[..], [AppEvent::Started(DryerMode::Idle)]));
}

// ── Profile selection ─────────────────────────────────────────

#[test]
fn profile_message_starts_heating_in_the_same_tick() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(45.0);

    svc.tick(&mut sensor, [filament("pla")], 0, &mut sink);

    assert_eq!(svc.mode(), DryerMode::Heating);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ProfileApplied {
                material: "PLA",
                target_c: 50,
                ..
            }
        )),
        1
    );
    let t = last_telemetry(&sink);
    assert_eq!(t.target_temperature, 50);
    assert_eq!(t.remaining_time, 240);
    assert!(t.heater_state);
    assert!(t.fan_state);
    assert_eq!(t.material, Some("PLA"));
    assert_eq!(t.current_temperature, Some(45.0));
}

#[test]
fn full_cycle_emits_completion_once() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(45.0);
    svc.tick(&mut sensor, [filament("PLA")], 0, &mut sink);

    sensor.set(51.0);
    svc.tick(&mut sensor, none(), 60_000, &mut sink);
    assert_eq!(svc.mode(), DryerMode::HoldingAtTarget);
    assert!(!svc.controller().heater_on());

    sensor.set(48.0);
    svc.tick(&mut sensor, none(), 120_000, &mut sink);
    assert!(svc.controller().heater_on());

    svc.tick(&mut sensor, none(), hours_to_ms(4), &mut sink);
    svc.tick(&mut sensor, none(), hours_to_ms(4) + 1_000, &mut sink);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::DryingComplete)), 1);
    assert_eq!(svc.mode(), DryerMode::Complete);
    assert!(!svc.controller().heater_on());
    assert!(svc.controller().fan_on());
    assert_eq!(last_telemetry(&sink).remaining_time, 0);
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_after_pla_turns_everything_off() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(45.0);
    svc.tick(&mut sensor, [filament("PLA")], 0, &mut sink);
    assert!(svc.controller().heater_on());

    svc.handle_message("cmnd/dryer/filament", b" RESET \n", 5_000, &mut sink)
        .unwrap();

    let c = svc.controller();
    assert!(!c.heater_on());
    assert!(!c.fan_on());
    assert!(!c.manual_override());
    assert_eq!(c.remaining_ms(5_000), 0);
    assert_eq!(c.mode(), DryerMode::Idle);
    assert_eq!(c.heater().pin().last(), Some(false));
    assert_eq!(c.fan().pin().last(), Some(true));
}

#[test]
fn tick_after_reset_follows_the_rules() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(45.0);
    svc.tick(&mut sensor, [filament("PLA")], 0, &mut sink);

    // The 50 °C target is kept and the timer reads zero: rule 5 asks for
    // heat, rule 6 cuts it again and the warm chamber keeps circulating.
    svc.tick(&mut sensor, [filament("RESET")], 5_000, &mut sink);
    assert_eq!(svc.mode(), DryerMode::Complete);
    assert!(!svc.controller().heater_on());
    assert!(svc.controller().fan_on());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DryingComplete)), 0);

    sensor.set(25.0);
    svc.tick(&mut sensor, none(), 6_000, &mut sink);
    assert_eq!(svc.mode(), DryerMode::Idle);
    assert!(!svc.controller().heater_on());
    assert!(!svc.controller().fan_on());
}

// ── Manual override ───────────────────────────────────────────

#[test]
fn manual_heater_holds_against_cold_reading() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(20.0);

    svc.tick(&mut sensor, [msg("cmnd/dryer/heater", "ON")], 0, &mut sink);
    svc.tick(&mut sensor, none(), 1_000, &mut sink);

    assert_eq!(svc.mode(), DryerMode::Manual);
    assert!(svc.controller().heater_on());
    assert!(svc.controller().fan_on());
}

#[test]
fn manual_fan_off_then_profile_clears_override() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(40.0);

    svc.tick(&mut sensor, [msg("cmnd/dryer/fan", "off")], 0, &mut sink);
    assert!(svc.controller().manual_override());

    svc.tick(&mut sensor, [filament("ABS")], 1_000, &mut sink);
    assert!(!svc.controller().manual_override());
    assert_eq!(svc.mode(), DryerMode::Heating);
}

// ── Rejections ────────────────────────────────────────────────

#[test]
fn rejected_messages_change_nothing() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(25.0);
    svc.tick(&mut sensor, none(), 0, &mut sink);
    let before = *svc.controller().state();

    svc.tick(
        &mut sensor,
        [
            filament("unobtainium"),
            filament(""),
            msg("cmnd/dryer/heater", "maybe"),
            msg("cmnd/other", "ON"),
            InboundMessage::new("cmnd/dryer/fan", &[0xff, 0xfe]).unwrap(),
        ],
        1_000,
        &mut sink,
    );

    assert_eq!(*svc.controller().state(), before);
    let rejected: Vec<CommandError> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandRejected(err) => Some(*err),
            _ => None,
        })
        .collect();
    assert_eq!(
        rejected,
        [
            CommandError::UnknownMaterial,
            CommandError::InvalidPayload,
            CommandError::InvalidPayload,
            CommandError::UnknownTopic,
            CommandError::InvalidPayload,
        ]
    );
}

// ── Safety ────────────────────────────────────────────────────

#[test]
fn over_temperature_shuts_down_once_and_recovers() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(45.0);
    svc.tick(&mut sensor, [filament("NYLON")], 0, &mut sink);

    sensor.set(82.0);
    svc.tick(&mut sensor, none(), 1_000, &mut sink);
    svc.tick(&mut sensor, none(), 2_000, &mut sink);

    assert_eq!(svc.mode(), DryerMode::SafetyShutdown);
    assert!(!svc.controller().heater_on());
    assert!(svc.controller().fan_on());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SafetyShutdown { .. })),
        1
    );

    // A manual heater command is overruled within the same tick.
    svc.tick(&mut sensor, [msg("cmnd/dryer/heater", "ON")], 3_000, &mut sink);
    assert_eq!(svc.mode(), DryerMode::SafetyShutdown);
    assert!(!svc.controller().heater_on());

    sensor.set(60.0);
    svc.tick(&mut sensor, none(), 4_000, &mut sink);
    assert_eq!(svc.mode(), DryerMode::Manual);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn sensor_fault_skips_control_but_keeps_reporting() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(45.0)
        .then(Ok(reading(45.0)))
        .then(Err(SensorError::Timeout));

    svc.tick(&mut sensor, [filament("PLA")], 0, &mut sink);
    let modes_before = sink.count(|e| matches!(e, AppEvent::ModeChanged { .. }));

    // No fresh reading: no evaluation, so no mode change.
    svc.tick(&mut sensor, none(), 1_000, &mut sink);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SensorFault(SensorError::Timeout))),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ModeChanged { .. })),
        modes_before
    );
    assert_eq!(last_telemetry(&sink).current_temperature, Some(45.0));
    assert_eq!(svc.tick_count(), 2);
}

#[test]
fn telemetry_is_null_until_first_reading() {
    let (mut svc, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(30.0).then(Err(SensorError::ChecksumMismatch));
    svc.tick(&mut sensor, none(), 0, &mut sink);

    let t = last_telemetry(&sink);
    assert_eq!(t.current_temperature, None);
    assert_eq!(t.humidity, None);

    let json = serde_json::to_value(t).unwrap();
    assert!(json["currentTemperature"].is_null());
}
