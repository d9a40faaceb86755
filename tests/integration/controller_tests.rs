//! Controller scenarios driven through the real relay driver.
//!
//! Assertions are made on both the logical relay state and the coil level
//! the pin actually saw, so the NC fan inversion is covered end to end.

use filadry::app::ports::RelayActuator;
use filadry::controller::rules::Thresholds;
use filadry::controller::{DryerController, DryerMode};
use filadry::error::{CommandError, SensorError};
use filadry::profiles::{ProfileCatalog, hours_to_ms};

use crate::mock_hw::{MockRelay, relays};

fn controller() -> DryerController<MockRelay, MockRelay> {
    let (heater, fan) = relays();
    DryerController::new(ProfileCatalog::builtin(), Thresholds::default(), heater, fan)
}

#[test]
fn startup_leaves_both_devices_off() {
    let c = controller();
    assert_eq!(c.mode(), DryerMode::Idle);
    assert!(!c.heater_on());
    assert!(!c.fan_on());
    // NO heater: coil low.  NC fan: coil high to hold the fan off.
    assert_eq!(c.heater().pin().last(), Some(false));
    assert_eq!(c.fan().pin().last(), Some(true));
    assert_eq!(c.remaining_ms(0), 0);
}

#[test]
fn pla_cycle_heats_holds_and_completes() {
    let mut c = controller();
    let t0 = 1_000;
    c.apply_profile("PLA", t0).unwrap();
    assert_eq!(c.target_temperature_c(), 50);
    assert_eq!(c.remaining_ms(t0), hours_to_ms(4));
    assert!(c.heater_on());
    assert!(c.fan_on(), "a profile starts circulation with the heater");

    let d = c.evaluate(45.0, t0 + 1_000).unwrap();
    assert_eq!(d.mode, DryerMode::Heating);
    assert!(c.heater_on() && c.fan_on());
    assert_eq!(c.fan().pin().last(), Some(false), "NC fan runs with coil off");

    let d = c.evaluate(51.0, t0 + 2_000).unwrap();
    assert_eq!(d.mode, DryerMode::HoldingAtTarget);
    assert!(!c.heater_on());
    assert!(c.fan_on());

    c.evaluate(45.0, t0 + 3_000).unwrap();
    assert!(c.heater_on());

    let d = c.evaluate(45.0, t0 + hours_to_ms(4)).unwrap();
    assert!(d.drying_complete);
    assert_eq!(d.mode, DryerMode::Complete);
    assert!(!c.heater_on());
    assert!(c.fan_on(), "fan keeps running while still warm");
    assert_eq!(c.remaining_ms(t0 + hours_to_ms(5)), 0);

    // Once complete the heater stays off even below target.
    let d = c.evaluate(40.0, t0 + hours_to_ms(5)).unwrap();
    assert!(!c.heater_on());
    assert!(!d.drying_complete);
}

#[test]
fn completion_below_cutoff_stops_fan() {
    let mut c = controller();
    c.apply_profile("TestFilament", 0).unwrap();
    c.evaluate(25.0, 1_000).unwrap();
    let d = c.evaluate(25.0, 10_000).unwrap();
    assert!(d.drying_complete);
    assert_eq!(d.mode, DryerMode::Idle);
    assert!(!c.heater_on());
    assert!(!c.fan_on());
}

#[test]
fn every_profile_applies_in_any_case() {
    for p in ProfileCatalog::builtin().iter() {
        for name in [
            p.material.to_string(),
            p.material.to_ascii_lowercase(),
            p.material.to_ascii_uppercase(),
        ] {
            let mut c = controller();
            c.set_manual_fan(true);
            let got = c.apply_profile(&name, 500).unwrap();
            assert_eq!(got.material, p.material);
            assert_eq!(c.target_temperature_c(), p.temperature_c);
            assert_eq!(c.state().timer.duration_ms(), p.duration_ms);
            assert!(!c.manual_override());
            assert_eq!(c.state().material, Some(p.material));
        }
    }
}

#[test]
fn unknown_material_changes_nothing() {
    let mut c = controller();
    c.apply_profile("ABS", 0).unwrap();
    c.set_manual_heater(true);
    let before = *c.state();

    assert_eq!(
        c.apply_profile("unknown-xyz", 5_000),
        Err(CommandError::UnknownMaterial)
    );
    assert_eq!(*c.state(), before);
    assert!(c.heater_on());
}

#[test]
fn reset_after_profile_turns_everything_off() {
    let mut c = controller();
    c.apply_profile("PLA", 0).unwrap();
    c.evaluate(45.0, 1_000).unwrap();

    c.reset(2_000);
    assert!(!c.heater_on());
    assert!(!c.fan_on());
    assert!(!c.manual_override());
    assert_eq!(c.remaining_ms(2_000), 0);
    assert_eq!(c.mode(), DryerMode::Idle);
    assert_eq!(c.state().material, None);
    assert_eq!(c.heater().pin().last(), Some(false));
    assert_eq!(c.fan().pin().last(), Some(true));
}

#[test]
fn manual_heater_survives_cold_reading() {
    let mut c = controller();
    c.set_manual_heater(true);
    let d = c.evaluate(20.0, 1_000).unwrap();
    assert_eq!(d.mode, DryerMode::Manual);
    assert!(c.heater_on());
    assert!(c.fan_on());
}

#[test]
fn manual_fan_leaves_heater_alone() {
    let mut c = controller();
    c.apply_profile("PETG", 0).unwrap();
    c.set_manual_fan(false);
    assert!(c.manual_override());
    assert!(c.heater_on());
    assert!(!c.fan_on());
}

#[test]
fn over_temperature_beats_manual_override() {
    let mut c = controller();
    c.set_manual_heater(true);
    c.set_manual_fan(false);

    let d = c.evaluate(80.0, 1_000).unwrap();
    assert_eq!(d.mode, DryerMode::SafetyShutdown);
    assert!(!c.heater_on());
    assert!(c.fan_on());
    assert!(c.manual_override(), "safety does not clear the override");

    // No latch: the next cool reading hands control back to manual.
    let d = c.evaluate(60.0, 2_000).unwrap();
    assert_eq!(d.mode, DryerMode::Manual);
    assert!(!c.heater_on());
    assert!(c.fan_on());
}

#[test]
fn nan_reading_is_rejected_without_side_effects() {
    let mut c = controller();
    c.apply_profile("PLA", 0).unwrap();
    c.evaluate(45.0, 1_000).unwrap();
    let before = *c.state();
    let writes = c.heater().pin().levels.len();

    assert_eq!(c.evaluate(f32::NAN, 2_000), Err(SensorError::InvalidReading));
    assert_eq!(*c.state(), before);
    assert_eq!(c.heater().pin().levels.len(), writes);
}

#[test]
fn evaluate_is_idempotent() {
    let mut c = controller();
    c.apply_profile("NYLON", 0).unwrap();
    for temp in [20.0, 45.0, 70.0, 85.0] {
        let first = c.evaluate(temp, 60_000).unwrap();
        let state = *c.state();
        let outputs = (c.heater().is_on(), c.fan().is_on());

        let second = c.evaluate(temp, 60_000).unwrap();
        assert_eq!(first.mode, second.mode);
        assert_eq!(*c.state(), state);
        assert_eq!((c.heater().is_on(), c.fan().is_on()), outputs);
    }
}

#[test]
fn timer_survives_clock_rollover() {
    let mut c = controller();
    let t0 = u32::MAX - 5_000;
    c.apply_profile("TestFilament", t0).unwrap();
    assert_eq!(c.remaining_ms(t0.wrapping_add(6_000)), 4_000);
    c.evaluate(35.0, t0.wrapping_add(6_000)).unwrap();
    assert!(c.heater_on());
    let d = c.evaluate(35.0, t0.wrapping_add(10_000)).unwrap();
    assert!(d.drying_complete);
}
