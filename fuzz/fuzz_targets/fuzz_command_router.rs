//! Fuzz target: `CommandRouter::route` and `DryerService::handle_message`
//!
//! The first byte picks a topic, the rest is the payload.  Routing must
//! never panic, and a rejected message must leave the relays untouched.
//!
//! cargo fuzz run fuzz_command_router

#![no_main]

use filadry::app::events::AppEvent;
use filadry::app::ports::{EventSink, RelayActuator};
use filadry::app::service::DryerService;
use filadry::config::DryerConfig;
use filadry::profiles::ProfileCatalog;
use libfuzzer_sys::fuzz_target;

const TOPICS: [&str; 4] = [
    "cmnd/dryer/filament",
    "cmnd/dryer/heater",
    "cmnd/dryer/fan",
    "tele/dryer/state",
];

#[derive(Default)]
struct Flag(bool);

impl RelayActuator for Flag {
    fn set_on(&mut self, on: bool) {
        self.0 = on;
    }
    fn is_on(&self) -> bool {
        self.0
    }
    fn is_energized(&self) -> bool {
        self.0
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&sel, payload)) = data.split_first() else {
        return;
    };
    let topic = TOPICS[usize::from(sel) % TOPICS.len()];

    let Ok(mut svc) = DryerService::new(
        &DryerConfig::default(),
        ProfileCatalog::builtin(),
        Flag::default(),
        Flag::default(),
    ) else {
        return;
    };

    let before = *svc.controller().state();
    if svc.handle_message(topic, payload, 0, &mut Discard).is_err() {
        assert_eq!(*svc.controller().state(), before);
        assert!(!svc.controller().heater_on());
        assert!(!svc.controller().fan_on());
    }
});
