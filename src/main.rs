//! Filadry Firmware — Main Entry Point
//!
//! Wires the hexagonal core to the ESP32 and runs the fixed-cadence
//! control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   MqttTelemetrySink  Esp32Clock│
//! │  (SensorPort)      (EventSink)    (EventSink+Bus)    (Clock)   │
//! │  Relay<GpioOutput> ×2             LinkSupervisor               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DryerService (pure logic)                   │    │
//! │  │  Router · Controller · Profiles · Timer                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{error, info, warn};

use filadry::adapters::hardware::HardwareAdapter;
use filadry::adapters::link::{LinkAction, LinkSupervisor};
use filadry::adapters::log_sink::LogEventSink;
use filadry::adapters::mqtt::{EspMqttBus, MqttTelemetrySink};
use filadry::adapters::time::Esp32Clock;
use filadry::app::ports::{ClockPort, MessageBus};
use filadry::app::service::DryerService;
use filadry::config::{DryerConfig, NetworkConfig};
use filadry::drivers::hw_init::{self, GpioOutput};
use filadry::drivers::relay::{Relay, Wiring};
use filadry::inbox;
use filadry::pins;
use filadry::profiles::ProfileCatalog;
use filadry::sensors::SensorHub;
use filadry::sensors::dht::DhtSensor;

const MQTT_CLIENT_ID: &str = "filadry";
const WIFI_CONNECT_ATTEMPTS: u32 = 3;
const WIFI_RETRY_DELAY_MS: u32 = 2_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Filadry v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Relays de-energised before anything else ───────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}, halting", e);
        loop {
            FreeRtos::delay_ms(1_000);
        }
    }

    // ── 3. Core service ───────────────────────────────────────
    let config = DryerConfig::default();
    let heater = Relay::new(
        GpioOutput::new(pins::HEATER_RELAY_GPIO),
        Wiring::NormallyOpen,
        "heater",
    );
    let fan = Relay::new(
        GpioOutput::new(pins::FAN_RELAY_GPIO),
        Wiring::NormallyClosed,
        "fan",
    );
    let mut service = DryerService::new(&config, ProfileCatalog::builtin(), heater, fan)
        .map_err(|e| anyhow!("configuration rejected: {}", e))?;

    let mut hw = HardwareAdapter::new(SensorHub::new(
        DhtSensor::new(pins::DHT_DATA_GPIO, config.sensor_offset_c),
        config.sensor_failure_warn_threshold,
    ));
    let clock = Esp32Clock::new();

    // ── 4. Network ────────────────────────────────────────────
    let net = NetworkConfig::from_build_env();
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let mut wifi = if net.wifi_ssid.is_empty() {
        warn!("WiFi: no credentials built in, running offline");
        None
    } else {
        match start_wifi(peripherals.modem, sys_loop, nvs_partition, &net) {
            Ok(mut w) => {
                if let Err(e) = connect_station(&mut w) {
                    warn!("WiFi: {:#}, will retry with the broker link", e);
                }
                Some(w)
            }
            Err(e) => {
                warn!("WiFi: start failed ({:#}), running offline", e);
                None
            }
        }
    };

    let bus = EspMqttBus::new(net, MQTT_CLIENT_ID);
    let mut sinks = (
        LogEventSink::new(),
        MqttTelemetrySink::new(bus, config.topics.telemetry.clone()),
    );
    let mut link = LinkSupervisor::new(config.broker_retry_secs, clock.now_ms());

    service.start(&mut sinks);
    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        FreeRtos::delay_ms(config.control_loop_interval_ms);
        let now_ms = clock.now_ms();

        match link.poll(sinks.1.bus().is_connected(), now_ms) {
            LinkAction::Reconnect => {
                if let Some(w) = wifi.as_mut() {
                    if !w.is_connected().unwrap_or(false) {
                        if let Err(e) = connect_station(w) {
                            warn!("WiFi: {:#}", e);
                        }
                    }
                    if let Err(e) = sinks.1.bus_mut().reconnect() {
                        warn!("MQTT: restart failed: {}", e);
                    }
                }
            }
            LinkAction::Resubscribe => {
                if let Err(e) = sinks.1.subscribe_all(&service.router().command_topics()) {
                    warn!("MQTT: subscribe failed: {}", e);
                }
            }
            LinkAction::None => {}
        }

        service.tick(&mut hw, inbox::drain_inbound(), now_ms, &mut sinks);
    }
}

fn start_wifi(
    modem: Modem,
    sys_loop: EspSystemEventLoop,
    nvs_partition: EspDefaultNvsPartition,
    net: &NetworkConfig,
) -> Result<BlockingWifi<EspWifi<'static>>> {
    let esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs_partition))?;
    let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;

    let auth_method = if net.wifi_password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPAWPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: net
            .wifi_ssid
            .try_into()
            .map_err(|_| anyhow!("wifi ssid too long"))?,
        password: net
            .wifi_password
            .try_into()
            .map_err(|_| anyhow!("wifi password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("WiFi: started, ssid `{}`", net.wifi_ssid);
    Ok(wifi)
}

fn connect_station(wifi: &mut BlockingWifi<EspWifi<'static>>) -> Result<()> {
    let mut last_err = None;
    for attempt in 1..=WIFI_CONNECT_ATTEMPTS {
        match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
            Ok(()) => {
                info!("WiFi: connected on attempt {}", attempt);
                return Ok(());
            }
            Err(e) => {
                warn!("WiFi: attempt {}/{} failed: {}", attempt, WIFI_CONNECT_ATTEMPTS, e);
                last_err = Some(e);
            }
        }
        if attempt < WIFI_CONNECT_ATTEMPTS {
            let _ = wifi.disconnect();
            FreeRtos::delay_ms(WIFI_RETRY_DELAY_MS);
        }
    }
    Err(match last_err {
        Some(e) => anyhow!("connect failed: {}", e),
        None => anyhow!("connect failed"),
    })
}
