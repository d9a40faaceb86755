//! MQTT adapter.
//!
//! Two halves:
//!
//! - [`MqttTelemetrySink`] implements [`EventSink`]: telemetry events are
//!   serialised to JSON and published on the telemetry topic.  Generic over
//!   [`MessageBus`] so it is testable on the host.
//! - `EspMqttBus` (ESP-IDF only) implements [`MessageBus`] over the
//!   ESP-IDF MQTT client and feeds received messages into the
//!   [`inbox`](crate::inbox).
//!
//! Publishing is fire-and-forget.  While the link is down telemetry is
//! simply skipped; the next tick publishes a fresh snapshot.

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::{BusError, EventSink, MessageBus};
use crate::config::Topic;

pub struct MqttTelemetrySink<B: MessageBus> {
    bus: B,
    topic: Topic,
    published: u32,
}

impl<B: MessageBus> MqttTelemetrySink<B> {
    pub fn new(bus: B, topic: Topic) -> Self {
        Self {
            bus,
            topic,
            published: 0,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Telemetry messages accepted by the bus since startup.
    pub fn published(&self) -> u32 {
        self.published
    }

    /// Subscribe to each topic, stopping at the first failure.
    pub fn subscribe_all(&mut self, topics: &[&str]) -> Result<(), BusError> {
        for topic in topics {
            self.bus.subscribe(topic)?;
        }
        Ok(())
    }
}

impl<B: MessageBus> EventSink for MqttTelemetrySink<B> {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Telemetry(t) = event else {
            return;
        };
        if !self.bus.is_connected() {
            return;
        }
        let payload = match serde_json::to_vec(t) {
            Ok(p) => p,
            Err(e) => {
                warn!("MQTT: telemetry encode failed: {}", e);
                return;
            }
        };
        match self.bus.publish(self.topic.as_str(), &payload) {
            Ok(()) => self.published = self.published.wrapping_add(1),
            Err(e) => warn!("MQTT: publish to {} failed: {}", self.topic, e),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspMqttBus;

#[cfg(target_os = "espidf")]
mod esp {
    use core::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };
    use esp_idf_svc::sys::EspError;
    use log::{info, warn};

    use crate::app::ports::{BusError, MessageBus};
    use crate::config::NetworkConfig;
    use crate::inbox;

    /// Written from the MQTT task's callback, read by the control loop.
    static CONNECTED: AtomicBool = AtomicBool::new(false);

    pub struct EspMqttBus {
        client: Option<EspMqttClient<'static>>,
        net: NetworkConfig,
        client_id: &'static str,
    }

    impl EspMqttBus {
        /// Start a client.  The connection completes asynchronously; watch
        /// [`MessageBus::is_connected`].  If the client cannot even be
        /// created the bus starts without one and waits for
        /// [`reconnect`](Self::reconnect).
        pub fn new(net: NetworkConfig, client_id: &'static str) -> Self {
            let mut bus = Self {
                client: None,
                net,
                client_id,
            };
            if let Err(e) = bus.reconnect() {
                warn!("MQTT: client start failed: {}", e);
            }
            bus
        }

        /// Drop the current client, if any, and start a new one.
        pub fn reconnect(&mut self) -> Result<(), EspError> {
            self.client = None;
            CONNECTED.store(false, Ordering::Release);
            self.client = Some(start_client(&self.net, self.client_id)?);
            Ok(())
        }

        fn client(&mut self) -> Result<&mut EspMqttClient<'static>, BusError> {
            if !CONNECTED.load(Ordering::Acquire) {
                return Err(BusError::NotConnected);
            }
            self.client.as_mut().ok_or(BusError::NotConnected)
        }
    }

    fn start_client(
        net: &NetworkConfig,
        client_id: &str,
    ) -> Result<EspMqttClient<'static>, EspError> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username: net.broker_user,
            password: net.broker_password,
            ..Default::default()
        };
        let client = EspMqttClient::new_cb(net.broker_url, &conf, |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    CONNECTED.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => {
                    CONNECTED.store(false, Ordering::Release);
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    details: Details::Complete,
                    ..
                } => {
                    inbox::push_inbound(topic, data);
                }
                EventPayload::Received { .. } => {
                    warn!("MQTT: fragmented message dropped");
                }
                _ => {}
            }
        })?;
        info!("MQTT: client started for {}", net.broker_url);
        Ok(client)
    }

    impl MessageBus for EspMqttBus {
        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BusError> {
            self.client()?
                .publish(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|_| BusError::Rejected)
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
            self.client()?
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| BusError::Rejected)
        }

        fn is_connected(&self) -> bool {
            CONNECTED.load(Ordering::Acquire) && self.client.is_some()
        }
    }
}
