//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                   |
//! |------------|--------------|-------------------------------|
//! | `hardware` | SensorPort   | DHT22 via SensorHub           |
//! | `link`     | —            | broker reconnect policy       |
//! | `log_sink` | EventSink    | Serial log output             |
//! | `mqtt`     | EventSink    | telemetry publish             |
//! |            | MessageBus   | ESP-IDF MQTT client           |
//! | `time`     | ClockPort    | ESP32 system timer            |

pub mod hardware;
pub mod link;
pub mod log_sink;
pub mod mqtt;
pub mod time;
