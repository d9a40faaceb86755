//! Inbound message queue.
//!
//! The MQTT client delivers messages on its own task.  They are copied into
//! a bounded `embassy-sync` channel and drained by the control loop between
//! sensor refresh and evaluation, so command handling never interleaves
//! with a control decision.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │  MQTT task   │─────────────────▶│ Control loop │
//! │  (callback)  │   depth = 8      │   (tick)     │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use crate::config::Topic;

/// Longest payload accepted; anything longer is dropped.
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Channel depth for inbound messages.
const INBOX_DEPTH: usize = 8;

/// One message copied off the broker connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: Topic,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// Copy a topic and payload into fixed-capacity storage.
    ///
    /// Returns `None` if the topic is longer than any configured topic can
    /// be, or the payload is longer than [`MAX_PAYLOAD_LEN`].
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let topic = Topic::try_from(topic).ok()?;
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self { topic, payload })
    }
}

/// Bus task → control loop.
static INBOX: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH> = Channel::new();

/// Queue a message for the next tick.  Returns `false` if it was dropped.
pub fn push_inbound(topic: &str, payload: &[u8]) -> bool {
    let Some(msg) = InboundMessage::new(topic, payload) else {
        warn!(
            "inbox: oversized message dropped (topic {} bytes, payload {} bytes)",
            topic.len(),
            payload.len()
        );
        return false;
    };
    if INBOX.try_send(msg).is_err() {
        warn!("inbox: full, dropped message on {}", topic);
        return false;
    }
    true
}

/// Take the next queued message, if any.
pub fn next_inbound() -> Option<InboundMessage> {
    INBOX.try_receive().ok()
}

/// Iterate over everything queued right now.
pub fn drain_inbound() -> impl Iterator<Item = InboundMessage> {
    core::iter::from_fn(next_inbound)
}
