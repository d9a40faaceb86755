//! Broker link supervisor.
//!
//! Tracks whether the message-bus session is up and tells the main loop
//! when to act.  Pure state machine: it never touches the network.
//!
//! ## Reconnection policy
//!
//! After a disconnect the supervisor waits an exponential backoff (5 s →
//! 10 s → 20 s … capped at 60 s) between reconnect attempts.  When the link
//! comes back it asks once for the command topics to be re-subscribed.

use log::{info, warn};

const MAX_BACKOFF_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down { attempt: u32, retry_at_ms: u32 },
}

/// What the main loop should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    None,
    /// Tear down and re-create the broker client.
    Reconnect,
    /// The link just came up: subscribe to the command topics.
    Resubscribe,
}

pub struct LinkSupervisor {
    state: LinkState,
    base_backoff_secs: u32,
    backoff_secs: u32,
}

impl LinkSupervisor {
    /// Start in the down state, waiting for the first connect.  The first
    /// retry is due `base_backoff_secs` after `now_ms`.
    pub fn new(base_backoff_secs: u32, now_ms: u32) -> Self {
        let base = base_backoff_secs.clamp(1, MAX_BACKOFF_SECS);
        Self {
            state: LinkState::Down {
                attempt: 0,
                retry_at_ms: now_ms.wrapping_add(base * 1000),
            },
            base_backoff_secs: base,
            backoff_secs: base,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_up(&self) -> bool {
        self.state == LinkState::Up
    }

    /// Current delay before the next attempt, in seconds.
    pub fn backoff_secs(&self) -> u32 {
        self.backoff_secs
    }

    pub fn poll(&mut self, connected: bool, now_ms: u32) -> LinkAction {
        match self.state {
            LinkState::Up => {
                if !connected {
                    warn!("MQTT: link lost, retry in {}s", self.backoff_secs);
                    self.state = LinkState::Down {
                        attempt: 0,
                        retry_at_ms: now_ms.wrapping_add(self.backoff_secs * 1000),
                    };
                }
                LinkAction::None
            }
            LinkState::Down { attempt, retry_at_ms } => {
                if connected {
                    info!("MQTT: link up after {} attempt(s)", attempt);
                    self.state = LinkState::Up;
                    self.backoff_secs = self.base_backoff_secs;
                    return LinkAction::Resubscribe;
                }
                if !is_due(now_ms, retry_at_ms) {
                    return LinkAction::None;
                }
                self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                info!(
                    "MQTT: reconnect attempt {} (next in {}s)",
                    attempt + 1,
                    self.backoff_secs
                );
                self.state = LinkState::Down {
                    attempt: attempt + 1,
                    retry_at_ms: now_ms.wrapping_add(self.backoff_secs * 1000),
                };
                LinkAction::Reconnect
            }
        }
    }
}

/// `now` has reached `deadline` on a wrapping clock.
fn is_due(now_ms: u32, deadline_ms: u32) -> bool {
    now_ms.wrapping_sub(deadline_ms) < (1 << 31)
}
