//! Inbound commands to the application service.
//!
//! Messages arrive from the broker as `(topic, payload)` pairs.  The
//! [`CommandRouter`] turns them into [`DryerCommand`]s; anything it cannot
//! decode is rejected before it reaches the controller.
//!
//! | Topic             | Payload                  | Command          |
//! |-------------------|--------------------------|------------------|
//! | `topics.filament` | `RESET`                  | `Reset`          |
//! | `topics.filament` | material name            | `SelectProfile`  |
//! | `topics.heater`   | `ON` / `OFF`             | `Heater(bool)`   |
//! | `topics.fan`      | `ON` / `OFF`             | `Fan(bool)`      |
//!
//! Payloads are trimmed of surrounding whitespace and matched without
//! regard to ASCII case.

use crate::config::TopicConfig;
use crate::error::CommandError;

/// Longest material name accepted from the wire.
pub const MAX_MATERIAL_LEN: usize = 16;

pub type MaterialName = heapless::String<MAX_MATERIAL_LEN>;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryerCommand {
    /// Apply the named drying profile.
    SelectProfile(MaterialName),

    /// Return to idle.
    Reset,

    /// Manual heater override (fan follows).
    Heater(bool),

    /// Manual fan override.
    Fan(bool),
}

/// Decodes broker messages against the configured topic set.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    topics: TopicConfig,
}

impl CommandRouter {
    pub fn new(topics: TopicConfig) -> Self {
        Self { topics }
    }

    /// The three command topics, for subscription.
    pub fn command_topics(&self) -> [&str; 3] {
        [
            self.topics.filament.as_str(),
            self.topics.heater.as_str(),
            self.topics.fan.as_str(),
        ]
    }

    pub fn route(&self, topic: &str, payload: &[u8]) -> Result<DryerCommand, CommandError> {
        if topic == self.topics.filament.as_str() {
            let text = decode(payload)?;
            if text.eq_ignore_ascii_case("RESET") {
                return Ok(DryerCommand::Reset);
            }
            if text.is_empty() {
                return Err(CommandError::InvalidPayload);
            }
            // Longer than any catalog entry, so it cannot match.
            let name =
                MaterialName::try_from(text).map_err(|_| CommandError::UnknownMaterial)?;
            Ok(DryerCommand::SelectProfile(name))
        } else if topic == self.topics.heater.as_str() {
            parse_on_off(decode(payload)?).map(DryerCommand::Heater)
        } else if topic == self.topics.fan.as_str() {
            parse_on_off(decode(payload)?).map(DryerCommand::Fan)
        } else {
            Err(CommandError::UnknownTopic)
        }
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new(TopicConfig::default())
    }
}

/// UTF-8 payload with surrounding whitespace removed.
fn decode(payload: &[u8]) -> Result<&str, CommandError> {
    core::str::from_utf8(payload)
        .map(str::trim)
        .map_err(|_| CommandError::InvalidPayload)
}

fn parse_on_off(text: &str) -> Result<bool, CommandError> {
    if text.eq_ignore_ascii_case("ON") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("OFF") {
        Ok(false)
    } else {
        Err(CommandError::InvalidPayload)
    }
}
