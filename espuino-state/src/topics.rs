//! Topic resolution
//!
//! ESPuino publishes its state under one base (`State` by default) and listens
//! for commands under another (`Cmnd`). Every topic is `<base>/<suffix>`.
//! A base may contain the `{device}` placeholder to scope topics per device
//! when several players share a broker.

use serde::{Deserialize, Serialize};

/// Default base for topics the device publishes
pub const DEFAULT_STATE_BASE: &str = "State";

/// Default base for topics the device subscribes to
pub const DEFAULT_COMMAND_BASE: &str = "Cmnd";

/// Placeholder replaced by the device name inside a base
pub const DEVICE_PLACEHOLDER: &str = "{device}";

/// Topics published by the device (we subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateTopic {
    /// `Online` / `Offline` presence signal
    OnlineState,
    Track,
    Loudness,
    PlaybackState,
    Battery,
    Voltage,
    WifiRssi,
    Rfid,
    SoftwareRevision,
    IpAddress,
}

impl StateTopic {
    pub fn suffix(&self) -> &'static str {
        match self {
            StateTopic::OnlineState => "State",
            StateTopic::Track => "Track",
            StateTopic::Loudness => "Loudness",
            StateTopic::PlaybackState => "PlaybackState",
            StateTopic::Battery => "Battery",
            StateTopic::Voltage => "Voltage",
            StateTopic::WifiRssi => "WifiRssi",
            StateTopic::Rfid => "Rfid",
            StateTopic::SoftwareRevision => "SoftwareRevision",
            StateTopic::IpAddress => "IPv4",
        }
    }
}

/// Topics the device listens on (we publish)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandTopic {
    Loudness,
    TrackControl,
    Sleep,
}

impl CommandTopic {
    pub fn suffix(&self) -> &'static str {
        match self {
            CommandTopic::Loudness => "Loudness",
            CommandTopic::TrackControl => "TrackControl",
            CommandTopic::Sleep => "Sleep",
        }
    }
}

/// Builds full topic strings for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResolver {
    state_base: String,
    command_base: String,
}

impl TopicResolver {
    /// Create a resolver, expanding `{device}` in both bases
    pub fn new(device_name: &str, state_base: &str, command_base: &str) -> Self {
        Self {
            state_base: expand_base(state_base, device_name),
            command_base: expand_base(command_base, device_name),
        }
    }

    /// Resolver using the firmware's default `State` / `Cmnd` bases
    pub fn with_defaults(device_name: &str) -> Self {
        Self::new(device_name, DEFAULT_STATE_BASE, DEFAULT_COMMAND_BASE)
    }

    /// Full topic to subscribe to for a device state
    pub fn state_topic(&self, topic: StateTopic) -> String {
        format!("{}/{}", self.state_base, topic.suffix())
    }

    /// Full topic to publish a command on
    pub fn command_topic(&self, topic: CommandTopic) -> String {
        format!("{}/{}", self.command_base, topic.suffix())
    }

    pub fn state_base(&self) -> &str {
        &self.state_base
    }

    pub fn command_base(&self) -> &str {
        &self.command_base
    }
}

fn expand_base(base: &str, device_name: &str) -> String {
    base.trim_end_matches('/')
        .replace(DEVICE_PLACEHOLDER, device_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bases() {
        let topics = TopicResolver::with_defaults("espuino");
        assert_eq!(topics.state_topic(StateTopic::Track), "State/Track");
        assert_eq!(topics.state_topic(StateTopic::OnlineState), "State/State");
        assert_eq!(topics.state_topic(StateTopic::IpAddress), "State/IPv4");
        assert_eq!(
            topics.command_topic(CommandTopic::TrackControl),
            "Cmnd/TrackControl"
        );
    }

    #[test]
    fn test_device_placeholder() {
        let topics = TopicResolver::new("kids", "espuino/{device}/State", "espuino/{device}/Cmnd");
        assert_eq!(
            topics.state_topic(StateTopic::Loudness),
            "espuino/kids/State/Loudness"
        );
        assert_eq!(
            topics.command_topic(CommandTopic::Sleep),
            "espuino/kids/Cmnd/Sleep"
        );
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let topics = TopicResolver::new("kids", "State/", "Cmnd//");
        assert_eq!(topics.state_topic(StateTopic::Track), "State/Track");
        assert_eq!(topics.command_topic(CommandTopic::Loudness), "Cmnd/Loudness");
    }

    #[test]
    fn test_directions_are_independent() {
        let topics = TopicResolver::with_defaults("espuino");
        assert_ne!(
            topics.state_topic(StateTopic::Loudness),
            topics.command_topic(CommandTopic::Loudness)
        );
    }
}
