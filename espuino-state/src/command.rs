//! Outbound commands
//!
//! Each player operation becomes exactly one [`Publish`] on a device command
//! topic. Delivery is fire-and-forget: nothing waits for the device to echo.

use serde::{Deserialize, Serialize};

/// Payload sent on the `Sleep` command topic to power the device down
pub const SLEEP_PAYLOAD: &str = "0";

/// A message to hand to the MQTT client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publish {
    pub topic: String,
    pub payload: String,
}

impl Publish {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Codes understood on the `TrackControl` command topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackControl {
    Stop,
    PlayPause,
    Next,
    Previous,
}

impl TrackControl {
    pub fn code(&self) -> u8 {
        match self {
            TrackControl::Stop => 1,
            TrackControl::PlayPause => 3,
            TrackControl::Next => 4,
            TrackControl::Previous => 5,
        }
    }

    pub fn payload(&self) -> String {
        self.code().to_string()
    }
}

/// Operation requested by an observer of the media player
///
/// Deserializes from `{"command": "..."}`, with `volume` for `set_volume`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    TurnOff,
    SetVolume { volume: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_control_codes() {
        assert_eq!(TrackControl::Stop.payload(), "1");
        assert_eq!(TrackControl::PlayPause.payload(), "3");
        assert_eq!(TrackControl::Next.payload(), "4");
        assert_eq!(TrackControl::Previous.payload(), "5");
    }

    #[test]
    fn test_player_command_from_json() {
        let cmd: PlayerCommand = serde_json::from_str(r#"{"command":"next"}"#).unwrap();
        assert_eq!(cmd, PlayerCommand::Next);

        let cmd: PlayerCommand =
            serde_json::from_str(r#"{"command":"set_volume","volume":0.25}"#).unwrap();
        assert_eq!(cmd, PlayerCommand::SetVolume { volume: 0.25 });

        let cmd: PlayerCommand = serde_json::from_str(r#"{"command":"turn_off"}"#).unwrap();
        assert_eq!(cmd, PlayerCommand::TurnOff);
    }

    #[test]
    fn test_player_command_rejects_unknown() {
        assert!(serde_json::from_str::<PlayerCommand>(r#"{"command":"shuffle"}"#).is_err());
        assert!(serde_json::from_str::<PlayerCommand>(r#"{"command":"set_volume"}"#).is_err());
    }
}
