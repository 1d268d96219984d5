//! Player state enumeration

use serde::{Deserialize, Serialize};

/// Visible state of the media player entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// Currently playing audio
    Playing,
    /// Playback is paused
    Paused,
    /// Stopped or nothing queued
    Idle,
    /// Device is asleep or unreachable
    Off,
}

impl PlayerState {
    /// Parse a playback-state payload published by the device
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace:
    /// - "playing", "play"
    /// - "paused", "pause"
    /// - "stopped", "stop", "idle"
    ///
    /// Returns `None` for anything else. `Off` is never reported by the device.
    pub fn from_playback_payload(payload: &str) -> Option<Self> {
        match payload.trim().to_lowercase().as_str() {
            "playing" | "play" => Some(PlayerState::Playing),
            "paused" | "pause" => Some(PlayerState::Paused),
            "stopped" | "stop" | "idle" => Some(PlayerState::Idle),
            _ => None,
        }
    }

    /// Whether entering this state wipes the track metadata
    pub fn clears_metadata(&self) -> bool {
        matches!(self, PlayerState::Idle | PlayerState::Off)
    }

    /// Whether inbound track messages may override this state
    ///
    /// A paused or switched-off player keeps its state when track text arrives.
    pub fn follows_track_updates(&self) -> bool {
        !matches!(self, PlayerState::Paused | PlayerState::Off)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Idle => "idle",
            PlayerState::Off => "off",
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState::Idle
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_playback_payload_playing() {
        assert_eq!(
            PlayerState::from_playback_payload("playing"),
            Some(PlayerState::Playing)
        );
        assert_eq!(
            PlayerState::from_playback_payload("PLAY"),
            Some(PlayerState::Playing)
        );
    }

    #[test]
    fn test_from_playback_payload_paused() {
        assert_eq!(
            PlayerState::from_playback_payload("Paused"),
            Some(PlayerState::Paused)
        );
        assert_eq!(
            PlayerState::from_playback_payload("pause"),
            Some(PlayerState::Paused)
        );
    }

    #[test]
    fn test_from_playback_payload_idle_aliases() {
        for payload in ["stopped", "stop", "idle", " Idle\n"] {
            assert_eq!(
                PlayerState::from_playback_payload(payload),
                Some(PlayerState::Idle),
                "payload {:?}",
                payload
            );
        }
    }

    #[test]
    fn test_from_playback_payload_unknown() {
        assert_eq!(PlayerState::from_playback_payload("buffering"), None);
        assert_eq!(PlayerState::from_playback_payload(""), None);
        assert_eq!(PlayerState::from_playback_payload("off"), None);
    }

    #[test]
    fn test_default() {
        assert_eq!(PlayerState::default(), PlayerState::Idle);
    }

    #[test]
    fn test_guards() {
        assert!(PlayerState::Idle.clears_metadata());
        assert!(PlayerState::Off.clears_metadata());
        assert!(!PlayerState::Paused.clears_metadata());

        assert!(PlayerState::Playing.follows_track_updates());
        assert!(PlayerState::Idle.follows_track_updates());
        assert!(!PlayerState::Paused.follows_track_updates());
        assert!(!PlayerState::Off.follows_track_updates());
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&PlayerState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
    }
}
