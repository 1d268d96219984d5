//! Device presence

use serde::{Deserialize, Serialize};

/// Payload the device publishes while reachable
pub const PAYLOAD_ONLINE: &str = "Online";
/// Payload published (usually as last will) when the device drops off
pub const PAYLOAD_OFFLINE: &str = "Offline";

/// Whether the device is reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    /// Parse a presence payload
    ///
    /// Only the exact payloads `Online` and `Offline` are recognized.
    pub fn from_payload(payload: &str) -> Option<Self> {
        match payload {
            PAYLOAD_ONLINE => Some(Availability::Online),
            PAYLOAD_OFFLINE => Some(Availability::Offline),
            _ => None,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Availability::Online)
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Online
    }
}
