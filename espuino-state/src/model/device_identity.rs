//! Device identity type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Manufacturer reported for every ESPuino device
pub const MANUFACTURER: &str = "ESPuino Community";

/// Identifier namespace used in [`DeviceInfo::identifiers`]
pub const IDENTIFIER_DOMAIN: &str = "espuino";

/// Configured identity of one ESPuino device
///
/// The device name is the stable identifier: it scopes topics and prefixes
/// every entity's unique id. The friendly name is only for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    device_name: String,
    friendly_name: String,
}

impl DeviceIdentity {
    /// Create an identity whose friendly name equals the device name
    pub fn new(device_name: impl Into<String>) -> Self {
        let device_name = device_name.into();
        Self {
            friendly_name: device_name.clone(),
            device_name,
        }
    }

    /// Set the display name; blank names fall back to the device name
    pub fn with_friendly_name(mut self, friendly_name: Option<impl Into<String>>) -> Self {
        if let Some(name) = friendly_name.map(Into::into) {
            if !name.trim().is_empty() {
                self.friendly_name = name;
            }
        }
        self
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Stable id for one entity of this device, e.g. `kids_room_media_player`
    pub fn unique_id(&self, entity_key: &str) -> String {
        format!("{}_{}", self.device_name, entity_key)
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: vec![(IDENTIFIER_DOMAIN.to_string(), self.device_name.clone())],
            name: self.friendly_name.clone(),
            manufacturer: MANUFACTURER.to_string(),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.device_name)
    }
}

/// Device description attached to entity snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_name_defaults_to_device_name() {
        let id = DeviceIdentity::new("espuino_kids");
        assert_eq!(id.friendly_name(), "espuino_kids");
    }

    #[test]
    fn test_friendly_name_blank_falls_back() {
        let id = DeviceIdentity::new("espuino_kids").with_friendly_name(Some("  "));
        assert_eq!(id.friendly_name(), "espuino_kids");

        let id = DeviceIdentity::new("espuino_kids").with_friendly_name(Some("Kids Room"));
        assert_eq!(id.friendly_name(), "Kids Room");
    }

    #[test]
    fn test_unique_id() {
        let id = DeviceIdentity::new("espuino_kids");
        assert_eq!(id.unique_id("media_player"), "espuino_kids_media_player");
    }

    #[test]
    fn test_device_info() {
        let info = DeviceIdentity::new("espuino_kids")
            .with_friendly_name(Some("Kids Room"))
            .device_info();
        assert_eq!(
            info.identifiers,
            vec![("espuino".to_string(), "espuino_kids".to_string())]
        );
        assert_eq!(info.name, "Kids Room");
        assert_eq!(info.manufacturer, "ESPuino Community");
    }
}
