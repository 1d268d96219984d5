//! Read-only device sensors
//!
//! Besides playback, ESPuino reports battery level, supply voltage, Wi-Fi
//! signal, the last RFID card, firmware revision and IP address. Each becomes
//! a [`DeviceSensor`] that shares the player's availability handling.

use serde::Serialize;

use crate::availability::AvailabilityHooks;
use crate::error::StateError;
use crate::model::{DeviceIdentity, DeviceInfo};
use crate::notify::ChangeNotifier;
use crate::topics::StateTopic;

/// What a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Battery,
    Voltage,
    WifiRssi,
    Rfid,
    SoftwareRevision,
    IpAddress,
}

impl SensorKind {
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Battery,
        SensorKind::Voltage,
        SensorKind::WifiRssi,
        SensorKind::Rfid,
        SensorKind::SoftwareRevision,
        SensorKind::IpAddress,
    ];

    /// Entity key, also accepted when selecting sensors by name
    pub fn key(&self) -> &'static str {
        match self {
            SensorKind::Battery => "battery",
            SensorKind::Voltage => "voltage",
            SensorKind::WifiRssi => "wifi_rssi",
            SensorKind::Rfid => "rfid",
            SensorKind::SoftwareRevision => "software_revision",
            SensorKind::IpAddress => "ip_address",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn topic(&self) -> StateTopic {
        match self {
            SensorKind::Battery => StateTopic::Battery,
            SensorKind::Voltage => StateTopic::Voltage,
            SensorKind::WifiRssi => StateTopic::WifiRssi,
            SensorKind::Rfid => StateTopic::Rfid,
            SensorKind::SoftwareRevision => StateTopic::SoftwareRevision,
            SensorKind::IpAddress => StateTopic::IpAddress,
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            SensorKind::Battery => Some("%"),
            SensorKind::Voltage => Some("V"),
            SensorKind::WifiRssi => Some("dBm"),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            SensorKind::Battery | SensorKind::Voltage | SensorKind::WifiRssi
        )
    }
}

/// Last reported sensor value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub unique_id: String,
    pub kind: SensorKind,
    pub available: bool,
    pub value: Option<SensorValue>,
    pub unit: Option<&'static str>,
    pub device: DeviceInfo,
}

/// One sensor entity of a device
#[derive(Debug)]
pub struct DeviceSensor {
    kind: SensorKind,
    unique_id: String,
    device_info: DeviceInfo,
    value: Option<SensorValue>,
    available: bool,
    notifier: ChangeNotifier,
}

impl DeviceSensor {
    pub fn new(kind: SensorKind, identity: &DeviceIdentity, notifier: ChangeNotifier) -> Self {
        Self {
            kind,
            unique_id: identity.unique_id(kind.key()),
            device_info: identity.device_info(),
            value: None,
            available: true,
            notifier,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn value(&self) -> Option<&SensorValue> {
        self.value.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            unique_id: self.unique_id.clone(),
            kind: self.kind,
            available: self.available,
            value: self.value.clone(),
            unit: self.kind.unit(),
            device: self.device_info.clone(),
        }
    }

    /// Handle a payload on this sensor's state topic
    pub fn handle_message(&mut self, payload: &str) -> bool {
        tracing::debug!(sensor = %self.unique_id, "Sensor value received: {:?}", payload);

        let trimmed = payload.trim();
        let next = if self.kind.is_numeric() {
            match trimmed.parse::<f64>() {
                Ok(number) => Some(SensorValue::Number(number)),
                Err(source) => {
                    let err = StateError::InvalidSensorValue {
                        kind: self.kind.key(),
                        payload: payload.to_string(),
                        source,
                    };
                    tracing::warn!(sensor = %self.unique_id, "{}", err);
                    return false;
                }
            }
        } else if trimmed.is_empty() {
            None
        } else {
            Some(SensorValue::Text(trimmed.to_string()))
        };

        if self.value == next {
            return false;
        }
        self.value = next;
        self.notifier.notify(&self.unique_id);
        true
    }
}

impl AvailabilityHooks for DeviceSensor {
    fn on_device_offline(&mut self) {
        let was_available = std::mem::replace(&mut self.available, false);
        let had_value = self.value.take().is_some();
        if was_available || had_value {
            self.notifier.notify(&self.unique_id);
        }
    }

    fn on_device_online(&mut self) {
        if !std::mem::replace(&mut self.available, true) {
            self.notifier.notify(&self.unique_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{channel, UpdateReceiver};

    fn create_test_sensor(kind: SensorKind) -> (DeviceSensor, UpdateReceiver) {
        let (notifier, updates) = channel();
        let sensor = DeviceSensor::new(kind, &DeviceIdentity::new("kids"), notifier);
        (sensor, updates)
    }

    #[test]
    fn test_keys_round_trip() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(SensorKind::from_key("humidity"), None);
    }

    #[test]
    fn test_unique_id() {
        let (sensor, _updates) = create_test_sensor(SensorKind::WifiRssi);
        assert_eq!(sensor.unique_id(), "kids_wifi_rssi");
    }

    #[test]
    fn test_numeric_value() {
        let (mut sensor, updates) = create_test_sensor(SensorKind::Battery);

        assert!(sensor.handle_message("87.5"));
        assert_eq!(sensor.value(), Some(&SensorValue::Number(87.5)));
        assert!(!sensor.handle_message(" 87.5 "));
        assert_eq!(updates.try_iter().count(), 1);
    }

    #[test]
    fn test_invalid_numeric_keeps_previous() {
        let (mut sensor, _updates) = create_test_sensor(SensorKind::Voltage);
        sensor.handle_message("4.1");

        assert!(!sensor.handle_message("n/a"));
        assert_eq!(sensor.value(), Some(&SensorValue::Number(4.1)));
    }

    #[test]
    fn test_text_value() {
        let (mut sensor, _updates) = create_test_sensor(SensorKind::Rfid);

        assert!(sensor.handle_message("0412345678\n"));
        assert_eq!(
            sensor.value(),
            Some(&SensorValue::Text("0412345678".to_string()))
        );
        assert!(sensor.handle_message(""));
        assert_eq!(sensor.value(), None);
    }

    #[test]
    fn test_offline_clears_value() {
        let (mut sensor, updates) = create_test_sensor(SensorKind::IpAddress);
        sensor.handle_message("192.168.1.20");
        updates.try_iter().count();

        sensor.on_device_offline();
        assert!(!sensor.is_available());
        assert_eq!(sensor.value(), None);

        sensor.on_device_online();
        assert!(sensor.is_available());
        assert_eq!(sensor.value(), None);
        assert_eq!(updates.try_iter().count(), 2);
    }

    #[test]
    fn test_snapshot_serializes_value_untagged() {
        let (mut sensor, _updates) = create_test_sensor(SensorKind::WifiRssi);
        sensor.handle_message("-61");

        let json = serde_json::to_value(sensor.snapshot()).unwrap();
        assert_eq!(json["value"], -61.0);
        assert_eq!(json["unit"], "dBm");
        assert_eq!(json["kind"], "wifi_rssi");
    }
}
