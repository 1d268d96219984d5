//! One ESPuino and everything the bridge exposes for it
//!
//! [`EspuinoDevice`] owns the availability supervisor, the media player and
//! the sensors, and routes inbound messages to them. Routes are registered
//! against full topic strings when the device is built; messages on a topic
//! are handled in the order they arrive.

use std::collections::HashMap;

use crate::availability::{AvailabilityHooks, AvailabilitySupervisor};
use crate::media_player::{self, MediaPlayer};
use crate::model::DeviceIdentity;
use crate::notify::ChangeNotifier;
use crate::sensor::{DeviceSensor, SensorKind};
use crate::topics::{StateTopic, TopicResolver};

/// Handler bound to a subscribed topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Presence,
    Track,
    Loudness,
    PlaybackState,
    /// Index into `EspuinoDevice::sensors`
    Sensor(usize),
}

#[derive(Debug)]
pub struct EspuinoDevice {
    identity: DeviceIdentity,
    topics: TopicResolver,
    supervisor: AvailabilitySupervisor,
    player: MediaPlayer,
    sensors: Vec<DeviceSensor>,
    routes: HashMap<String, Route>,
}

impl EspuinoDevice {
    /// Build a device with the given sensors and register its routes
    pub fn new(
        identity: DeviceIdentity,
        topics: TopicResolver,
        sensor_kinds: &[SensorKind],
        notifier: ChangeNotifier,
    ) -> Self {
        let player = MediaPlayer::new(&identity, topics.clone(), notifier.clone());

        let mut sensors: Vec<DeviceSensor> = Vec::with_capacity(sensor_kinds.len());
        for kind in sensor_kinds {
            if sensors.iter().any(|s| s.kind() == *kind) {
                continue;
            }
            sensors.push(DeviceSensor::new(*kind, &identity, notifier.clone()));
        }

        let mut routes = HashMap::new();
        routes.insert(topics.state_topic(StateTopic::OnlineState), Route::Presence);
        for topic in media_player::SUBSCRIPTIONS {
            let route = match topic {
                StateTopic::Track => Route::Track,
                StateTopic::Loudness => Route::Loudness,
                StateTopic::PlaybackState => Route::PlaybackState,
                other => {
                    tracing::warn!("No player handler for {:?}, not subscribing", other);
                    continue;
                }
            };
            routes.insert(topics.state_topic(topic), route);
        }
        for (index, sensor) in sensors.iter().enumerate() {
            routes.insert(topics.state_topic(sensor.kind().topic()), Route::Sensor(index));
        }

        tracing::info!(
            "Registered {} topics for device {}",
            routes.len(),
            identity.device_name()
        );

        Self {
            identity,
            topics,
            supervisor: AvailabilitySupervisor::new(),
            player,
            sensors,
            routes,
        }
    }

    /// Device with the firmware's default topics and every sensor
    pub fn with_defaults(identity: DeviceIdentity, notifier: ChangeNotifier) -> Self {
        let topics = TopicResolver::with_defaults(identity.device_name());
        Self::new(identity, topics, &SensorKind::ALL, notifier)
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn topics(&self) -> &TopicResolver {
        &self.topics
    }

    pub fn supervisor(&self) -> &AvailabilitySupervisor {
        &self.supervisor
    }

    pub fn player(&self) -> &MediaPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut MediaPlayer {
        &mut self.player
    }

    pub fn sensors(&self) -> &[DeviceSensor] {
        &self.sensors
    }

    pub fn sensor(&self, kind: SensorKind) -> Option<&DeviceSensor> {
        self.sensors.iter().find(|s| s.kind() == kind)
    }

    /// Every topic with a registered handler, sorted
    pub fn subscriptions(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.routes.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Route an inbound message
    ///
    /// Returns `false` if no handler is registered for `topic`.
    pub fn dispatch(&mut self, topic: &str, payload: &str) -> bool {
        let Some(route) = self.routes.get(topic).copied() else {
            tracing::debug!("No handler for topic {}", topic);
            return false;
        };

        match route {
            Route::Presence => {
                let mut entities: Vec<&mut dyn AvailabilityHooks> =
                    Vec::with_capacity(1 + self.sensors.len());
                entities.push(&mut self.player);
                for sensor in self.sensors.iter_mut() {
                    entities.push(sensor);
                }
                self.supervisor.handle_presence(payload, &mut entities);
            }
            Route::Track => {
                self.player.handle_track(payload);
            }
            Route::Loudness => {
                self.player.handle_loudness(payload);
            }
            Route::PlaybackState => {
                self.player.handle_playback_state(payload);
            }
            Route::Sensor(index) => {
                if let Some(sensor) = self.sensors.get_mut(index) {
                    sensor.handle_message(payload);
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayerState;
    use crate::notify::{channel, UpdateReceiver};

    fn create_test_device(kinds: &[SensorKind]) -> (EspuinoDevice, UpdateReceiver) {
        let (notifier, updates) = channel();
        let identity = DeviceIdentity::new("kids");
        let device = EspuinoDevice::new(
            identity,
            TopicResolver::with_defaults("kids"),
            kinds,
            notifier,
        );
        (device, updates)
    }

    #[test]
    fn test_subscriptions_without_sensors() {
        let (device, _updates) = create_test_device(&[]);
        assert_eq!(
            device.subscriptions(),
            vec![
                "State/Loudness".to_string(),
                "State/PlaybackState".to_string(),
                "State/State".to_string(),
                "State/Track".to_string(),
            ]
        );
    }

    #[test]
    fn test_subscriptions_include_sensors_once() {
        let (device, _updates) =
            create_test_device(&[SensorKind::Battery, SensorKind::Battery, SensorKind::IpAddress]);
        assert_eq!(device.sensors().len(), 2);
        assert!(device.subscriptions().contains(&"State/IPv4".to_string()));
        assert_eq!(device.subscriptions().len(), 6);
    }

    #[test]
    fn test_dispatch_routes_to_player() {
        let (mut device, _updates) = create_test_device(&[]);

        assert!(device.dispatch("State/Track", "(1/3): Intro.mp3"));
        assert!(device.dispatch("State/Loudness", "0"));
        assert_eq!(device.player().state(), PlayerState::Playing);
        assert_eq!(device.player().volume().map(|v| v.level()), Some(0.0));
    }

    #[test]
    fn test_each_player_topic_reaches_its_handler() {
        let (mut device, _updates) = create_test_device(&[]);
        for topic in media_player::SUBSCRIPTIONS {
            let full = device.topics().state_topic(topic);
            assert!(device.dispatch(&full, ""), "no route for {}", full);
        }

        assert!(device.dispatch("State/PlaybackState", "paused"));
        assert_eq!(device.player().state(), PlayerState::Paused);
        assert!(device.dispatch("State/Loudness", "21"));
        assert_eq!(device.player().volume().map(|v| v.level()), Some(1.0));
        assert_eq!(device.player().state(), PlayerState::Paused);
    }

    #[test]
    fn test_dispatch_unknown_topic() {
        let (mut device, updates) = create_test_device(&[]);
        assert!(!device.dispatch("State/Unknown", "x"));
        assert!(!device.dispatch("Cmnd/TrackControl", "3"));
        assert_eq!(updates.try_iter().count(), 0);
    }

    #[test]
    fn test_presence_reaches_all_entities() {
        let (mut device, updates) = create_test_device(&[SensorKind::Battery]);
        device.dispatch("State/Battery", "90");
        updates.try_iter().count();

        device.dispatch("State/State", "Offline");
        assert!(!device.player().is_available());
        assert!(!device.sensors()[0].is_available());

        let ids: Vec<String> = updates.try_iter().map(|u| u.unique_id).collect();
        assert_eq!(ids, vec!["kids_media_player".to_string(), "kids_battery".to_string()]);
    }

    #[test]
    fn test_sensor_lookup() {
        let (mut device, _updates) = create_test_device(&[SensorKind::Rfid]);
        device.dispatch("State/Rfid", "0411");
        assert!(device.sensor(SensorKind::Rfid).and_then(|s| s.value()).is_some());
        assert!(device.sensor(SensorKind::Battery).is_none());
    }
}
