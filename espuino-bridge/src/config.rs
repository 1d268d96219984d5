//! Bridge configuration
//!
//! Command line arguments (with environment fallbacks) are parsed into
//! [`Args`] and validated into a [`BridgeConfig`] before anything connects.

use std::time::Duration;

use clap::Parser;
use espuino_state::media_player;
use espuino_state::topics::{DEFAULT_COMMAND_BASE, DEFAULT_STATE_BASE, DEVICE_PLACEHOLDER};
use espuino_state::{DeviceIdentity, SensorKind, TopicResolver};
use rumqttc::MqttOptions;

use crate::error::{BridgeError, Result};

/// Default root for published entity snapshots
pub const DEFAULT_SNAPSHOT_ROOT: &str = "espuino/{device}";

/// ESPuino MQTT bridge
///
/// Follows an ESPuino's state topics on an MQTT broker, publishes the
/// derived media player and sensor state as JSON, and forwards player
/// commands back to the device.
#[derive(Parser, Debug, Clone)]
#[command(name = "espuino-bridge")]
#[command(about = "Expose an ESPuino audio player over MQTT as a media player")]
#[command(version)]
pub struct Args {
    /// Device name, substituted for `{device}` in topic bases
    #[arg(short, long, env = "ESPUINO_DEVICE")]
    pub device_name: String,

    /// Name shown for the device, defaults to the device name
    #[arg(long, env = "ESPUINO_FRIENDLY_NAME")]
    pub friendly_name: Option<String>,

    /// MQTT broker host
    #[arg(long, env = "ESPUINO_MQTT_HOST", default_value = "localhost")]
    pub mqtt_host: String,

    /// MQTT broker port
    #[arg(long, env = "ESPUINO_MQTT_PORT", default_value = "1883")]
    pub mqtt_port: u16,

    /// MQTT client id, defaults to `espuino-bridge-<device>`
    #[arg(long, env = "ESPUINO_MQTT_CLIENT_ID")]
    pub mqtt_client_id: Option<String>,

    /// MQTT username
    #[arg(long, env = "ESPUINO_MQTT_USERNAME")]
    pub username: Option<String>,

    /// MQTT password
    #[arg(long, env = "ESPUINO_MQTT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Keep-alive interval in seconds
    #[arg(long, default_value = "30")]
    pub keep_alive: u64,

    /// Base of the device's state topics
    #[arg(long, env = "ESPUINO_STATE_BASE", default_value = DEFAULT_STATE_BASE)]
    pub state_base: String,

    /// Base of the device's command topics
    #[arg(long, env = "ESPUINO_COMMAND_BASE", default_value = DEFAULT_COMMAND_BASE)]
    pub command_base: String,

    /// Root under which entity snapshots are published
    #[arg(long, env = "ESPUINO_SNAPSHOT_ROOT", default_value = DEFAULT_SNAPSHOT_ROOT)]
    pub snapshot_root: String,

    /// Topic accepting JSON player commands, defaults to `<snapshot root>/media_player/set`
    #[arg(long, env = "ESPUINO_CONTROL_TOPIC")]
    pub control_topic: Option<String>,

    /// Sensors to expose (battery, voltage, wifi_rssi, rfid, software_revision, ip_address)
    #[arg(long, value_delimiter = ',')]
    pub sensors: Vec<String>,

    /// Expose no sensors, only the media player
    #[arg(long, conflicts_with = "sensors")]
    pub no_sensors: bool,

    /// Seconds to wait before polling again after a connection error
    #[arg(long, default_value = "5")]
    pub reconnect_delay: u64,

    /// Capacity of the MQTT client request queue, at least the requests made on connect
    #[arg(long, default_value = "64")]
    pub channel_capacity: usize,
}

/// Validated bridge configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub device_name: String,
    pub friendly_name: Option<String>,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_client_id: String,
    pub credentials: Option<(String, String)>,
    pub keep_alive: Duration,
    pub state_base: String,
    pub command_base: String,
    pub snapshot_root: String,
    pub control_topic: Option<String>,
    pub sensors: Vec<SensorKind>,
    pub reconnect_delay: Duration,
    pub channel_capacity: usize,
}

impl BridgeConfig {
    /// Defaults for a device on a local broker
    pub fn new(device_name: impl Into<String>) -> Self {
        let device_name = device_name.into();
        Self {
            mqtt_client_id: default_client_id(&device_name),
            device_name,
            friendly_name: None,
            mqtt_host: "localhost".to_string(),
            mqtt_port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            state_base: DEFAULT_STATE_BASE.to_string(),
            command_base: DEFAULT_COMMAND_BASE.to_string(),
            snapshot_root: DEFAULT_SNAPSHOT_ROOT.to_string(),
            control_topic: None,
            sensors: SensorKind::ALL.to_vec(),
            reconnect_delay: Duration::from_secs(5),
            channel_capacity: 64,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let name = self.device_name.trim();
        if name.is_empty() {
            return Err(BridgeError::Configuration(
                "Device name must not be empty".to_string(),
            ));
        }
        if name.contains(['/', '+', '#']) {
            return Err(BridgeError::Configuration(format!(
                "Device name '{}' must not contain '/', '+' or '#'",
                self.device_name
            )));
        }

        if self.mqtt_host.trim().is_empty() {
            return Err(BridgeError::Configuration(
                "MQTT host must not be empty".to_string(),
            ));
        }

        if self.mqtt_port == 0 {
            return Err(BridgeError::Configuration(
                "MQTT port must not be 0".to_string(),
            ));
        }

        // rumqttc rejects shorter keep-alive intervals
        if self.keep_alive < Duration::from_secs(5) {
            return Err(BridgeError::Configuration(format!(
                "Keep-alive must be at least 5 seconds, got {}",
                self.keep_alive.as_secs()
            )));
        }

        // Requests issued on ConnAck are queued before the event loop is polled again
        let required = self.connect_requests();
        if self.channel_capacity < required {
            return Err(BridgeError::Configuration(format!(
                "Channel capacity must be at least {} for {} sensors, got {}",
                required,
                self.sensors.len(),
                self.channel_capacity
            )));
        }

        for (label, topic) in [
            ("state base", self.state_base.as_str()),
            ("command base", self.command_base.as_str()),
            ("snapshot root", self.snapshot_root.as_str()),
        ] {
            check_topic(label, topic)?;
        }
        if let Some(topic) = &self.control_topic {
            check_topic("control topic", topic)?;
        }

        let topics = self.topic_resolver();
        if topics.state_base() == topics.command_base() {
            return Err(BridgeError::Configuration(format!(
                "State and command bases must differ, both resolve to '{}'",
                topics.state_base()
            )));
        }

        Ok(())
    }

    /// Client requests made on every ConnAck
    ///
    /// One subscribe per device topic plus the control topic, then one
    /// retained snapshot per entity.
    pub fn connect_requests(&self) -> usize {
        let subscriptions = 1 + media_player::SUBSCRIPTIONS.len() + self.sensors.len() + 1;
        let snapshots = 1 + self.sensors.len();
        subscriptions + snapshots
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.device_name.trim()).with_friendly_name(self.friendly_name.clone())
    }

    pub fn topic_resolver(&self) -> TopicResolver {
        TopicResolver::new(self.device_name.trim(), &self.state_base, &self.command_base)
    }

    /// Snapshot root with `{device}` expanded and no trailing slash
    pub fn snapshot_root(&self) -> String {
        expand(&self.snapshot_root, self.device_name.trim())
    }

    /// Topic accepting JSON player commands
    pub fn control_topic(&self) -> String {
        match &self.control_topic {
            Some(topic) => expand(topic, self.device_name.trim()),
            None => format!("{}/media_player/set", self.snapshot_root()),
        }
    }

    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options =
            MqttOptions::new(&self.mqtt_client_id, self.mqtt_host.trim(), self.mqtt_port);
        options.set_keep_alive(self.keep_alive);
        if let Some((username, password)) = &self.credentials {
            options.set_credentials(username, password);
        }
        options
    }
}

impl TryFrom<Args> for BridgeConfig {
    type Error = BridgeError;

    fn try_from(args: Args) -> Result<Self> {
        let sensors = if args.no_sensors {
            Vec::new()
        } else if args.sensors.is_empty() {
            SensorKind::ALL.to_vec()
        } else {
            parse_sensors(&args.sensors)?
        };

        let credentials = match (args.username, args.password) {
            (Some(username), Some(password)) => Some((username, password)),
            (Some(username), None) => Some((username, String::new())),
            (None, Some(_)) => {
                return Err(BridgeError::Configuration(
                    "MQTT password given without a username".to_string(),
                ))
            }
            (None, None) => None,
        };

        let config = Self {
            mqtt_client_id: args
                .mqtt_client_id
                .unwrap_or_else(|| default_client_id(args.device_name.trim())),
            device_name: args.device_name,
            friendly_name: args.friendly_name,
            mqtt_host: args.mqtt_host,
            mqtt_port: args.mqtt_port,
            credentials,
            keep_alive: Duration::from_secs(args.keep_alive),
            state_base: args.state_base,
            command_base: args.command_base,
            snapshot_root: args.snapshot_root,
            control_topic: args.control_topic,
            sensors,
            reconnect_delay: Duration::from_secs(args.reconnect_delay),
            channel_capacity: args.channel_capacity,
        };

        config.validate()?;
        Ok(config)
    }
}

fn default_client_id(device_name: &str) -> String {
    format!("espuino-bridge-{}", device_name)
}

fn parse_sensors(keys: &[String]) -> Result<Vec<SensorKind>> {
    keys.iter()
        .map(|key| key.trim())
        .filter(|key| !key.is_empty())
        .map(|key| {
            SensorKind::from_key(key).ok_or_else(|| {
                BridgeError::Configuration(format!("Unknown sensor '{}'", key))
            })
        })
        .collect()
}

fn check_topic(label: &str, topic: &str) -> Result<()> {
    if topic.trim_end_matches('/').is_empty() {
        return Err(BridgeError::Configuration(format!(
            "The {} must not be empty",
            label
        )));
    }
    if topic.contains(['+', '#']) {
        return Err(BridgeError::Configuration(format!(
            "The {} '{}' must not contain MQTT wildcards",
            label, topic
        )));
    }
    Ok(())
}

fn expand(template: &str, device_name: &str) -> String {
    template
        .replace(DEVICE_PLACEHOLDER, device_name)
        .trim_end_matches('/')
        .to_string()
}
