//! ESPuino State
//!
//! Playback, track and availability state for ESPuino audio players that
//! talk MQTT. The crate is synchronous and transport-agnostic: feed it
//! `(topic, payload)` pairs, read snapshots back, and publish the
//! [`Publish`] values its commands return.
//!
//! # Architecture
//!
//! ```text
//! MQTT message → EspuinoDevice::dispatch → MediaPlayer / DeviceSensor / AvailabilitySupervisor
//!                                                 │
//!                                                 └── ChangeNotifier → UpdateReceiver (observers)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use espuino_state::{notify, DeviceIdentity, EspuinoDevice, PlayerState};
//!
//! let (notifier, updates) = notify::channel();
//! let mut device = EspuinoDevice::with_defaults(DeviceIdentity::new("kids"), notifier);
//!
//! device.dispatch("State/Track", "(2/5): Lullaby.mp3");
//! assert_eq!(device.player().state(), PlayerState::Playing);
//! assert_eq!(device.player().track().title.as_deref(), Some("Lullaby"));
//!
//! // One notification per change
//! assert_eq!(updates.try_iter().count(), 1);
//!
//! // Commands return the message to publish
//! let publish = device.player_mut().stop();
//! assert_eq!(publish.topic, "Cmnd/TrackControl");
//! assert_eq!(publish.payload, "1");
//! ```

// Core modules
pub mod availability;
pub mod command;
pub mod device;
pub mod media_player;
pub mod model;
pub mod notify;
pub mod sensor;
pub mod topics;
pub mod track_parser;

// Error types
pub mod error;

// ============================================================================
// Re-exports
// ============================================================================

pub use availability::{AvailabilityHooks, AvailabilitySupervisor};
pub use command::{PlayerCommand, Publish, TrackControl};
pub use device::EspuinoDevice;
pub use media_player::{Feature, MediaPlayer, PlayerSnapshot};
pub use model::{Availability, DeviceIdentity, DeviceInfo, PlayerState, TrackInfo, Volume};
pub use notify::{ChangeNotifier, EntityUpdate, UpdateReceiver};
pub use sensor::{DeviceSensor, SensorKind, SensorSnapshot, SensorValue};
pub use topics::{CommandTopic, StateTopic, TopicResolver};
pub use track_parser::{parse_track, ParseOutcome, ParsedTrack};

pub use error::{Result, StateError};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::availability::AvailabilityHooks;
    pub use crate::command::{PlayerCommand, Publish};
    pub use crate::device::EspuinoDevice;
    pub use crate::model::{DeviceIdentity, PlayerState, TrackInfo, Volume};
    pub use crate::notify::{channel, ChangeNotifier, UpdateReceiver};
    pub use crate::sensor::SensorKind;
    pub use crate::topics::TopicResolver;
}
