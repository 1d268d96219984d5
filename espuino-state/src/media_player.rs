//! Media player entity
//!
//! Holds the playback state machine for one ESPuino. Inbound device messages
//! and outbound commands both drive [`PlayerState`]:
//!
//! ```text
//!            track(non-empty) / next / previous / "playing"
//!   Idle ─────────────────────────────────────────────────► Playing
//!    ▲  ◄──────────── track("") / stop / "stopped" ────────   │
//!    │                                                         │ "paused"
//!    │ device back online                                      ▼
//!   Off ◄──── turn_off / device offline (from any) ───────  Paused
//! ```
//!
//! Entering `Idle` or `Off` wipes the track metadata. Every call that changes
//! something observable emits exactly one update notification.

use serde::Serialize;

use crate::availability::AvailabilityHooks;
use crate::command::{PlayerCommand, Publish, TrackControl, SLEEP_PAYLOAD};
use crate::error::StateError;
use crate::model::{DeviceIdentity, DeviceInfo, PlayerState, TrackInfo, Volume};
use crate::notify::ChangeNotifier;
use crate::topics::{CommandTopic, StateTopic, TopicResolver};
use crate::track_parser::parse_track;

/// Entity key used in the unique id and snapshot topic
pub const ENTITY_KEY: &str = "media_player";

/// Display name of the player entity
pub const ENTITY_NAME: &str = "ESPuino Player";

/// Operations the player advertises to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Play,
    Pause,
    Stop,
    NextTrack,
    PreviousTrack,
    VolumeSet,
    TurnOff,
}

pub const SUPPORTED_FEATURES: &[Feature] = &[
    Feature::Play,
    Feature::Pause,
    Feature::Stop,
    Feature::NextTrack,
    Feature::PreviousTrack,
    Feature::VolumeSet,
    Feature::TurnOff,
];

/// Device state topics the player consumes
pub const SUBSCRIPTIONS: [StateTopic; 3] = [
    StateTopic::Track,
    StateTopic::Loudness,
    StateTopic::PlaybackState,
];

/// Read-only view handed to observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub unique_id: String,
    pub name: &'static str,
    pub available: bool,
    pub state: PlayerState,
    pub volume_level: Option<f64>,
    pub media_track: Option<u32>,
    pub media_title: Option<String>,
    pub media_artist: Option<String>,
    pub media_album_name: Option<String>,
    pub supported_features: &'static [Feature],
    pub device: DeviceInfo,
}

/// Playback state machine for one device
#[derive(Debug)]
pub struct MediaPlayer {
    unique_id: String,
    device_info: DeviceInfo,
    topics: TopicResolver,
    state: PlayerState,
    volume: Option<Volume>,
    track: TrackInfo,
    available: bool,
    notifier: ChangeNotifier,
    span: tracing::Span,
}

impl MediaPlayer {
    /// Create an available, idle player at half volume
    pub fn new(identity: &DeviceIdentity, topics: TopicResolver, notifier: ChangeNotifier) -> Self {
        let unique_id = identity.unique_id(ENTITY_KEY);
        let span = tracing::debug_span!(
            "media_player",
            device = %identity.device_name(),
            entity = %unique_id
        );
        Self {
            unique_id,
            device_info: identity.device_info(),
            topics,
            state: PlayerState::Idle,
            volume: Some(Volume::default()),
            track: TrackInfo::new(),
            available: true,
            notifier,
            span,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Current volume, `None` while the device is offline
    pub fn volume(&self) -> Option<Volume> {
        self.volume
    }

    pub fn track(&self) -> &TrackInfo {
        &self.track
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            unique_id: self.unique_id.clone(),
            name: ENTITY_NAME,
            available: self.available,
            state: self.state,
            volume_level: self.volume.map(|v| v.level()),
            media_track: self.track.number,
            media_title: self.track.title.clone(),
            media_artist: self.track.artist.clone(),
            media_album_name: self.track.album.clone(),
            supported_features: SUPPORTED_FEATURES,
            device: self.device_info.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Inbound device messages
    // ------------------------------------------------------------------

    /// Handle a `PlaybackState` payload
    pub fn handle_playback_state(&mut self, payload: &str) -> bool {
        let span = self.span.clone();
        let _entered = span.enter();
        tracing::debug!("Playback state received: {:?}", payload);

        let Some(next) = PlayerState::from_playback_payload(payload) else {
            tracing::warn!("{}", StateError::UnknownPlaybackState(payload.to_string()));
            return false;
        };

        let changed = self.transition(next);
        self.commit(changed)
    }

    /// Handle a `Track` payload
    ///
    /// Non-empty track text counts as a playing signal unless the player is
    /// paused or off; an empty payload likewise drops to idle.
    pub fn handle_track(&mut self, payload: &str) -> bool {
        let span = self.span.clone();
        let _entered = span.enter();
        tracing::debug!("Track received: {:?}", payload);

        let parsed = parse_track(payload);
        let follows = self.state.follows_track_updates();

        let mut changed;
        if parsed.is_empty() {
            changed = self.track.clear();
            if follows {
                changed |= self.transition(PlayerState::Idle);
            }
        } else {
            let next = TrackInfo {
                number: parsed.number,
                title: parsed.title,
                ..TrackInfo::default()
            };
            changed = self.track != next;
            if changed {
                tracing::debug!("Track now {}", next.display());
                self.track = next;
            }
            if follows {
                changed |= self.transition(PlayerState::Playing);
            }
        }

        self.commit(changed)
    }

    /// Handle a `Loudness` payload (0-21)
    ///
    /// Malformed payloads are logged and the previous volume is kept.
    pub fn handle_loudness(&mut self, payload: &str) -> bool {
        let span = self.span.clone();
        let _entered = span.enter();
        tracing::debug!("Loudness received: {:?}", payload);

        let volume = match Volume::from_device(payload) {
            Ok(volume) => volume,
            Err(err) => {
                tracing::warn!("{}", err);
                return false;
            }
        };

        let changed = self.volume != Some(volume);
        if changed {
            tracing::debug!("New volume level: {}", volume.level());
            self.volume = Some(volume);
        }
        self.commit(changed)
    }

    // ------------------------------------------------------------------
    // Outbound commands
    // ------------------------------------------------------------------

    /// Request a volume; the local level only follows the device's echo
    pub fn set_volume(&self, level: f64) -> Publish {
        let steps = Volume::new(level).to_device();
        tracing::debug!(parent: &self.span, "Setting device volume to {} (from {})", steps, level);
        Publish::new(
            self.topics.command_topic(CommandTopic::Loudness),
            steps.to_string(),
        )
    }

    /// Toggle play/pause; state waits for the device's confirmation
    pub fn play(&self) -> Publish {
        self.track_control(TrackControl::PlayPause)
    }

    /// Toggle play/pause; state waits for the device's confirmation
    pub fn pause(&self) -> Publish {
        self.track_control(TrackControl::PlayPause)
    }

    pub fn stop(&mut self) -> Publish {
        let publish = self.track_control(TrackControl::Stop);
        self.force_state(PlayerState::Idle);
        publish
    }

    pub fn next_track(&mut self) -> Publish {
        let publish = self.track_control(TrackControl::Next);
        self.force_state(PlayerState::Playing);
        publish
    }

    pub fn previous_track(&mut self) -> Publish {
        let publish = self.track_control(TrackControl::Previous);
        self.force_state(PlayerState::Playing);
        publish
    }

    /// Put the device to sleep
    pub fn turn_off(&mut self) -> Publish {
        let publish = Publish::new(self.topics.command_topic(CommandTopic::Sleep), SLEEP_PAYLOAD);
        self.force_state(PlayerState::Off);
        publish
    }

    /// Run a command, returning the message to publish
    pub fn execute(&mut self, command: PlayerCommand) -> Publish {
        match command {
            PlayerCommand::Play => self.play(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Stop => self.stop(),
            PlayerCommand::Next => self.next_track(),
            PlayerCommand::Previous => self.previous_track(),
            PlayerCommand::TurnOff => self.turn_off(),
            PlayerCommand::SetVolume { volume } => self.set_volume(volume),
        }
    }

    fn track_control(&self, control: TrackControl) -> Publish {
        Publish::new(
            self.topics.command_topic(CommandTopic::TrackControl),
            control.payload(),
        )
    }

    /// Optimistic update after a command
    fn force_state(&mut self, next: PlayerState) {
        let span = self.span.clone();
        let _entered = span.enter();
        let changed = self.transition(next);
        self.commit(changed);
    }

    /// Move to `next`, wiping metadata when it is Idle or Off
    fn transition(&mut self, next: PlayerState) -> bool {
        let mut changed = false;
        if self.state != next {
            tracing::debug!("Playback state {} -> {}", self.state, next);
            self.state = next;
            changed = true;
        }
        if self.state.clears_metadata() && self.track.clear() {
            tracing::debug!("Cleared media metadata due to state {}", self.state);
            changed = true;
        }
        changed
    }

    fn commit(&self, changed: bool) -> bool {
        if changed {
            self.notifier.notify(&self.unique_id);
        }
        changed
    }
}

impl AvailabilityHooks for MediaPlayer {
    fn on_device_offline(&mut self) {
        let span = self.span.clone();
        let _entered = span.enter();
        tracing::debug!("Clearing player state, device offline");

        let mut changed = std::mem::replace(&mut self.available, false);
        changed |= self.volume.take().is_some();
        changed |= self.transition(PlayerState::Off);
        self.commit(changed);
    }

    fn on_device_online(&mut self) {
        let span = self.span.clone();
        let _entered = span.enter();

        let mut changed = !std::mem::replace(&mut self.available, true);
        if self.state == PlayerState::Off {
            changed |= self.transition(PlayerState::Idle);
        }
        self.commit(changed);
    }
}
