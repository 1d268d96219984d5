//! End-to-end scenarios through `EspuinoDevice::dispatch`
//!
//! Each test replays a message sequence as the device would publish it and
//! checks the resulting player state and notifications.

use espuino_state::prelude::*;
use espuino_state::{notify, SensorValue};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_device() -> (EspuinoDevice, UpdateReceiver) {
    let (notifier, updates) = notify::channel();
    let device = EspuinoDevice::with_defaults(DeviceIdentity::new("kids"), notifier);
    (device, updates)
}

fn drain(updates: &UpdateReceiver) -> usize {
    updates.try_iter().count()
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn test_track_pause_then_empty_track() {
    let (mut device, _updates) = create_device();
    assert_eq!(device.player().state(), PlayerState::Idle);

    device.dispatch("State/Track", "(2/5): A.mp3");
    assert_eq!(device.player().state(), PlayerState::Playing);
    assert_eq!(device.player().track().number, Some(2));
    assert_eq!(device.player().track().title.as_deref(), Some("A"));

    device.dispatch("State/PlaybackState", "pause");
    assert_eq!(device.player().state(), PlayerState::Paused);
    assert_eq!(device.player().track().number, Some(2));

    // Paused guards against the idle drop, metadata still goes
    device.dispatch("State/Track", "");
    assert_eq!(device.player().state(), PlayerState::Paused);
    assert!(device.player().track().is_empty());
}

#[test]
fn test_resent_track_while_stopped_reports_playing() {
    // Track text is taken as a playing signal even without confirmation
    let (mut device, _updates) = create_device();
    device.dispatch("State/Track", "(1/3): One.mp3");
    device.dispatch("State/PlaybackState", "stopped");
    assert_eq!(device.player().state(), PlayerState::Idle);

    device.dispatch("State/Track", "(1/3): One.mp3");
    assert_eq!(device.player().state(), PlayerState::Playing);
}

#[test]
fn test_invalid_loudness_keeps_prior_volume() {
    let (mut device, updates) = create_device();
    device.dispatch("State/Loudness", "14");
    drain(&updates);

    device.dispatch("State/Loudness", "abc");
    let level = device.player().volume().map(|v| v.level());
    assert_eq!(level, Some(14.0 / 21.0));
    assert_eq!(drain(&updates), 0);
}

#[test]
fn test_commands_publish_to_command_topics() {
    let (mut device, _updates) = create_device();
    let player = device.player_mut();

    let publishes = vec![
        player.execute(PlayerCommand::SetVolume { volume: 0.5 }),
        player.execute(PlayerCommand::Play),
        player.execute(PlayerCommand::Pause),
        player.execute(PlayerCommand::Stop),
        player.execute(PlayerCommand::Next),
        player.execute(PlayerCommand::Previous),
        player.execute(PlayerCommand::TurnOff),
    ];

    let pairs: Vec<(&str, &str)> = publishes
        .iter()
        .map(|p| (p.topic.as_str(), p.payload.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Cmnd/Loudness", "11"),
            ("Cmnd/TrackControl", "3"),
            ("Cmnd/TrackControl", "3"),
            ("Cmnd/TrackControl", "1"),
            ("Cmnd/TrackControl", "4"),
            ("Cmnd/TrackControl", "5"),
            ("Cmnd/Sleep", "0"),
        ]
    );
    assert_eq!(device.player().state(), PlayerState::Off);
}

// ============================================================================
// Availability
// ============================================================================

#[test]
fn test_offline_then_online() {
    let (mut device, _updates) = create_device();
    device.dispatch("State/Track", "(4/9): Song.flac");
    device.dispatch("State/Loudness", "10");

    device.dispatch("State/State", "Offline");
    let player = device.player();
    assert_eq!(player.state(), PlayerState::Off);
    assert_eq!(player.volume(), None);
    assert!(player.track().is_empty());
    assert!(!player.is_available());

    device.dispatch("State/State", "Online");
    let player = device.player();
    assert_eq!(player.state(), PlayerState::Idle);
    assert!(player.is_available());
    assert!(player.track().is_empty());

    // Metadata returns with the next track message
    device.dispatch("State/Track", "(5/9): Next.flac");
    assert_eq!(device.player().track().title.as_deref(), Some("Next"));
}

#[test]
fn test_presence_is_idempotent() {
    let (notifier, updates) = notify::channel();
    let identity = DeviceIdentity::new("kids");
    let topics = TopicResolver::with_defaults("kids");
    let mut device = EspuinoDevice::new(identity, topics, &[], notifier);

    device.dispatch("State/State", "Offline");
    device.dispatch("State/State", "Offline");
    assert_eq!(drain(&updates), 1);

    device.dispatch("State/State", "Online");
    device.dispatch("State/State", "Online");
    assert_eq!(drain(&updates), 1);
}

#[test]
fn test_unknown_presence_payload_is_ignored() {
    let (mut device, updates) = create_device();
    device.dispatch("State/State", "rebooting");
    assert!(device.player().is_available());
    assert_eq!(drain(&updates), 0);
}

#[test]
fn test_turned_off_player_comes_back_idle() {
    let (mut device, _updates) = create_device();
    device.player_mut().turn_off();
    assert_eq!(device.player().state(), PlayerState::Off);

    // Device goes to sleep and drops off the broker, then wakes up
    device.dispatch("State/State", "Offline");
    device.dispatch("State/State", "Online");
    assert_eq!(device.player().state(), PlayerState::Idle);
}

#[test]
fn test_sensors_follow_availability() {
    let (mut device, _updates) = create_device();
    device.dispatch("State/Battery", "55");
    device.dispatch("State/SoftwareRevision", "ESPuino v2.2");

    assert_eq!(
        device.sensor(SensorKind::Battery).and_then(|s| s.value()),
        Some(&SensorValue::Number(55.0))
    );

    device.dispatch("State/State", "Offline");
    assert!(device.sensors().iter().all(|s| s.value().is_none()));
    assert!(device.sensors().iter().all(|s| !s.is_available()));
}

// ============================================================================
// Topic scoping
// ============================================================================

#[test]
fn test_device_scoped_topics() {
    let (notifier, _updates) = notify::channel();
    let identity = DeviceIdentity::new("living");
    let topics = TopicResolver::new("living", "espuino/{device}/State", "espuino/{device}/Cmnd");
    let mut device = EspuinoDevice::new(identity, topics, &[], notifier);

    assert!(!device.dispatch("State/Track", "(1/1): X.mp3"));
    assert!(device.dispatch("espuino/living/State/Track", "(1/1): X.mp3"));
    assert_eq!(
        device.player_mut().next_track().topic,
        "espuino/living/Cmnd/TrackControl"
    );
}
