//! Error types for espuino-state
//!
//! None of these escape message handling: handlers build them at the point
//! of detection, log them and keep the previous state.

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Result type for espuino-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while interpreting device payloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Loudness payload was not an integer
    #[error("Invalid loudness payload {payload:?}: {source}")]
    InvalidLoudness {
        payload: String,
        #[source]
        source: ParseIntError,
    },

    /// Playback-state payload was not one of the known words
    #[error("Unknown playback state payload: {0:?}")]
    UnknownPlaybackState(String),

    /// Presence payload was neither `Online` nor `Offline`
    #[error("Unknown presence payload: {0:?}")]
    UnknownPresence(String),

    /// Numeric sensor payload did not parse
    #[error("Invalid {kind} payload {payload:?}: {source}")]
    InvalidSensorValue {
        kind: &'static str,
        payload: String,
        #[source]
        source: ParseFloatError,
    },
}
