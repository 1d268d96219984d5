//! Volume level and conversion to the device's native range
//!
//! ESPuino reports and accepts loudness as an integer in `0..=21`. Observers
//! work with a normalized level in `0.0..=1.0`.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};

/// Highest loudness step the device accepts
pub const DEVICE_VOLUME_MAX: u8 = 21;

/// Normalized volume level (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    /// Create a volume, clamping into `0.0..=1.0`
    ///
    /// NaN is treated as silence.
    pub fn new(level: f64) -> Self {
        if level.is_nan() {
            return Self(0.0);
        }
        Self(level.clamp(0.0, 1.0))
    }

    pub fn level(&self) -> f64 {
        self.0
    }

    /// Convert to the device's loudness step
    ///
    /// Scales by 21 and rounds half up.
    pub fn to_device(&self) -> u8 {
        to_device(self.0)
    }

    /// Parse a loudness payload published by the device
    pub fn from_device(raw: &str) -> Result<Self> {
        from_device(raw).map(Volume)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Map a normalized level onto the device range `0..=21`
pub fn to_device(level: f64) -> u8 {
    if level.is_nan() {
        return 0;
    }
    let scaled = (level.clamp(0.0, 1.0) * f64::from(DEVICE_VOLUME_MAX) + 0.5).floor();
    scaled.clamp(0.0, f64::from(DEVICE_VOLUME_MAX)) as u8
}

/// Map a device loudness payload onto `0.0..=1.0`
///
/// Surrounding whitespace is ignored. Out-of-range integers are clamped,
/// including ones too large for any machine integer.
pub fn from_device(raw: &str) -> Result<f64> {
    let steps: i64 = match raw.trim().parse() {
        Ok(steps) => steps,
        Err(source) => match source.kind().clone() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => {
                return Err(StateError::InvalidLoudness {
                    payload: raw.to_string(),
                    source,
                })
            }
        },
    };
    Ok((steps as f64 / f64::from(DEVICE_VOLUME_MAX)).clamp(0.0, 1.0))
}
