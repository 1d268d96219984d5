//! Availability supervision
//!
//! The device announces itself with `Online` and (via last will) `Offline` on
//! its presence topic. One [`AvailabilitySupervisor`] per device tracks that
//! signal and, on every real transition, drives the [`AvailabilityHooks`] of
//! each entity belonging to the device.

use crate::error::StateError;
use crate::model::Availability;

/// Per-entity reaction to the device dropping off or coming back
///
/// Implementors clear whatever they can no longer vouch for when the device
/// goes offline, and move back to a neutral known state when it returns.
/// Each implementor emits its own update notification if it changed.
pub trait AvailabilityHooks {
    /// Device stopped responding
    fn on_device_offline(&mut self);

    /// Device is reachable again
    fn on_device_online(&mut self);
}

/// Tracks the device presence signal
#[derive(Debug, Clone, Default)]
pub struct AvailabilitySupervisor {
    current: Availability,
}

impl AvailabilitySupervisor {
    /// Supervisor starting in the `Online` state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Availability {
        self.current
    }

    pub fn is_online(&self) -> bool {
        self.current.is_online()
    }

    /// Handle one presence payload
    ///
    /// Unknown payloads and repeats of the current state are ignored. Returns
    /// whether a transition happened (and the hooks were run).
    pub fn handle_presence(
        &mut self,
        payload: &str,
        entities: &mut [&mut dyn AvailabilityHooks],
    ) -> bool {
        let Some(next) = Availability::from_payload(payload) else {
            tracing::debug!("{}", StateError::UnknownPresence(payload.to_string()));
            return false;
        };

        if next == self.current {
            tracing::trace!("Presence unchanged: {:?}", next);
            return false;
        }

        tracing::info!("Device presence changed: {:?} -> {:?}", self.current, next);
        self.current = next;

        for entity in entities.iter_mut() {
            match next {
                Availability::Offline => entity.on_device_offline(),
                Availability::Online => entity.on_device_online(),
            }
        }

        true
    }
}
