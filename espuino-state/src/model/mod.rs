//! Model types for espuino-state

mod availability;
mod device_identity;
mod player_state;
mod track_info;
mod volume;

pub use availability::{Availability, PAYLOAD_OFFLINE, PAYLOAD_ONLINE};
pub use device_identity::{DeviceIdentity, DeviceInfo, IDENTIFIER_DOMAIN, MANUFACTURER};
pub use player_state::PlayerState;
pub use track_info::TrackInfo;
pub use volume::{from_device, to_device, Volume, DEVICE_VOLUME_MAX};
