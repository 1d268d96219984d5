//! ESPuino Bridge
//!
//! Connects an [`espuino_state::EspuinoDevice`] to an MQTT broker with
//! rumqttc. The device's state topics are followed, entity snapshots are
//! published as retained JSON, and JSON player commands are turned into
//! device commands.
//!
//! ```text
//! broker ──Publish──▶ Bridge::handle_message ──▶ EspuinoDevice::dispatch
//!   ▲                        │                           │
//!   │                        ▼                           ▼
//!   └──── CommandSink ◀── snapshots / commands ◀── UpdateReceiver
//! ```
//!
//! Installing a tracing subscriber is left to the binary, see [`logging`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;
pub mod sink;

pub use bridge::Bridge;
pub use config::{Args, BridgeConfig};
pub use error::{BridgeError, Result};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use sink::CommandSink;
