use thiserror::Error;

use crate::logging::LoggingError;

/// Errors that can occur while running the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration rejected before connecting
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Request could not be queued on the MQTT client
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// Entity snapshot could not be encoded
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Payload on the control topic was not a player command
    #[error("Invalid player command: {0}")]
    InvalidCommand(#[source] serde_json::Error),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
