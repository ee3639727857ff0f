//! Error taxonomy.
//!
//! No variant is fatal to the host: each one degrades a single feature
//! (sync, lock, notification) and the session carries on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CinematicError {
    /// A participant invoked a director-only operation.
    #[error("{operation} requires the director role")]
    Authority { operation: &'static str },

    /// The canvas reported not ready.
    #[error("canvas not ready for {operation}")]
    NotReady { operation: &'static str },

    /// The channel failed to initialise or to send.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A message with an unrecognised `type` arrived.
    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),

    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("host reported an empty client id")]
    EmptyClientId,

    #[error("settings error: {0}")]
    Settings(String),

    /// A host event arrived before (or after a failed) initialisation.
    #[error("module not initialised")]
    Uninitialized,
}
