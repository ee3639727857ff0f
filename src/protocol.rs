//! `module.simple-cinematic-pan` wire protocol.
//!
//! This module owns **every message that crosses the channel boundary**
//! between controllers running in different clients.
//!
//! ## Message kinds
//!
//! | `type`             | `data`                  | Sent by      | Effect on receivers            |
//! |--------------------|-------------------------|--------------|--------------------------------|
//! | `sync-view`        | `{x, y, scale}`         | director     | animate camera, engage lock    |
//! | `canvas-lock`      | `{locked}`              | director     | apply lock locally             |
//! | `reset`            | *(absent)*              | director     | clear lock, bars and UI hiding |
//! | `player-connected` | *(absent)*              | participant  | director re-sends lock state   |
//!
//! ## Design rules
//!
//! 1. The envelope is camelCase JSON: `type`, `data`, `timestamp`, `sender`,
//!    `animationDuration`.
//! 2. `timestamp` is informational; nothing orders messages by it.
//! 3. `animationDuration` only appears on `sync-view`.
//! 4. Unknown `type` values are rejected at decode time with
//!    [`CinematicError::UnknownMessageType`] so nothing past the transport
//!    ever sees them.

use serde::{Deserialize, Serialize};

use crate::error::CinematicError;
use crate::types::{ClientId, ViewState};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// `data` of a `canvas-lock` message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockPayload {
    pub locked: bool,
}

/// Typed body of a message, discriminated by the wire `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    SyncView {
        view: ViewState,
        /// Milliseconds; `None` lets the receiver use its own setting.
        animation_duration: Option<u32>,
    },
    CanvasLock {
        locked: bool,
    },
    Reset,
    PlayerConnected,
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::SyncView { .. } => kinds::SYNC_VIEW,
            Payload::CanvasLock { .. } => kinds::CANVAS_LOCK,
            Payload::Reset => kinds::RESET,
            Payload::PlayerConnected => kinds::PLAYER_CONNECTED,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// One unit of exchange on the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub payload: Payload,
    /// Emission time in epoch milliseconds.
    pub timestamp: u64,
    pub sender: ClientId,
}

impl Message {
    pub fn new(payload: Payload, sender: ClientId, timestamp: u64) -> Self {
        Self {
            payload,
            timestamp,
            sender,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    /// Serialise to the JSON envelope.
    pub fn encode(&self) -> Result<Vec<u8>, CinematicError> {
        serde_json::to_vec(&WireMessage::from(self)).map_err(CinematicError::Encode)
    }

    /// Parse a JSON envelope.
    pub fn decode(bytes: &[u8]) -> Result<Self, CinematicError> {
        let wire: WireMessage = serde_json::from_slice(bytes).map_err(CinematicError::Decode)?;
        wire.try_into()
    }
}

/// Raw envelope as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    timestamp: u64,
    sender: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    animation_duration: Option<u32>,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        let (data, animation_duration) = match &msg.payload {
            Payload::SyncView {
                view,
                animation_duration,
            } => (Some(serde_json::json!(view)), *animation_duration),
            Payload::CanvasLock { locked } => {
                (Some(serde_json::json!(LockPayload { locked: *locked })), None)
            }
            Payload::Reset | Payload::PlayerConnected => (None, None),
        };

        Self {
            kind: msg.kind().to_string(),
            data,
            timestamp: msg.timestamp,
            sender: msg.sender.clone(),
            animation_duration,
        }
    }
}

impl TryFrom<WireMessage> for Message {
    type Error = CinematicError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let payload = match wire.kind.as_str() {
            kinds::SYNC_VIEW => Payload::SyncView {
                view: data_as(wire.data)?,
                animation_duration: wire.animation_duration,
            },
            kinds::CANVAS_LOCK => {
                let LockPayload { locked } = data_as(wire.data)?;
                Payload::CanvasLock { locked }
            }
            kinds::RESET => Payload::Reset,
            kinds::PLAYER_CONNECTED => Payload::PlayerConnected,
            _ => return Err(CinematicError::UnknownMessageType(wire.kind)),
        };

        Ok(Self {
            payload,
            timestamp: wire.timestamp,
            sender: wire.sender,
        })
    }
}

fn data_as<T: serde::de::DeserializeOwned>(
    data: Option<serde_json::Value>,
) -> Result<T, CinematicError> {
    serde_json::from_value(data.unwrap_or(serde_json::Value::Null)).map_err(CinematicError::Decode)
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Wire `type` strings.
pub mod kinds {
    pub const SYNC_VIEW: &str = "sync-view";
    pub const CANVAS_LOCK: &str = "canvas-lock";
    pub const RESET: &str = "reset";
    pub const PLAYER_CONNECTED: &str = "player-connected";
}

/// Channel and module identity.
pub mod subjects {
    /// Module identity; also the settings namespace.
    pub const MODULE_ID: &str = "simple-cinematic-pan";
    /// The single channel every controller publishes and subscribes on.
    pub const CHANNEL: &str = "module.simple-cinematic-pan";
}
