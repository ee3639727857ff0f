//! Transport adapter over the host's publish/subscribe channel.
//!
//! ## Delivery model
//!
//! ```text
//! Channel (host socket, MemoryBus, …)
//!   publish(CHANNEL, bytes) ──► every subscriber's Inbox (sender included)
//!
//! Transport
//!   connect()  subscribes exactly once
//!   send()     encode + publish, failures logged and swallowed
//!   poll()     drain Inbox in arrival order → decode → Vec<Message>
//! ```
//!
//! Frames are queued rather than delivered by callback, so a handler that
//! publishes while it runs can never re-enter the controller. The adapter
//! does no reordering or buffering beyond the inbox itself.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::error::CinematicError;
use crate::protocol::{subjects, Message};

// ---------------------------------------------------------------------------
// Channel seam
// ---------------------------------------------------------------------------

/// Queue of raw frames received for one subscriber.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    frames: Arc<Mutex<VecDeque<Bytes>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by channel implementations when a frame arrives.
    pub fn push(&self, frame: Bytes) {
        self.frames.lock().push_back(frame);
    }

    pub fn drain(&self) -> Vec<Bytes> {
        self.frames.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}

/// A broadcast channel: reliable, ordered per sender, at-least-once, and
/// (typically) echoing a sender's frames back to itself.
pub trait Channel: Send + Sync {
    fn subscribe(&self, channel: &str) -> Result<Inbox, CinematicError>;

    fn publish(&self, channel: &str, payload: Bytes) -> Result<(), CinematicError>;
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

struct Link {
    channel: Arc<dyn Channel>,
    inbox: Inbox,
}

/// Wraps a [`Channel`] for one controller.
///
/// Built without a channel (or with one that refuses the subscription) it
/// degrades to a no-op: nothing is sent and nothing arrives.
pub struct Transport {
    link: Option<Link>,
}

impl Transport {
    pub fn connect(channel: Option<Arc<dyn Channel>>) -> Self {
        let Some(channel) = channel else {
            warn!("Channel not available, synchronisation disabled");
            return Self::disconnected();
        };

        match channel.subscribe(subjects::CHANNEL) {
            Ok(inbox) => {
                debug!("Subscribed to {}", subjects::CHANNEL);
                Self {
                    link: Some(Link { channel, inbox }),
                }
            }
            Err(e) => {
                warn!("Failed to subscribe to {}: {}", subjects::CHANNEL, e);
                Self::disconnected()
            }
        }
    }

    pub fn disconnected() -> Self {
        Self { link: None }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Encode and publish `msg`. Never fails from the caller's view.
    pub fn send(&self, msg: &Message) {
        let Some(link) = &self.link else {
            error!("Channel not available for sending {}", msg.kind());
            return;
        };

        match msg.encode() {
            Ok(payload) => {
                debug!("Emitting {} from {}", msg.kind(), msg.sender);
                if let Err(e) = link.channel.publish(subjects::CHANNEL, Bytes::from(payload)) {
                    warn!("Failed to publish {}: {}", msg.kind(), e);
                }
            }
            Err(e) => warn!("Failed to serialise {}: {}", msg.kind(), e),
        }
    }

    /// Drain every frame received so far, in arrival order.
    ///
    /// Undecodable frames and unknown message types are logged and dropped.
    pub fn poll(&self) -> Vec<Message> {
        let Some(link) = &self.link else {
            return Vec::new();
        };

        link.inbox
            .drain()
            .into_iter()
            .filter_map(|frame| match Message::decode(&frame) {
                Ok(msg) => Some(msg),
                Err(CinematicError::UnknownMessageType(kind)) => {
                    warn!("Unknown message type: {}", kind);
                    None
                }
                Err(e) => {
                    warn!("Dropping malformed frame: {}", e);
                    None
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// In-process channel
// ---------------------------------------------------------------------------

/// Broadcast channel living in one process.
///
/// Every publish is copied into every subscriber's inbox, the publisher's
/// own included, which is how real host sockets behave too. Cheap to clone.
#[derive(Clone, Default)]
pub struct MemoryBus {
    inner: Arc<Mutex<BusState>>,
}

#[derive(Default)]
struct BusState {
    subscribers: HashMap<String, Vec<Inbox>>,
    unavailable: bool,
    published: u64,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: subscribe and publish fail until re-enabled.
    pub fn set_available(&self, available: bool) {
        self.inner.lock().unavailable = !available;
    }

    /// Total number of frames accepted since creation.
    pub fn published(&self) -> u64 {
        self.inner.lock().published
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .lock()
            .subscribers
            .get(channel)
            .map_or(0, |subs| subs.len())
    }
}

impl Channel for MemoryBus {
    fn subscribe(&self, channel: &str) -> Result<Inbox, CinematicError> {
        let mut state = self.inner.lock();
        if state.unavailable {
            return Err(CinematicError::TransportUnavailable(
                "memory bus offline".into(),
            ));
        }
        let inbox = Inbox::new();
        state
            .subscribers
            .entry(channel.to_string())
            .or_default()
            .push(inbox.clone());
        Ok(inbox)
    }

    fn publish(&self, channel: &str, payload: Bytes) -> Result<(), CinematicError> {
        let mut state = self.inner.lock();
        if state.unavailable {
            return Err(CinematicError::TransportUnavailable(
                "memory bus offline".into(),
            ));
        }
        state.published += 1;
        if let Some(subs) = state.subscribers.get(channel) {
            for inbox in subs {
                inbox.push(payload.clone());
            }
        }
        Ok(())
    }
}
