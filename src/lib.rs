//! Cinematic Pan
//!
//! Director-driven shared camera for collaborative sessions: one privileged
//! client (the *director*) can push its view to every participant, lock
//! their canvas input, and letterbox everyone's screen while the lock holds.
//!
//! ## Architecture
//!
//! ```text
//! CinematicModule  (module.rs)      ← "not yet initialised" slot, host hooks
//!   └── Controller  (controller.rs) ← lock state, authority, dispatch
//!         ├── Transport  (transport.rs) ← subscribe once, ordered inbox
//!         ├── Effector   (overlay.rs)   ← letterbox bars + UI hiding
//!         └── Host       (host.rs)      ← canvas, stage, notifier, settings
//! ```
//!
//! Every controller runs single-threaded inside its own client. Messages on
//! the channel are JSON envelopes defined in [`protocol`]; the director
//! applies its own changes immediately and ignores its echoes.

pub mod commands;
pub mod controller;
pub mod error;
pub mod host;
pub mod module;
pub mod overlay;
pub mod protocol;
pub mod settings;
pub mod sim;
pub mod timer;
pub mod transport;
pub mod types;

pub use commands::DirectorCommand;
pub use controller::Controller;
pub use error::CinematicError;
pub use module::CinematicModule;
pub use protocol::{Message, Payload};
pub use settings::{CinematicSettings, SettingsProvider};
pub use transport::{Channel, MemoryBus, Transport};
pub use types::{ClientId, Role, SceneInfo, SessionState, ViewState};
