//! Core session types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Camera position and zoom of one client.
///
/// `x`/`y` are the view centre in world space; `scale` is the zoom factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewState {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl ViewState {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// A view is usable when every component is finite and the zoom is positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.scale.is_finite() && self.scale > 0.0
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}) x{:.2}", self.x, self.y, self.scale)
    }
}

// ---------------------------------------------------------------------------
// Identity & role
// ---------------------------------------------------------------------------

/// Opaque identifier of a connected client, as assigned by the host.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Privilege of the local client.
///
/// Never stored: always read back from the host at the time of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Director,
    Participant,
}

impl Role {
    pub fn is_director(self) -> bool {
        matches!(self, Role::Director)
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The parts of a host scene document the module reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneInfo {
    pub name: String,
    /// Scene is the one currently shown to players.
    pub active: bool,
    /// `cinematicModeOnLoadScene` flag, set by the director in scene config.
    pub cinematic_mode_on_load: bool,
    /// Scene's configured initial camera, if any.
    pub initial_view: Option<ViewState>,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Per-process lock state, owned by the controller.
///
/// Only [`SessionState::transition`] writes the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    locked: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Set the lock flag; returns the previous value.
    pub(crate) fn transition(&mut self, locked: bool) -> bool {
        std::mem::replace(&mut self.locked, locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_validity() {
        assert!(ViewState::new(1.0, -2.0, 0.5).is_valid());
        assert!(!ViewState::new(1.0, 2.0, 0.0).is_valid());
        assert!(!ViewState::new(f64::NAN, 2.0, 1.0).is_valid());
    }

    #[test]
    fn transition_reports_previous() {
        let mut s = SessionState::new();
        assert!(!s.transition(true));
        assert!(s.transition(false));
        assert!(!s.locked());
    }

    #[test]
    fn client_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ClientId::new("u1")).unwrap();
        assert_eq!(json, "\"u1\"");
    }
}
