//! Host collaborator seams.
//!
//! The controller never touches the rendering engine, the DOM or the toast
//! UI directly. Everything it needs from the surrounding host goes through
//! the traits in this module, which the integration layer implements (and
//! [`crate::sim`] implements in memory).
//!
//! ```text
//! Controller
//!   ├── HostContext  identity, role, scene-control refresh
//!   ├── Canvas       camera + input gating
//!   ├── Stage        letterbox overlay + top-level UI regions
//!   ├── Notifier     toasts + progress toasts
//!   ├── SettingsProvider
//!   └── Clock        epoch milliseconds (timestamps, cosmetic timers)
//! ```

use crate::settings::SettingsProvider;
use crate::types::{ClientId, Role, ViewState};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

pub trait HostContext {
    fn client_id(&self) -> ClientId;

    /// Display name, for logs only.
    fn user_name(&self) -> String;

    /// Read on every call; the host may change it between calls.
    fn role(&self) -> Role;

    /// Re-render the director's scene controls so the lock tool shows `locked`.
    fn refresh_controls(&mut self, locked: bool);
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Input affordances of the canvas that a lock gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFlags {
    pub stage_interactive: bool,
    pub mouse_interaction_enabled: bool,
    pub drag_drop_enabled: bool,
}

impl InputFlags {
    pub fn all(enabled: bool) -> Self {
        Self {
            stage_interactive: enabled,
            mouse_interaction_enabled: enabled,
            drag_drop_enabled: enabled,
        }
    }
}

impl Default for InputFlags {
    fn default() -> Self {
        Self::all(true)
    }
}

pub trait Canvas {
    fn ready(&self) -> bool;

    fn current_view(&self) -> ViewState;

    /// Jump to `view` instantly.
    fn pan(&mut self, view: ViewState);

    /// Whether [`animate_pan`](Canvas::animate_pan) is a real animation.
    fn supports_animated_pan(&self) -> bool {
        false
    }

    /// Animate to `view` over `duration_ms`. Only called when
    /// [`supports_animated_pan`](Canvas::supports_animated_pan) is true.
    fn animate_pan(&mut self, view: ViewState, _duration_ms: u32) {
        self.pan(view);
    }

    fn set_input(&mut self, flags: InputFlags);

    /// Drop whatever the local user currently has selected.
    fn release_selection(&mut self);
}

// ---------------------------------------------------------------------------
// Stage (presentation surface)
// ---------------------------------------------------------------------------

/// Appearance of a freshly created letterbox overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub color: String,
    pub opacity: f64,
    /// Overlay swallows pointer input (participants only).
    pub intercept_pointer: bool,
}

/// A top-level UI element that can be hidden in cinematic mode.
///
/// The render surface and the overlay itself are never listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiRegion {
    pub id: String,
    /// The main interface region, which gets the scale / z-index emphasis.
    pub primary: bool,
}

/// Inline style properties the effector reads and writes.
///
/// `None` means the property is unset on the element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionStyle {
    pub opacity: Option<f64>,
    pub transition: Option<String>,
    pub pointer_events: Option<String>,
    pub scale: Option<f64>,
    pub z_index: Option<i32>,
}

pub trait Stage {
    fn overlay_exists(&self) -> bool;

    /// Create the overlay with both bars at 0 height.
    fn create_overlay(&mut self, spec: &OverlaySpec);

    /// Transition both bars to `pct` percent of the viewport height.
    ///
    /// Returns `false` when the overlay has no bars to animate.
    fn set_bars_height(&mut self, pct: u8, transition_ms: u32) -> bool;

    fn remove_overlay(&mut self);

    fn ui_regions(&self) -> Vec<UiRegion>;

    fn region_style(&self, id: &str) -> RegionStyle;

    fn set_region_style(&mut self, id: &str, style: RegionStyle);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Every user-facing message the module can show.
///
/// The host localises [`Notice::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    DirectorOnlyCanvasLock,
    DirectorOnlySync,
    DirectorOnlyReset,
    CanvasLocked,
    CanvasUnlocked,
    CanvasLockedLocal,
    CanvasUnlockedLocal,
    CanvasNotReady,
    PlayersSynchronizing,
    ViewSynchronized,
}

impl Notice {
    pub fn key(self) -> &'static str {
        match self {
            Notice::DirectorOnlyCanvasLock => "simple-cinematic-pan.notifications.gm-only-canvas-lock",
            Notice::DirectorOnlySync => "simple-cinematic-pan.notifications.gm-only-sync",
            Notice::DirectorOnlyReset => "simple-cinematic-pan.notifications.gm-only-reset",
            Notice::CanvasLocked => "simple-cinematic-pan.notifications.canvas-locked",
            Notice::CanvasUnlocked => "simple-cinematic-pan.notifications.canvas-unlocked",
            Notice::CanvasLockedLocal => "simple-cinematic-pan.notifications.canvas-locked-local",
            Notice::CanvasUnlockedLocal => {
                "simple-cinematic-pan.notifications.canvas-unlocked-local"
            }
            Notice::CanvasNotReady => "simple-cinematic-pan.notifications.canvas-not-ready",
            Notice::PlayersSynchronizing => {
                "simple-cinematic-pan.notifications.players-synchronizing"
            }
            Notice::ViewSynchronized => "simple-cinematic-pan.notifications.view-synchronized",
        }
    }
}

/// Handle to a progress toast returned by [`Notifier::begin_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressId(pub u64);

pub trait Notifier {
    fn notify(&mut self, level: Level, notice: Notice);

    fn begin_progress(&mut self, notice: Notice) -> ProgressId;

    /// `pct` is in `0.0..=1.0`; `message` replaces the toast text.
    fn update_progress(&mut self, id: ProgressId, pct: f64, message: Option<Notice>);
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

pub trait Clock {
    /// Milliseconds since the Unix epoch. Must never go backwards.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Every collaborator a [`Controller`](crate::Controller) needs.
pub struct Host {
    pub context: Box<dyn HostContext>,
    pub canvas: Box<dyn Canvas>,
    pub stage: Box<dyn Stage>,
    pub notifier: Box<dyn Notifier>,
    pub settings: Box<dyn SettingsProvider>,
    pub clock: Box<dyn Clock>,
}
