//! Controller – session lock state, authority gating and message dispatch.
//!
//! ## Authority
//!
//! | Operation                    | Who may call | Broadcasts                 |
//! |------------------------------|--------------|----------------------------|
//! | `set_lock` / `toggle_lock`   | director     | `canvas-lock`              |
//! | `sync_view`                  | director     | `canvas-lock`?, `sync-view`|
//! | `reset_and_resync_all_users` | director     | `reset`                    |
//! | `apply_canvas_lock`          | anyone       | –                          |
//! | `apply_view`                 | participants | –                          |
//! | `reset`                      | anyone       | –                          |
//! | `handle_player_connected`    | anyone       | `player-connected`         |
//!
//! The director applies its own changes synchronously and ignores the echo
//! of its broadcasts. Receivers apply messages in the order the transport
//! hands them over; there is no sequencing across senders, so a `reset`
//! racing a `sync-view` resolves to whichever is processed last.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::commands::DirectorCommand;
use crate::error::CinematicError;
use crate::host::{Host, InputFlags, Level, Notice, ProgressId};
use crate::overlay::Effector;
use crate::protocol::{Message, Payload};
use crate::transport::{Channel, Transport};
use crate::types::{ClientId, Role, SceneInfo, SessionState, ViewState};

/// Cosmetic progress toast shown to the director while participants pan.
#[derive(Debug)]
struct Progress {
    id: ProgressId,
    started_at: u64,
    duration_ms: u32,
    /// Last percentage pushed to the toast.
    reported: u32,
}

pub struct Controller {
    session: SessionState,
    host: Host,
    transport: Transport,
    effector: Effector,
    progress: Vec<Progress>,
}

impl Controller {
    /// Build a controller and subscribe to the module channel.
    ///
    /// A missing or refusing `channel` leaves the controller in local-only
    /// mode; only an unusable host identity is an error.
    pub fn new(host: Host, channel: Option<Arc<dyn Channel>>) -> Result<Self, CinematicError> {
        let client_id = host.context.client_id();
        if client_id.as_str().is_empty() {
            return Err(CinematicError::EmptyClientId);
        }
        info!(
            "Cinematic pan initialised for {} ({})",
            host.context.user_name(),
            client_id
        );

        Ok(Self {
            session: SessionState::new(),
            host,
            transport: Transport::connect(channel),
            effector: Effector::new(),
            progress: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn is_locked(&self) -> bool {
        self.session.locked()
    }

    pub fn role(&self) -> Role {
        self.host.context.role()
    }

    pub fn client_id(&self) -> ClientId {
        self.host.context.client_id()
    }

    pub fn is_synchronised(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn effector(&self) -> &Effector {
        &self.effector
    }

    /// True while a cosmetic timer or progress toast is still running.
    pub fn has_pending_effects(&self) -> bool {
        self.effector.has_pending_effects() || !self.progress.is_empty()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Module-ready behaviour: a director clears stale state everywhere, a
    /// participant announces itself so a locked director re-sends the lock.
    pub fn start(&mut self) {
        if self.role().is_director() {
            if let Err(e) = self.reset_and_resync_all_users() {
                warn!("Startup reset failed: {}", e);
            }
        } else {
            self.handle_player_connected();
        }
    }

    /// Drain the transport and dispatch every message, in arrival order.
    ///
    /// Returns the number of messages handled.
    pub fn pump(&mut self) -> usize {
        let messages = self.transport.poll();
        let count = messages.len();
        for msg in messages {
            self.handle_message(msg);
        }
        count
    }

    /// Advance cosmetic timers and progress toasts to the clock's now.
    pub fn tick(&mut self) {
        let now = self.host.clock.now_ms();
        self.effector.tick(&mut *self.host.stage, now);
        self.advance_progress(now);
    }

    // -----------------------------------------------------------------------
    // Director-only operations
    // -----------------------------------------------------------------------

    /// Engage or release the shared lock and tell everyone.
    pub fn set_lock(&mut self, locked: bool) -> Result<(), CinematicError> {
        debug!(
            "set_lock({}) called by {}",
            locked,
            self.host.context.user_name()
        );
        self.require_director("set_lock", Notice::DirectorOnlyCanvasLock)?;

        self.session.transition(locked);
        self.host.context.refresh_controls(locked);
        self.broadcast(Payload::CanvasLock { locked });
        self.apply_effects(locked);

        self.notify(
            Level::Info,
            if locked {
                Notice::CanvasLocked
            } else {
                Notice::CanvasUnlocked
            },
        );
        Ok(())
    }

    pub fn toggle_lock(&mut self) -> Result<(), CinematicError> {
        self.set_lock(!self.is_locked())
    }

    /// Push the director's current view to every participant.
    ///
    /// Locks first if needed. `animation_duration` of `None` or `Some(0)`
    /// falls back to the `animation-duration` setting.
    pub fn sync_view(&mut self, animation_duration: Option<u32>) -> Result<(), CinematicError> {
        debug!("sync_view() called by {}", self.host.context.user_name());
        self.require_director("sync_view", Notice::DirectorOnlySync)?;

        if !self.host.canvas.ready() {
            warn!("Canvas not ready, cannot sync view");
            self.notify(Level::Error, Notice::CanvasNotReady);
            return Err(CinematicError::NotReady {
                operation: "sync_view",
            });
        }

        if !self.is_locked() {
            self.set_lock(true)?;
        }

        let view = self.host.canvas.current_view();
        let duration = self.resolve_duration(animation_duration);
        debug!("Sending view {} over {}ms", view, duration);

        self.broadcast(Payload::SyncView {
            view,
            animation_duration: Some(duration),
        });
        self.pan_canvas(view, duration);
        self.begin_progress(duration);
        Ok(())
    }

    /// Tell every client to reset, then reset locally without waiting for
    /// the echo.
    pub fn reset_and_resync_all_users(&mut self) -> Result<(), CinematicError> {
        self.require_director("reset_and_resync_all_users", Notice::DirectorOnlyReset)?;
        self.broadcast(Payload::Reset);
        self.reset();
        Ok(())
    }

    pub fn execute(&mut self, command: DirectorCommand) -> Result<(), CinematicError> {
        debug!("Executing {:?}", command);
        match command {
            DirectorCommand::SetLock(locked) => self.set_lock(locked),
            DirectorCommand::ToggleLock => self.toggle_lock(),
            DirectorCommand::SyncViewNow => self.sync_view(None),
            DirectorCommand::ResetAndResync => self.reset_and_resync_all_users(),
        }
    }

    // -----------------------------------------------------------------------
    // Local application
    // -----------------------------------------------------------------------

    /// Apply a lock state locally without broadcasting.
    ///
    /// Participants get their canvas input gated; everyone gets bars and UI
    /// hiding. Silently ignored while the canvas is not ready.
    pub fn apply_canvas_lock(&mut self, locked: bool) {
        debug!("Applying canvas lock locally: {}", locked);
        if !self.host.canvas.ready() {
            debug!("Canvas not ready, lock not applied");
            return;
        }

        self.session.transition(locked);

        if !self.role().is_director() {
            self.host.canvas.set_input(InputFlags::all(!locked));
            if locked {
                self.host.canvas.release_selection();
            }
            debug!(
                "Canvas interactions {}",
                if locked { "disabled" } else { "enabled" }
            );
        }

        self.apply_effects(locked);
        self.notify(
            Level::Info,
            if locked {
                Notice::CanvasLockedLocal
            } else {
                Notice::CanvasUnlockedLocal
            },
        );
    }

    /// Animate to a view pushed by the director, engaging the lock (and its
    /// effects) first if needed. Ignored on the director.
    pub fn apply_view(&mut self, view: ViewState, animation_duration: Option<u32>) {
        if self.role().is_director() {
            debug!("Director ignores remote view {}", view);
            return;
        }
        if !self.host.canvas.ready() {
            debug!("Canvas not ready, view not applied");
            return;
        }
        if !view.is_valid() {
            warn!("Ignoring invalid view {}", view);
            return;
        }

        if !self.is_locked() {
            self.apply_canvas_lock(true);
        }
        let duration = self.resolve_duration(animation_duration);
        self.pan_canvas(view, duration);
    }

    /// Clear lock, bars and UI hiding locally. Idempotent.
    ///
    /// Does not go through [`set_lock`](Self::set_lock), so it never
    /// broadcasts and works on any role.
    pub fn reset(&mut self) {
        debug!("reset() called");
        if self.is_locked() {
            self.session.transition(false);
            if !self.role().is_director() {
                self.host.canvas.set_input(InputFlags::all(true));
            }
            self.host.context.refresh_controls(false);
            self.apply_effects(false);
        }
        self.session.transition(false);
    }

    /// Announce a freshly initialised participant.
    pub fn handle_player_connected(&mut self) {
        self.broadcast(Payload::PlayerConnected);
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Apply one message received from the channel.
    pub fn handle_message(&mut self, msg: Message) {
        if msg.sender == self.client_id() {
            debug!("Ignoring {} from self", msg.kind());
            return;
        }
        debug!("Processing {} from {}", msg.kind(), msg.sender);

        match msg.payload {
            Payload::SyncView {
                view,
                animation_duration,
            } => self.apply_view(view, animation_duration),
            Payload::CanvasLock { locked } => self.apply_canvas_lock(locked),
            Payload::Reset => self.reset(),
            Payload::PlayerConnected => {
                if self.role().is_director() && self.is_locked() {
                    if let Err(e) = self.set_lock(true) {
                        warn!("Failed to re-send lock state: {}", e);
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    /// A scene flagged for cinematic-on-load became active: participants
    /// lock themselves without any network round trip.
    pub fn on_scene_updated(&mut self, scene: &SceneInfo) {
        debug!(
            "Scene '{}' updated (active={}, cinematic_on_load={})",
            scene.name, scene.active, scene.cinematic_mode_on_load
        );
        if scene.cinematic_mode_on_load
            && scene.active
            && !self.is_locked()
            && !self.role().is_director()
        {
            info!("Cinematic mode on load for scene '{}'", scene.name);
            self.apply_canvas_lock(true);
        }
    }

    /// The canvas finished (re)drawing a scene while a participant is locked.
    pub fn on_canvas_ready(&mut self, scene: &SceneInfo) {
        if !self.is_locked() || self.role().is_director() {
            return;
        }
        self.host.canvas.release_selection();
        if scene.cinematic_mode_on_load {
            if let Some(view) = scene.initial_view {
                self.apply_view(view, None);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_director(
        &mut self,
        operation: &'static str,
        notice: Notice,
    ) -> Result<(), CinematicError> {
        if self.role().is_director() {
            return Ok(());
        }
        warn!("Participant attempted {}", operation);
        self.notify(Level::Warn, notice);
        Err(CinematicError::Authority { operation })
    }

    fn broadcast(&self, payload: Payload) {
        let msg = Message::new(payload, self.client_id(), self.host.clock.now_ms());
        self.transport.send(&msg);
    }

    fn apply_effects(&mut self, locked: bool) {
        let role = self.role();
        let now = self.host.clock.now_ms();
        let stage = &mut *self.host.stage;
        let settings = &*self.host.settings;
        self.effector.set_bars(locked, stage, settings, role, now);
        self.effector.set_ui_hidden(locked, stage, settings, role, now);
    }

    fn pan_canvas(&mut self, view: ViewState, duration_ms: u32) {
        if self.host.canvas.supports_animated_pan() {
            debug!("Animating pan to {} over {}ms", view, duration_ms);
            self.host.canvas.animate_pan(view, duration_ms);
        } else {
            debug!("Animated pan unavailable, jumping to {}", view);
            self.host.canvas.pan(view);
        }
    }

    fn resolve_duration(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|ms| *ms > 0)
            .unwrap_or_else(|| self.host.settings.animation_duration_ms())
    }

    /// Info toasts go to the director only; warnings and errors go to
    /// whoever caused them. Everything respects `show-notifications`.
    fn notify(&mut self, level: Level, notice: Notice) {
        if !self.host.settings.show_notifications() {
            return;
        }
        if level == Level::Info && !self.role().is_director() {
            return;
        }
        debug!("Showing notification {} ({:?})", notice.key(), level);
        self.host.notifier.notify(level, notice);
    }

    fn begin_progress(&mut self, duration_ms: u32) {
        if !self.host.settings.show_notifications() {
            return;
        }
        let id = self.host.notifier.begin_progress(Notice::PlayersSynchronizing);
        self.progress.push(Progress {
            id,
            started_at: self.host.clock.now_ms(),
            duration_ms,
            reported: 0,
        });
    }

    fn advance_progress(&mut self, now: u64) {
        let notifier = &mut self.host.notifier;
        self.progress.retain_mut(|p| {
            let elapsed = now.saturating_sub(p.started_at);
            if elapsed >= p.duration_ms as u64 {
                notifier.update_progress(p.id, 1.0, Some(Notice::ViewSynchronized));
                return false;
            }
            let pct = (elapsed * 100 / p.duration_ms as u64) as u32;
            if pct > p.reported {
                p.reported = pct;
                notifier.update_progress(p.id, pct as f64 / 100.0, None);
            }
            true
        });
    }
}
