//! Letterbox overlay and UI-hiding effector.
//!
//! Two independent local state machines keyed by the lock flag:
//!
//! ```text
//! bars:  Shown ──lock──► (create overlay, +10ms expand) Hidden
//!        Hidden ──unlock──► (shrink, +1s remove)        Shown
//!
//! ui:    Visible ──lock──► Hidden(saved styles)
//!        Hidden ──unlock──► Restoring(+1.5s per region) ──► Visible
//! ```
//!
//! Presence of the overlay on the [`Stage`] is the source of truth for the
//! bars, so repeated calls never create a second overlay or animate twice.
//! Deferred steps run from [`Effector::tick`]; a re-lock while a removal or
//! restore is still pending cancels it instead of racing it.

use std::collections::HashMap;

use log::debug;

use crate::host::{OverlaySpec, RegionStyle, Stage, UiRegion};
use crate::settings::SettingsProvider;
use crate::timer::{TimerId, TimerQueue};
use crate::types::Role;

pub const BAR_TRANSITION_MS: u32 = 1000;
pub const BAR_EXPAND_DELAY_MS: u64 = 10;
pub const UI_RESTORE_DELAY_MS: u64 = 1500;
pub const UI_ZINDEX_RESTORE_DELAY_MS: u64 = 100;
pub const PRIMARY_EMPHASIS_SCALE: f64 = 1.05;
pub const PRIMARY_EMPHASIS_Z_INDEX: i32 = 1;

const HIDE_TRANSITION: &str = "500ms ease-in-out";
const UNHIDE_TRANSITION: &str = "500ms 1s ease-in-out";
const POINTER_EVENTS_NONE: &str = "none";

#[derive(Debug)]
enum EffectTask {
    ExpandBars { height_pct: u8 },
    RemoveOverlay,
    RestoreRegion { id: String, primary: bool, saved: RegionStyle },
    RestoreZIndex { id: String, saved: Option<i32> },
}

#[derive(Debug, Default)]
enum UiPhase {
    #[default]
    Visible,
    Hidden {
        saved: Vec<(UiRegion, RegionStyle)>,
    },
    Restoring {
        saved: Vec<(UiRegion, RegionStyle)>,
        pending: Vec<TimerId>,
    },
}

/// Local presentation side effects for one client.
#[derive(Debug, Default)]
pub struct Effector {
    timers: TimerQueue<EffectTask>,
    pending_expand: Option<TimerId>,
    pending_removal: Option<TimerId>,
    ui: UiPhase,
}

impl Effector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay exists and is not on its way out.
    pub fn bars_shown(&self, stage: &dyn Stage) -> bool {
        stage.overlay_exists() && self.pending_removal.is_none()
    }

    pub fn ui_hidden(&self) -> bool {
        matches!(self.ui, UiPhase::Hidden { .. })
    }

    pub fn has_pending_effects(&self) -> bool {
        !self.timers.is_empty()
    }

    // -----------------------------------------------------------------------
    // Bars
    // -----------------------------------------------------------------------

    pub fn set_bars(
        &mut self,
        locked: bool,
        stage: &mut dyn Stage,
        settings: &dyn SettingsProvider,
        role: Role,
        now_ms: u64,
    ) {
        if locked {
            self.show_bars(stage, settings, role, now_ms);
        } else {
            self.hide_bars(stage, now_ms);
        }
    }

    fn show_bars(
        &mut self,
        stage: &mut dyn Stage,
        settings: &dyn SettingsProvider,
        role: Role,
        now_ms: u64,
    ) {
        let height_pct = settings.bars_height_pct();

        if stage.overlay_exists() {
            if let Some(id) = self.pending_removal.take() {
                self.timers.cancel(id);
                stage.set_bars_height(height_pct, BAR_TRANSITION_MS);
                debug!("Cinematic bars removal cancelled, expanding again");
            }
            return;
        }

        let spec = OverlaySpec {
            color: settings.bars_color(),
            opacity: settings.bars_opacity(),
            intercept_pointer: !role.is_director(),
        };
        debug!(
            "Adding cinematic bars (height={}% color={} opacity={})",
            height_pct, spec.color, spec.opacity
        );
        stage.create_overlay(&spec);
        self.pending_expand = Some(self.timers.schedule(
            now_ms + BAR_EXPAND_DELAY_MS,
            EffectTask::ExpandBars { height_pct },
        ));
    }

    fn hide_bars(&mut self, stage: &mut dyn Stage, now_ms: u64) {
        if !stage.overlay_exists() || self.pending_removal.is_some() {
            return;
        }
        if let Some(id) = self.pending_expand.take() {
            self.timers.cancel(id);
        }

        if stage.set_bars_height(0, BAR_TRANSITION_MS) {
            debug!("Animating cinematic bars removal");
            self.pending_removal = Some(self.timers.schedule(
                now_ms + BAR_TRANSITION_MS as u64,
                EffectTask::RemoveOverlay,
            ));
        } else {
            stage.remove_overlay();
            debug!("Cinematic bars removed immediately (no bars found)");
        }
    }

    // -----------------------------------------------------------------------
    // UI regions
    // -----------------------------------------------------------------------

    /// Fade peripheral UI out (locked) or back in (unlocked).
    ///
    /// Hiding only applies to participants with `hide-ui-for-players` on;
    /// restoring always runs if something was hidden.
    pub fn set_ui_hidden(
        &mut self,
        hidden: bool,
        stage: &mut dyn Stage,
        settings: &dyn SettingsProvider,
        role: Role,
        now_ms: u64,
    ) {
        if hidden {
            if role.is_director() {
                debug!("Skipping UI hide for director");
                return;
            }
            if !settings.hide_ui_for_players() {
                debug!("UI hiding disabled in settings");
                return;
            }
            self.hide_ui(stage);
        } else {
            self.show_ui(stage, now_ms);
        }
    }

    fn hide_ui(&mut self, stage: &mut dyn Stage) {
        let saved = match std::mem::take(&mut self.ui) {
            UiPhase::Hidden { saved } => {
                self.ui = UiPhase::Hidden { saved };
                return;
            }
            UiPhase::Restoring { saved, pending } => {
                for id in pending {
                    self.timers.cancel(id);
                }
                saved
            }
            UiPhase::Visible => stage
                .ui_regions()
                .into_iter()
                .map(|region| {
                    let style = stage.region_style(&region.id);
                    (region, style)
                })
                .collect(),
        };

        debug!("Hiding {} UI regions", saved.len());
        for (region, _) in &saved {
            let mut style = stage.region_style(&region.id);
            if region.primary {
                style.z_index = Some(PRIMARY_EMPHASIS_Z_INDEX);
                style.scale = Some(PRIMARY_EMPHASIS_SCALE);
            }
            style.transition = Some(HIDE_TRANSITION.to_string());
            style.opacity = Some(0.0);
            style.pointer_events = Some(POINTER_EVENTS_NONE.to_string());
            stage.set_region_style(&region.id, style);
        }

        self.ui = UiPhase::Hidden { saved };
    }

    fn show_ui(&mut self, stage: &mut dyn Stage, now_ms: u64) {
        let saved = match std::mem::take(&mut self.ui) {
            UiPhase::Hidden { saved } => saved,
            other => {
                self.ui = other;
                return;
            }
        };

        debug!("Restoring {} UI regions", saved.len());
        let mut pending = Vec::with_capacity(saved.len());
        for (region, original) in &saved {
            let mut style = stage.region_style(&region.id);
            style.transition = Some(UNHIDE_TRANSITION.to_string());
            style.opacity = Some(1.0);
            if region.primary {
                style.scale = Some(1.0);
            }
            style.pointer_events = original.pointer_events.clone();
            stage.set_region_style(&region.id, style);

            pending.push(self.timers.schedule(
                now_ms + UI_RESTORE_DELAY_MS,
                EffectTask::RestoreRegion {
                    id: region.id.clone(),
                    primary: region.primary,
                    saved: original.clone(),
                },
            ));
        }

        self.ui = if pending.is_empty() {
            UiPhase::Visible
        } else {
            UiPhase::Restoring { saved, pending }
        };
    }

    // -----------------------------------------------------------------------
    // Deferred steps
    // -----------------------------------------------------------------------

    /// Run every deferred step due at `now_ms`.
    pub fn tick(&mut self, stage: &mut dyn Stage, now_ms: u64) {
        for (id, task) in self.timers.pop_due(now_ms) {
            match task {
                EffectTask::ExpandBars { height_pct } => {
                    self.pending_expand = None;
                    if stage.overlay_exists() {
                        stage.set_bars_height(height_pct, BAR_TRANSITION_MS);
                        debug!("Cinematic bars animation started");
                    }
                }
                EffectTask::RemoveOverlay => {
                    self.pending_removal = None;
                    stage.remove_overlay();
                    debug!("Cinematic bars removed after animation");
                }
                EffectTask::RestoreRegion { id: region_id, primary, saved } => {
                    let mut style = stage.region_style(&region_id);
                    style.transition = saved.transition.clone();
                    style.opacity = saved.opacity;
                    let follow_up = primary.then(|| {
                        style.scale = saved.scale;
                        self.timers.schedule(
                            now_ms + UI_ZINDEX_RESTORE_DELAY_MS,
                            EffectTask::RestoreZIndex {
                                id: region_id.clone(),
                                saved: saved.z_index,
                            },
                        )
                    });
                    stage.set_region_style(&region_id, style);
                    self.finish_restore(id, follow_up);
                }
                EffectTask::RestoreZIndex { id: region_id, saved } => {
                    let mut style = stage.region_style(&region_id);
                    style.z_index = saved;
                    stage.set_region_style(&region_id, style);
                    self.finish_restore(id, None);
                }
            }
        }
    }

    fn finish_restore(&mut self, done: TimerId, follow_up: Option<TimerId>) {
        if let UiPhase::Restoring { pending, .. } = &mut self.ui {
            pending.retain(|id| *id != done);
            pending.extend(follow_up);
            if pending.is_empty() {
                self.ui = UiPhase::Visible;
            }
        }
    }

    /// Saved pre-hide styles, keyed by region id. Empty unless hidden.
    pub fn saved_styles(&self) -> HashMap<String, RegionStyle> {
        match &self.ui {
            UiPhase::Hidden { saved } | UiPhase::Restoring { saved, .. } => saved
                .iter()
                .map(|(region, style)| (region.id.clone(), style.clone()))
                .collect(),
            UiPhase::Visible => HashMap::new(),
        }
    }
}
