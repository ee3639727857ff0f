//! In-memory host collaborators.
//!
//! Each type is a cheap-clone handle over shared state: box one clone into
//! the controller's [`Host`] and keep another to inspect or poke the
//! simulated host from outside (tests, the simulation binary).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::controller::Controller;
use crate::error::CinematicError;
use crate::host::{
    Canvas, Clock, Host, HostContext, InputFlags, Level, Notice, Notifier, OverlaySpec, ProgressId,
    RegionStyle, Stage, UiRegion,
};
use crate::settings::CinematicSettings;
use crate::transport::Channel;
use crate::types::{ClientId, Role, ViewState};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Host context
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct HostState {
    id: ClientId,
    name: String,
    role: Role,
    refreshes: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct SimHost {
    inner: Arc<Mutex<HostState>>,
}

impl SimHost {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        let id = id.into();
        Self {
            inner: Arc::new(Mutex::new(HostState {
                name: id.clone(),
                id: ClientId::new(id),
                role,
                refreshes: Vec::new(),
            })),
        }
    }

    pub fn set_role(&self, role: Role) {
        self.inner.lock().role = role;
    }

    /// Every `refresh_controls` call, in order.
    pub fn refreshes(&self) -> Vec<bool> {
        self.inner.lock().refreshes.clone()
    }
}

impl HostContext for SimHost {
    fn client_id(&self) -> ClientId {
        self.inner.lock().id.clone()
    }

    fn user_name(&self) -> String {
        self.inner.lock().name.clone()
    }

    fn role(&self) -> Role {
        self.inner.lock().role
    }

    fn refresh_controls(&mut self, locked: bool) {
        self.inner.lock().refreshes.push(locked);
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// One camera move requested of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanRecord {
    Jump(ViewState),
    Animated(ViewState, u32),
}

#[derive(Debug)]
struct CanvasState {
    ready: bool,
    animated: bool,
    view: ViewState,
    input: InputFlags,
    selection: usize,
    pans: Vec<PanRecord>,
}

#[derive(Debug, Clone)]
pub struct SimCanvas {
    inner: Arc<Mutex<CanvasState>>,
}

impl Default for SimCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SimCanvas {
    /// Ready canvas with animated-pan support at the default view.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CanvasState {
                ready: true,
                animated: true,
                view: ViewState::default(),
                input: InputFlags::default(),
                selection: 0,
                pans: Vec::new(),
            })),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.inner.lock().ready = ready;
    }

    pub fn set_animated(&self, animated: bool) {
        self.inner.lock().animated = animated;
    }

    /// Move the camera as the local user would, without recording a pan.
    pub fn set_view(&self, view: ViewState) {
        self.inner.lock().view = view;
    }

    pub fn view(&self) -> ViewState {
        self.inner.lock().view
    }

    pub fn input(&self) -> InputFlags {
        self.inner.lock().input
    }

    pub fn select(&self, count: usize) {
        self.inner.lock().selection = count;
    }

    pub fn selection(&self) -> usize {
        self.inner.lock().selection
    }

    pub fn pans(&self) -> Vec<PanRecord> {
        self.inner.lock().pans.clone()
    }
}

impl Canvas for SimCanvas {
    fn ready(&self) -> bool {
        self.inner.lock().ready
    }

    fn current_view(&self) -> ViewState {
        self.inner.lock().view
    }

    fn pan(&mut self, view: ViewState) {
        let mut st = self.inner.lock();
        st.view = view;
        st.pans.push(PanRecord::Jump(view));
    }

    fn supports_animated_pan(&self) -> bool {
        self.inner.lock().animated
    }

    fn animate_pan(&mut self, view: ViewState, duration_ms: u32) {
        let mut st = self.inner.lock();
        st.view = view;
        st.pans.push(PanRecord::Animated(view, duration_ms));
    }

    fn set_input(&mut self, flags: InputFlags) {
        self.inner.lock().input = flags;
    }

    fn release_selection(&mut self) {
        self.inner.lock().selection = 0;
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SimOverlay {
    pub spec: OverlaySpec,
    pub bars_height: u8,
    /// `false` simulates an overlay whose bar elements went missing.
    pub has_bars: bool,
}

#[derive(Debug, Default)]
struct StageState {
    overlay: Option<SimOverlay>,
    created: usize,
    removed: usize,
    bar_animations: usize,
    regions: BTreeMap<String, (bool, RegionStyle)>,
}

#[derive(Debug, Clone)]
pub struct SimStage {
    inner: Arc<Mutex<StageState>>,
}

impl Default for SimStage {
    fn default() -> Self {
        Self::new()
    }
}

impl SimStage {
    /// Stage with an `interface` (primary), `players` and `hotbar` region.
    pub fn new() -> Self {
        let stage = Self {
            inner: Arc::new(Mutex::new(StageState::default())),
        };
        stage.add_region("interface", true, RegionStyle::default());
        stage.add_region("players", false, RegionStyle::default());
        stage.add_region("hotbar", false, RegionStyle::default());
        stage
    }

    pub fn add_region(&self, id: &str, primary: bool, style: RegionStyle) {
        self.inner
            .lock()
            .regions
            .insert(id.to_string(), (primary, style));
    }

    pub fn overlay(&self) -> Option<SimOverlay> {
        self.inner.lock().overlay.clone()
    }

    /// Drop the bar elements from the current overlay.
    pub fn strip_bars(&self) {
        if let Some(o) = self.inner.lock().overlay.as_mut() {
            o.has_bars = false;
        }
    }

    pub fn overlays_created(&self) -> usize {
        self.inner.lock().created
    }

    pub fn overlays_removed(&self) -> usize {
        self.inner.lock().removed
    }

    pub fn bar_animations(&self) -> usize {
        self.inner.lock().bar_animations
    }

    pub fn style(&self, id: &str) -> RegionStyle {
        self.region_style(id)
    }
}

impl Stage for SimStage {
    fn overlay_exists(&self) -> bool {
        self.inner.lock().overlay.is_some()
    }

    fn create_overlay(&mut self, spec: &OverlaySpec) {
        let mut st = self.inner.lock();
        st.created += 1;
        st.overlay = Some(SimOverlay {
            spec: spec.clone(),
            bars_height: 0,
            has_bars: true,
        });
    }

    fn set_bars_height(&mut self, pct: u8, _transition_ms: u32) -> bool {
        let mut st = self.inner.lock();
        let animated = match st.overlay.as_mut() {
            Some(o) if o.has_bars => {
                o.bars_height = pct;
                true
            }
            _ => false,
        };
        if animated {
            st.bar_animations += 1;
        }
        animated
    }

    fn remove_overlay(&mut self) {
        let mut st = self.inner.lock();
        if st.overlay.take().is_some() {
            st.removed += 1;
        }
    }

    fn ui_regions(&self) -> Vec<UiRegion> {
        self.inner
            .lock()
            .regions
            .iter()
            .map(|(id, (primary, _))| UiRegion {
                id: id.clone(),
                primary: *primary,
            })
            .collect()
    }

    fn region_style(&self, id: &str) -> RegionStyle {
        self.inner
            .lock()
            .regions
            .get(id)
            .map(|(_, style)| style.clone())
            .unwrap_or_default()
    }

    fn set_region_style(&mut self, id: &str, style: RegionStyle) {
        if let Some((_, current)) = self.inner.lock().regions.get_mut(id) {
            *current = style;
        }
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct NotifierState {
    shown: Vec<(Level, Notice)>,
    progress: HashMap<ProgressId, Vec<(f64, Option<Notice>)>>,
    next_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SimNotifier {
    inner: Arc<Mutex<NotifierState>>,
}

impl SimNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<(Level, Notice)> {
        self.inner.lock().shown.clone()
    }

    pub fn progress_count(&self) -> usize {
        self.inner.lock().progress.len()
    }

    /// Updates pushed to a progress toast, oldest first.
    pub fn progress_updates(&self, id: ProgressId) -> Vec<(f64, Option<Notice>)> {
        self.inner
            .lock()
            .progress
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Notifier for SimNotifier {
    fn notify(&mut self, level: Level, notice: Notice) {
        self.inner.lock().shown.push((level, notice));
    }

    fn begin_progress(&mut self, _notice: Notice) -> ProgressId {
        let mut st = self.inner.lock();
        let id = ProgressId(st.next_id);
        st.next_id += 1;
        st.progress.insert(id, Vec::new());
        id
    }

    fn update_progress(&mut self, id: ProgressId, pct: f64, message: Option<Notice>) {
        if let Some(updates) = self.inner.lock().progress.get_mut(&id) {
            updates.push((pct, message));
        }
    }
}

// ---------------------------------------------------------------------------
// Whole client
// ---------------------------------------------------------------------------

/// Outside handles onto one simulated client's host.
#[derive(Debug, Clone)]
pub struct SimClient {
    pub host: SimHost,
    pub canvas: SimCanvas,
    pub stage: SimStage,
    pub notifier: SimNotifier,
    pub clock: ManualClock,
}

impl SimClient {
    pub fn new(id: &str, role: Role, clock: ManualClock) -> Self {
        Self {
            host: SimHost::new(id, role),
            canvas: SimCanvas::new(),
            stage: SimStage::new(),
            notifier: SimNotifier::new(),
            clock,
        }
    }

    /// Bundle boxed clones of every handle, plus `settings` and a clock.
    pub fn host(&self, settings: CinematicSettings, clock: Box<dyn Clock>) -> Host {
        Host {
            context: Box::new(self.host.clone()),
            canvas: Box::new(self.canvas.clone()),
            stage: Box::new(self.stage.clone()),
            notifier: Box::new(self.notifier.clone()),
            settings: Box::new(settings),
            clock,
        }
    }

    /// Build a controller on this client's handles and the manual clock.
    pub fn controller(
        &self,
        settings: CinematicSettings,
        channel: Option<Arc<dyn Channel>>,
    ) -> Result<Controller, CinematicError> {
        Controller::new(self.host(settings, Box::new(self.clock.clone())), channel)
    }
}
