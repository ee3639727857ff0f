//! Module slot – the explicit owner of the one [`Controller`] per process.
//!
//! The host's lifecycle hooks are wired to methods on [`CinematicModule`].
//! Until [`initialize`](CinematicModule::initialize) succeeds the slot is
//! empty and every hook is a logged no-op, so hooks that fire early (or
//! after a failed construction) never crash the host.
//!
//! | Host event              | Method                |
//! |-------------------------|-----------------------|
//! | module ready            | `initialize`          |
//! | socket frame(s) arrived | `pump`                |
//! | animation frame / timer | `tick`                |
//! | scene updated           | `on_scene_updated`    |
//! | canvas ready            | `on_canvas_ready`     |
//! | control tool clicked    | `on_tool`             |

use log::{debug, error, info, warn};

use crate::commands::{director_tools, DirectorCommand, ToolDescriptor};
use crate::controller::Controller;
use crate::error::CinematicError;
use crate::types::SceneInfo;

#[derive(Default)]
pub struct CinematicModule {
    controller: Option<Controller>,
}

impl CinematicModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the controller and run its startup behaviour.
    ///
    /// A failing `build` is logged and leaves the slot empty.
    pub fn initialize<F>(&mut self, build: F) -> bool
    where
        F: FnOnce() -> Result<Controller, CinematicError>,
    {
        if self.controller.is_some() {
            warn!("Cinematic pan already initialised");
            return true;
        }

        info!("Cinematic pan ready, initialising");
        match build() {
            Ok(mut controller) => {
                controller.start();
                self.controller = Some(controller);
                info!("Cinematic pan initialised successfully");
                true
            }
            Err(e) => {
                error!("Error creating cinematic pan controller: {}", e);
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut Controller> {
        self.controller.as_mut()
    }

    /// Lock state for control rendering; `false` when uninitialised.
    pub fn is_locked(&self) -> bool {
        self.controller.as_ref().is_some_and(Controller::is_locked)
    }

    pub fn pump(&mut self) -> usize {
        self.controller.as_mut().map_or(0, Controller::pump)
    }

    pub fn tick(&mut self) {
        if let Some(c) = self.controller.as_mut() {
            c.tick();
        }
    }

    pub fn on_scene_updated(&mut self, scene: &SceneInfo) {
        match self.controller.as_mut() {
            Some(c) => c.on_scene_updated(scene),
            None => debug!("Scene update ignored, module not initialised"),
        }
    }

    pub fn on_canvas_ready(&mut self, scene: &SceneInfo) {
        match self.controller.as_mut() {
            Some(c) => c.on_canvas_ready(scene),
            None => debug!("Canvas ready ignored, module not initialised"),
        }
    }

    /// Tools to render for the local user.
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        match &self.controller {
            Some(c) => director_tools(c.role(), c.is_locked()),
            None => Vec::new(),
        }
    }

    /// Route a scene-control click. Unknown tools are ignored.
    pub fn on_tool(&mut self, name: &str, active: bool) -> Result<(), CinematicError> {
        let Some(controller) = self.controller.as_mut() else {
            debug!("Tool '{}' ignored, module not initialised", name);
            return Err(CinematicError::Uninitialized);
        };
        let Some(command) = DirectorCommand::from_tool(name, active) else {
            debug!("Ignoring unknown tool '{}'", name);
            return Ok(());
        };
        controller.execute(command)
    }
}
