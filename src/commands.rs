//! Director commands and the scene-control tools that trigger them.
//!
//! The surrounding UI renders [`director_tools`] as a control group and
//! routes clicks back through [`DirectorCommand::from_tool`].

use crate::types::Role;

pub const TOOL_CANVAS_LOCK: &str = "simpleCinematicPan-canvas-lock";
pub const TOOL_SYNC_VIEW: &str = "simpleCinematicPan-sync-view";
pub const TOOL_RESET: &str = "simpleCinematicPan-reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorCommand {
    /// Lock tool toggled to an explicit state.
    SetLock(bool),
    ToggleLock,
    SyncViewNow,
    ResetAndResync,
}

impl DirectorCommand {
    /// Map a tool click to a command. `active` is the toggle state for
    /// toggle tools and ignored for buttons.
    pub fn from_tool(name: &str, active: bool) -> Option<Self> {
        match name {
            TOOL_CANVAS_LOCK => Some(DirectorCommand::SetLock(active)),
            TOOL_SYNC_VIEW => Some(DirectorCommand::SyncViewNow),
            TOOL_RESET => Some(DirectorCommand::ResetAndResync),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Toggle,
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title_key: &'static str,
    pub icon: &'static str,
    pub kind: ToolKind,
    pub order: u8,
    /// Current toggle state; only meaningful for [`ToolKind::Toggle`].
    pub active: bool,
}

/// Tools offered to the local user. Participants get none.
pub fn director_tools(role: Role, locked: bool) -> Vec<ToolDescriptor> {
    if !role.is_director() {
        return Vec::new();
    }

    vec![
        ToolDescriptor {
            name: TOOL_CANVAS_LOCK,
            title_key: "simple-cinematic-pan.controls.canvas-lock.title",
            icon: "fas fa-lock",
            kind: ToolKind::Toggle,
            order: 1,
            active: locked,
        },
        ToolDescriptor {
            name: TOOL_SYNC_VIEW,
            title_key: "simple-cinematic-pan.controls.sync-view.title",
            icon: "fas fa-sync-alt",
            kind: ToolKind::Button,
            order: 2,
            active: false,
        },
        ToolDescriptor {
            name: TOOL_RESET,
            title_key: "simple-cinematic-pan.controls.reset.title",
            icon: "fas fa-undo",
            kind: ToolKind::Button,
            order: 3,
            active: false,
        },
    ]
}
