//! The module slot: lifecycle hooks before and after initialisation.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cinematic_pan::commands::{ToolKind, TOOL_CANVAS_LOCK, TOOL_RESET, TOOL_SYNC_VIEW};
    use cinematic_pan::sim::{ManualClock, SimClient};
    use cinematic_pan::{
        Channel, CinematicError, CinematicModule, CinematicSettings, MemoryBus, Role, SceneInfo,
    };

    fn init(module: &mut CinematicModule, sim: &SimClient, bus: &MemoryBus) -> bool {
        let channel: Arc<dyn Channel> = Arc::new(bus.clone());
        module.initialize(|| sim.controller(CinematicSettings::default(), Some(channel)))
    }

    #[test]
    fn uninitialised_hooks_are_no_ops() {
        let mut module = CinematicModule::new();
        let scene = SceneInfo {
            active: true,
            cinematic_mode_on_load: true,
            ..SceneInfo::default()
        };

        assert!(!module.is_initialized());
        assert_eq!(module.pump(), 0);
        module.tick();
        module.on_scene_updated(&scene);
        module.on_canvas_ready(&scene);
        assert!(!module.is_locked());
        assert!(module.tools().is_empty());
        assert!(matches!(
            module.on_tool(TOOL_CANVAS_LOCK, true),
            Err(CinematicError::Uninitialized)
        ));
    }

    #[test]
    fn failed_construction_leaves_slot_empty() {
        let bus = MemoryBus::new();
        let sim = SimClient::new("", Role::Participant, ManualClock::new(0));
        let mut module = CinematicModule::new();

        assert!(!init(&mut module, &sim, &bus));
        assert!(!module.is_initialized());
        assert_eq!(bus.published(), 0);
    }

    #[test]
    fn director_start_broadcasts_reset() {
        let bus = MemoryBus::new();
        let sim = SimClient::new("gm", Role::Director, ManualClock::new(0));
        let mut module = CinematicModule::new();

        assert!(init(&mut module, &sim, &bus));
        assert!(module.is_initialized());
        assert_eq!(bus.published(), 1);

        // Initialising again keeps the existing controller.
        assert!(init(&mut module, &sim, &bus));
        assert_eq!(bus.published(), 1);
    }

    #[test]
    fn participant_start_announces_itself() {
        let bus = MemoryBus::new();
        let gm_sim = SimClient::new("gm", Role::Director, ManualClock::new(0));
        let mut gm = CinematicModule::new();
        assert!(init(&mut gm, &gm_sim, &bus));
        gm.on_tool(TOOL_CANVAS_LOCK, true).unwrap();
        gm.pump();

        let sim = SimClient::new("p", Role::Participant, ManualClock::new(0));
        let mut module = CinematicModule::new();
        assert!(init(&mut module, &sim, &bus));

        // player-connected reaches the director, which re-sends the lock.
        assert_eq!(gm.pump(), 1);
        assert_eq!(module.pump(), 2);
        assert!(module.is_locked());
    }

    #[test]
    fn tools_follow_role_and_lock_state() {
        let bus = MemoryBus::new();
        let sim = SimClient::new("gm", Role::Director, ManualClock::new(0));
        let mut module = CinematicModule::new();
        assert!(init(&mut module, &sim, &bus));

        let tools = module.tools();
        let names: Vec<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names, vec![TOOL_CANVAS_LOCK, TOOL_SYNC_VIEW, TOOL_RESET]);
        assert_eq!(tools[0].kind, ToolKind::Toggle);
        assert!(!tools[0].active);

        module.on_tool(TOOL_CANVAS_LOCK, true).unwrap();
        assert!(module.is_locked());
        assert!(module.tools()[0].active);

        module.on_tool("somebody-elses-tool", true).unwrap();
        module.on_tool(TOOL_RESET, false).unwrap();
        assert!(!module.is_locked());
    }

    #[test]
    fn participant_gets_no_tools_and_no_authority() {
        let bus = MemoryBus::new();
        let sim = SimClient::new("p", Role::Participant, ManualClock::new(0));
        let mut module = CinematicModule::new();
        assert!(init(&mut module, &sim, &bus));

        assert!(module.tools().is_empty());
        assert!(matches!(
            module.on_tool(TOOL_SYNC_VIEW, false),
            Err(CinematicError::Authority { .. })
        ));
    }
}
