//! Multi-client session tests: several controllers sharing one channel.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cinematic_pan::host::InputFlags;
    use cinematic_pan::protocol::subjects;
    use cinematic_pan::sim::{ManualClock, PanRecord, SimClient};
    use cinematic_pan::transport::Inbox;
    use cinematic_pan::{
        Channel, CinematicSettings, Controller, MemoryBus, Message, Payload, Role, ViewState,
    };

    struct Peer {
        sim: SimClient,
        ctl: Controller,
    }

    fn peer(bus: &MemoryBus, clock: &ManualClock, id: &str, role: Role) -> Peer {
        let sim = SimClient::new(id, role, clock.clone());
        let channel: Arc<dyn Channel> = Arc::new(bus.clone());
        let ctl = sim
            .controller(CinematicSettings::default(), Some(channel))
            .unwrap();
        Peer { sim, ctl }
    }

    /// Pump every peer until nothing is left in flight.
    fn settle(peers: &mut [&mut Peer]) {
        loop {
            let handled: usize = peers.iter_mut().map(|p| p.ctl.pump()).sum();
            if handled == 0 {
                break;
            }
        }
    }

    fn tick(peers: &mut [&mut Peer]) {
        for p in peers.iter_mut() {
            p.ctl.tick();
        }
    }

    fn tap(bus: &MemoryBus) -> Inbox {
        bus.subscribe(subjects::CHANNEL).unwrap()
    }

    fn decoded(inbox: &Inbox) -> Vec<Payload> {
        inbox
            .drain()
            .iter()
            .map(|f| Message::decode(f).unwrap().payload)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Round trip
    // -----------------------------------------------------------------------

    #[test]
    fn sync_view_locks_then_pushes_view_to_participants() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(1_000);
        let mut gm = peer(&bus, &clock, "gm", Role::Director);
        let mut p1 = peer(&bus, &clock, "p1", Role::Participant);
        let mut p2 = peer(&bus, &clock, "p2", Role::Participant);

        gm.ctl.start();
        p1.ctl.start();
        p2.ctl.start();
        settle(&mut [&mut gm, &mut p1, &mut p2]);
        assert!(!p1.ctl.is_locked());

        let target = ViewState::new(100.0, 200.0, 1.5);
        gm.sim.canvas.set_view(target);
        let wire = tap(&bus);

        gm.ctl.sync_view(Some(2000)).unwrap();
        assert!(gm.ctl.is_locked());

        assert_eq!(
            decoded(&wire),
            vec![
                Payload::CanvasLock { locked: true },
                Payload::SyncView {
                    view: target,
                    animation_duration: Some(2000),
                },
            ]
        );

        settle(&mut [&mut gm, &mut p1, &mut p2]);
        for p in [&p1, &p2] {
            assert!(p.ctl.is_locked());
            assert_eq!(
                p.sim.canvas.pans().last(),
                Some(&PanRecord::Animated(target, 2000))
            );
            assert!(p.sim.stage.overlay().is_some());
            assert_eq!(p.sim.canvas.input(), InputFlags::all(false));
        }
    }

    #[test]
    fn sync_view_message_alone_engages_lock() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut p = peer(&bus, &clock, "p", Role::Participant);

        let view = ViewState::new(100.0, 200.0, 1.5);
        p.ctl.handle_message(Message::new(
            Payload::SyncView {
                view,
                animation_duration: Some(2000),
            },
            "gm".into(),
            0,
        ));

        assert!(p.ctl.is_locked());
        assert_eq!(p.sim.canvas.view(), view);
        assert_eq!(p.sim.canvas.pans(), vec![PanRecord::Animated(view, 2000)]);
        assert!(p.sim.stage.overlay().is_some());
        assert_eq!(p.sim.canvas.input(), InputFlags::all(false));
    }

    #[test]
    fn director_applies_its_own_sync_without_round_trip() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut gm = peer(&bus, &clock, "gm", Role::Director);

        let view = ViewState::new(5.0, 6.0, 2.0);
        gm.sim.canvas.set_view(view);
        gm.ctl.sync_view(None).unwrap();

        assert_eq!(gm.sim.canvas.pans(), vec![PanRecord::Animated(view, 3000)]);
        assert!(gm.sim.stage.overlay().is_some());

        // The echo arrives later and changes nothing.
        let frames_before = bus.published();
        assert_eq!(gm.ctl.pump(), 2);
        assert_eq!(bus.published(), frames_before);
        assert_eq!(gm.sim.canvas.pans().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Late joiner
    // -----------------------------------------------------------------------

    #[test]
    fn late_joiner_receives_lock_but_not_view() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut gm = peer(&bus, &clock, "gm", Role::Director);
        let mut p1 = peer(&bus, &clock, "p1", Role::Participant);

        gm.ctl.start();
        p1.ctl.start();
        settle(&mut [&mut gm, &mut p1]);

        gm.ctl.sync_view(Some(1000)).unwrap();
        settle(&mut [&mut gm, &mut p1]);
        assert_eq!(p1.sim.stage.overlays_created(), 1);

        let mut late = peer(&bus, &clock, "late", Role::Participant);
        let wire = tap(&bus);
        late.ctl.start();
        settle(&mut [&mut gm, &mut p1, &mut late]);

        assert_eq!(
            decoded(&wire),
            vec![
                Payload::PlayerConnected,
                Payload::CanvasLock { locked: true },
            ]
        );
        assert!(late.ctl.is_locked());
        assert!(late.sim.stage.overlay().is_some());
        assert!(late.sim.canvas.pans().is_empty());

        // The re-sent lock is idempotent for clients already locked.
        assert_eq!(p1.sim.stage.overlays_created(), 1);
    }

    #[test]
    fn player_connected_is_ignored_while_unlocked() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut gm = peer(&bus, &clock, "gm", Role::Director);
        let mut p1 = peer(&bus, &clock, "p1", Role::Participant);

        let wire = tap(&bus);
        p1.ctl.handle_player_connected();
        settle(&mut [&mut gm, &mut p1]);

        assert_eq!(decoded(&wire), vec![Payload::PlayerConnected]);
        assert!(!gm.ctl.is_locked());
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    #[test]
    fn reset_and_resync_unlocks_everyone() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut gm = peer(&bus, &clock, "gm", Role::Director);
        let mut p1 = peer(&bus, &clock, "p1", Role::Participant);

        gm.ctl.set_lock(true).unwrap();
        settle(&mut [&mut gm, &mut p1]);
        clock.advance(20);
        tick(&mut [&mut gm, &mut p1]);
        assert!(p1.ctl.is_locked());

        let wire = tap(&bus);
        gm.ctl.reset_and_resync_all_users().unwrap();
        assert!(!gm.ctl.is_locked());
        settle(&mut [&mut gm, &mut p1]);

        // Only the reset went out; no follow-up canvas-lock broadcast.
        assert_eq!(decoded(&wire), vec![Payload::Reset]);
        assert!(!p1.ctl.is_locked());
        assert_eq!(p1.sim.canvas.input(), InputFlags::all(true));

        clock.advance(1000);
        tick(&mut [&mut gm, &mut p1]);
        assert!(gm.sim.stage.overlay().is_none());
        assert!(p1.sim.stage.overlay().is_none());
    }

    // -----------------------------------------------------------------------
    // Echo & ordering
    // -----------------------------------------------------------------------

    #[test]
    fn own_echo_leaves_state_untouched() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut p = peer(&bus, &clock, "p", Role::Participant);

        for payload in [
            Payload::CanvasLock { locked: true },
            Payload::SyncView {
                view: ViewState::new(1.0, 1.0, 1.0),
                animation_duration: None,
            },
        ] {
            p.ctl.handle_message(Message::new(payload, "p".into(), 0));
        }

        assert!(!p.ctl.is_locked());
        assert!(p.sim.stage.overlay().is_none());
        assert!(p.sim.canvas.pans().is_empty());
    }

    #[test]
    fn messages_apply_in_arrival_order_without_reconciliation() {
        let bus = MemoryBus::new();
        let clock = ManualClock::new(0);
        let mut p = peer(&bus, &clock, "p", Role::Participant);

        // A stale sync-view processed after an unlock re-engages the lock.
        p.ctl
            .handle_message(Message::new(Payload::CanvasLock { locked: false }, "gm".into(), 2));
        p.ctl.handle_message(Message::new(
            Payload::SyncView {
                view: ViewState::new(3.0, 4.0, 1.0),
                animation_duration: None,
            },
            "gm".into(),
            1,
        ));
        assert!(p.ctl.is_locked());
    }

    #[test]
    fn offline_director_still_applies_local_effects() {
        let clock = ManualClock::new(0);
        let sim = SimClient::new("gm", Role::Director, clock.clone());
        let mut gm = sim.controller(CinematicSettings::default(), None).unwrap();

        assert!(!gm.is_synchronised());
        gm.set_lock(true).unwrap();
        assert!(gm.is_locked());
        assert!(sim.stage.overlay().is_some());
        assert_eq!(gm.pump(), 0);
    }
}
