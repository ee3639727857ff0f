//! cinematic-pan-sim binary
//!
//! Runs one director and N participants against an in-process channel and
//! walks them through the whole lock / sync / late-join / reset cycle,
//! ticking cosmetic timers in real time.
//!
//! ## Configuration (env / TOML via `config` crate)
//!
//! | Key                               | Default   | Description                  |
//! |-----------------------------------|-----------|------------------------------|
//! | `CINEMATIC_ANIMATION_DURATION`    | `3000`    | Pan animation (ms)           |
//! | `CINEMATIC_SHOW_NOTIFICATIONS`    | `true`    | Director toasts              |
//! | `CINEMATIC_CINEMATIC_BARS_HEIGHT` | `10`      | Bar height (%)               |
//! | `CINEMATIC_HIDE_UI_FOR_PLAYERS`   | `false`   | Fade participant UI          |
//! | `CINEMATIC_DEBUG_MODE`            | `false`   | Crate log level `debug`      |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cinematic_pan::host::{HostContext, SystemClock};
use cinematic_pan::sim::SimClient;
use cinematic_pan::{
    Channel, CinematicModule, CinematicSettings, DirectorCommand, MemoryBus, Role,
    SettingsProvider, ViewState,
};
use clap::Parser;
use tracing::Instrument;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "cinematic-pan-sim", about = "Cinematic Pan session simulator", version)]
struct Args {
    /// Participants connected before the director syncs
    #[arg(long, env = "SIM_PARTICIPANTS", default_value_t = 3)]
    participants: usize,

    /// Optional TOML settings file
    #[arg(long, env = "SIM_SETTINGS")]
    settings: Option<PathBuf>,

    /// Timer tick interval (ms)
    #[arg(long, env = "SIM_TICK_MS", default_value_t = 16)]
    tick_ms: u64,

    /// Force debug logging regardless of `debug-mode`
    #[arg(long)]
    debug: bool,
}

// ---------------------------------------------------------------------------
// Simulated session
// ---------------------------------------------------------------------------

struct Client {
    handles: SimClient,
    module: CinematicModule,
}

struct Session {
    bus: MemoryBus,
    settings: CinematicSettings,
    clients: Vec<Client>,
}

impl Session {
    fn join(&mut self, id: &str, role: Role) -> Result<()> {
        let handles = SimClient::new(id, role, Default::default());
        let mut module = CinematicModule::new();
        let channel: Arc<dyn Channel> = Arc::new(self.bus.clone());
        let settings = self.settings.clone();
        let host = handles.host(settings, Box::new(SystemClock));

        if !module.initialize(|| cinematic_pan::Controller::new(host, Some(channel))) {
            bail!("client {} failed to initialise", id);
        }
        self.clients.push(Client { handles, module });
        self.settle();
        Ok(())
    }

    /// Pump every client until no frames remain in flight.
    fn settle(&mut self) {
        loop {
            let handled: usize = self.clients.iter_mut().map(|c| c.module.pump()).sum();
            if handled == 0 {
                break;
            }
        }
    }

    fn tick(&mut self) {
        self.settle();
        for c in &mut self.clients {
            c.module.tick();
        }
    }

    fn director(&mut self) -> &mut Client {
        &mut self.clients[0]
    }

    async fn run_for(&mut self, ms: u64, tick_ms: u64) -> Result<()> {
        let mut timer = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
        let deadline = tokio::time::Instant::now() + Duration::from_millis(ms);
        while tokio::time::Instant::now() < deadline {
            tokio::select! {
                _ = timer.tick() => self.tick(),
                _ = tokio::signal::ctrl_c() => bail!("interrupted"),
            }
        }
        self.tick();
        Ok(())
    }

    fn report(&self) {
        for c in &self.clients {
            let id = c.handles.host.user_name();
            log::info!(
                "{:<14} locked={:<5} bars={:<5} view={}",
                id,
                c.module.is_locked(),
                c.handles.stage.overlay().is_some(),
                c.handles.canvas.view()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = CinematicSettings::load(args.settings.as_deref())
        .context("Failed to load cinematic settings")?;

    let level = if args.debug || settings.debug_mode() {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("cinematic_pan={level}").parse()?)
                .add_directive(format!("cinematic_pan_sim={level}").parse()?),
        )
        .init();

    let span = tracing::info_span!("session", participants = args.participants);
    run(args, settings).instrument(span).await
}

async fn run(args: Args, settings: CinematicSettings) -> Result<()> {
    log::info!(
        "Starting cinematic-pan-sim (participants={}, animation={}ms)",
        args.participants,
        settings.animation_duration
    );

    let mut session = Session {
        bus: MemoryBus::new(),
        settings: settings.clone(),
        clients: Vec::new(),
    };

    session.join("director", Role::Director)?;
    for i in 0..args.participants {
        session.join(&format!("participant-{i}"), Role::Participant)?;
    }

    // Director frames a shot and pushes it.
    let target = ViewState::new(100.0, 200.0, 1.5);
    session.director().handles.canvas.set_view(target);
    session
        .director()
        .module
        .controller_mut()
        .context("director not initialised")?
        .execute(DirectorCommand::SyncViewNow)?;
    session
        .run_for(settings.animation_duration as u64 + 500, args.tick_ms)
        .await?;

    // A latecomer is brought into the lock but not the view.
    session.join("late-joiner", Role::Participant)?;
    session.run_for(200, args.tick_ms).await?;

    log::info!("After sync:");
    session.report();

    let diverged: Vec<_> = session.clients[1..]
        .iter()
        .filter(|c| !c.module.is_locked() || c.handles.stage.overlay().is_none())
        .map(|c| c.handles.host.user_name())
        .collect();
    if !diverged.is_empty() {
        bail!("clients not locked after sync: {:?}", diverged);
    }

    let off_target: Vec<_> = session.clients[1..=args.participants]
        .iter()
        .filter(|c| c.handles.canvas.view() != target)
        .map(|c| c.handles.host.user_name())
        .collect();
    if !off_target.is_empty() {
        bail!("clients did not reach the director's view: {:?}", off_target);
    }

    session
        .director()
        .module
        .on_tool(cinematic_pan::commands::TOOL_RESET, false)?;
    session.run_for(2000, args.tick_ms).await?;

    log::info!("After reset:");
    session.report();

    let still_locked: Vec<_> = session
        .clients
        .iter()
        .filter(|c| c.module.is_locked() || c.handles.stage.overlay().is_some())
        .map(|c| c.handles.host.user_name())
        .collect();
    if !still_locked.is_empty() {
        bail!("clients still locked after reset: {:?}", still_locked);
    }

    log::info!("Session converged ({} frames published)", session.bus.published());
    Ok(())
}
