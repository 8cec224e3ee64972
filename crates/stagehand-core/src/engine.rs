use std::path::Path;
use std::time::Duration;

use log::{debug, info};

use crate::bus::EventSender;
use crate::config::EngineConfig;
use crate::console::ConsoleBuffer;
use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::gamestate::{ApplyReport, Gamestate, GamestateEnv, GamestateManager, LoadingScreen};
use crate::sched::Scheduler;
use crate::sync::ShutdownToken;
use crate::telemetry::Telemetry;
use crate::time::Time;

/// Engine context and main loop driver.
///
/// Owns the timers, the timeline registry, the event bus and the gamestate registry.
/// Platform code calls [`Engine::tick`] at a fixed rate and [`Engine::draw`] once per
/// frame; everything else happens inside those two calls.
pub struct Engine {
    cfg: EngineConfig,
    env: GamestateEnv,
    gamestates: GamestateManager,
    telemetry: Telemetry,
    shutdown: ShutdownToken,

    scratch: Vec<EngineEvent>,
    last_report: ApplyReport,

    booted: bool,
    shut_down: bool,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        let console = ConsoleBuffer::new(cfg.runtime.console_capacity);
        Self::with_console(cfg, console)
    }

    /// Like [`Engine::new`], sharing a console buffer that a logger already writes to.
    pub fn with_console(cfg: EngineConfig, console: ConsoleBuffer) -> Self {
        let mut telemetry = Telemetry::new();
        telemetry.configure_fps_logging(
            cfg.frame.log_fps,
            cfg.frame.fps_log_period_ms as f32 / 1000.0,
        );

        Self {
            cfg,
            env: GamestateEnv::new(console),
            gamestates: GamestateManager::new(),
            telemetry,
            shutdown: ShutdownToken::new(),
            scratch: Vec::new(),
            last_report: ApplyReport::default(),
            booted: false,
            shut_down: false,
        }
    }

    pub fn load_config_toml(path: impl AsRef<Path>) -> EngineResult<EngineConfig> {
        EngineConfig::load(path)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    // ------------------------------------------------------------------
    // registration

    pub fn register_gamestate<F>(&mut self, name: &str, factory: F)
    where
        F: FnMut() -> Box<dyn Gamestate> + 'static,
    {
        self.gamestates.register(name, factory);
    }

    pub fn set_loading_screen(&mut self, screen: Box<dyn LoadingScreen>) {
        self.gamestates.set_loading_screen(screen);
    }

    /// Queue the gamestates listed in the config. Only the first call does anything.
    pub fn boot(&mut self) {
        if self.booted {
            return;
        }
        self.booted = true;

        for gs in self.cfg.gamestates.iter() {
            if !gs.enabled {
                info!(target: "engine", "gamestate '{}' disabled by config", gs.name);
                continue;
            }
            self.gamestates.load(&gs.name);
            self.gamestates.set_show_loading(&gs.name, gs.show_loading);
            if gs.start {
                self.gamestates.start(&gs.name);
            }
        }

        info!(target: "engine", "boot ({} gamestate(s) registered)", self.gamestates.len());
    }

    // ------------------------------------------------------------------
    // main loop

    /// One fixed-rate tick: pending events, timers, lifecycle transitions, then logic.
    ///
    /// Events already on the bus go first so a freeze stops timers before they advance;
    /// a timer never expires into a gamestate that was paused in the same tick.
    pub fn tick(&mut self, dt: Duration) -> EngineResult<()> {
        if self.shut_down {
            return Err(EngineError::ExitRequested);
        }

        self.env.time.advance(dt);
        self.telemetry.tick(dt);

        self.dispatch_events();
        self.apply_requests();

        for fired in self.env.scheduler.tick(dt) {
            self.env.bus.send(EngineEvent::Timer(fired));
        }

        self.dispatch_events();
        self.apply_requests();

        self.last_report = self.gamestates.apply_pending(&mut self.env.ctx());
        if !self.last_report.is_empty() {
            debug!(target: "engine", "tick {}: {:?}", self.env.time.tick_index, self.last_report);
        }

        self.gamestates.logic_all(&mut self.env.ctx(), dt);
        self.apply_requests();

        if self.shutdown.is_requested() {
            self.env.exit_requested = true;
        }
        Ok(())
    }

    pub fn draw(&mut self) {
        self.env.time.frame_index += 1;
        self.telemetry.frame();
        self.gamestates.draw_all(&mut self.env.ctx());
    }

    pub fn step(&mut self, dt: Duration) -> EngineResult<()> {
        self.tick(dt)?;
        self.draw();
        Ok(())
    }

    /// Step `ticks` times without a window. Stops early once exit is requested and
    /// returns the number of steps taken.
    pub fn run_headless(&mut self, dt: Duration, ticks: u64) -> EngineResult<u64> {
        self.boot();

        let mut done = 0;
        while done < ticks {
            if self.exit_requested() {
                info!(target: "engine", "exit requested after {done} tick(s)");
                break;
            }
            self.step(dt)?;
            done += 1;
        }
        Ok(done)
    }

    /// Stop and unload every gamestate. Only the first call does anything.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.gamestates.shutdown(&mut self.env.ctx());
        info!(
            target: "engine",
            "shutdown after {} tick(s), {} timer(s) left",
            self.env.time.tick_index,
            self.env.scheduler.timers().len()
        );
    }

    fn dispatch_events(&mut self) {
        let mut events = std::mem::take(&mut self.scratch);
        self.env.bus.drain_into(&mut events);

        for ev in events.iter() {
            match ev {
                EngineEvent::CloseRequested => {
                    info!(target: "engine", "close requested");
                    self.env.exit_requested = true;
                }
                EngineEvent::FocusLost if self.cfg.runtime.freeze_on_focus_loss => {
                    self.gamestates.freeze_all(&mut self.env.ctx());
                }
                EngineEvent::FocusGained if self.cfg.runtime.freeze_on_focus_loss => {
                    self.gamestates.unfreeze_all(&mut self.env.ctx());
                }
                EngineEvent::Resized { width, height } => {
                    debug!(target: "engine", "resized to {width}x{height}");
                    self.gamestates.reload_all(&mut self.env.ctx());
                }
                _ => {}
            }

            self.gamestates.event_all(&mut self.env.ctx(), ev);
        }

        events.clear();
        self.scratch = events;
    }

    fn apply_requests(&mut self) {
        loop {
            let requests = self.env.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                self.gamestates.apply_request(request, &mut self.env.ctx());
            }
        }
    }

    // ------------------------------------------------------------------
    // requests

    pub fn load_gamestate(&mut self, name: &str) -> bool {
        self.gamestates.load(name)
    }

    pub fn unload_gamestate(&mut self, name: &str) -> bool {
        self.gamestates.unload(name)
    }

    pub fn start_gamestate(&mut self, name: &str) -> bool {
        self.gamestates.start(name)
    }

    pub fn stop_gamestate(&mut self, name: &str) -> bool {
        self.gamestates.stop(name)
    }

    pub fn pause_gamestate(&mut self, name: &str) -> bool {
        self.gamestates.pause(name, &mut self.env.ctx())
    }

    pub fn resume_gamestate(&mut self, name: &str) -> bool {
        self.gamestates.resume(name, &mut self.env.ctx())
    }

    pub fn switch_gamestate(&mut self, current: &str, next: &str) -> bool {
        self.gamestates.switch(current, next)
    }

    pub fn unload_all_gamestates(&mut self) -> usize {
        self.gamestates.unload_all()
    }

    pub fn set_show_loading(&mut self, name: &str, show: bool) -> bool {
        self.gamestates.set_show_loading(name, show)
    }

    pub fn freeze(&mut self) -> usize {
        self.gamestates.freeze_all(&mut self.env.ctx())
    }

    pub fn unfreeze(&mut self) -> usize {
        self.gamestates.unfreeze_all(&mut self.env.ctx())
    }

    // ------------------------------------------------------------------
    // accessors

    pub fn gamestates(&self) -> &GamestateManager {
        &self.gamestates
    }

    /// What the last tick's apply pass did.
    pub fn last_report(&self) -> &ApplyReport {
        &self.last_report
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.env.scheduler
    }

    pub fn time(&self) -> &Time {
        &self.env.time
    }

    pub fn console(&self) -> &ConsoleBuffer {
        &self.env.console
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Producer handle for platform code.
    pub fn events(&self) -> EventSender<EngineEvent> {
        self.env.bus.sender()
    }

    pub fn send_event(&self, event: EngineEvent) {
        self.env.bus.send(event);
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn request_exit(&mut self) {
        self.env.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.env.exit_requested() || self.shutdown.is_requested()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
