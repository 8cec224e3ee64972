use std::time::Instant;

use stagehand_core::{Engine, EngineError, EngineEvent, EngineResult};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use super::clock::FixedStep;
use crate::keys;
use crate::signals::ExitSignal;

struct App {
    engine: Engine,
    clock: FixedStep,
    exit_signal: ExitSignal,
    control_flow_poll: bool,

    window: Option<Window>,
    window_id: Option<WindowId>,
    last: Option<Instant>,

    fatal: Option<EngineError>,
    shutting_down: bool,
}

impl App {
    fn new(engine: Engine) -> Self {
        let clock = FixedStep::from_config(&engine.config().frame);
        let exit_signal = ExitSignal::new(engine.shutdown_token());
        if let Err(e) = exit_signal.install_ctrlc_handler() {
            log::warn!(target: "engine", "{e}");
        }

        let control_flow_poll = engine
            .config()
            .runtime
            .control_flow
            .trim()
            .eq_ignore_ascii_case("poll");

        Self {
            engine,
            clock,
            exit_signal,
            control_flow_poll,
            window: None,
            window_id: None,
            last: None,
            fatal: None,
            shutting_down: false,
        }
    }

    fn set_fatal_and_exit(&mut self, event_loop: &ActiveEventLoop, e: EngineError) {
        log::error!(target: "engine", "winit host fatal: {e}");
        self.fatal = Some(e);
        self.shutdown_and_exit(event_loop);
    }

    fn shutdown_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutting_down {
            event_loop.exit();
            return;
        }
        self.shutting_down = true;

        self.engine.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let cfg = &self.engine.config().window;
        let attrs = WindowAttributes::default()
            .with_title(cfg.title.clone())
            .with_inner_size(LogicalSize::new(cfg.width, cfg.height));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                self.set_fatal_and_exit(event_loop, EngineError::Other(e.to_string()));
                return;
            }
        };

        self.window_id = Some(window.id());
        self.window = Some(window);

        self.engine.boot();
        self.last = Some(Instant::now());
        log::info!(target: "engine", "first frame");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.engine.send_event(EngineEvent::CloseRequested),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.engine.send_event(EngineEvent::Resized { width, height });
            }
            WindowEvent::Focused(true) => self.engine.send_event(EngineEvent::FocusGained),
            WindowEvent::Focused(false) => self.engine.send_event(EngineEvent::FocusLost),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                self.engine.send_event(EngineEvent::Key {
                    code: keys::map_physical_key(&event.physical_key),
                    pressed: event.state.is_pressed(),
                });
            }
            WindowEvent::RedrawRequested => {
                if !self.shutting_down {
                    self.engine.draw();
                }
            }
            WindowEvent::Destroyed => self.shutdown_and_exit(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(if self.control_flow_poll {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        });

        if self.shutting_down {
            return;
        }
        if self.exit_signal.is_exit_requested() || self.engine.exit_requested() {
            self.shutdown_and_exit(event_loop);
            return;
        }
        let Some(last) = self.last else {
            return;
        };

        let now = Instant::now();
        self.last = Some(now);

        let ticks = self.clock.advance(now.duration_since(last));
        let dt = self.clock.tick_dt();
        for _ in 0..ticks {
            if let Err(e) = self.engine.tick(dt) {
                self.set_fatal_and_exit(event_loop, e);
                return;
            }
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.engine.shutdown();
    }
}

/// Open a window from the engine config and drive the engine until exit.
pub fn run_winit_app(engine: Engine) -> EngineResult<()> {
    let event_loop = EventLoop::new().map_err(|e| EngineError::Other(e.to_string()))?;
    let mut app = App::new(engine);

    event_loop
        .run_app(&mut app)
        .map_err(|e| EngineError::Other(e.to_string()))?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
