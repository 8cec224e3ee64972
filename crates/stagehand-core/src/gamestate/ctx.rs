use crate::bus::{Bus, EventSender};
use crate::console::ConsoleBuffer;
use crate::events::EngineEvent;
use crate::sched::Scheduler;
use crate::time::Time;
use crate::timeline::Timeline;

/// Lifecycle request queued from inside a gamestate callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load(String),
    Unload(String),
    Start(String),
    Stop(String),
    Pause(String),
    Resume(String),
    Switch { current: String, next: String },
    UnloadAll,
}

/// Engine state shared with gamestates, owned by the engine.
pub struct GamestateEnv {
    pub scheduler: Scheduler,
    pub time: Time,
    pub bus: Bus<EngineEvent>,
    pub console: ConsoleBuffer,
    pub(crate) requests: Vec<Request>,
    pub(crate) exit_requested: bool,
}

impl GamestateEnv {
    pub fn new(console: ConsoleBuffer) -> Self {
        Self {
            scheduler: Scheduler::new(),
            time: Time::new(),
            bus: Bus::unbounded(),
            console,
            requests: Vec::new(),
            exit_requested: false,
        }
    }

    pub fn ctx(&mut self) -> GamestateCtx<'_> {
        GamestateCtx {
            scheduler: &self.scheduler,
            time: &self.time,
            events: self.bus.sender(),
            console: &self.console,
            requests: &mut self.requests,
            exit_requested: &mut self.exit_requested,
        }
    }

    pub(crate) fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    #[inline]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

impl Default for GamestateEnv {
    fn default() -> Self {
        Self::new(ConsoleBuffer::default())
    }
}

/// What a gamestate sees during its callbacks.
///
/// Lifecycle requests made here are queued and applied by the engine once the current
/// pass over the registry is over, so callbacks never re-enter the manager.
pub struct GamestateCtx<'a> {
    pub scheduler: &'a Scheduler,
    pub time: &'a Time,
    pub events: EventSender<EngineEvent>,
    pub console: &'a ConsoleBuffer,
    requests: &'a mut Vec<Request>,
    exit_requested: &'a mut bool,
}

impl GamestateCtx<'_> {
    /// New timeline bound to the engine's timers and visible in the debug registry.
    #[inline]
    pub fn timeline<C>(&self, name: impl Into<String>) -> Timeline<C> {
        self.scheduler.timeline(name)
    }

    #[inline]
    pub fn send_event(&self, event: EngineEvent) {
        self.events.send(event);
    }

    #[inline]
    pub fn request(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn load_gamestate(&mut self, name: &str) {
        self.request(Request::Load(name.to_string()));
    }

    pub fn unload_gamestate(&mut self, name: &str) {
        self.request(Request::Unload(name.to_string()));
    }

    pub fn start_gamestate(&mut self, name: &str) {
        self.request(Request::Start(name.to_string()));
    }

    pub fn stop_gamestate(&mut self, name: &str) {
        self.request(Request::Stop(name.to_string()));
    }

    pub fn pause_gamestate(&mut self, name: &str) {
        self.request(Request::Pause(name.to_string()));
    }

    pub fn resume_gamestate(&mut self, name: &str) {
        self.request(Request::Resume(name.to_string()));
    }

    pub fn switch_gamestate(&mut self, current: &str, next: &str) {
        self.request(Request::Switch {
            current: current.to_string(),
            next: next.to_string(),
        });
    }

    pub fn unload_all_gamestates(&mut self) {
        self.request(Request::UnloadAll);
    }

    #[inline]
    pub fn request_exit(&mut self) {
        *self.exit_requested = true;
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        *self.exit_requested
    }
}
