//! Stagehand engine core.
//!
//! Timeline/action scheduler, gamestate lifecycle manager and the engine context that
//! drives both once per fixed-rate tick. Windowing lives in `stagehand-platform-winit`
//! and logging setup in `stagehand-modules-logging`.

pub mod bus;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod events;
pub mod gamestate;
pub mod sched;
pub mod sync;
pub mod telemetry;
pub mod time;
pub mod timeline;
pub mod timer;

pub use bus::{Bus, EventSender};
pub use config::{EngineConfig, FrameConfig, GamestateConfig, RuntimeConfig, WindowConfig};
pub use console::{ConsoleBuffer, ConsoleLine};
pub use engine::Engine;
pub use error::{EngineError, EngineResult, GamestateStage};
pub use events::EngineEvent;
pub use gamestate::{
    ApplyReport, Gamestate, GamestateCtx, GamestateFactory, GamestateManager, GamestateStatus,
    LoadingScreen, Request,
};
pub use sched::Scheduler;
pub use sync::ShutdownToken;
pub use time::Time;
pub use timeline::{ActionArgs, ActionCall, ActionId, ActionState, Timeline, TimelineSnapshot};
pub use timer::{TimerEvent, TimerId, Timers};
