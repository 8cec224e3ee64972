mod ctx;
mod entry;
mod manager;
mod module;

pub use ctx::{GamestateCtx, GamestateEnv, Request};
pub use entry::{GamestateEntry, GamestateStatus};
pub use manager::{ApplyReport, GamestateManager, LoadingScreen};
pub use module::{Gamestate, GamestateFactory};
