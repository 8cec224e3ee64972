use std::time::Duration;

use super::ctx::GamestateCtx;
use crate::error::EngineResult;
use crate::events::EngineEvent;

/// A loadable game module.
///
/// The manager resolves an instance through the registered factory when the gamestate is
/// loaded and drops it after `unload`, so anything created in `load` lives in `self`.
pub trait Gamestate {
    /// Number of times `load` will call its progress callback.
    fn progress_count(&self) -> usize {
        0
    }

    /// Blocking from the manager's point of view, even if the module loads in parallel
    /// internally.
    fn load(&mut self, ctx: &mut GamestateCtx<'_>, progress: &mut dyn FnMut()) -> EngineResult<()>;

    fn start(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn pause(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn resume(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    fn logic(&mut self, _ctx: &mut GamestateCtx<'_>, _delta: Duration) -> EngineResult<()> {
        Ok(())
    }

    /// Every event drained by the engine, timer events included. Gamestates that own
    /// timelines forward them here.
    fn process_event(
        &mut self,
        _ctx: &mut GamestateCtx<'_>,
        _event: &EngineEvent,
    ) -> EngineResult<()> {
        Ok(())
    }

    /// Rebuild resources that depend on the display.
    fn reload(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        Ok(())
    }
}

/// Creates a fresh module instance each time the gamestate is loaded.
pub type GamestateFactory = Box<dyn FnMut() -> Box<dyn Gamestate>>;
