use std::time::Duration;

use log::{debug, info};
use stagehand_core::{
    args, ActionCall, ActionState, EngineError, EngineEvent, EngineResult, Gamestate, GamestateCtx,
    Timeline,
};

use super::{INTRO, MENU};

const HOLD: Duration = Duration::from_millis(1500);
const FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct Fade {
    pub alpha: f32,
    pub done: bool,
}

/// Splash screen: hold, fade out, hand over to the menu. Any key skips the hold.
#[derive(Default)]
pub struct Intro {
    timeline: Option<Timeline<Fade>>,
    fade: Fade,
    switched: bool,
}

impl Intro {
    pub fn new() -> Self {
        Self::default()
    }
}

fn fade_out(fade: &mut Fade, call: &mut ActionCall<'_>) -> bool {
    match call.state {
        ActionState::Start => {
            fade.alpha = 1.0;
            false
        }
        ActionState::Running => {
            let total = call.args.get::<Duration>(0).as_secs_f32().max(f32::EPSILON);
            fade.alpha = (fade.alpha - call.delta.as_secs_f32() / total).max(0.0);
            fade.alpha <= 0.0
        }
        ActionState::Destroy => {
            fade.done = true;
            false
        }
        _ => false,
    }
}

impl Gamestate for Intro {
    fn progress_count(&self) -> usize {
        3
    }

    fn load(&mut self, ctx: &mut GamestateCtx<'_>, progress: &mut dyn FnMut()) -> EngineResult<()> {
        for step in ["logo", "font", "jingle"] {
            debug!(target: "gamestate", "intro: {step} ready");
            progress();
        }
        self.timeline = Some(ctx.timeline(INTRO));
        Ok(())
    }

    fn start(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        let Some(tl) = self.timeline.as_mut() else {
            return Err(EngineError::other("intro timeline missing"));
        };

        self.fade = Fade {
            alpha: 1.0,
            done: false,
        };
        self.switched = false;

        tl.add_delay(HOLD);
        tl.add_action(&mut self.fade, "fade-out", fade_out, args![FADE]);
        Ok(())
    }

    fn pause(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.pause(&mut self.fade);
        }
        Ok(())
    }

    fn resume(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.resume(&mut self.fade);
        }
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.clean_queue(&mut self.fade);
        }
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.take() {
            tl.destroy(&mut self.fade);
        }
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.draw(&mut self.fade);
        }
        log::trace!(target: "gamestate", "intro alpha {:.2}", self.fade.alpha);
        Ok(())
    }

    fn logic(&mut self, ctx: &mut GamestateCtx<'_>, delta: Duration) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.process(&mut self.fade, delta);
        }

        if self.fade.done && !self.switched {
            self.switched = true;
            info!(target: "gamestate", "intro finished after {:.2} s", ctx.time.t_sec);
            ctx.switch_gamestate(INTRO, MENU);
        }
        Ok(())
    }

    fn process_event(
        &mut self,
        _ctx: &mut GamestateCtx<'_>,
        event: &EngineEvent,
    ) -> EngineResult<()> {
        let Some(tl) = self.timeline.as_mut() else {
            return Ok(());
        };

        match event {
            EngineEvent::Key { pressed: true, .. } => {
                tl.skip_delay();
            }
            _ => {
                tl.handle_event(&mut self.fade, event);
            }
        }
        Ok(())
    }
}
