use std::time::Duration;

use log::info;
use stagehand_core::{
    args, ActionArgs, ActionCall, ActionState, EngineError, EngineEvent, EngineResult, Gamestate,
    GamestateCtx, Timeline,
};
use stagehand_platform_winit::keys;

use super::{INTRO, MENU};

const ENTRIES: [&str; 3] = ["start", "replay intro", "quit"];
const BLINK: Duration = Duration::from_millis(400);

#[derive(Debug, Default)]
pub struct MenuView {
    pub cursor_visible: bool,
    pub selected: usize,
}

#[derive(Default)]
pub struct Menu {
    timeline: Option<Timeline<MenuView>>,
    view: MenuView,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    fn activate(&mut self, ctx: &mut GamestateCtx<'_>) {
        match ENTRIES[self.view.selected] {
            "replay intro" => ctx.switch_gamestate(MENU, INTRO),
            "quit" => ctx.request_exit(),
            other => info!(target: "gamestate", "menu: '{other}' is not wired up yet"),
        }
    }
}

/// Toggles the cursor every `BLINK`; runs until the menu goes away.
fn blink(view: &mut MenuView, call: &mut ActionCall<'_>) -> bool {
    if call.state != ActionState::Running {
        return false;
    }
    let delta = call.delta;
    let acc = call.args.get_mut::<Duration>(0);
    *acc += delta;
    if *acc >= BLINK {
        *acc -= BLINK;
        view.cursor_visible = !view.cursor_visible;
    }
    false
}

impl Gamestate for Menu {
    fn load(
        &mut self,
        ctx: &mut GamestateCtx<'_>,
        _progress: &mut dyn FnMut(),
    ) -> EngineResult<()> {
        self.timeline = Some(ctx.timeline(MENU));
        Ok(())
    }

    fn start(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        let Some(tl) = self.timeline.as_mut() else {
            return Err(EngineError::other("menu timeline missing"));
        };

        self.view = MenuView::default();
        tl.add_action(
            &mut self.view,
            "welcome",
            |_view: &mut MenuView, call: &mut ActionCall<'_>| {
                if call.state == ActionState::Running {
                    info!(target: "gamestate", "menu: {}", ENTRIES.join(" / "));
                    return true;
                }
                false
            },
            ActionArgs::new(),
        );
        tl.add_background_action(
            &mut self.view,
            "cursor-blink",
            blink,
            args![Duration::ZERO],
            Duration::from_millis(250),
        );
        Ok(())
    }

    fn pause(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.pause(&mut self.view);
        }
        Ok(())
    }

    fn resume(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.resume(&mut self.view);
        }
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.clean_queue(&mut self.view);
            tl.clean_background_queue(&mut self.view);
        }
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        if let Some(tl) = self.timeline.take() {
            tl.destroy(&mut self.view);
        }
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        log::trace!(
            target: "gamestate",
            "menu [{}]{}",
            ENTRIES[self.view.selected],
            if self.view.cursor_visible { " _" } else { "" }
        );
        Ok(())
    }

    fn logic(&mut self, _ctx: &mut GamestateCtx<'_>, delta: Duration) -> EngineResult<()> {
        if let Some(tl) = self.timeline.as_mut() {
            tl.process(&mut self.view, delta);
        }
        Ok(())
    }

    fn process_event(
        &mut self,
        ctx: &mut GamestateCtx<'_>,
        event: &EngineEvent,
    ) -> EngineResult<()> {
        match *event {
            EngineEvent::Key { code, pressed } if pressed => match code {
                keys::ARROW_UP => {
                    self.view.selected = (self.view.selected + ENTRIES.len() - 1) % ENTRIES.len();
                }
                keys::ARROW_DOWN => {
                    self.view.selected = (self.view.selected + 1) % ENTRIES.len();
                }
                keys::ENTER | keys::SPACE => self.activate(ctx),
                keys::ESCAPE => ctx.request_exit(),
                _ => {}
            },
            _ => {
                if let Some(tl) = self.timeline.as_mut() {
                    tl.handle_event(&mut self.view, event);
                }
            }
        }
        Ok(())
    }

    fn reload(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        info!(target: "gamestate", "menu: layout rebuilt");
        Ok(())
    }
}
