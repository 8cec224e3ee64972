use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use stagehand_core::gamestate::GamestateEnv;
use stagehand_core::{EngineEvent, EngineResult, Gamestate, GamestateCtx, GamestateManager};

type Calls = Rc<RefCell<Vec<String>>>;

struct Tracked {
    name: String,
    calls: Calls,
}

impl Tracked {
    fn note(&self, what: &str) {
        let line = format!("{}.{what}", self.name);
        self.calls.borrow_mut().push(line);
    }
}

impl Gamestate for Tracked {
    fn load(
        &mut self,
        _ctx: &mut GamestateCtx<'_>,
        _progress: &mut dyn FnMut(),
    ) -> EngineResult<()> {
        self.note("load");
        Ok(())
    }

    fn start(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        self.note("start");
        Ok(())
    }

    fn pause(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        self.note("pause");
        Ok(())
    }

    fn resume(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        self.note("resume");
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        self.note("stop");
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        self.note("unload");
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GamestateCtx<'_>) -> EngineResult<()> {
        self.note("draw");
        Ok(())
    }

    fn logic(&mut self, _ctx: &mut GamestateCtx<'_>, _delta: Duration) -> EngineResult<()> {
        self.note("logic");
        Ok(())
    }

    fn process_event(
        &mut self,
        _ctx: &mut GamestateCtx<'_>,
        event: &EngineEvent,
    ) -> EngineResult<()> {
        if let EngineEvent::User(n) = event {
            self.note(&format!("event{n}"));
        }
        Ok(())
    }
}

fn setup(names: &[&str]) -> (GamestateManager, GamestateEnv, Calls) {
    let calls = Calls::default();
    let mut manager = GamestateManager::new();
    for &name in names {
        let calls = calls.clone();
        let owned = name.to_string();
        manager.register(name, move || {
            Box::new(Tracked {
                name: owned.clone(),
                calls: calls.clone(),
            }) as Box<dyn Gamestate>
        });
    }
    (manager, GamestateEnv::default(), calls)
}

fn bring_up(manager: &mut GamestateManager, env: &mut GamestateEnv, name: &str) {
    manager.load(name);
    manager.start(name);
    manager.apply_pending(&mut env.ctx());
}

fn drain(calls: &Calls) -> Vec<String> {
    std::mem::take(&mut *calls.borrow_mut())
}

#[test]
fn menu_loads_on_first_apply() {
    let (mut manager, mut env, calls) = setup(&["menu"]);

    assert!(manager.get("menu").is_none());
    assert!(manager.load("menu"));

    let status = manager.status("menu").unwrap();
    assert!(status.pending_load && status.show_loading);
    assert!(!status.loaded);

    manager.apply_pending(&mut env.ctx());

    let status = manager.status("menu").unwrap();
    assert!(status.loaded);
    assert!(!status.pending_load);
    assert_eq!(drain(&calls), vec!["menu.load"]);
}

#[test]
fn unload_while_load_pending_never_calls_module() {
    let (mut manager, mut env, calls) = setup(&["level"]);

    manager.load("level");
    assert!(manager.unload("level"));
    let report = manager.apply_pending(&mut env.ctx());
    manager.apply_pending(&mut env.ctx());

    assert!(report.is_empty());
    assert!(drain(&calls).is_empty());
    assert!(!manager.is_loaded("level"));
    assert!(!manager.get("level").unwrap().is_resolved());
}

#[test]
fn switch_tears_down_then_brings_up() {
    let (mut manager, mut env, calls) = setup(&["a", "b"]);
    bring_up(&mut manager, &mut env, "a");
    drain(&calls);

    assert!(manager.switch("a", "b"));
    let report = manager.apply_pending(&mut env.ctx());

    assert_eq!(
        drain(&calls),
        vec!["a.stop", "a.unload", "b.load", "b.start"]
    );
    assert_eq!(report.stopped, vec!["a"]);
    assert_eq!(report.unloaded, vec!["a"]);
    assert_eq!(report.loaded, vec!["b"]);
    assert_eq!(report.started, vec!["b"]);
    assert!(!manager.is_loaded("a"));
    assert!(manager.is_started("b"));
}

#[test]
fn switch_batches_phases_across_gamestates() {
    let (mut manager, mut env, calls) = setup(&["a", "b", "c", "d"]);
    bring_up(&mut manager, &mut env, "a");
    bring_up(&mut manager, &mut env, "c");
    drain(&calls);

    manager.switch("a", "b");
    manager.switch("c", "d");
    manager.apply_pending(&mut env.ctx());

    assert_eq!(
        drain(&calls),
        vec![
            "a.stop", "c.stop",
            "a.unload", "c.unload",
            "b.load", "d.load",
            "b.start", "d.start",
        ]
    );
}

#[test]
fn reload_after_unload_uses_a_fresh_instance() {
    let (mut manager, mut env, calls) = setup(&["a"]);
    bring_up(&mut manager, &mut env, "a");

    manager.unload("a");
    manager.load("a");
    manager.start("a");
    manager.apply_pending(&mut env.ctx());

    let seen = drain(&calls);
    assert_eq!(seen[..2], ["a.load", "a.start"]);
    assert_eq!(seen[2..], ["a.stop", "a.unload", "a.load", "a.start"]);
    assert!(manager.is_started("a"));
}

#[test]
fn redundant_requests_are_noops() {
    let (mut manager, mut env, _calls) = setup(&["a"]);
    bring_up(&mut manager, &mut env, "a");

    assert!(!manager.load("a"));
    assert!(!manager.start("a"));
    assert!(manager.stop("a"));
    assert!(!manager.stop("a"));
    assert!(!manager.resume("a", &mut env.ctx()));
}

#[test]
fn freeze_keeps_explicit_pause() {
    let (mut manager, mut env, calls) = setup(&["hud", "world"]);
    bring_up(&mut manager, &mut env, "hud");
    bring_up(&mut manager, &mut env, "world");
    manager.pause("hud", &mut env.ctx());
    drain(&calls);

    manager.freeze_all(&mut env.ctx());
    assert!(manager.is_paused("world"));
    assert!(manager.status("world").unwrap().frozen);
    assert!(!manager.status("hud").unwrap().frozen);

    manager.logic_all(&mut env.ctx(), Duration::from_millis(16));
    manager.unfreeze_all(&mut env.ctx());
    manager.logic_all(&mut env.ctx(), Duration::from_millis(16));

    assert!(manager.is_paused("hud"));
    assert!(!manager.is_paused("world"));
    assert_eq!(
        drain(&calls),
        vec!["world.pause", "world.resume", "world.logic"]
    );
}

#[test]
fn paused_gamestates_still_draw_but_skip_events() {
    let (mut manager, mut env, calls) = setup(&["a", "b"]);
    bring_up(&mut manager, &mut env, "a");
    bring_up(&mut manager, &mut env, "b");
    manager.pause("b", &mut env.ctx());
    drain(&calls);

    manager.event_all(&mut env.ctx(), &EngineEvent::User(7));
    manager.draw_all(&mut env.ctx());

    assert_eq!(drain(&calls), vec!["a.event7", "a.draw", "b.draw"]);
}
