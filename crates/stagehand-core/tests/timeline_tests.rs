use std::time::Duration;

use stagehand_core::{
    ActionArgs, ActionCall, ActionState, EngineEvent, Scheduler, Timeline, TimerEvent,
};

type Log = Vec<String>;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Logs every state and finishes on the first `Running`.
fn instant(tag: &str) -> impl FnMut(&mut Log, &mut ActionCall<'_>) -> bool {
    let tag = tag.to_string();
    move |log, call| {
        log.push(format!("{tag}:{}", call.state));
        call.state == ActionState::Running
    }
}

/// Logs every state and never finishes.
fn endless(tag: &str) -> impl FnMut(&mut Log, &mut ActionCall<'_>) -> bool {
    let tag = tag.to_string();
    move |log, call| {
        log.push(format!("{tag}:{}", call.state));
        false
    }
}

fn only(log: &Log, state: &str) -> Vec<String> {
    log.iter().filter(|l| l.ends_with(state)).cloned().collect()
}

/// Advance the scheduler's timers and feed what fired to the timeline.
fn pump(
    sched: &mut Scheduler,
    tl: &mut Timeline<Log>,
    log: &mut Log,
    dt: Duration,
) -> Vec<TimerEvent> {
    let fired = sched.tick(dt);
    for ev in fired.iter() {
        tl.handle_event(log, &EngineEvent::Timer(*ev));
    }
    fired
}

#[test]
fn instant_actions_finish_in_one_process() {
    let sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("instant");

    let names: Vec<String> = (0..16).map(|i| format!("a{i}")).collect();
    for name in names.iter() {
        tl.add_action(&mut log, name.as_str(), instant(name), ActionArgs::new());
    }

    tl.process(&mut log, Duration::ZERO);

    let expected: Vec<String> = names.iter().map(|n| format!("{n}:Destroy")).collect();
    assert_eq!(only(&log, "Destroy"), expected);
    assert!(tl.is_empty());
}

#[test]
fn a_b_c_destroy_in_order() {
    let sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("abc");

    tl.add_action(&mut log, "a", instant("a"), ActionArgs::new());
    tl.add_action(&mut log, "b", instant("b"), ActionArgs::new());
    tl.add_action(&mut log, "c", instant("c"), ActionArgs::new());
    assert_eq!(tl.queue_len(), 3);

    tl.process(&mut log, ms(16));

    assert_eq!(
        only(&log, "Destroy"),
        vec!["a:Destroy", "b:Destroy", "c:Destroy"]
    );
    assert_eq!(
        log,
        vec![
            "a:Init",
            "b:Init",
            "c:Init",
            "a:Start",
            "a:Running",
            "a:Destroy",
            "b:Start",
            "b:Running",
            "b:Destroy",
            "c:Start",
            "c:Running",
            "c:Destroy",
        ]
    );
    assert!(tl.is_empty());
}

#[test]
fn delay_blocks_until_its_timer_event() {
    let mut sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("delayed");

    tl.add_delay(ms(100));
    tl.add_action(&mut log, "after", instant("after"), ActionArgs::new());
    log.clear();

    for _ in 0..50 {
        tl.process(&mut log, ms(16));
    }
    assert!(log.is_empty());
    assert_eq!(tl.head_name(), Some("delay"));

    // not enough time yet
    assert!(pump(&mut sched, &mut tl, &mut log, ms(60)).is_empty());
    tl.process(&mut log, ms(16));
    assert!(log.is_empty());

    assert_eq!(pump(&mut sched, &mut tl, &mut log, ms(60)).len(), 1);
    tl.process(&mut log, ms(16));
    assert_eq!(log, vec!["after:Start", "after:Running", "after:Destroy"]);
    assert!(tl.is_empty());
    assert!(sched.timers().is_empty());
}

#[test]
fn unrelated_timer_events_do_not_release_a_delay() {
    let mut sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("delayed");
    let mut other: Timeline<Log> = sched.timeline("other");

    tl.add_delay(ms(200));
    other.add_delay(ms(10));
    tl.process(&mut log, Duration::ZERO);
    other.process(&mut log, Duration::ZERO);

    let fired = sched.tick(ms(20));
    assert_eq!(fired.len(), 1);
    assert!(!tl.handle_event(&mut log, &EngineEvent::Timer(fired[0])));
    assert!(other.handle_event(&mut log, &EngineEvent::Timer(fired[0])));

    tl.process(&mut log, Duration::ZERO);
    assert_eq!(tl.head_name(), Some("delay"));
}

#[test]
fn clean_queue_destroys_unstarted_actions_once() {
    let sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("clean");

    tl.add_action(&mut log, "running", endless("running"), ActionArgs::new());
    tl.add_delay(ms(50));
    tl.add_action(&mut log, "x", endless("x"), ActionArgs::new());
    tl.add_action(&mut log, "y", endless("y"), ActionArgs::new());
    tl.process(&mut log, Duration::ZERO);

    tl.clean_queue(&mut log);
    tl.clean_queue(&mut log);

    assert_eq!(
        only(&log, "Destroy"),
        vec!["running:Destroy", "x:Destroy", "y:Destroy"]
    );
    assert!(!log.contains(&"x:Start".to_string()));
    assert!(tl.is_empty());
    assert!(sched.timers().is_empty());
}

#[test]
fn background_action_waits_for_500ms_delay() {
    let mut sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("bg");

    let id = tl.add_background_action(
        &mut log,
        "spawn",
        endless("spawn"),
        ActionArgs::new(),
        ms(500),
    );
    assert_eq!(log, vec!["spawn:Init"]);

    tl.process(&mut log, ms(16));
    assert!(!tl.is_active(id));
    assert_eq!(log, vec!["spawn:Init"]);

    assert!(pump(&mut sched, &mut tl, &mut log, ms(499)).is_empty());
    assert!(!tl.is_active(id));

    assert_eq!(pump(&mut sched, &mut tl, &mut log, ms(1)).len(), 1);
    assert!(tl.is_active(id));

    // the timer is gone, so no second expiry can start it again
    assert!(pump(&mut sched, &mut tl, &mut log, ms(500)).is_empty());
    tl.process(&mut log, ms(16));

    assert_eq!(only(&log, "Start"), vec!["spawn:Start"]);
    assert_eq!(log.last().map(String::as_str), Some("spawn:Running"));
}

#[test]
fn pause_resume_keeps_pending_start() {
    let mut sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("paused");

    tl.add_background_action(&mut log, "bg", endless("bg"), ActionArgs::new(), ms(100));
    pump(&mut sched, &mut tl, &mut log, ms(40));

    tl.pause(&mut log);
    tl.resume(&mut log);
    pump(&mut sched, &mut tl, &mut log, ms(40));
    assert!(only(&log, "Start").is_empty());

    // time spent paused does not count
    tl.pause(&mut log);
    assert!(pump(&mut sched, &mut tl, &mut log, ms(1000)).is_empty());
    tl.resume(&mut log);

    assert!(pump(&mut sched, &mut tl, &mut log, ms(10)).is_empty());
    assert_eq!(pump(&mut sched, &mut tl, &mut log, ms(10)).len(), 1);
    assert!(pump(&mut sched, &mut tl, &mut log, ms(100)).is_empty());
    assert_eq!(only(&log, "Start"), vec!["bg:Start"]);
}

#[test]
fn pause_and_resume_reach_active_actions() {
    let sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("side");

    tl.add_action(&mut log, "head", endless("head"), ActionArgs::new());
    tl.add_background_action(
        &mut log,
        "bg",
        endless("bg"),
        ActionArgs::new(),
        Duration::ZERO,
    );
    tl.process(&mut log, Duration::ZERO);
    log.clear();

    tl.pause(&mut log);
    tl.resume(&mut log);
    assert_eq!(
        log,
        vec!["head:Pause", "bg:Pause", "head:Resume", "bg:Resume"]
    );
}

#[test]
fn skip_delay_expires_on_next_advance() {
    let mut sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("skip");

    tl.add_delay(Duration::from_secs(30));
    tl.add_action(&mut log, "after", instant("after"), ActionArgs::new());
    tl.process(&mut log, Duration::ZERO);

    assert!(tl.skip_delay());
    assert_eq!(pump(&mut sched, &mut tl, &mut log, ms(1)).len(), 1);
    tl.process(&mut log, Duration::ZERO);

    assert_eq!(only(&log, "Destroy"), vec!["after:Destroy"]);
}

#[test]
fn background_completion_removes_action() {
    let sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("bg");

    let mut ticks = 0;
    tl.add_background_action(
        &mut log,
        "countdown",
        move |log: &mut Log, call: &mut ActionCall<'_>| {
            if call.state != ActionState::Running {
                log.push(format!("countdown:{}", call.state));
                return false;
            }
            ticks += 1;
            ticks == 3
        },
        ActionArgs::new(),
        Duration::ZERO,
    );

    for _ in 0..2 {
        tl.process(&mut log, ms(16));
    }
    assert_eq!(tl.background_len(), 1);

    tl.process(&mut log, ms(16));
    assert!(tl.is_background_empty());
    assert_eq!(
        log,
        vec!["countdown:Init", "countdown:Start", "countdown:Destroy"]
    );
}

#[test]
fn destroy_cleans_both_queues_and_unregisters() {
    let sched = Scheduler::new();
    let mut log = Log::new();
    let mut tl = sched.timeline("gone");

    tl.add_action(&mut log, "q", endless("q"), ActionArgs::new());
    tl.add_background_action(&mut log, "bg", endless("bg"), ActionArgs::new(), ms(300));
    assert_eq!(
        sched.timelines().describe(),
        vec!["gone: [q] bg [bg]".to_string()]
    );

    tl.destroy(&mut log);

    assert_eq!(only(&log, "Destroy"), vec!["q:Destroy", "bg:Destroy"]);
    assert!(sched.timelines().is_empty());
    assert!(sched.timers().is_empty());
}

#[test]
fn args_macro_builds_positional_bag() {
    let sched = Scheduler::new();
    let mut out = Vec::<String>::new();
    let mut tl = sched.timeline("args");

    tl.add_action(
        &mut out,
        "greet",
        |out: &mut Vec<String>, call: &mut ActionCall<'_>| {
            if call.state == ActionState::Running {
                let who = call.args.get::<&str>(0);
                let times = *call.args.get::<u32>(1);
                out.push(who.repeat(times as usize));
                return true;
            }
            false
        },
        stagehand_core::args!["ab", 3_u32],
    );
    tl.process(&mut out, Duration::ZERO);

    assert_eq!(out, vec!["ababab"]);
}
