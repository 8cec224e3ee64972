//! Cooperative action scheduler.
//!
//! A [`Timeline`] owns an ordered queue, where only the head runs, and a background set,
//! where every active action runs on each [`Timeline::process`]. Actions are callbacks
//! driven through [`ActionState`]; they never change their own state.
//!
//! Delays are timer-driven: a delay at the head of the queue starts a timer, and only the
//! matching timer event passed to [`Timeline::handle_event`] lets the queue move on. The
//! `delta` given to `process` is forwarded to `Running` callbacks and plays no part in
//! delays.

mod action;
mod args;
mod registry;

pub use action::{ActionCall, ActionCallback, ActionId, ActionState};
pub use args::ActionArgs;
pub use registry::{TimelineRegistry, TimelineSnapshot};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use parking_lot::Mutex;

use action::{ActionKind, ActionNode, KindTag, QueuedBackground};

use crate::events::EngineEvent;
use crate::timer::Timers;

const DELAY_NAME: &str = "delay";

pub struct Timeline<C> {
    name: String,
    queue: VecDeque<ActionNode<C>>,
    background: Vec<ActionNode<C>>,
    next_id: u64,
    timers: Timers,
    snapshot: Arc<Mutex<TimelineSnapshot>>,
}

impl<C> Timeline<C> {
    /// Standalone timeline. Use `Scheduler::timeline` to also make it visible in the
    /// timeline registry.
    pub fn new(name: impl Into<String>, timers: Timers) -> Self {
        let name = name.into();
        debug!(target: "timeline", "[{name}] created");
        Self {
            snapshot: Arc::new(Mutex::new(TimelineSnapshot {
                name: name.clone(),
                ..TimelineSnapshot::default()
            })),
            name,
            queue: VecDeque::new(),
            background: Vec::new(),
            next_id: 0,
            timers,
        }
    }

    pub(crate) fn snapshot_handle(&self) -> &Arc<Mutex<TimelineSnapshot>> {
        &self.snapshot
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn is_background_empty(&self) -> bool {
        self.background.is_empty()
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn background_len(&self) -> usize {
        self.background.len()
    }

    pub fn head_name(&self) -> Option<&str> {
        self.queue.front().map(|a| a.name.as_str())
    }

    /// Whether the action is still queued or in the background set.
    pub fn contains(&self, id: ActionId) -> bool {
        self.queue
            .iter()
            .chain(self.background.iter())
            .any(|a| a.id == id)
    }

    /// Whether the action has received `Start` and not finished yet.
    pub fn is_active(&self, id: ActionId) -> bool {
        self.queue
            .iter()
            .chain(self.background.iter())
            .any(|a| a.id == id && a.active)
    }

    fn next_id(&mut self) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a callback action to the ordered queue. `Init` fires immediately.
    pub fn add_action<F>(
        &mut self,
        ctx: &mut C,
        name: impl Into<String>,
        callback: F,
        args: ActionArgs,
    ) -> ActionId
    where
        F: FnMut(&mut C, &mut ActionCall<'_>) -> bool + 'static,
    {
        let id = self.next_id();
        let mut node = ActionNode {
            id,
            name: name.into(),
            kind: ActionKind::Callback(Box::new(callback)),
            args,
            delay: Duration::ZERO,
            timer: None,
            active: false,
        };
        debug!(target: "timeline", "[{}] queued action '{}'", self.name, node.name);
        node.call(ctx, ActionState::Init, Duration::ZERO);
        self.queue.push_back(node);
        self.refresh();
        id
    }

    /// Append a pure delay to the ordered queue.
    ///
    /// Its timer starts once the delay reaches the head; the queue moves on only after
    /// the matching timer event was handled.
    pub fn add_delay(&mut self, delay: Duration) -> ActionId {
        let id = self.next_id();
        let timer = self.timers.create(delay);
        self.queue.push_back(ActionNode {
            id,
            name: DELAY_NAME.to_string(),
            kind: ActionKind::Delay,
            args: ActionArgs::new(),
            delay,
            timer: Some(timer),
            active: false,
        });
        debug!(target: "timeline", "[{}] queued delay of {} ms", self.name, delay.as_millis());
        self.refresh();
        id
    }

    /// Register an action that runs alongside everything else.
    ///
    /// `Init` fires immediately. With a zero delay the action becomes active and receives
    /// `Start` right away; otherwise it waits for its timer event.
    pub fn add_background_action<F>(
        &mut self,
        ctx: &mut C,
        name: impl Into<String>,
        callback: F,
        args: ActionArgs,
        delay: Duration,
    ) -> ActionId
    where
        F: FnMut(&mut C, &mut ActionCall<'_>) -> bool + 'static,
    {
        let id = self.push_background(ctx, name.into(), Box::new(callback), args, delay);
        self.refresh();
        id
    }

    /// Queue a step that, once it reaches the head, moves the action into the background
    /// set. The action's `Init` fires at that point, not now.
    pub fn add_queued_background_action<F>(
        &mut self,
        name: impl Into<String>,
        callback: F,
        args: ActionArgs,
        delay: Duration,
    ) -> ActionId
    where
        F: FnMut(&mut C, &mut ActionCall<'_>) -> bool + 'static,
    {
        let id = self.next_id();
        self.queue.push_back(ActionNode {
            id,
            name: name.into(),
            kind: ActionKind::QueuedBackground(Some(QueuedBackground {
                callback: Box::new(callback),
                args,
                delay,
            })),
            args: ActionArgs::new(),
            delay,
            timer: None,
            active: false,
        });
        self.refresh();
        id
    }

    fn push_background(
        &mut self,
        ctx: &mut C,
        name: String,
        callback: ActionCallback<C>,
        args: ActionArgs,
        delay: Duration,
    ) -> ActionId {
        let id = self.next_id();
        let mut node = ActionNode {
            id,
            name,
            kind: ActionKind::Callback(callback),
            args,
            delay,
            timer: None,
            active: false,
        };

        if delay.is_zero() {
            node.active = true;
        } else {
            let timer = self.timers.create(delay);
            self.timers.start(timer);
            node.timer = Some(timer);
        }

        debug!(
            target: "timeline",
            "[{}] background action '{}' registered (delay {} ms)",
            self.name,
            node.name,
            delay.as_millis()
        );

        node.call(ctx, ActionState::Init, Duration::ZERO);
        if node.active {
            node.call(ctx, ActionState::Start, Duration::ZERO);
        }

        self.background.push(node);
        id
    }

    /// Step the ordered queue, then every active background action.
    ///
    /// Finished actions at the head are destroyed and the next head is processed in the
    /// same call, so any number of instant actions complete within one tick.
    pub fn process(&mut self, ctx: &mut C, delta: Duration) {
        loop {
            let Some(head) = self.queue.front_mut() else {
                break;
            };

            match head.tag() {
                KindTag::Callback => {
                    if !head.active {
                        head.call(ctx, ActionState::Start, Duration::ZERO);
                        head.active = true;
                    }
                    if !head.call(ctx, ActionState::Running, delta) {
                        break;
                    }
                    head.call(ctx, ActionState::Destroy, Duration::ZERO);
                    if let Some(done) = self.queue.pop_front() {
                        trace!(
                            target: "timeline",
                            "[{}] action '{}' finished",
                            self.name,
                            done.name
                        );
                        self.discard(done);
                    }
                }
                KindTag::Delay => {
                    if head.active {
                        if let Some(done) = self.queue.pop_front() {
                            self.discard(done);
                        }
                        continue;
                    }
                    if let Some(timer) = head.timer {
                        if !self.timers.is_started(timer) {
                            self.timers.start(timer);
                            trace!(
                                target: "timeline",
                                "[{}] delay of {} ms started",
                                self.name,
                                head.delay.as_millis()
                            );
                        }
                    }
                    break;
                }
                KindTag::QueuedBackground => {
                    let Some(mut step) = self.queue.pop_front() else {
                        break;
                    };
                    let payload = match &mut step.kind {
                        ActionKind::QueuedBackground(payload) => payload.take(),
                        _ => None,
                    };
                    let name = std::mem::take(&mut step.name);
                    self.discard(step);
                    if let Some(p) = payload {
                        self.push_background(ctx, name, p.callback, p.args, p.delay);
                    }
                }
            }
        }

        let mut i = 0;
        while i < self.background.len() {
            let node = &mut self.background[i];
            if !node.active {
                i += 1;
                continue;
            }
            if node.call(ctx, ActionState::Running, delta) {
                node.call(ctx, ActionState::Destroy, Duration::ZERO);
                let done = self.background.remove(i);
                trace!(
                    target: "timeline",
                    "[{}] background action '{}' finished",
                    self.name,
                    done.name
                );
                self.discard(done);
            } else {
                i += 1;
            }
        }

        self.refresh();
    }

    /// Feed an engine event to the timeline. Returns `true` if one of its timers matched.
    ///
    /// Only the ordered head and background actions own running timers; the first match
    /// becomes active and receives `Start` (a delay just completes).
    pub fn handle_event(&mut self, ctx: &mut C, event: &EngineEvent) -> bool {
        let Some(source) = event.timer_source() else {
            return false;
        };
        let timer = Some(source);

        if let Some(head) = self.queue.front_mut() {
            if head.timer == timer {
                head.active = true;
                head.timer = None;
                self.timers.destroy(source);
                if head.has_callback() {
                    head.call(ctx, ActionState::Start, Duration::ZERO);
                } else {
                    debug!(
                        target: "timeline",
                        "[{}] delay of {} ms reached",
                        self.name,
                        head.delay.as_millis()
                    );
                }
                self.refresh();
                return true;
            }
        }

        let Some(node) = self.background.iter_mut().find(|a| a.timer == timer) else {
            return false;
        };
        node.active = true;
        node.timer = None;
        self.timers.destroy(source);
        debug!(
            target: "timeline",
            "[{}] background action '{}' delay reached",
            self.name,
            node.name
        );
        node.call(ctx, ActionState::Start, Duration::ZERO);

        self.refresh();
        true
    }

    /// Send a side-channel state to the active head and every active background action.
    pub fn propagate(&mut self, ctx: &mut C, state: ActionState) {
        if let Some(head) = self.queue.front_mut() {
            if head.active {
                head.call(ctx, state, Duration::ZERO);
            }
        }
        for node in self.background.iter_mut() {
            if node.active {
                node.call(ctx, state, Duration::ZERO);
            }
        }
    }

    #[inline]
    pub fn draw(&mut self, ctx: &mut C) {
        self.propagate(ctx, ActionState::Draw);
    }

    /// Stop pending delay timers so paused time does not count, then notify actions.
    pub fn pause(&mut self, ctx: &mut C) {
        debug!(target: "timeline", "[{}] paused", self.name);
        if let Some(timer) = self.queue.front().and_then(|a| a.timer) {
            self.timers.stop(timer);
        }
        for timer in self.background.iter().filter_map(|a| a.timer) {
            self.timers.stop(timer);
        }
        self.propagate(ctx, ActionState::Pause);
    }

    /// Undo [`Timeline::pause`]. Timers that were not running when paused stay as they are.
    pub fn resume(&mut self, ctx: &mut C) {
        debug!(target: "timeline", "[{}] resumed", self.name);
        self.propagate(ctx, ActionState::Resume);
        if let Some(timer) = self.queue.front().and_then(|a| a.timer) {
            self.timers.resume(timer);
        }
        for timer in self.background.iter().filter_map(|a| a.timer) {
            self.timers.resume(timer);
        }
    }

    /// Make the delay at the head expire on the next timer advance.
    pub fn skip_delay(&mut self) -> bool {
        let Some(head) = self.queue.front() else {
            return false;
        };
        if head.has_callback() {
            return false;
        }
        let Some(timer) = head.timer else {
            return false;
        };
        debug!(target: "timeline", "[{}] skipping delay", self.name);
        self.timers.set_delay(timer, Duration::ZERO)
    }

    /// Destroy every queued action, started or not, without waiting for completion.
    pub fn clean_queue(&mut self, ctx: &mut C) {
        if self.queue.is_empty() {
            return;
        }
        debug!(
            target: "timeline",
            "[{}] cleaning queue ({} actions)",
            self.name,
            self.queue.len()
        );
        let drained: Vec<_> = self.queue.drain(..).collect();
        for mut node in drained {
            node.call(ctx, ActionState::Destroy, Duration::ZERO);
            self.discard(node);
        }
        self.refresh();
    }

    /// Destroy every background action, active or still waiting on its delay.
    pub fn clean_background_queue(&mut self, ctx: &mut C) {
        if self.background.is_empty() {
            return;
        }
        debug!(
            target: "timeline",
            "[{}] cleaning background queue ({} actions)",
            self.name,
            self.background.len()
        );
        let drained: Vec<_> = self.background.drain(..).collect();
        for mut node in drained {
            node.call(ctx, ActionState::Destroy, Duration::ZERO);
            self.discard(node);
        }
        self.refresh();
    }

    /// Clean both queues and drop the timeline, removing it from the registry.
    pub fn destroy(mut self, ctx: &mut C) {
        self.clean_queue(ctx);
        self.clean_background_queue(ctx);
        debug!(target: "timeline", "[{}] destroyed", self.name);
    }

    fn discard(&self, node: ActionNode<C>) {
        if let Some(timer) = node.timer {
            self.timers.destroy(timer);
        }
    }

    fn refresh(&self) {
        let mut snap = self.snapshot.lock();
        snap.queue = self.queue.iter().map(|a| a.name.clone()).collect();
        snap.background = self.background.iter().map(|a| a.name.clone()).collect();
    }
}

impl<C> Drop for Timeline<C> {
    fn drop(&mut self) {
        // Callbacks need a context, so only timers are released here.
        for node in self.queue.iter().chain(self.background.iter()) {
            if let Some(timer) = node.timer {
                self.timers.destroy(timer);
            }
        }
    }
}
