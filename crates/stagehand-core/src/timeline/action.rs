use std::fmt;
use std::time::Duration;

use super::args::ActionArgs;
use crate::timer::TimerId;

/// Lifecycle state an action callback is invoked with.
///
/// `Init`, `Start`, `Running` and `Destroy` are driven by the timeline; `Draw`, `Pause`
/// and `Resume` are side-channel notifications sent to active actions only.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ActionState {
    Init,
    Start,
    Running,
    Draw,
    Pause,
    Resume,
    Destroy,
}

impl ActionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionState::Init => "Init",
            ActionState::Start => "Start",
            ActionState::Running => "Running",
            ActionState::Draw => "Draw",
            ActionState::Pause => "Pause",
            ActionState::Resume => "Resume",
            ActionState::Destroy => "Destroy",
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-timeline action id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) u64);

impl ActionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What a callback sees on each invocation.
pub struct ActionCall<'a> {
    pub id: ActionId,
    pub name: &'a str,
    pub state: ActionState,
    /// Delta handed to `Timeline::process`; zero for every state but `Running`.
    pub delta: Duration,
    pub args: &'a mut ActionArgs,
}

/// Action callback. The return value is only meaningful for `Running`: `true` means done.
pub type ActionCallback<C> = Box<dyn FnMut(&mut C, &mut ActionCall<'_>) -> bool>;

pub(crate) struct QueuedBackground<C> {
    pub(crate) callback: ActionCallback<C>,
    pub(crate) args: ActionArgs,
    pub(crate) delay: Duration,
}

pub(crate) enum ActionKind<C> {
    Callback(ActionCallback<C>),
    /// Pure delay marker, completed by its timer event.
    Delay,
    /// Ordered step that hands its payload over to the background set.
    QueuedBackground(Option<QueuedBackground<C>>),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum KindTag {
    Callback,
    Delay,
    QueuedBackground,
}

pub(crate) struct ActionNode<C> {
    pub(crate) id: ActionId,
    pub(crate) name: String,
    pub(crate) kind: ActionKind<C>,
    pub(crate) args: ActionArgs,
    pub(crate) delay: Duration,
    pub(crate) timer: Option<TimerId>,
    pub(crate) active: bool,
}

impl<C> ActionNode<C> {
    pub(crate) fn tag(&self) -> KindTag {
        match self.kind {
            ActionKind::Callback(_) => KindTag::Callback,
            ActionKind::Delay => KindTag::Delay,
            ActionKind::QueuedBackground(_) => KindTag::QueuedBackground,
        }
    }

    #[inline]
    pub(crate) fn has_callback(&self) -> bool {
        matches!(self.kind, ActionKind::Callback(_))
    }

    /// Invoke the callback; nodes without one report "not done".
    pub(crate) fn call(&mut self, ctx: &mut C, state: ActionState, delta: Duration) -> bool {
        let ActionKind::Callback(callback) = &mut self.kind else {
            return false;
        };

        log::trace!(target: "timeline", "action '{}' ({}) -> {}", self.name, self.id.0, state);

        let mut call = ActionCall {
            id: self.id,
            name: &self.name,
            state,
            delta,
            args: &mut self.args,
        };
        callback(ctx, &mut call)
    }
}
