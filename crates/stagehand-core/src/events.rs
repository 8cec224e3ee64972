use crate::timer::{TimerEvent, TimerId};

/// Everything the engine forwards to gamestates and timelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Timer(TimerEvent),
    FocusLost,
    FocusGained,
    Resized { width: u32, height: u32 },
    CloseRequested,
    /// Platform key code; the core does not interpret it.
    Key { code: u32, pressed: bool },
    User(u64),
}

impl EngineEvent {
    /// Source of a timer event, `None` for every other kind.
    #[inline]
    pub fn timer_source(&self) -> Option<TimerId> {
        match self {
            EngineEvent::Timer(ev) => Some(ev.source),
            _ => None,
        }
    }
}

impl From<TimerEvent> for EngineEvent {
    #[inline]
    fn from(value: TimerEvent) -> Self {
        EngineEvent::Timer(value)
    }
}
