use std::time::Duration;

use crate::timeline::{Timeline, TimelineRegistry};
use crate::timer::{TimerEvent, Timers};

/// Timer service plus the registry of live timelines.
///
/// One per engine; cloning hands out another handle to the same state.
#[derive(Clone, Default)]
pub struct Scheduler {
    timers: Timers,
    timelines: TimelineRegistry,
}

impl Scheduler {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    #[inline]
    pub fn timelines(&self) -> &TimelineRegistry {
        &self.timelines
    }

    /// Create a timeline registered for debug inspection.
    pub fn timeline<C>(&self, name: impl Into<String>) -> Timeline<C> {
        let timeline = Timeline::new(name, self.timers.clone());
        self.timelines.track(timeline.snapshot_handle());
        timeline
    }

    #[inline]
    pub fn tick(&mut self, dt: Duration) -> Vec<TimerEvent> {
        self.timers.advance(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_follows_timeline_lifetime() {
        let sched = Scheduler::new();
        let mut a: Timeline<()> = sched.timeline("a");
        let b: Timeline<()> = sched.timeline("b");
        a.add_delay(Duration::from_millis(5));

        let snaps = sched.timelines().snapshots();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].name, "a");
        assert_eq!(snaps[0].queue, vec!["delay".to_string()]);

        b.destroy(&mut ());
        drop(a);
        assert!(sched.timelines().is_empty());
        assert!(sched.timers().is_empty());
    }
}
