//! Delay timers driven by the engine tick.
//!
//! Timers never fire on their own: the owner advances them with an explicit delta and
//! turns the returned [`TimerEvent`]s into engine events. Expiry is therefore observed by
//! whoever receives the event, not by whoever created the timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// Generation-checked timer handle.
///
/// A destroyed timer's slot may be reused; the generation makes stale ids never match
/// the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    index: u32,
    generation: u32,
}

impl TimerId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Expiry notification; `count` is the number of whole periods elapsed since the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub source: TimerId,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
struct Timer {
    delay: Duration,
    elapsed: Duration,
    state: TimerState,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    timer: Option<Timer>,
}

#[derive(Debug, Default)]
struct TimerSlots {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl TimerSlots {
    fn get_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.timer.as_mut()
    }

    fn get(&self, id: TimerId) -> Option<&Timer> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.timer.as_ref()
    }
}

/// Shared timer service.
///
/// Cloning yields another handle to the same set; the engine owns one and hands clones
/// to timelines.
#[derive(Clone, Default)]
pub struct Timers {
    inner: Arc<Mutex<TimerSlots>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stopped timer.
    pub fn create(&self, delay: Duration) -> TimerId {
        let mut inner = self.inner.lock();
        inner.live += 1;

        let timer = Timer {
            delay,
            elapsed: Duration::ZERO,
            state: TimerState::Idle,
        };

        if let Some(index) = inner.free.pop() {
            let slot = &mut inner.slots[index as usize];
            slot.timer = Some(timer);
            TimerId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = inner.slots.len() as u32;
            inner.slots.push(Slot {
                generation: 0,
                timer: Some(timer),
            });
            TimerId {
                index,
                generation: 0,
            }
        }
    }

    /// Start (or restart) the timer from zero.
    pub fn start(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(t) = inner.get_mut(id) else {
            return false;
        };
        t.elapsed = Duration::ZERO;
        t.state = TimerState::Running;
        true
    }

    /// Stop a running timer, keeping its elapsed time.
    pub fn stop(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(t) = inner.get_mut(id) else {
            return false;
        };
        if t.state != TimerState::Running {
            return false;
        }
        t.state = TimerState::Stopped;
        true
    }

    /// Resume a timer stopped by [`Timers::stop`]. Timers that were never started stay idle.
    pub fn resume(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(t) = inner.get_mut(id) else {
            return false;
        };
        if t.state != TimerState::Stopped {
            return false;
        }
        t.state = TimerState::Running;
        true
    }

    pub fn destroy(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(slot) = inner.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation || slot.timer.is_none() {
            return false;
        }
        slot.timer = None;
        slot.generation = slot.generation.wrapping_add(1);
        inner.free.push(id.index);
        inner.live -= 1;
        true
    }

    /// True once the timer was started, even if it is currently stopped.
    pub fn is_started(&self, id: TimerId) -> bool {
        let inner = self.inner.lock();
        inner.get(id).is_some_and(|t| t.state != TimerState::Idle)
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        let inner = self.inner.lock();
        let timer = inner.get(id);
        timer.is_some_and(|t| t.state == TimerState::Running)
    }

    pub fn exists(&self, id: TimerId) -> bool {
        self.inner.lock().get(id).is_some()
    }

    pub fn set_delay(&self, id: TimerId, delay: Duration) -> bool {
        let mut inner = self.inner.lock();
        let Some(t) = inner.get_mut(id) else {
            return false;
        };
        t.delay = delay;
        true
    }

    /// Make the timer expire on the next advance. Stopped or idle timers expire as soon
    /// as they run again.
    pub fn skip(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(t) = inner.get_mut(id) else {
            return false;
        };
        t.elapsed = t.delay;
        true
    }

    /// Advance every running timer by `dt` and report the ones that expired.
    ///
    /// A zero-delay timer fires once per advance.
    pub fn advance(&self, dt: Duration) -> Vec<TimerEvent> {
        let mut inner = self.inner.lock();
        let mut fired = Vec::new();

        for (index, slot) in inner.slots.iter_mut().enumerate() {
            let Some(t) = slot.timer.as_mut() else {
                continue;
            };
            if t.state != TimerState::Running {
                continue;
            }

            t.elapsed += dt;
            if t.elapsed < t.delay {
                continue;
            }

            let count = if t.delay.is_zero() {
                t.elapsed = Duration::ZERO;
                1
            } else {
                let n = (t.elapsed.as_nanos() / t.delay.as_nanos()) as u32;
                t.elapsed -= t.delay * n;
                n
            };

            fired.push(TimerEvent {
                source: TimerId {
                    index: index as u32,
                    generation: slot.generation,
                },
                count,
            });
        }

        if !fired.is_empty() {
            log::trace!(target: "timer", "{} timer(s) fired", fired.len());
        }
        fired
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.inner.lock().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
