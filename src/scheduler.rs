//! Cooperative timer queue.
//!
//! The engine is single-threaded and event driven: all deferred work is a
//! `set_timeout` callback. `Scheduler` provides that primitive over a
//! virtual millisecond clock that only moves when the host calls
//! [`Scheduler::advance`] or [`Scheduler::run_until_idle`], which makes
//! debounce behaviour fully deterministic.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::warn;

use crate::Options;

/// Handle of a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
struct SchedulerState {
    now: Duration,
    next_id: u64,
    /// Keyed by (due time, creation order) so ties fire first-in first-out.
    timers: BTreeMap<(Duration, u64), Callback>,
}

/// Single-threaded timer queue over a virtual clock.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
    max_iterations: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&Options::default())
    }

    /// Create a scheduler using the iteration bound from `options`.
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState::default())),
            max_iterations: options.max_timer_iterations,
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Run `callback` once `delay` has elapsed.
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.timers.insert((due, id), Box::new(callback));
        TimerId(id)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        let key = state.timers.keys().find(|(_, seq)| *seq == id.0).copied();
        key.is_some_and(|key| state.timers.remove(&key).is_some())
    }

    /// Move the clock forward by `by`, firing every timer that falls due,
    /// including timers scheduled by callbacks during the advance.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        while self.fire_next(Some(target)) {
            fired += 1;
            if fired >= self.max_iterations {
                warn!(fired, "timer loop did not settle; stopping advance");
                break;
            }
        }
        let mut state = self.state.borrow_mut();
        if state.now < target {
            state.now = target;
        }
        fired
    }

    /// Fire timers in due order until none are left.
    ///
    /// Returns the number of timers fired. Stops after the configured
    /// iteration bound if callbacks keep rescheduling work.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while self.fire_next(None) {
            fired += 1;
            if fired >= self.max_iterations {
                warn!(fired, pending = self.pending(), "timer loop did not settle; giving up");
                break;
            }
        }
        fired
    }

    /// Pop and run the earliest timer due at or before `limit`.
    ///
    /// The queue borrow is released before the callback runs so callbacks
    /// may schedule or cancel timers.
    fn fire_next(&self, limit: Option<Duration>) -> bool {
        let callback = {
            let mut state = self.state.borrow_mut();
            let Some(&(due, seq)) = state.timers.keys().next() else {
                return false;
            };
            if limit.is_some_and(|limit| due > limit) {
                return false;
            }
            state.now = state.now.max(due);
            state.timers.remove(&(due, seq))
        };
        if let Some(callback) = callback {
            callback();
        }
        true
    }
}
