//! Coalescing rescan scheduler shared by every filter and the monitor.
//!
//! This is deliberately not a resetting debounce: while a run is pending,
//! further `schedule()` calls are dropped instead of pushing the timer
//! back, so a page that mutates continuously still gets scanned every
//! `delay`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::{Scheduler, TimerId};

struct Inner {
    scheduler: Scheduler,
    delay: Duration,
    pending: Cell<Option<TimerId>>,
    scan: Box<dyn Fn()>,
}

/// Single-slot debounced runner around a scan function.
///
/// Cloning yields another handle to the same slot.
#[derive(Clone)]
pub struct DebouncedScanner {
    inner: Rc<Inner>,
}

impl DebouncedScanner {
    /// Wrap `scan` so that it runs at most once per `delay` window.
    pub fn new(scheduler: &Scheduler, delay: Duration, scan: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                scheduler: scheduler.clone(),
                delay,
                pending: Cell::new(None),
                scan: Box::new(scan),
            }),
        }
    }

    /// Request a run. A no-op while one is already pending.
    pub fn schedule(&self) {
        if self.is_pending() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.scheduler.set_timeout(self.inner.delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.pending.set(None);
                (inner.scan)();
            }
        });
        self.inner.pending.set(Some(id));
    }

    /// Cancel the pending run, if any, without running the scan.
    pub fn clear(&self) {
        if let Some(id) = self.inner.pending.take() {
            self.inner.scheduler.clear_timeout(id);
        }
    }

    /// Whether a run is waiting on the timer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}
