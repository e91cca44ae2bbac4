//! Settings and block-list stores, and their persistence.
//!
//! Stores are plain in-memory state with synchronous subscribers. Every
//! subscriber receives a snapshot immediately on subscribing and after
//! every change; a change to the same value notifies nobody.

pub mod block_list;
pub mod storage;
pub mod toggles;

pub use block_list::{BlockList, BlockListEntry, BlockListSnapshot};
pub use storage::{
    JsonFileStorage, MemoryStorage, Storage, BLOCKED_BRANDS_KEY, BLOCKED_SELLERS_KEY, TOGGLE_STATE_KEY,
};
pub use toggles::{default_toggles, Toggle, ToggleStore};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

/// Subscriber registry shared by the stores.
pub(crate) struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<T> Listeners<T> {
    pub(crate) fn add(&self, listener: Listener<T>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Call every listener with `value`. The registry is not borrowed while
    /// listeners run, so they may subscribe or unsubscribe.
    pub(crate) fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self.entries.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(value);
        }
    }
}

/// Handle returned by `subscribe`. Dropping it keeps the subscription;
/// call [`Subscription::unsubscribe`] to end it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new<T: 'static>(listeners: &Rc<Listeners<T>>, id: u64) -> Self {
        let weak: Weak<Listeners<T>> = Rc::downgrade(listeners);
        Self {
            cancel: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.remove(id);
                }
            })),
        }
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
