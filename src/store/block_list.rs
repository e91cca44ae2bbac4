//! User-curated block lists of sellers and brands.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Listeners, Subscription};
use crate::text::normalize_text;

/// One blocked seller or brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockListEntry {
    /// The spelling first added by the user.
    pub display_name: String,
    /// Trimmed, case-folded key. Unique within a list, never empty.
    pub normalized_key: String,
}

impl BlockListEntry {
    /// Build an entry from a user-facing name. `None` for blank names.
    #[must_use]
    pub fn new(name: &str) -> Option<Self> {
        let display_name = name.trim();
        if display_name.is_empty() {
            return None;
        }
        Some(Self {
            display_name: display_name.to_string(),
            normalized_key: normalize_text(display_name),
        })
    }
}

/// What subscribers receive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockListSnapshot {
    /// Display names in insertion order.
    pub names: Vec<String>,
    /// Normalized keys for membership tests.
    pub normalized: HashSet<String>,
}

impl BlockListSnapshot {
    /// Whether `name` (normalized) is blocked.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.normalized.contains(&normalize_text(name))
    }
}

/// A deduplicated, observable list of blocked names.
#[derive(Default)]
pub struct BlockList {
    entries: RefCell<Vec<BlockListEntry>>,
    listeners: Rc<Listeners<BlockListSnapshot>>,
}

impl BlockList {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List built from names, applying the same dedup as [`BlockList::add`].
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<BlockListEntry> = Vec::new();
        for name in names {
            if let Some(entry) = BlockListEntry::new(name.as_ref()) {
                if !entries.iter().any(|e| e.normalized_key == entry.normalized_key) {
                    entries.push(entry);
                }
            }
        }
        Self {
            entries: RefCell::new(entries),
            listeners: Rc::default(),
        }
    }

    /// List rebuilt from a persisted value.
    ///
    /// Anything but an array is discarded; non-string and blank items are
    /// skipped and duplicates collapsed, so legacy data is cleaned on load.
    #[must_use]
    pub fn from_persisted(value: Option<&Value>) -> Self {
        let Some(Value::Array(items)) = value else {
            if value.is_some() {
                debug!("discarding block list with unexpected shape");
            }
            return Self::new();
        };
        Self::from_names(items.iter().filter_map(Value::as_str))
    }

    /// Value to persist: the display names, in order.
    #[must_use]
    pub fn to_persisted(&self) -> Value {
        Value::Array(self.names().into_iter().map(Value::String).collect())
    }

    /// Add a name. Returns `false` (and notifies nobody) for blank names and
    /// names whose key is already present; the first spelling wins.
    pub fn add(&self, name: &str) -> bool {
        let Some(entry) = BlockListEntry::new(name) else {
            return false;
        };
        {
            let mut entries = self.entries.borrow_mut();
            if entries.iter().any(|e| e.normalized_key == entry.normalized_key) {
                return false;
            }
            entries.push(entry);
        }
        self.notify();
        true
    }

    /// Remove the entry matching `name` case-insensitively.
    pub fn remove(&self, name: &str) -> bool {
        let key = normalize_text(name);
        if key.is_empty() {
            return false;
        }
        {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|e| e.normalized_key != key);
            if entries.len() == before {
                return false;
            }
        }
        self.notify();
        true
    }

    /// Whether `name` is blocked.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let key = normalize_text(name);
        self.entries.borrow().iter().any(|e| e.normalized_key == key)
    }

    /// Display names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|e| e.display_name.clone()).collect()
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<BlockListEntry> {
        self.entries.borrow().clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BlockListSnapshot {
        let entries = self.entries.borrow();
        BlockListSnapshot {
            names: entries.iter().map(|e| e.display_name.clone()).collect(),
            normalized: entries.iter().map(|e| e.normalized_key.clone()).collect(),
        }
    }

    /// Subscribe to changes. `listener` is called right away with the
    /// current snapshot.
    pub fn subscribe(&self, listener: impl Fn(&BlockListSnapshot) + 'static) -> Subscription {
        let listener: Rc<dyn Fn(&BlockListSnapshot)> = Rc::new(listener);
        let id = self.listeners.add(Rc::clone(&listener));
        listener(&self.snapshot());
        Subscription::new(&self.listeners, id)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.listeners.notify(&snapshot);
    }
}
