//! Filter toggles.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{Listeners, Subscription};

/// Toggle id of the unbranded filter.
pub const FILTER_MERKLOOS: &str = "filter-merkloos";
/// Toggle id of the sponsored filter.
pub const FILTER_GESPONSORD: &str = "filter-gesponsord";
/// Toggle id of the house advertising filter.
pub const FILTER_GENERAL_ADS: &str = "filter-general-ads";
/// Toggle id of the third-party seller filter.
pub const FILTER_VERKOOP_DOOR_BOL: &str = "filter-verkoop-door-bol";
/// Toggle id of the good-choice filter.
pub const FILTER_GOEDE_KEUZE: &str = "filter-goede-keuze";

/// A user-facing on/off switch for one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    /// Accessible text of the badge shown next to the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl Toggle {
    fn new(id: &str, label: &str, enabled: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: String::new(),
            enabled,
            badge: None,
        }
    }
}

/// The toggles shipped with the extension, in panel order.
#[must_use]
pub fn default_toggles() -> Vec<Toggle> {
    vec![
        Toggle::new(FILTER_MERKLOOS, "Merkloze producten wegfilteren", true),
        Toggle::new(FILTER_GESPONSORD, "Gesponsorde producten wegfilteren", true),
        Toggle::new(FILTER_GENERAL_ADS, "Advertentieblokken wegfilteren", true),
        Toggle::new(FILTER_VERKOOP_DOOR_BOL, "Verkoop door Bol", false),
        Toggle {
            badge: Some("Goede keuze".to_string()),
            ..Toggle::new(FILTER_GOEDE_KEUZE, "Alleen goede keuzes tonen", false)
        },
    ]
}

/// Observable set of toggles.
pub struct ToggleStore {
    toggles: RefCell<Vec<Toggle>>,
    listeners: Rc<Listeners<Vec<Toggle>>>,
}

impl Default for ToggleStore {
    fn default() -> Self {
        Self::new(default_toggles())
    }
}

impl ToggleStore {
    /// Store holding `toggles`. Later duplicates of an id are ignored.
    #[must_use]
    pub fn new(toggles: Vec<Toggle>) -> Self {
        let mut unique: Vec<Toggle> = Vec::with_capacity(toggles.len());
        for toggle in toggles {
            if !unique.iter().any(|t| t.id == toggle.id) {
                unique.push(toggle);
            }
        }
        Self {
            toggles: RefCell::new(unique),
            listeners: Rc::default(),
        }
    }

    /// Default toggles with persisted states applied on top.
    ///
    /// The persisted value is an object of id to bool. Unknown ids and
    /// non-boolean values are ignored; any other shape is discarded.
    #[must_use]
    pub fn from_persisted(value: Option<&Value>) -> Self {
        let store = Self::default();
        match value {
            Some(Value::Object(states)) => {
                let mut toggles = store.toggles.borrow_mut();
                for toggle in toggles.iter_mut() {
                    if let Some(enabled) = states.get(&toggle.id).and_then(Value::as_bool) {
                        toggle.enabled = enabled;
                    }
                }
            }
            Some(_) => debug!("discarding toggle state with unexpected shape"),
            None => {}
        }
        store
    }

    /// Value to persist: every toggle id mapped to its state.
    #[must_use]
    pub fn to_persisted(&self) -> Value {
        let states: Map<String, Value> = self
            .toggles
            .borrow()
            .iter()
            .map(|t| (t.id.clone(), Value::Bool(t.enabled)))
            .collect();
        Value::Object(states)
    }

    /// Set a toggle. Returns `false` for unknown ids and unchanged values,
    /// in which case nobody is notified.
    pub fn set_toggle(&self, id: &str, enabled: bool) -> bool {
        {
            let mut toggles = self.toggles.borrow_mut();
            let Some(toggle) = toggles.iter_mut().find(|t| t.id == id) else {
                debug!(id, "ignoring unknown toggle");
                return false;
            };
            if toggle.enabled == enabled {
                return false;
            }
            toggle.enabled = enabled;
        }
        debug!(id, enabled, "toggle changed");
        self.listeners.notify(&self.all());
        true
    }

    /// A toggle by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Toggle> {
        self.toggles.borrow().iter().find(|t| t.id == id).cloned()
    }

    /// Whether the toggle `id` exists and is on.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.toggles.borrow().iter().any(|t| t.id == id && t.enabled)
    }

    /// Every toggle, in order.
    #[must_use]
    pub fn all(&self) -> Vec<Toggle> {
        self.toggles.borrow().clone()
    }

    /// Subscribe to changes. `listener` is called right away with all
    /// toggles.
    pub fn subscribe(&self, listener: impl Fn(&[Toggle]) + 'static) -> Subscription {
        let listener: Rc<dyn Fn(&Vec<Toggle>)> = Rc::new(move |toggles: &Vec<Toggle>| listener(toggles));
        let id = self.listeners.add(Rc::clone(&listener));
        listener(&self.all());
        Subscription::new(&self.listeners, id)
    }
}
