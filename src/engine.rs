//! Engine Bootstrap
//!
//! Loads persisted settings, builds the stores, every filter and the
//! empty-page monitor, and wires them together:
//!
//! - toggle changes enable or disable their filter;
//! - block list changes rescan the block filters;
//! - every change is persisted and triggers an empty-page check.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::filters::{
    block_button, BlockKind, BrandBlockScan, ConcernScan, Filter, GeneralAdsScan, GoodChoiceScan,
    SellerBlockScan, SponsoredScan, UnbrandedScan, VerkoopDoorBolScan,
};
use crate::monitor::{EmptyPageMonitor, MonitorState};
use crate::page::Page;
use crate::scheduler::Scheduler;
use crate::store::toggles::{
    FILTER_GENERAL_ADS, FILTER_GESPONSORD, FILTER_GOEDE_KEUZE, FILTER_MERKLOOS, FILTER_VERKOOP_DOOR_BOL,
};
use crate::store::{
    BlockList, BlockListSnapshot, Storage, Subscription, Toggle, ToggleStore, BLOCKED_BRANDS_KEY,
    BLOCKED_SELLERS_KEY, TOGGLE_STATE_KEY,
};
use crate::toast::{EmptyPageToast, Notice};
use crate::visibility::Concern;
use crate::Options;

/// Read a persisted value; failures are logged and read as absent.
fn load(storage: &dyn Storage, key: &str) -> Option<Value> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted state, using defaults");
            None
        }
    }
}

/// Write a value; failures are logged and otherwise ignored.
fn persist(storage: &dyn Storage, key: &str, value: Value) {
    if let Err(e) = storage.set(key, value) {
        warn!(key, error = %e, "failed to persist state");
    }
}

/// Subscriber callback that skips the immediate call made on subscribing.
fn after_first<T: ?Sized>(f: impl Fn(&T) + 'static) -> impl Fn(&T) + 'static {
    let primed = Cell::new(false);
    move |value: &T| {
        if primed.replace(true) {
            f(value);
        }
    }
}

/// The running content script for one page.
pub struct Engine {
    page: Rc<Page>,
    scheduler: Scheduler,
    toggles: Rc<ToggleStore>,
    sellers: Rc<BlockList>,
    brands: Rc<BlockList>,
    filters: Vec<(Option<&'static str>, Filter)>,
    monitor: EmptyPageMonitor,
    toast: EmptyPageToast,
    subscriptions: RefCell<Vec<Subscription>>,
    destroyed: Cell<bool>,
}

impl Engine {
    /// Load state from `storage` and start every filter on `page`.
    ///
    /// Scans run on `scheduler`; call [`Engine::flush`] (or advance the
    /// scheduler) to let them happen.
    pub fn start(page: Rc<Page>, scheduler: &Scheduler, storage: Rc<dyn Storage>, options: &Options) -> Self {
        let toggles = Rc::new(ToggleStore::from_persisted(load(&*storage, TOGGLE_STATE_KEY).as_ref()));
        let sellers = Rc::new(BlockList::from_persisted(load(&*storage, BLOCKED_SELLERS_KEY).as_ref()));
        let brands = Rc::new(BlockList::from_persisted(load(&*storage, BLOCKED_BRANDS_KEY).as_ref()));

        block_button::ensure_styles(&page);

        let toast = EmptyPageToast::new(Rc::clone(&page), scheduler, options);
        let notice: Rc<dyn Notice> = Rc::new(toast.clone());
        let monitor = EmptyPageMonitor::new(Rc::clone(&page), scheduler, options, notice);

        let filters: Vec<(Option<&'static str>, Filter)> = vec![
            (Some(FILTER_MERKLOOS), filter(&page, scheduler, options, UnbrandedScan)),
            (Some(FILTER_GESPONSORD), filter(&page, scheduler, options, SponsoredScan)),
            (Some(FILTER_GENERAL_ADS), filter(&page, scheduler, options, GeneralAdsScan)),
            (Some(FILTER_VERKOOP_DOOR_BOL), filter(&page, scheduler, options, VerkoopDoorBolScan)),
            (Some(FILTER_GOEDE_KEUZE), filter(&page, scheduler, options, GoodChoiceScan)),
            (None, filter(&page, scheduler, options, SellerBlockScan::new())),
            (None, filter(&page, scheduler, options, BrandBlockScan::new())),
        ];

        for (toggle, filter) in &filters {
            match (toggle, filter.concern()) {
                (Some(id), _) => filter.set_enabled(toggles.is_enabled(id)),
                (None, Concern::SellerBlock) => filter.attach_block_list(&sellers),
                (None, _) => filter.attach_block_list(&brands),
            }
            filter.observe();
        }
        monitor.observe();
        monitor.schedule_check();

        let mut subscriptions = Vec::new();

        let toggle_filters: Vec<(&'static str, Filter)> = filters
            .iter()
            .filter_map(|(toggle, filter)| toggle.map(|id| (id, filter.clone())))
            .collect();
        let (store, check) = (Rc::clone(&storage), monitor.clone());
        let toggle_handle = Rc::downgrade(&toggles);
        subscriptions.push(toggles.subscribe(after_first(move |all: &[Toggle]| {
            for toggle in all {
                if let Some((_, filter)) = toggle_filters.iter().find(|(id, _)| *id == toggle.id) {
                    filter.set_enabled(toggle.enabled);
                }
            }
            if let Some(toggles) = toggle_handle.upgrade() {
                persist(&*store, TOGGLE_STATE_KEY, toggles.to_persisted());
            }
            check.schedule_check();
        })));

        for (list, key) in [(&sellers, BLOCKED_SELLERS_KEY), (&brands, BLOCKED_BRANDS_KEY)] {
            let (store, check) = (Rc::clone(&storage), monitor.clone());
            subscriptions.push(list.subscribe(after_first(move |snapshot: &BlockListSnapshot| {
                let names = snapshot.names.iter().cloned().map(Value::String).collect();
                persist(&*store, key, Value::Array(names));
                check.schedule_check();
            })));
        }

        info!(
            kind = ?page.kind(),
            blocked_sellers = sellers.len(),
            blocked_brands = brands.len(),
            "engine started"
        );

        Self {
            page,
            scheduler: scheduler.clone(),
            toggles,
            sellers,
            brands,
            filters,
            monitor,
            toast,
            subscriptions: RefCell::new(subscriptions),
            destroyed: Cell::new(false),
        }
    }

    #[must_use]
    pub fn page(&self) -> &Rc<Page> {
        &self.page
    }

    #[must_use]
    pub fn toggles(&self) -> &ToggleStore {
        &self.toggles
    }

    /// The block list for `kind`.
    #[must_use]
    pub fn block_list(&self, kind: BlockKind) -> &BlockList {
        match kind {
            BlockKind::Seller => &self.sellers,
            BlockKind::Brand => &self.brands,
        }
    }

    #[must_use]
    pub fn monitor(&self) -> &EmptyPageMonitor {
        &self.monitor
    }

    #[must_use]
    pub fn toast(&self) -> &EmptyPageToast {
        &self.toast
    }

    /// The filter hiding `concern`.
    #[must_use]
    pub fn filter(&self, concern: Concern) -> Option<&Filter> {
        self.filters.iter().map(|(_, f)| f).find(|f| f.concern() == concern)
    }

    /// Flip a filter toggle. Returns `false` for unknown ids and unchanged
    /// values.
    pub fn set_enabled(&self, toggle_id: &str, enabled: bool) -> bool {
        self.toggles.set_toggle(toggle_id, enabled)
    }

    /// Block a seller or brand.
    pub fn add_blocked_entry(&self, kind: BlockKind, name: &str) -> bool {
        self.block_list(kind).add(name)
    }

    /// Unblock a seller or brand.
    pub fn remove_blocked_entry(&self, kind: BlockKind, name: &str) -> bool {
        self.block_list(kind).remove(name)
    }

    /// Run every pending timer until the page settles. Returns the number
    /// of timers fired.
    pub fn flush(&self) -> usize {
        self.scheduler.run_until_idle()
    }

    /// Run every filter once, bypassing debounce, then check the page.
    pub fn scan_now(&self) -> MonitorState {
        for (_, filter) in &self.filters {
            filter.scan_now();
        }
        self.monitor.check_now()
    }

    /// Stop everything and reveal every hidden listing.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            subscription.unsubscribe();
        }
        for (_, filter) in &self.filters {
            filter.destroy();
        }
        self.monitor.destroy();
        debug!("engine destroyed");
    }
}

fn filter(page: &Rc<Page>, scheduler: &Scheduler, options: &Options, scan: impl ConcernScan + 'static) -> Filter {
    Filter::new(Rc::clone(page), scheduler, options, scan)
}
