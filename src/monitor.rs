//! Empty-Page Monitor
//!
//! Watches how many listings remain visible after filtering and tells the
//! user when a page ends up empty (or nearly empty) because of the active
//! filters.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::debounce::DebouncedScanner;
use crate::dom::{self, NodeRef};
use crate::listing::ListingResolver;
use crate::page::{ObserveOptions, ObserverId, Page, PageKind};
use crate::scheduler::Scheduler;
use crate::toast::Notice;
use crate::visibility::Concern;
use crate::Options;

const NO_RESULTS: &str = "Geen resultaten gevonden.";
const NO_RESULTS_FILTERED: &str =
    "Geen resultaten! Met de huidige filters staan er op deze pagina geen producten. Pas je filters aan of ga verder.";

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Enough results, or a page where counting makes no sense.
    None,
    /// Nothing visible. `filtered` when listings exist but all are hidden.
    NoResults { filtered: bool },
    /// Only a few listings remain visible.
    FewResults { visible: usize, hidden: usize },
}

impl MonitorState {
    /// Text shown to the user, `None` when nothing should be shown.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match *self {
            MonitorState::None => None,
            MonitorState::NoResults { filtered: false } => Some(NO_RESULTS.to_string()),
            MonitorState::NoResults { filtered: true } => Some(NO_RESULTS_FILTERED.to_string()),
            MonitorState::FewResults { visible, hidden } => {
                let results = if visible == 1 { "resultaat" } else { "resultaten" };
                if hidden == 0 {
                    Some(format!("Nog {visible} {results} over."))
                } else {
                    let products = if hidden == 1 { "product" } else { "producten" };
                    Some(format!("Nog {visible} {results} over ({hidden} {products} verborgen)."))
                }
            }
        }
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::None => write!(f, "none"),
            MonitorState::NoResults { filtered } => write!(f, "no-results(filtered={filtered})"),
            MonitorState::FewResults { visible, hidden } => write!(f, "few-results({visible}/{hidden})"),
        }
    }
}

/// Whether a listing is hidden by any filter: the listing itself, one of
/// its ancestors or one of its descendants carries a marker.
#[must_use]
pub fn is_listing_hidden(listing: &NodeRef) -> bool {
    let selector = Concern::any_marker_selector();
    dom::closest(listing, &selector).is_some() || dom::contains_match(listing, &selector)
}

/// Classify the page as it is right now.
#[must_use]
pub fn evaluate(page: &Page, resolver: &ListingResolver, few_results_threshold: usize) -> MonitorState {
    if page.kind() == PageKind::ProductDetail {
        return MonitorState::None;
    }

    let listings = resolver.collect_listing_roots(page);
    if listings.is_empty() {
        return MonitorState::NoResults { filtered: false };
    }

    let hidden = listings.iter().filter(|l| is_listing_hidden(l)).count();
    let visible = listings.len() - hidden;

    if visible == 0 {
        MonitorState::NoResults { filtered: hidden > 0 }
    } else if visible < few_results_threshold {
        MonitorState::FewResults { visible, hidden }
    } else {
        MonitorState::None
    }
}

struct MonitorInner {
    page: Rc<Page>,
    resolver: ListingResolver,
    threshold: usize,
    notice: Rc<dyn Notice>,
    scanner: DebouncedScanner,
    last_message: RefCell<Option<String>>,
    observer: Cell<Option<ObserverId>>,
    destroyed: Cell<bool>,
}

impl MonitorInner {
    fn check(&self) -> MonitorState {
        let state = evaluate(&self.page, &self.resolver, self.threshold);
        let Some(message) = state.message() else {
            if self.last_message.borrow_mut().take().is_some() {
                debug!("empty-page notice cleared");
            }
            self.notice.hide();
            return state;
        };

        if self.last_message.borrow().as_deref() == Some(message.as_str()) {
            return state;
        }
        debug!(%state, "empty-page notice");
        *self.last_message.borrow_mut() = Some(message.clone());
        self.notice.show(&message);
        state
    }
}

/// Debounced watcher that drives a [`Notice`].
///
/// Cloning yields another handle to the same monitor.
#[derive(Clone)]
pub struct EmptyPageMonitor {
    inner: Rc<MonitorInner>,
}

impl EmptyPageMonitor {
    pub fn new(page: Rc<Page>, scheduler: &Scheduler, options: &Options, notice: Rc<dyn Notice>) -> Self {
        let delay = options.empty_page_check_delay;
        let inner = Rc::new_cyclic(|weak: &Weak<MonitorInner>| {
            let weak = weak.clone();
            let scanner = DebouncedScanner::new(scheduler, delay, move || {
                if let Some(inner) = weak.upgrade() {
                    if !inner.destroyed.get() {
                        inner.check();
                    }
                }
            });
            MonitorInner {
                page,
                resolver: ListingResolver::new(options),
                threshold: options.few_results_threshold,
                notice,
                scanner,
                last_message: RefCell::new(None),
                observer: Cell::new(None),
                destroyed: Cell::new(false),
            }
        });
        Self { inner }
    }

    /// Watch structural changes and marker changes.
    pub fn observe(&self) {
        if self.inner.destroyed.get() || self.inner.observer.get().is_some() {
            return;
        }
        let options = ObserveOptions {
            child_list: true,
            attributes: true,
            character_data: false,
            attribute_filter: Some(Concern::all_markers()),
        };
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.page.observe(options, move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.scanner.schedule();
            }
        });
        self.inner.observer.set(Some(id));
    }

    /// Request a debounced check.
    pub fn schedule_check(&self) {
        if !self.inner.destroyed.get() {
            self.inner.scanner.schedule();
        }
    }

    /// Check right away and update the notice.
    pub fn check_now(&self) -> MonitorState {
        self.inner.scanner.clear();
        self.inner.check()
    }

    /// Message currently considered shown.
    #[must_use]
    pub fn last_message(&self) -> Option<String> {
        self.inner.last_message.borrow().clone()
    }

    /// Stop watching and hide the notice.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        if let Some(observer) = self.inner.observer.take() {
            self.inner.page.disconnect(observer);
        }
        self.inner.scanner.clear();
        self.inner.last_message.borrow_mut().take();
        self.inner.notice.hide();
    }
}
