//! Per-concern filters.
//!
//! Every filter is the same driver ([`Filter`]) around a [`ConcernScan`]
//! that knows how to find the listings affected by one concern. A scan is
//! always three passes:
//!
//! 1. read: the concern computes the affected set (and any block button
//!    changes) without touching the page;
//! 2. write: button changes are applied, then every affected listing is
//!    marked;
//! 3. sweep: every element carrying the marker that is no longer affected
//!    is unmarked.
//!
//! Marking before sweeping means a listing that stays affected is never
//! briefly revealed.

pub mod block_button;
pub mod brand_block;
pub mod general_ads;
pub mod good_choice;
pub mod seller_block;
pub mod sponsored;
pub mod unbranded;
pub mod verkoop_door_bol;

pub use block_button::{BlockKind, ButtonUpdate};
pub use brand_block::BrandBlockScan;
pub use general_ads::GeneralAdsScan;
pub use good_choice::GoodChoiceScan;
pub use seller_block::SellerBlockScan;
pub use sponsored::SponsoredScan;
pub use unbranded::UnbrandedScan;
pub use verkoop_door_bol::VerkoopDoorBolScan;

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::debounce::DebouncedScanner;
use crate::dom::{NodeId, NodeRef};
use crate::listing::ListingResolver;
use crate::page::{ListenerId, ObserveOptions, ObserverId, Page};
use crate::scheduler::Scheduler;
use crate::store::{BlockList, Subscription};
use crate::visibility::{self, Concern};
use crate::Options;

/// Result of a read pass.
#[derive(Default)]
pub struct ScanPlan<'a> {
    affected: Vec<NodeRef<'a>>,
    seen: HashSet<NodeId>,
    buttons: Vec<ButtonUpdate<'a>>,
    button_containers: HashSet<NodeId>,
}

impl<'a> ScanPlan<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node` as affected. Duplicates are ignored.
    pub fn affect(&mut self, node: NodeRef<'a>) {
        if self.seen.insert(node.id) {
            self.affected.push(node);
        }
    }

    /// Queue a block button change. A container holds one button, so only
    /// the first change queued for a container is kept.
    pub fn button(&mut self, update: ButtonUpdate<'a>) {
        if self.button_containers.insert(update.container().id) {
            self.buttons.push(update);
        }
    }

    /// Affected nodes in discovery order.
    #[must_use]
    pub fn affected(&self) -> &[NodeRef<'a>] {
        &self.affected
    }

    /// Whether `node` is affected.
    #[must_use]
    pub fn is_affected(&self, node: &NodeRef) -> bool {
        self.seen.contains(&node.id)
    }

    /// Queued button changes.
    #[must_use]
    pub fn buttons(&self) -> &[ButtonUpdate<'a>] {
        &self.buttons
    }
}

/// One hiding concern: what to watch and which listings it affects.
pub trait ConcernScan {
    /// The marker this concern owns.
    fn concern(&self) -> Concern;

    /// Mutations that should trigger a rescan.
    fn observe_options(&self) -> ObserveOptions {
        ObserveOptions::everything()
    }

    /// Rescan debounce delay.
    fn debounce(&self, options: &Options) -> Duration {
        options.scan_debounce
    }

    /// Block list feeding this concern, if any.
    fn block_kind(&self) -> Option<BlockKind> {
        None
    }

    /// Replace the set of blocked normalized names.
    fn set_blocked(&self, _blocked: &HashSet<String>) {}

    /// Read pass. Must not write to the page.
    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a>;
}

struct FilterInner {
    page: Rc<Page>,
    resolver: ListingResolver,
    scan: Box<dyn ConcernScan>,
    scanner: DebouncedScanner,
    enabled: Cell<bool>,
    destroyed: Cell<bool>,
    observer: Cell<Option<ObserverId>>,
    click_listener: Cell<Option<ListenerId>>,
    subscription: RefCell<Option<Subscription>>,
}

impl FilterInner {
    fn run_scan(&self) {
        if self.destroyed.get() {
            return;
        }
        let page = &*self.page;
        let concern = self.scan.concern();
        let enabled = self.enabled.get();

        let plan = if enabled {
            self.scan.plan(page, &self.resolver)
        } else {
            ScanPlan::new()
        };

        let mut button_writes = 0usize;
        for update in plan.buttons() {
            if update.apply(page) {
                button_writes += 1;
            }
        }
        for node in plan.affected() {
            visibility::mark_hidden(page, node, concern);
        }

        let mut swept = 0usize;
        for node in page.select_all(&concern.marker_selector()) {
            if !plan.is_affected(&node) {
                visibility::unmark_hidden(page, &node, concern);
                swept += 1;
            }
        }

        debug!(
            concern = concern.tag(),
            enabled,
            affected = plan.affected().len(),
            swept,
            button_writes,
            "filter scan"
        );
    }
}

/// A running filter for one concern.
///
/// Cloning yields another handle to the same filter.
#[derive(Clone)]
pub struct Filter {
    inner: Rc<FilterInner>,
}

impl Filter {
    /// Build an enabled filter. Nothing happens until [`Filter::observe`]
    /// or [`Filter::scan_now`] is called.
    pub fn new(page: Rc<Page>, scheduler: &Scheduler, options: &Options, scan: impl ConcernScan + 'static) -> Self {
        let delay = scan.debounce(options);
        let inner = Rc::new_cyclic(|weak: &Weak<FilterInner>| {
            let weak = weak.clone();
            let scanner = DebouncedScanner::new(scheduler, delay, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.run_scan();
                }
            });
            FilterInner {
                page,
                resolver: ListingResolver::new(options),
                scan: Box::new(scan),
                scanner,
                enabled: Cell::new(true),
                destroyed: Cell::new(false),
                observer: Cell::new(None),
                click_listener: Cell::new(None),
                subscription: RefCell::new(None),
            }
        });
        Self { inner }
    }

    /// The concern this filter hides.
    #[must_use]
    pub fn concern(&self) -> Concern {
        self.inner.scan.concern()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Whether a debounced scan is waiting.
    #[must_use]
    pub fn is_scan_pending(&self) -> bool {
        self.inner.scanner.is_pending()
    }

    /// Start watching the page and schedule an initial scan. Calling it
    /// again has no further effect.
    pub fn observe(&self) {
        if self.inner.destroyed.get() || self.inner.observer.get().is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.page.observe(self.inner.scan.observe_options(), move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.scanner.schedule();
            }
        });
        self.inner.observer.set(Some(id));
        self.inner.scanner.schedule();
    }

    /// Turn the filter on or off. Turning it on schedules a rescan; turning
    /// it off reveals everything this filter hid right away.
    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.destroyed.get() || self.inner.enabled.get() == enabled {
            return;
        }
        debug!(concern = self.concern().tag(), enabled, "filter toggled");
        self.inner.enabled.set(enabled);
        if enabled {
            self.inner.scanner.schedule();
        } else {
            self.inner.scanner.clear();
            self.inner.run_scan();
        }
    }

    /// Run a scan right away, bypassing the debounce.
    pub fn scan_now(&self) {
        self.inner.scanner.clear();
        self.inner.run_scan();
    }

    /// Schedule a debounced scan.
    pub fn schedule_scan(&self) {
        if !self.inner.destroyed.get() {
            self.inner.scanner.schedule();
        }
    }

    /// Feed a block list into this filter.
    ///
    /// The list's snapshots replace the blocked set and schedule a rescan,
    /// and clicks on this filter's block buttons add to the list. A no-op
    /// for concerns without a block list.
    pub fn attach_block_list(&self, list: &Rc<BlockList>) {
        let Some(kind) = self.inner.scan.block_kind() else {
            return;
        };
        if self.inner.destroyed.get() {
            return;
        }
        self.detach_block_list();

        let weak = Rc::downgrade(&self.inner);
        let subscription = list.subscribe(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                inner.scan.set_blocked(&snapshot.normalized);
                inner.scanner.schedule();
            }
        });
        *self.inner.subscription.borrow_mut() = Some(subscription);

        let list = Rc::clone(list);
        let listener = self.inner.page.add_click_listener(move |target| {
            let Some(name) = block_button::clicked_name(target, kind) else {
                return false;
            };
            if list.add(&name) {
                debug!(kind = kind.as_str(), name = %name, "blocked from page button");
            } else {
                trace!(kind = kind.as_str(), name = %name, "already blocked");
            }
            true
        });
        self.inner.click_listener.set(Some(listener));
    }

    fn detach_block_list(&self) {
        if let Some(subscription) = self.inner.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
        if let Some(listener) = self.inner.click_listener.take() {
            self.inner.page.remove_click_listener(listener);
        }
    }

    /// Stop the filter and reveal everything it hid.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        if let Some(observer) = self.inner.observer.take() {
            self.inner.page.disconnect(observer);
        }
        self.detach_block_list();
        self.inner.scanner.clear();

        let page = &*self.inner.page;
        let concern = self.concern();
        for node in page.select_all(&concern.marker_selector()) {
            visibility::unmark_hidden(page, &node, concern);
        }
        debug!(concern = concern.tag(), "filter destroyed");
    }
}

/// Unique listing roots for every product link on the page.
pub(crate) fn listings_from_product_links<'a>(page: &'a Page, resolver: &ListingResolver) -> Vec<NodeRef<'a>> {
    let mut seen = HashSet::new();
    page.select_all(crate::patterns::PRODUCT_LINK_SELECTOR)
        .iter()
        .filter_map(|link| resolver.find_listing_root(link))
        .filter(|listing| seen.insert(listing.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::has_marker;
    use std::time::Duration;

    struct MarkAll;

    impl ConcernScan for MarkAll {
        fn concern(&self) -> Concern {
            Concern::Sponsored
        }

        fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
            let mut plan = ScanPlan::new();
            for listing in listings_from_product_links(page, resolver) {
                plan.affect(listing);
            }
            plan
        }
    }

    const PAGE: &str = r#"<html><body><ul>
        <li id="a"><a href="/nl/nl/p/a/1/">A</a></li>
        <li id="b"><a href="/nl/nl/p/b/2/">B</a></li>
    </ul></body></html>"#;

    #[test]
    fn test_observe_scans_after_debounce() {
        let page = Rc::new(Page::new(PAGE));
        let scheduler = Scheduler::new();
        let filter = Filter::new(Rc::clone(&page), &scheduler, &Options::default(), MarkAll);

        filter.observe();
        let a = page.select_first("#a").expect("a");
        assert!(!has_marker(&a, Concern::Sponsored));

        scheduler.advance(Duration::from_millis(120));
        assert!(has_marker(&a, Concern::Sponsored));
    }

    #[test]
    fn test_disable_reveals() {
        let page = Rc::new(Page::new(PAGE));
        let scheduler = Scheduler::new();
        let filter = Filter::new(Rc::clone(&page), &scheduler, &Options::default(), MarkAll);
        filter.scan_now();

        filter.set_enabled(false);
        scheduler.run_until_idle();

        assert!(page.select_all(&Concern::Sponsored.marker_selector()).is_empty());
    }

    #[test]
    fn test_disable_reveals_without_waiting() {
        let page = Rc::new(Page::new(PAGE));
        let scheduler = Scheduler::new();
        let filter = Filter::new(Rc::clone(&page), &scheduler, &Options::default(), MarkAll);
        filter.observe();
        scheduler.run_until_idle();
        assert_eq!(page.select_all(&Concern::Sponsored.marker_selector()).len(), 2);

        filter.set_enabled(false);

        assert!(page.select_all(&Concern::Sponsored.marker_selector()).is_empty());
        let a = page.select_first("#a").expect("a");
        assert!(!visibility::is_display_none(&a));
    }

    #[test]
    fn test_rescan_of_settled_page_writes_nothing() {
        let page = Rc::new(Page::new(PAGE));
        let scheduler = Scheduler::new();
        let filter = Filter::new(Rc::clone(&page), &scheduler, &Options::default(), MarkAll);
        filter.scan_now();
        let attributes = page.attribute_writes();
        let styles = page.style_writes();

        filter.scan_now();

        assert_eq!(page.attribute_writes(), attributes);
        assert_eq!(page.style_writes(), styles);
    }

    #[test]
    fn test_destroy_unmarks_and_disconnects() {
        let page = Rc::new(Page::new(PAGE));
        let scheduler = Scheduler::new();
        let filter = Filter::new(Rc::clone(&page), &scheduler, &Options::default(), MarkAll);
        filter.observe();
        scheduler.run_until_idle();

        filter.destroy();

        assert_eq!(page.observer_count(), 0);
        assert!(page.select_all(&Concern::Sponsored.marker_selector()).is_empty());
        filter.scan_now();
        assert!(page.select_all(&Concern::Sponsored.marker_selector()).is_empty());
    }

    #[test]
    fn test_mutation_triggers_rescan() {
        let page = Rc::new(Page::new(PAGE));
        let scheduler = Scheduler::new();
        let filter = Filter::new(Rc::clone(&page), &scheduler, &Options::default(), MarkAll);
        filter.observe();
        scheduler.run_until_idle();

        let list = page.select_first("ul").expect("ul");
        page.append_html(&list, r#"<li id="c"><a href="/nl/nl/p/c/3/">C</a></li>"#);
        assert!(filter.is_scan_pending());
        scheduler.run_until_idle();

        let c = page.select_first("#c").expect("c");
        assert!(has_marker(&c, Concern::Sponsored));
    }
}
