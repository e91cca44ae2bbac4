//! # bol-filter
//!
//! Listing classification engine for bol.com result pages.
//!
//! The engine finds the product cards ("listings") on a page, decides per
//! concern whether each one should be hidden (sponsored tiles, house
//! advertising, unbranded products, third-party sellers, listings without
//! a good-choice label, blocked sellers and brands) and tells the user when
//! filtering leaves a page empty.
//!
//! ## Quick Start
//!
//! ```rust
//! use bol_filter::filter_html;
//!
//! let html = r#"<html><body><ul>
//!   <li><a href="/nl/nl/b/merkloos/1/">Merkloos</a><a href="/nl/nl/p/kabel/1/">Kabel</a></li>
//!   <li><a href="/nl/nl/b/philips/2/">Philips</a><a href="/nl/nl/p/lamp/2/">Lamp</a></li>
//! </ul></body></html>"#;
//!
//! let report = filter_html(html);
//! assert_eq!(report.listings, 2);
//! assert_eq!(report.hidden, 1);
//! ```
//!
//! ## Structure
//!
//! - **Listing resolution** ([`listing`]): node to product card.
//! - **Extraction** ([`seller`], [`text`]): seller and brand names.
//! - **Markers** ([`visibility`]): one attribute per concern, combined
//!   into the inline `display`.
//! - **Filters** ([`filters`]): one debounced scanner per concern.
//! - **Monitor** ([`monitor`], [`toast`]): the empty-page notice.
//! - **Engine** ([`engine`]): stores, persistence and wiring.
//!
//! Everything runs on one thread. Time is a virtual clock owned by a
//! [`Scheduler`]; nothing happens until the host advances it.

mod error;
mod options;
mod patterns;
mod result;

/// DOM operations adapter providing browser-style element operations.
pub mod dom;

/// Text normalization and block-button aware text extraction.
pub mod text;

/// The host page: document, mutation observers, click delegation.
pub mod page;

/// Cooperative virtual-clock timer queue.
pub mod scheduler;

/// Single-slot debounced rescans.
pub mod debounce;

/// Listing root resolution.
pub mod listing;

/// Seller and brand extraction.
pub mod seller;

/// Per-concern hidden markers.
pub mod visibility;

/// Per-concern filters and block buttons.
pub mod filters;

/// Empty-page detection.
pub mod monitor;

/// The empty-page notice.
pub mod toast;

/// Toggle and block list stores with persistence.
pub mod store;

/// Bootstrap wiring everything together.
pub mod engine;

use std::rc::Rc;

// Public API - re-exports
pub use engine::Engine;
pub use error::{Error, Result};
pub use filters::{BlockKind, Filter};
pub use listing::{find_listing_root, ListingResolver};
pub use monitor::{EmptyPageMonitor, MonitorState};
pub use options::Options;
pub use page::{Page, PageKind};
pub use result::{FilterReport, ListingSummary};
pub use scheduler::Scheduler;
pub use store::{MemoryStorage, Storage};
pub use visibility::Concern;

/// Run every filter with default settings over an HTML document.
#[must_use]
pub fn filter_html(html: &str) -> FilterReport {
    filter_html_with_options(html, &Options::default())
}

/// Run every filter over an HTML document with custom options and default
/// settings (no block lists, default toggles).
#[must_use]
pub fn filter_html_with_options(html: &str, options: &Options) -> FilterReport {
    filter_page(Rc::new(Page::new(html)), Rc::new(MemoryStorage::new()), options)
}

/// Start an engine on `page` with settings from `storage`, let it settle
/// and report the result. The page keeps the filters' markers.
pub fn filter_page(page: Rc<Page>, storage: Rc<dyn Storage>, options: &Options) -> FilterReport {
    let scheduler = Scheduler::with_options(options);
    let engine = Engine::start(Rc::clone(&page), &scheduler, storage, options);
    engine.flush();
    FilterReport::from_page(&page, &ListingResolver::new(options), engine.monitor().last_message())
}
