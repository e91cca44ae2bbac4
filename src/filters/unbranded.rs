//! Unbranded products ("Merkloos").

use super::{listings_from_product_links, ConcernScan, ScanPlan};
use crate::dom::{self, NodeRef};
use crate::listing::ListingResolver;
use crate::page::{ObserveOptions, Page};
use crate::patterns::{BRAND_LINK_SELECTOR, UNBRANDED_MARKERS};
use crate::seller::brand_name;
use crate::text::normalize_text;
use crate::visibility::Concern;

/// Whether a brand name marks the product as unbranded.
#[must_use]
pub fn is_unbranded(brand: &str) -> bool {
    let normalized = normalize_text(brand);
    UNBRANDED_MARKERS.iter().any(|marker| normalized.contains(marker))
}

/// Brand of a listing: text of its first brand link, empty if none.
#[must_use]
pub fn listing_brand(listing: &NodeRef) -> String {
    dom::query_selector(listing, BRAND_LINK_SELECTOR)
        .map(|link| brand_name(&link))
        .unwrap_or_default()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnbrandedScan;

impl ConcernScan for UnbrandedScan {
    fn concern(&self) -> Concern {
        Concern::Unbranded
    }

    fn observe_options(&self) -> ObserveOptions {
        ObserveOptions::child_list()
    }

    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
        let mut plan = ScanPlan::new();
        for listing in listings_from_product_links(page, resolver) {
            if is_unbranded(&listing_brand(&listing)) {
                plan.affect(listing);
            }
        }
        plan
    }
}
