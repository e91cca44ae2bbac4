//! Sponsored product tiles ("Gesponsord").

use tracing::trace;

use super::{ConcernScan, ScanPlan};
use crate::dom::{self, NodeRef};
use crate::listing::ListingResolver;
use crate::page::Page;
use crate::patterns::{
    AD_ICON_SELECTOR, LISTING_ITEM_SELECTOR, PDP_SPONSORED_ITEM_SELECTOR, PDP_SPONSORED_LABEL_SELECTOR,
    SPONSORED_BADGE_SELECTOR, SPONSORED_KEYWORDS,
};
use crate::text::normalize_text;
use crate::visibility::Concern;

/// Whether `text` reads as a sponsored disclosure.
#[must_use]
pub fn is_sponsored_text(text: &str) -> bool {
    let normalized = normalize_text(text);
    SPONSORED_KEYWORDS.iter().any(|kw| normalized.contains(kw))
}

/// A badge counts only with the disclaimer icon next to it; plain muted
/// text elsewhere on a card may contain the same word.
fn is_sponsored_badge(badge: &NodeRef) -> bool {
    if !is_sponsored_text(&dom::text_content(badge)) {
        return false;
    }
    let container = dom::parent_element(badge).unwrap_or(*badge);
    dom::contains_match(&container, AD_ICON_SELECTOR)
}

/// Sponsored tiles in result lists and sponsored carousel items on product
/// pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct SponsoredScan;

impl ConcernScan for SponsoredScan {
    fn concern(&self) -> Concern {
        Concern::Sponsored
    }

    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
        let mut plan = ScanPlan::new();

        for badge in page.select_all(SPONSORED_BADGE_SELECTOR) {
            if !is_sponsored_badge(&badge) {
                continue;
            }
            if let Some(listing) = resolver.find_listing_root(&badge) {
                plan.affect(listing);
            } else {
                trace!("sponsored badge outside any listing");
            }
        }

        for item in page.select_all(PDP_SPONSORED_ITEM_SELECTOR) {
            let listing = if dom::matches(&item, LISTING_ITEM_SELECTOR) {
                Some(item)
            } else {
                resolver.find_listing_root(&item)
            };
            if let Some(listing) = listing.filter(|n| !dom::is_document_root(n)) {
                plan.affect(listing);
            }
        }

        for label in page.select_all(PDP_SPONSORED_LABEL_SELECTOR) {
            if !is_sponsored_text(&dom::text_content(&label)) {
                continue;
            }
            if let Some(listing) = resolver.find_listing_root(&label) {
                plan.affect(listing);
            }
        }

        plan
    }
}
