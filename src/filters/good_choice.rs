//! "Alleen goede keuzes tonen": hide every listing without a good-choice
//! label.

use std::time::Duration;

use super::{listings_from_product_links, ConcernScan, ScanPlan};
use crate::dom::{self, NodeRef};
use crate::listing::ListingResolver;
use crate::page::Page;
use crate::patterns::{GOOD_CHOICE_LABELS, VISIBLE_TEXT_SELECTOR};
use crate::text::normalize_text;
use crate::visibility::Concern;
use crate::Options;

/// Whether `text` is exactly one of the good-choice labels.
#[must_use]
pub fn is_good_choice_label(text: &str) -> bool {
    let normalized = normalize_text(text);
    GOOD_CHOICE_LABELS.iter().any(|label| normalized == *label)
}

/// Whether `listing` carries a good-choice label.
#[must_use]
pub fn has_good_choice(listing: &NodeRef) -> bool {
    dom::query_selector_all(listing, VISIBLE_TEXT_SELECTOR)
        .iter()
        .any(|el| is_good_choice_label(&dom::text_content(el)))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GoodChoiceScan;

impl ConcernScan for GoodChoiceScan {
    fn concern(&self) -> Concern {
        Concern::NotGoodChoice
    }

    fn debounce(&self, options: &Options) -> Duration {
        options.slow_scan_debounce
    }

    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
        let mut plan = ScanPlan::new();
        for listing in listings_from_product_links(page, resolver) {
            if !has_good_choice(&listing) {
                plan.affect(listing);
            }
        }
        plan
    }
}
