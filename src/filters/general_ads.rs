//! House advertising blocks in the middle of result lists.
//!
//! Unlike the other concerns the hidden element is the advertising block
//! itself, not a listing root.

use super::{ConcernScan, ScanPlan};
use crate::dom::{self, NodeRef};
use crate::listing::ListingResolver;
use crate::page::{ObserveOptions, Page};
use crate::patterns::{AD_BADGE_SELECTOR, AD_BADGE_TEXT, AD_BLOCK_SELECTOR, AD_ICON_SELECTOR};
use crate::text::normalize_text;
use crate::visibility::Concern;

fn is_ad_badge(badge: &NodeRef) -> bool {
    if !normalize_text(&dom::text_content(badge)).contains(AD_BADGE_TEXT) {
        return false;
    }
    let container = dom::closest(badge, "div").or_else(|| dom::parent_element(badge));
    container.is_some_and(|c| dom::contains_match(&c, AD_ICON_SELECTOR))
}

/// Advertising block enclosing `node`, never the body.
fn find_ad_block<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    dom::closest(node, AD_BLOCK_SELECTOR).filter(|block| !dom::is_document_root(block))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeneralAdsScan;

impl ConcernScan for GeneralAdsScan {
    fn concern(&self) -> Concern {
        Concern::GeneralAd
    }

    fn observe_options(&self) -> ObserveOptions {
        ObserveOptions::child_list()
    }

    fn plan<'a>(&self, page: &'a Page, _resolver: &ListingResolver) -> ScanPlan<'a> {
        let mut plan = ScanPlan::new();
        for badge in page.select_all(AD_BADGE_SELECTOR) {
            if !is_ad_badge(&badge) {
                continue;
            }
            if let Some(block) = find_ad_block(&badge) {
                plan.affect(block);
            }
        }
        plan
    }
}
