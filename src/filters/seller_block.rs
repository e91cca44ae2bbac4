//! Listings from sellers on the user's block list.

use std::cell::RefCell;
use std::collections::HashSet;

use super::{BlockKind, ButtonUpdate, ConcernScan, ScanPlan};
use crate::dom::{self, NodeRef};
use crate::listing::ListingResolver;
use crate::page::Page;
use crate::seller::{discover_seller_labels, find_seller_from_element, is_bol_seller};
use crate::text::normalize_text;
use crate::visibility::Concern;

/// Element the block button for a seller label goes into: the label's
/// parent, or the grandparent when the label sits inside a `<button>`.
#[must_use]
pub fn seller_button_container<'a>(label: &NodeRef<'a>) -> NodeRef<'a> {
    let container = dom::parent_element(label).unwrap_or(*label);
    if dom::tag_name(&container).as_deref() == Some("button") {
        return dom::parent_element(&container).unwrap_or(container);
    }
    container
}

/// Hides listings of blocked sellers and offers a block button next to
/// every third-party seller label.
#[derive(Debug, Default)]
pub struct SellerBlockScan {
    blocked: RefCell<HashSet<String>>,
}

impl SellerBlockScan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_blocked(&self, seller: &str) -> bool {
        self.blocked.borrow().contains(&normalize_text(seller))
    }
}

impl ConcernScan for SellerBlockScan {
    fn concern(&self) -> Concern {
        Concern::SellerBlock
    }

    fn block_kind(&self) -> Option<BlockKind> {
        Some(BlockKind::Seller)
    }

    fn set_blocked(&self, blocked: &HashSet<String>) {
        self.blocked.borrow_mut().clone_from(blocked);
    }

    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
        let mut plan = ScanPlan::new();
        for label in discover_seller_labels(page) {
            let seller = find_seller_from_element(&label);
            if seller.is_empty() {
                continue;
            }
            let Some(listing) = resolver.find_listing_root(&label) else {
                continue;
            };
            let container = seller_button_container(&label);

            if is_bol_seller(&seller) {
                plan.button(ButtonUpdate::Remove {
                    container,
                    kind: BlockKind::Seller,
                });
                continue;
            }
            let blocked = self.is_blocked(&seller);
            plan.button(ButtonUpdate::Ensure {
                container,
                kind: BlockKind::Seller,
                name: seller,
                blocked,
            });
            if blocked {
                plan.affect(listing);
            }
        }
        plan
    }
}
