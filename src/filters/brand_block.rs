//! Listings from brands on the user's block list.

use std::cell::RefCell;
use std::collections::HashSet;

use super::{BlockKind, ButtonUpdate, ConcernScan, ScanPlan};
use crate::dom;
use crate::listing::ListingResolver;
use crate::page::Page;
use crate::patterns::BRAND_LINK_SELECTOR;
use crate::seller::{brand_name, is_first_party};
use crate::text::normalize_text;
use crate::visibility::Concern;

/// Hides listings of blocked brands and puts a block button next to every
/// brand link.
#[derive(Debug, Default)]
pub struct BrandBlockScan {
    blocked: RefCell<HashSet<String>>,
}

impl BrandBlockScan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConcernScan for BrandBlockScan {
    fn concern(&self) -> Concern {
        Concern::BrandBlock
    }

    fn block_kind(&self) -> Option<BlockKind> {
        Some(BlockKind::Brand)
    }

    fn set_blocked(&self, blocked: &HashSet<String>) {
        self.blocked.borrow_mut().clone_from(blocked);
    }

    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
        let blocked_names = self.blocked.borrow();
        let mut plan = ScanPlan::new();
        for link in page.select_all(BRAND_LINK_SELECTOR) {
            let brand = brand_name(&link);
            if brand.is_empty() {
                continue;
            }
            let Some(listing) = resolver.find_listing_root(&link) else {
                continue;
            };
            let container = dom::parent_element(&link).unwrap_or(link);

            if is_first_party(&brand) {
                plan.button(ButtonUpdate::Remove {
                    container,
                    kind: BlockKind::Brand,
                });
                continue;
            }
            let blocked = blocked_names.contains(&normalize_text(&brand));
            plan.button(ButtonUpdate::Ensure {
                container,
                kind: BlockKind::Brand,
                name: brand,
                blocked,
            });
            if blocked {
                plan.affect(listing);
            }
        }
        plan
    }
}
