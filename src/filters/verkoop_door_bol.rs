//! Listings sold by a third party rather than by bol itself.

use super::{ConcernScan, ScanPlan};
use crate::listing::ListingResolver;
use crate::page::Page;
use crate::seller::{discover_seller_labels, find_seller_from_element, is_bol_seller};
use crate::visibility::Concern;

/// Hides every listing whose seller label names someone other than bol.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerkoopDoorBolScan;

impl ConcernScan for VerkoopDoorBolScan {
    fn concern(&self) -> Concern {
        Concern::VerkoopDoorBol
    }

    fn plan<'a>(&self, page: &'a Page, resolver: &ListingResolver) -> ScanPlan<'a> {
        let mut plan = ScanPlan::new();
        for label in discover_seller_labels(page) {
            let seller = find_seller_from_element(&label);
            if seller.is_empty() || is_bol_seller(&seller) {
                continue;
            }
            if let Some(listing) = resolver.find_listing_root(&label) {
                plan.affect(listing);
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    #[test]
    fn test_third_party_sellers_only() {
        let page = Page::new(
            r#"<html><body><ul>
                <li id="bol"><span>Verkoop door bol</span><a href="/nl/nl/p/a/1/">A</a></li>
                <li id="acme"><span>Verkoop door Acme B.V.</span><a href="/nl/nl/p/b/2/">B</a></li>
                <li id="split"><span>Verkoop door</span><a href="/nl/nl/v/shop/1/">Shop Two</a><a href="/nl/nl/p/c/3/">C</a></li>
                <li id="none"><a href="/nl/nl/p/d/4/">D</a></li>
            </ul></body></html>"#,
        );
        let plan = VerkoopDoorBolScan.plan(&page, &ListingResolver::default());
        let ids: Vec<String> = plan.affected().iter().filter_map(|n| dom::get_attribute(n, "id")).collect();

        assert_eq!(ids, vec!["acme", "split"]);
    }
}
