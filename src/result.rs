//! Result types for a filtering pass.
//!
//! A `FilterReport` summarizes what the filters did to a page: how many
//! listings were found, how many remain visible and why the rest is
//! hidden.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::listing::ListingResolver;
use crate::monitor::is_listing_hidden;
use crate::page::{Page, PageKind};
use crate::visibility::{hidden_reasons, Concern};

/// One listing as seen after filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSummary {
    /// Text of the listing's first product link.
    pub title: String,

    /// Reason tags of the markers on the listing itself.
    pub reasons: Vec<String>,

    /// Whether the listing is hidden (by its own or a nested marker).
    pub hidden: bool,
}

/// Outcome of a filtering pass over one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    /// "homepage", "product-detail" or "listing".
    pub page_kind: String,

    /// Number of listing roots found.
    pub listings: usize,

    /// Listings left visible.
    pub visible: usize,

    /// Listings hidden by at least one filter.
    pub hidden: usize,

    /// Number of marked elements per reason tag.
    pub hidden_by: BTreeMap<String, usize>,

    /// Message the empty-page notice shows, if any.
    pub notice: Option<String>,

    /// Per-listing detail, in document order.
    pub items: Vec<ListingSummary>,
}

impl FilterReport {
    /// Summarize the current state of `page`.
    #[must_use]
    pub fn from_page(page: &Page, resolver: &ListingResolver, notice: Option<String>) -> Self {
        let roots = resolver.collect_listing_roots(page);
        let items: Vec<ListingSummary> = roots
            .iter()
            .map(|root| ListingSummary {
                title: crate::dom::query_selector(root, crate::patterns::PRODUCT_LINK_SELECTOR)
                    .map(|link| crate::text::clean_text(&link))
                    .unwrap_or_default(),
                reasons: hidden_reasons(root).iter().map(|c| c.tag().to_string()).collect(),
                hidden: is_listing_hidden(root),
            })
            .collect();

        let hidden = items.iter().filter(|i| i.hidden).count();
        let hidden_by = Concern::ALL
            .iter()
            .map(|c| (c.tag().to_string(), page.select_all(&c.marker_selector()).len()))
            .filter(|(_, n)| *n > 0)
            .collect();

        Self {
            page_kind: page_kind_name(page.kind()).to_string(),
            listings: items.len(),
            visible: items.len() - hidden,
            hidden,
            hidden_by,
            notice,
            items,
        }
    }
}

fn page_kind_name(kind: PageKind) -> &'static str {
    match kind {
        PageKind::Homepage => "homepage",
        PageKind::ProductDetail => "product-detail",
        PageKind::Listing => "listing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::mark_hidden;

    #[test]
    fn test_report_counts() {
        let page = Page::new(
            r#"<html><body><ul>
                <li id="a"><a href="/nl/nl/p/a/1/">Lamp</a></li>
                <li id="b"><a href="/nl/nl/p/b/2/">Kabel</a></li>
            </ul></body></html>"#,
        );
        let b = page.select_first("#b").expect("b");
        mark_hidden(&page, &b, Concern::Sponsored);

        let report = FilterReport::from_page(&page, &ListingResolver::default(), None);

        assert_eq!(report.page_kind, "listing");
        assert_eq!(report.listings, 2);
        assert_eq!(report.visible, 1);
        assert_eq!(report.hidden_by.get("sponsored"), Some(&1));
        assert_eq!(report.items[1].title, "Kabel");
        assert_eq!(report.items[1].reasons, vec!["sponsored"]);
    }
}
