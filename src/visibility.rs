//! Visibility markers.
//!
//! Each concern owns one boolean marker attribute. A listing is hidden iff
//! at least one marker is present; the inline `display` is always derived
//! from all markers together so that one filter clearing its marker never
//! reveals a listing another filter still hides.

use crate::dom::{self, NodeRef};
use crate::page::Page;

/// An independent reason to hide a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    /// Brand is "merkloos" / "sans marque".
    Unbranded,
    /// Sponsored product tile.
    Sponsored,
    /// House advertising block in the result list.
    GeneralAd,
    /// Sold by a third party instead of the operator.
    VerkoopDoorBol,
    /// Lacks a good-choice label.
    NotGoodChoice,
    /// Seller is on the user's block list.
    SellerBlock,
    /// Brand is on the user's block list.
    BrandBlock,
}

impl Concern {
    /// Every concern, in marker evaluation order.
    pub const ALL: [Concern; 7] = [
        Concern::Unbranded,
        Concern::Sponsored,
        Concern::GeneralAd,
        Concern::VerkoopDoorBol,
        Concern::NotGoodChoice,
        Concern::SellerBlock,
        Concern::BrandBlock,
    ];

    /// Marker attribute written on hidden listings.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Concern::Unbranded => "data-bolfilter-hidden-merkloos",
            Concern::Sponsored => "data-bolfilter-hidden-gesponsord",
            Concern::GeneralAd => "data-bolfilter-hidden-general-ad",
            Concern::VerkoopDoorBol => "data-bolfilter-hidden-verkoop-door-bol",
            Concern::NotGoodChoice => "data-bolfilter-hidden-goede-keuze",
            Concern::SellerBlock => "data-bolfilter-hidden-seller-block",
            Concern::BrandBlock => "data-bolfilter-hidden-brand-block",
        }
    }

    /// Short reason tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Concern::Unbranded => "unbranded",
            Concern::Sponsored => "sponsored",
            Concern::GeneralAd => "general-ad",
            Concern::VerkoopDoorBol => "verkoop-door-bol",
            Concern::NotGoodChoice => "not-good-choice",
            Concern::SellerBlock => "seller-block",
            Concern::BrandBlock => "brand-block",
        }
    }

    /// Selector for elements carrying this concern's marker.
    #[must_use]
    pub fn marker_selector(self) -> String {
        format!(r#"[{}="true"]"#, self.marker())
    }

    /// Selector for elements carrying any marker.
    #[must_use]
    pub fn any_marker_selector() -> String {
        Self::ALL.iter().map(|c| c.marker_selector()).collect::<Vec<_>>().join(", ")
    }

    /// All marker attribute names.
    #[must_use]
    pub fn all_markers() -> Vec<String> {
        Self::ALL.iter().map(|c| c.marker().to_string()).collect()
    }
}

/// Whether `node` carries the marker for `concern`.
#[must_use]
pub fn has_marker(node: &NodeRef, concern: Concern) -> bool {
    node.attr(concern.marker()).is_some_and(|v| &*v == "true")
}

/// Concerns currently hiding `node`.
#[must_use]
pub fn hidden_reasons(node: &NodeRef) -> Vec<Concern> {
    Concern::ALL.into_iter().filter(|c| has_marker(node, *c)).collect()
}

/// Whether any marker is present on `node`.
#[must_use]
pub fn is_marked_hidden(node: &NodeRef) -> bool {
    Concern::ALL.iter().any(|c| has_marker(node, *c))
}

/// Mark `node` hidden for `concern`. No write if already marked.
pub fn mark_hidden(page: &Page, node: &NodeRef, concern: Concern) {
    if dom::is_document_root(node) || has_marker(node, concern) {
        return;
    }
    page.set_attribute(node, concern.marker(), "true");
    apply_visibility(page, node);
}

/// Clear the `concern` marker on `node`. No write if not marked.
pub fn unmark_hidden(page: &Page, node: &NodeRef, concern: Concern) {
    if dom::is_document_root(node) || !has_marker(node, concern) {
        return;
    }
    page.remove_attribute(node, concern.marker());
    apply_visibility(page, node);
}

/// Recompute inline `display` from the disjunction of all markers.
fn apply_visibility(page: &Page, node: &NodeRef) {
    if dom::is_document_root(node) {
        return;
    }
    let hidden = is_marked_hidden(node);
    let current = dom::get_attribute(node, "style").unwrap_or_default();
    let next = with_display(&current, hidden);
    if next != current {
        page.set_inline_style(node, &next);
    }
}

/// Rewrite an inline style so it does (or does not) carry `display: none`,
/// keeping every other declaration.
fn with_display(style: &str, hidden: bool) -> String {
    let mut declarations: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| {
            let property = d.split(':').next().unwrap_or_default().trim();
            !property.eq_ignore_ascii_case("display")
        })
        .collect();
    if hidden {
        declarations.push("display: none");
    }
    if declarations.is_empty() {
        String::new()
    } else {
        format!("{};", declarations.join("; "))
    }
}

/// Whether the inline style currently hides `node`.
#[must_use]
pub fn is_display_none(node: &NodeRef) -> bool {
    dom::get_attribute(node, "style").is_some_and(|style| {
        style.split(';').any(|d| {
            let mut parts = d.splitn(2, ':');
            let property = parts.next().unwrap_or_default().trim();
            let value = parts.next().unwrap_or_default().trim();
            property.eq_ignore_ascii_case("display") && value.eq_ignore_ascii_case("none")
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::new(r#"<html><body><div id="card" style="color: red"><a href="/p/x/1/">x</a></div></body></html>"#)
    }

    #[test]
    fn test_mark_twice_writes_once() {
        let page = page();
        let card = page.select_first("#card").expect("card");

        mark_hidden(&page, &card, Concern::Sponsored);
        mark_hidden(&page, &card, Concern::Sponsored);

        assert_eq!(page.attribute_writes(), 1);
        assert_eq!(page.style_writes(), 1);
        assert!(has_marker(&card, Concern::Sponsored));
        assert!(is_display_none(&card));
    }

    #[test]
    fn test_unmark_unmarked_writes_nothing() {
        let page = page();
        let card = page.select_first("#card").expect("card");

        unmark_hidden(&page, &card, Concern::Sponsored);

        assert_eq!(page.attribute_writes(), 0);
        assert_eq!(page.style_writes(), 0);
    }

    #[test]
    fn test_combined_visibility() {
        let page = page();
        let card = page.select_first("#card").expect("card");

        mark_hidden(&page, &card, Concern::Sponsored);
        mark_hidden(&page, &card, Concern::SellerBlock);
        unmark_hidden(&page, &card, Concern::Sponsored);
        assert!(is_display_none(&card));
        assert_eq!(hidden_reasons(&card), vec![Concern::SellerBlock]);

        unmark_hidden(&page, &card, Concern::SellerBlock);
        assert!(!is_display_none(&card));
        assert!(hidden_reasons(&card).is_empty());
    }

    #[test]
    fn test_other_style_declarations_survive() {
        let page = page();
        let card = page.select_first("#card").expect("card");

        mark_hidden(&page, &card, Concern::Unbranded);
        assert_eq!(dom::get_attribute(&card, "style").as_deref(), Some("color: red; display: none;"));

        unmark_hidden(&page, &card, Concern::Unbranded);
        assert_eq!(dom::get_attribute(&card, "style").as_deref(), Some("color: red;"));
    }

    #[test]
    fn test_body_is_never_marked() {
        let page = page();
        let body = page.body().expect("body");

        mark_hidden(&page, &body, Concern::GeneralAd);

        assert!(!has_marker(&body, Concern::GeneralAd));
        assert_eq!(page.attribute_writes(), 0);
    }

    #[test]
    fn test_with_display() {
        assert_eq!(with_display("", true), "display: none;");
        assert_eq!(with_display("display: block; margin: 0", true), "margin: 0; display: none;");
        assert_eq!(with_display("display:none;", false), "");
    }

    #[test]
    fn test_any_marker_selector_lists_all() {
        let selector = Concern::any_marker_selector();
        for concern in Concern::ALL {
            assert!(selector.contains(concern.marker()));
        }
    }
}
