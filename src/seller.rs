//! Seller and brand extraction.
//!
//! The seller of a listing is rendered inconsistently: sometimes as an
//! accessible label ("Verkoop door Acme"), sometimes as a single text node,
//! sometimes as a bare "Verkoop door" label followed by the name in a
//! sibling element. Extraction tries those shapes in that order.

use std::collections::HashSet;

use crate::dom::{self, NodeId, NodeRef};
use crate::page::Page;
use crate::patterns::{ARIA_LABEL_SELECTOR, FIRST_PARTY, SELLER_LABEL, VISIBLE_TEXT_SELECTOR};
use crate::text::clean_text;

/// Whether a seller or brand name is the site operator itself.
///
/// First-party names are never blockable.
#[must_use]
pub fn is_first_party(name: &str) -> bool {
    FIRST_PARTY.is_match(name.trim())
}

/// Alias kept for the seller-side call sites.
#[inline]
#[must_use]
pub fn is_bol_seller(name: &str) -> bool {
    is_first_party(name)
}

/// Seller named in a "Verkoop door X" label, `None` when the text is not
/// such a label. `Some("")` means the label carries no inline name.
fn seller_in_label(text: &str) -> Option<String> {
    SELLER_LABEL
        .captures(text)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()).trim().to_string())
}

/// Whether `text` is a seller label.
#[must_use]
pub fn is_seller_label(text: &str) -> bool {
    SELLER_LABEL.is_match(text.trim())
}

/// Extract the seller name for a label-bearing element.
///
/// Returns an empty string when no seller can be found; callers skip
/// such candidates.
#[must_use]
pub fn find_seller_from_element(el: &NodeRef) -> String {
    if let Some(label) = el.attr("aria-label") {
        if let Some(seller) = seller_in_label(&label) {
            if !seller.is_empty() {
                return seller;
            }
        }
    }

    let text = clean_text(el);
    if text.is_empty() {
        return String::new();
    }
    match seller_in_label(&text) {
        Some(seller) if !seller.is_empty() => seller,
        Some(_) => seller_from_siblings(el),
        None => String::new(),
    }
}

/// Seller name for a bare label: the first following sibling with text.
#[must_use]
fn seller_from_siblings(label: &NodeRef) -> String {
    let mut sibling = dom::next_element_sibling(label);
    while let Some(el) = sibling {
        let text = clean_text(&el);
        if !text.is_empty() {
            return text;
        }
        sibling = dom::next_element_sibling(&el);
    }
    String::new()
}

/// Every element on the page that may carry a seller label.
///
/// The union of elements whose accessible label is a seller label and leaf
/// text elements whose text is one, deduplicated, in document order.
#[must_use]
pub fn discover_seller_labels(page: &Page) -> Vec<NodeRef<'_>> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut labels = Vec::new();

    for el in page.select_all(ARIA_LABEL_SELECTOR) {
        let matches = el.attr("aria-label").is_some_and(|label| is_seller_label(&label));
        if matches && seen.insert(el.id) {
            labels.push(el);
        }
    }

    for el in page.select_all(VISIBLE_TEXT_SELECTOR) {
        if !dom::is_leaf_element(&el) {
            continue;
        }
        if is_seller_label(&dom::text_content(&el)) && seen.insert(el.id) {
            labels.push(el);
        }
    }

    labels
}

/// Brand name shown by a brand link, block button excluded.
#[must_use]
pub fn brand_name(link: &NodeRef) -> String {
    clean_text(link)
}
