//! Text primitives shared by the classifiers.

use crate::dom::{self, NodeRef};
use crate::patterns::BLOCK_BUTTON_CLASS;

/// Trim and case-fold text for comparisons and block-list keys.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Text of an element with any injected block button subtree left out.
///
/// Returns an empty string when the element is itself a block button, so
/// an injected label never leaks into an extracted seller or brand name.
#[must_use]
pub fn clean_text(node: &NodeRef) -> String {
    if dom::has_class(node, BLOCK_BUTTON_CLASS) {
        return String::new();
    }

    let button_selector = format!(".{BLOCK_BUTTON_CLASS}");
    if !dom::contains_match(node, &button_selector) {
        return dom::text_content(node).trim().to_string();
    }

    let mut out = String::new();
    collect_text_excluding(node, &mut out);
    out.trim().to_string()
}

fn collect_text_excluding(node: &NodeRef, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text());
        } else if child.is_element() && !dom::has_class(&child, BLOCK_BUTTON_CLASS) {
            collect_text_excluding(&child, out);
        }
    }
}
