//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate giving the browser-style
//! operations the classifier is written against (`closest`, `matches`,
//! `nextElementSibling`, `querySelectorAll(..).length`, ...).
//!
//! Everything here is read-only. Writes go through [`crate::page::Page`]
//! so that mutation observers are notified.

// Re-export core types for external use
pub use dom_query::{Document, NodeId, NodeRef, Selection};

pub use tendril::StrTendril;

// === Parsing ===

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Node Information ===

/// Lowercase tag name of an element, `None` for non-element nodes.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Whether the node is the document body or the document element.
///
/// Neither may ever be treated as a listing or hidden.
#[must_use]
pub fn is_document_root(node: &NodeRef) -> bool {
    matches!(tag_name(node).as_deref(), Some("body" | "html"))
}

/// Get an attribute value as an owned string.
#[inline]
#[must_use]
pub fn get_attribute(node: &NodeRef, name: &str) -> Option<String> {
    node.attr(name).map(|v| v.to_string())
}

/// Check whether the attribute is present, whatever its value.
#[inline]
#[must_use]
pub fn has_attribute(node: &NodeRef, name: &str) -> bool {
    Selection::from(*node).has_attr(name)
}

/// Check whether the element carries the given class.
#[inline]
#[must_use]
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    Selection::from(*node).has_class(class)
}

/// Check whether the element itself matches a CSS selector.
#[inline]
#[must_use]
pub fn matches(node: &NodeRef, selector: &str) -> bool {
    node.is_element() && Selection::from(*node).is(selector)
}

// === Text Content ===

/// All text content of the node and its descendants.
#[inline]
#[must_use]
pub fn text_content(node: &NodeRef) -> StrTendril {
    node.text()
}

// === Tree Navigation ===

/// Parent element, skipping the document node.
#[must_use]
pub fn parent_element<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.parent().filter(NodeRef::is_element)
}

/// Nearest inclusive ancestor matching the selector.
///
/// Browser equivalent: `el.closest(selector)`
#[must_use]
pub fn closest<'a>(node: &NodeRef<'a>, selector: &str) -> Option<NodeRef<'a>> {
    let mut current = Some(*node).filter(NodeRef::is_element);
    while let Some(el) = current {
        if matches(&el, selector) {
            return Some(el);
        }
        current = parent_element(&el);
    }
    None
}

/// Strict element ancestors, nearest first.
#[must_use]
pub fn ancestors<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut result = Vec::new();
    let mut current = parent_element(node);
    while let Some(el) = current {
        current = parent_element(&el);
        result.push(el);
    }
    result
}

/// Next sibling that is an element (skipping text and comment nodes).
#[inline]
#[must_use]
pub fn next_element_sibling<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.next_element_sibling()
}

/// Whether the element has no element children.
#[must_use]
pub fn is_leaf_element(node: &NodeRef) -> bool {
    node.is_element() && !node.children().iter().any(NodeRef::is_element)
}

// === Querying ===

/// Number of descendants matching the selector (the node itself excluded).
///
/// Browser equivalent: `el.querySelectorAll(selector).length`
#[inline]
#[must_use]
pub fn count_matches(node: &NodeRef, selector: &str) -> usize {
    Selection::from(*node).select(selector).length()
}

/// Whether any descendant matches the selector.
///
/// Browser equivalent: `el.querySelector(selector) !== null`
#[inline]
#[must_use]
pub fn contains_match(node: &NodeRef, selector: &str) -> bool {
    Selection::from(*node).select(selector).exists()
}

/// First descendant matching the selector.
#[must_use]
pub fn query_selector<'a>(node: &NodeRef<'a>, selector: &str) -> Option<NodeRef<'a>> {
    Selection::from(*node).select(selector).nodes().first().copied()
}

/// All descendants matching the selector, in document order.
#[must_use]
pub fn query_selector_all<'a>(node: &NodeRef<'a>, selector: &str) -> Vec<NodeRef<'a>> {
    Selection::from(*node).select(selector).nodes().to_vec()
}

// === Markup ===

/// Escape text for use inside element content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
