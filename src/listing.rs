//! Listing Root Resolution
//!
//! Given any node inside a product card, find the element that represents
//! exactly that one card. The host markup changes often, so resolution is
//! a ranked list of structural hints with a link-count bounded fallback
//! walk behind it.
//!
//! The bound separates "one card with a few variant links" from "the whole
//! result list": a standard card holds 1-2 product links, a card with
//! colour variants around 8, while the list container holds a hundred or
//! more.

use std::collections::HashSet;

use tracing::trace;

use crate::dom::{self, NodeId, NodeRef};
use crate::page::Page;
use crate::patterns::{
    EXPLICIT_PRODUCT_SELECTOR, LISTING_HINTS, LISTING_ROOT_SELECTOR, PRODUCT_LINK_SELECTOR,
};
use crate::visibility::Concern;
use crate::Options;

/// Resolves the listing root for nodes inside product cards.
#[derive(Debug, Clone, Copy)]
pub struct ListingResolver {
    max_links: usize,
    require_product_link: bool,
}

impl Default for ListingResolver {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl ListingResolver {
    /// Build a resolver from the thresholds in `options`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            max_links: options.max_listing_links,
            require_product_link: options.require_product_link,
        }
    }

    /// Find the element representing the single product card around `start`.
    ///
    /// Returns `None` when nothing qualifies. Never returns `<body>` or `<html>`.
    #[must_use]
    pub fn find_listing_root<'a>(&self, start: &NodeRef<'a>) -> Option<NodeRef<'a>> {
        if let Some(preferred) = preferred_container(start) {
            if !dom::is_document_root(&preferred)
                && (!self.require_product_link || self.has_acceptable_link_count(&preferred))
            {
                return Some(preferred);
            }
        }

        self.walk_for_candidate(start)
    }

    /// Bottom-up walk: keep the largest ancestor whose link count stays
    /// within the bound and stop at the first spike above it.
    fn walk_for_candidate<'a>(&self, start: &NodeRef<'a>) -> Option<NodeRef<'a>> {
        let mut candidate: Option<NodeRef<'a>> = None;
        let mut first_with_link: Option<NodeRef<'a>> = None;

        let mut node = Some(*start).filter(NodeRef::is_element);
        while let Some(current) = node {
            if dom::is_document_root(&current) {
                break;
            }
            let link_count = product_link_count(&current);
            if link_count > 0 {
                first_with_link.get_or_insert(current);
                if link_count <= self.max_links {
                    candidate = Some(current);
                } else if candidate.is_some() {
                    break;
                }
            }
            node = dom::parent_element(&current);
        }

        // Every ancestor above the bound: approximate with the closest one
        // that had a product link rather than losing the listing.
        let resolved = candidate.or(first_with_link);
        if resolved.is_some() && candidate.is_none() {
            trace!("listing resolved through over-bound fallback");
        }
        resolved.filter(|n| !dom::is_document_root(n))
    }

    fn has_acceptable_link_count(&self, node: &NodeRef) -> bool {
        let count = product_link_count(node);
        count > 0 && count <= self.max_links
    }

    /// Every listing root on the page, innermost only.
    ///
    /// Gathers roots resolved from product links, explicit listing
    /// containers and every element currently carrying a hidden marker,
    /// keeps those containing a product link and drops any root that
    /// contains another root.
    #[must_use]
    pub fn collect_listing_roots<'a>(&self, page: &'a Page) -> Vec<NodeRef<'a>> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut roots: Vec<NodeRef<'a>> = Vec::new();
        let mut push = |node: NodeRef<'a>| {
            if !dom::is_document_root(&node) && seen.insert(node.id) {
                roots.push(node);
            }
        };

        for link in page.select_all(PRODUCT_LINK_SELECTOR) {
            if let Some(root) = self.find_listing_root(&link) {
                push(root);
            }
        }
        for container in page.select_all(LISTING_ROOT_SELECTOR) {
            if dom::matches(&container, EXPLICIT_PRODUCT_SELECTOR) || dom::contains_match(&container, PRODUCT_LINK_SELECTOR) {
                push(container);
            }
        }
        for marked in page.select_all(&Concern::any_marker_selector()) {
            push(marked);
        }

        roots.retain(|root| dom::contains_match(root, PRODUCT_LINK_SELECTOR));
        innermost(roots)
    }
}

/// Nearest container for the first structural hint that matches at all.
fn preferred_container<'a>(start: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    LISTING_HINTS.iter().find_map(|hint| dom::closest(start, hint))
}

/// Number of product links inside `node`.
#[must_use]
pub fn product_link_count(node: &NodeRef) -> usize {
    dom::count_matches(node, PRODUCT_LINK_SELECTOR)
}

/// Drop every node that is an ancestor of another node in the set.
fn innermost(nodes: Vec<NodeRef<'_>>) -> Vec<NodeRef<'_>> {
    let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
    let mut containers: HashSet<NodeId> = HashSet::new();
    for node in &nodes {
        for ancestor in dom::ancestors(node) {
            if ids.contains(&ancestor.id) {
                containers.insert(ancestor.id);
            }
        }
    }
    nodes.into_iter().filter(|n| !containers.contains(&n.id)).collect()
}

/// Find the listing root around `start` using default thresholds.
#[must_use]
pub fn find_listing_root<'a>(start: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    ListingResolver::default().find_listing_root(start)
}
