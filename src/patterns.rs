//! Compiled regex patterns and CSS selectors for listing classification.
//!
//! All patterns are compiled once at first use using `LazyLock`.
//! Centralizing the selectors here keeps the host-markup coupling in one
//! place for when the listing pages change their markup.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Links
// =============================================================================

/// Product detail links. Both the localized and the short path form occur.
pub const PRODUCT_LINK_SELECTOR: &str = r#"a[href*="/nl/nl/p/"], a[href*="/p/"]"#;

/// Brand links (brand pages and partner brand pages).
pub const BRAND_LINK_SELECTOR: &str = r#"a[href*="/b/"], a[href*="/pb/"]"#;

// =============================================================================
// Listing containers
// =============================================================================

/// Tracking attributes the result list puts on each product tile.
pub const LISTING_DATA_SELECTOR: &str =
    r#"[data-bltgi*="ProductList"], [data-bltgh*="ProductList"]"#;

/// Structural hints for a listing root, strongest first.
///
/// `data-id` is a strong signal for a product container on carousels.
pub const LISTING_HINTS: &[&str] = &[
    LISTING_DATA_SELECTOR,
    r#"[data-test*="product"]"#,
    r#"[role="listitem"]"#,
    "[data-id]",
    "article",
    "li",
];

/// Every element that may explicitly be a listing root.
pub const LISTING_ROOT_SELECTOR: &str = r#"[data-bltgi*="ProductList"], [data-bltgh*="ProductList"], [data-test*="product"], [role="listitem"], article, li"#;

/// Elements that count as a listing root on their own.
pub const EXPLICIT_PRODUCT_SELECTOR: &str = r#"[data-test*="product"]"#;

/// Self-contained listing items (used by product-page carousels).
pub const LISTING_ITEM_SELECTOR: &str = r#"li, article, [role="listitem"]"#;

// =============================================================================
// Sponsored content
// =============================================================================

/// Small badge spans; sponsored badges are a subset.
pub const AD_BADGE_SELECTOR: &str = "span.text-12";

/// The muted badge variant used on sponsored product tiles.
pub const SPONSORED_BADGE_SELECTOR: &str = "span.text-12.text-neutral-text-medium";

/// Disclaimer icon rendered next to every real advertisement badge.
pub const AD_ICON_SELECTOR: &str = r#"svg[data-testid="advertisement-disclaimer-icon"]"#;

/// Mid-list consideration display block (house advertising).
pub const AD_BLOCK_SELECTOR: &str = r#"[data-bltgg*="ProductList_Middle_considerationDisplay"]"#;

/// Sponsored carousel items on product detail pages.
pub const PDP_SPONSORED_ITEM_SELECTOR: &str = ".js_sponsored-products_item";

/// Sponsored labels on product detail pages.
pub const PDP_SPONSORED_LABEL_SELECTOR: &str = ".dsa__label__text, button.dsa__label";

/// Keywords identifying a sponsored badge (matched as substrings of normalized text).
pub const SPONSORED_KEYWORDS: &[&str] = &["gesponsord", "gesponsorde", "sponsored"];

/// Keyword identifying a house advertisement badge.
pub const AD_BADGE_TEXT: &str = "gesponsord";

// =============================================================================
// Labels
// =============================================================================

/// Elements scanned for visible label text.
pub const VISIBLE_TEXT_SELECTOR: &str = "span, div, p";

/// Any element carrying an accessible label.
pub const ARIA_LABEL_SELECTOR: &str = "[aria-label]";

/// Exact (normalized) texts of the good-choice labels.
pub const GOOD_CHOICE_LABELS: &[&str] = &["goede keuze", "duurzame keuze"];

/// Brand names used for products without a brand.
pub const UNBRANDED_MARKERS: &[&str] = &["merkloos", "sans marque"];

// =============================================================================
// Injected UI
// =============================================================================

/// Class of the injected block buttons.
pub const BLOCK_BUTTON_CLASS: &str = "bf-block-btn";

/// Id of the injected block button stylesheet.
pub const BLOCK_BUTTON_STYLE_ID: &str = "bf-block-btn-style";

// =============================================================================
// Regexes
// =============================================================================

/// Matches a seller label: "Verkoop door <seller>". Group 1 is the seller,
/// which may be empty when the name is rendered in a sibling element.
pub static SELLER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*verkoop door\s*(.*?)\s*$").expect("SELLER_LABEL regex")
});

/// Matches the site operator as a seller or brand, with or without the domain suffix.
pub static FIRST_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bbol(?:\.com)?\b").expect("FIRST_PARTY regex")
});

/// Matches product detail page paths.
pub static PRODUCT_PAGE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/p/[^/]+/\d+").expect("PRODUCT_PAGE_PATH regex")
});
