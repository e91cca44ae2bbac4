//! Configuration options for the filtering engine.
//!
//! The `Options` struct holds the tunable thresholds and timings. The
//! defaults are the values observed to work on the live listing pages.

use std::time::Duration;

/// Configuration options for listing detection, scanning and the
/// empty-page monitor.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use bol_filter::Options;
/// use std::time::Duration;
///
/// let options = Options {
///     max_listing_links: 10,
///     scan_debounce: Duration::from_millis(50),
///     ..Options::default()
/// };
/// assert_eq!(options.few_results_threshold, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of product links a single listing may contain.
    ///
    /// A product card with colour/size variants carries a handful of links
    /// (standard cards 1-2, variant cards around 8) while the surrounding
    /// result list carries a hundred or more. Ancestors above this count
    /// are treated as list containers, not cards.
    ///
    /// Default: `25`
    pub max_listing_links: usize,

    /// Require a resolved listing root to contain a product link.
    ///
    /// Default: `true`
    pub require_product_link: bool,

    /// Debounce delay for filter rescans.
    ///
    /// Default: `120ms`
    pub scan_debounce: Duration,

    /// Debounce delay for the heavier filters (good choice walks every listing).
    ///
    /// Default: `140ms`
    pub slow_scan_debounce: Duration,

    /// Debounce delay for the empty-page check.
    ///
    /// Default: `500ms`
    pub empty_page_check_delay: Duration,

    /// How long the empty-page notice stays up.
    ///
    /// Default: `5000ms`
    pub toast_display_duration: Duration,

    /// Delay between fading the notice and removing its node.
    ///
    /// Default: `240ms`
    pub toast_fade_duration: Duration,

    /// Visible listing count from which the page no longer counts as
    /// "few results".
    ///
    /// Default: `5`
    pub few_results_threshold: usize,

    /// Upper bound on timers fired by a single `run_until_idle` call.
    ///
    /// Guards against a scan that keeps producing mutations which keep
    /// rescheduling scans.
    ///
    /// Default: `10_000`
    pub max_timer_iterations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_listing_links: 25,
            require_product_link: true,
            scan_debounce: Duration::from_millis(120),
            slow_scan_debounce: Duration::from_millis(140),
            empty_page_check_delay: Duration::from_millis(500),
            toast_display_duration: Duration::from_millis(5000),
            toast_fade_duration: Duration::from_millis(240),
            few_results_threshold: 5,
            max_timer_iterations: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert_eq!(opts.max_listing_links, 25);
        assert!(opts.require_product_link);
        assert_eq!(opts.scan_debounce, Duration::from_millis(120));
        assert_eq!(opts.slow_scan_debounce, Duration::from_millis(140));
        assert_eq!(opts.empty_page_check_delay, Duration::from_millis(500));
        assert_eq!(opts.toast_display_duration, Duration::from_millis(5000));
        assert_eq!(opts.toast_fade_duration, Duration::from_millis(240));
        assert_eq!(opts.few_results_threshold, 5);
    }

    #[test]
    fn test_struct_update_keeps_defaults() {
        let opts = Options {
            max_listing_links: 3,
            ..Options::default()
        };

        assert_eq!(opts.max_listing_links, 3);
        assert_eq!(opts.few_results_threshold, 5);
    }
}
