use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use bol_filter::debounce::DebouncedScanner;
use bol_filter::seller::{discover_seller_labels, find_seller_from_element};
use bol_filter::visibility::{has_marker, is_display_none, mark_hidden, unmark_hidden};
use bol_filter::{dom, find_listing_root, Concern, ListingResolver, Options, Page, Scheduler};

fn links(n: usize) -> String {
    (0..n)
        .map(|i| format!(r#"<a href="/nl/nl/p/item/{i}/">Item {i}</a>"#))
        .collect()
}

fn id_of(node: Option<dom::NodeRef>) -> Option<String> {
    node.and_then(|n| dom::get_attribute(&n, "id"))
}

#[test]
fn bottom_up_walk_stops_at_link_count_spike() {
    // No structural hint: the card is the largest ancestor within the bound.
    let page = Page::new(&format!(
        r#"<html><body><div id="grid">
            <div id="card"><div id="inner"><span id="start">x</span>{}</div></div>
            {}
        </div></body></html>"#,
        links(1),
        links(30)
    ));
    let start = page.select_first("#start").expect("start");

    assert_eq!(id_of(find_listing_root(&start)), Some("card".to_string()));
}

#[test]
fn every_ancestor_over_bound_falls_back_to_nearest_with_links() {
    let page = Page::new(&format!(
        r#"<html><body><div id="wall"><span id="start">x</span>{}</div></body></html>"#,
        links(40)
    ));
    let start = page.select_first("#start").expect("start");

    assert_eq!(id_of(find_listing_root(&start)), Some("wall".to_string()));
}

#[test]
fn custom_link_bound_is_honored() {
    let page = Page::new(&format!(
        r#"<html><body><div id="outer"><div id="pair"><span id="start">x</span>{}</div>{}</div></body></html>"#,
        links(2),
        links(2)
    ));
    let start = page.select_first("#start").expect("start");
    let strict = ListingResolver::new(&Options {
        max_listing_links: 2,
        ..Options::default()
    });

    assert_eq!(id_of(strict.find_listing_root(&start)), Some("pair".to_string()));
    assert_eq!(id_of(find_listing_root(&start)), Some("outer".to_string()));
}

#[test]
fn listing_root_is_never_body() {
    let page = Page::new(&format!(r#"<html><body><span id="start">x</span>{}</body></html>"#, links(1)));
    let start = page.select_first("#start").expect("start");

    assert!(find_listing_root(&start).is_none());
}

#[test]
fn collected_roots_are_innermost() {
    let page = Page::new(&format!(
        r#"<html><body><ul>
            <li id="outer"><ul><li id="a">{}</li><li id="b">{}</li></ul></li>
        </ul></body></html>"#,
        links(1),
        links(1)
    ));
    let roots: Vec<String> = ListingResolver::default()
        .collect_listing_roots(&page)
        .iter()
        .filter_map(|n| dom::get_attribute(n, "id"))
        .collect();

    assert_eq!(roots, vec!["a", "b"]);
}

#[test]
fn seller_shapes_are_all_recognized() {
    let page = Page::new(
        r#"<html><body>
            <div><a aria-label="Verkoop door Shop One">Shop</a></div>
            <div><span>Verkoop door Shop Two</span></div>
            <div><span>verkoop door</span><span></span><a href="/nl/nl/v/3/">Shop Three</a></div>
            <div><span>Niet verkocht</span></div>
        </body></html>"#,
    );
    let sellers: Vec<String> = discover_seller_labels(&page)
        .iter()
        .map(find_seller_from_element)
        .collect();

    assert_eq!(sellers, vec!["Shop One", "Shop Two", "Shop Three"]);
}

#[test]
fn injected_button_text_never_leaks_into_seller_name() {
    let page = Page::new(
        r#"<html><body><div id="row"><span>Verkoop door</span><a href="/nl/nl/v/1/">Acme<button class="bf-block-btn">Blokkeer</button></a></div></body></html>"#,
    );
    let labels = discover_seller_labels(&page);

    assert_eq!(labels.len(), 1);
    assert_eq!(find_seller_from_element(&labels[0]), "Acme");
}

#[test]
fn marking_is_idempotent() {
    let page = Page::new(r#"<html><body><li id="l" style="color: red;">x</li></body></html>"#);
    let node = page.select_first("#l").expect("li");

    mark_hidden(&page, &node, Concern::Sponsored);
    let writes = (page.attribute_writes(), page.style_writes());
    mark_hidden(&page, &node, Concern::Sponsored);

    assert_eq!((page.attribute_writes(), page.style_writes()), writes);
    let node = page.select_first("#l").expect("li");
    assert_eq!(dom::get_attribute(&node, "style").as_deref(), Some("color: red; display: none;"));
}

#[test]
fn display_follows_all_markers() {
    let page = Page::new(r#"<html><body><li id="l">x</li></body></html>"#);
    let node = page.select_first("#l").expect("li");

    mark_hidden(&page, &node, Concern::Unbranded);
    mark_hidden(&page, &node, Concern::BrandBlock);
    unmark_hidden(&page, &node, Concern::Unbranded);

    let node = page.select_first("#l").expect("li");
    assert!(is_display_none(&node));
    assert!(has_marker(&node, Concern::BrandBlock));

    unmark_hidden(&page, &node, Concern::BrandBlock);
    let node = page.select_first("#l").expect("li");
    assert!(!is_display_none(&node));
}

#[test]
fn debounced_requests_coalesce_into_one_run() {
    let scheduler = Scheduler::new();
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let scanner = DebouncedScanner::new(&scheduler, Duration::from_millis(120), move || {
        counter.set(counter.get() + 1);
    });

    for _ in 0..10 {
        scanner.schedule();
        scheduler.advance(Duration::from_millis(10));
    }
    scheduler.advance(Duration::from_millis(120));

    assert_eq!(runs.get(), 1);
    assert!(!scanner.is_pending());

    scanner.schedule();
    scanner.clear();
    scheduler.advance(Duration::from_millis(500));
    assert_eq!(runs.get(), 1);
}
