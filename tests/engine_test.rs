use std::rc::Rc;

use bol_filter::store::{BLOCKED_SELLERS_KEY, TOGGLE_STATE_KEY};
use bol_filter::toast::TOAST_ID;
use bol_filter::visibility::{has_marker, is_display_none};
use bol_filter::{
    dom, filter_html, filter_page, Concern, Engine, MemoryStorage, MonitorState, Options, Page, Scheduler, Storage,
};
use serde_json::json;

/// Six product tiles: one unbranded, one sponsored, one sold by a third
/// party, three plain ones sold by bol.
const RESULTS_PAGE: &str = r#"
<html><head></head><body>
  <ul class="product-list">
    <li id="merkloos" data-bltgi="ProductList_1">
      <div class="brand"><a href="/nl/nl/b/merkloos/1/">Merkloos</a></div>
      <a href="/nl/nl/p/usb-kabel/9300000000000001/">USB kabel</a>
      <div class="seller"><span>Verkoop door bol</span></div>
    </li>
    <li id="sponsored" data-bltgi="ProductList_2">
      <div><span class="text-12 text-neutral-text-medium">Gesponsord</span><svg data-testid="advertisement-disclaimer-icon"></svg></div>
      <div class="brand"><a href="/nl/nl/b/philips/2/">Philips</a></div>
      <a href="/nl/nl/p/philips-lamp/9300000000000002/">Philips lamp</a>
    </li>
    <li id="acme" data-bltgi="ProductList_3">
      <div class="brand"><a href="/nl/nl/b/acme/3/">Acme</a></div>
      <a href="/nl/nl/p/acme-boor/9300000000000003/">Acme boor</a>
      <div class="seller"><span>Verkoop door Acme Store</span></div>
    </li>
    <li id="plain-1" data-bltgi="ProductList_4">
      <div class="brand"><a href="/nl/nl/b/bosch/4/">Bosch</a></div>
      <a href="/nl/nl/p/bosch-zaag/9300000000000004/">Bosch zaag</a>
      <div class="seller"><span>Verkoop door bol</span></div>
    </li>
    <li id="plain-2" data-bltgi="ProductList_5">
      <div class="brand"><a href="/nl/nl/b/makita/5/">Makita</a></div>
      <a href="/nl/nl/p/makita-schroef/9300000000000005/">Makita schroef</a>
      <div class="seller"><span>Verkoop door bol</span></div>
    </li>
    <li id="plain-3" data-bltgi="ProductList_6">
      <div class="brand"><a href="/nl/nl/b/stanley/6/">Stanley</a></div>
      <a href="/nl/nl/p/stanley-hamer/9300000000000006/">Stanley hamer</a>
      <div class="seller"><span>Verkoop door bol</span></div>
    </li>
  </ul>
</body></html>
"#;

fn start(html: &str, storage: Rc<dyn Storage>) -> (Engine, Scheduler) {
    let options = Options::default();
    let scheduler = Scheduler::with_options(&options);
    let page = Rc::new(Page::new(html));
    let engine = Engine::start(page, &scheduler, storage, &options);
    (engine, scheduler)
}

fn hidden_ids(engine: &Engine) -> Vec<String> {
    engine
        .page()
        .select_all("li")
        .iter()
        .filter(|li| is_display_none(li))
        .filter_map(|li| dom::get_attribute(li, "id"))
        .collect()
}

#[test]
fn default_toggles_hide_unbranded_and_sponsored() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));

    engine.flush();

    assert_eq!(hidden_ids(&engine), vec!["merkloos", "sponsored"]);
    let page = engine.page();
    let merkloos = page.select_first("#merkloos").expect("merkloos");
    assert!(has_marker(&merkloos, Concern::Unbranded));
    assert!(!has_marker(&merkloos, Concern::Sponsored));
}

#[test]
fn nothing_is_hidden_before_the_debounce_elapses() {
    let (engine, scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));

    scheduler.advance(std::time::Duration::from_millis(119));
    assert!(hidden_ids(&engine).is_empty());

    scheduler.advance(std::time::Duration::from_millis(1));
    assert_eq!(hidden_ids(&engine), vec!["merkloos", "sponsored"]);
}

#[test]
fn enabling_verkoop_door_bol_hides_third_party_listing() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));
    engine.flush();

    assert!(engine.set_enabled("filter-verkoop-door-bol", true));
    engine.flush();

    assert_eq!(hidden_ids(&engine), vec!["merkloos", "sponsored", "acme"]);
}

#[test]
fn disabling_a_toggle_reveals_its_listings() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));
    engine.flush();

    engine.set_enabled("filter-merkloos", false);
    engine.flush();

    assert_eq!(hidden_ids(&engine), vec!["sponsored"]);
    let merkloos = engine.page().select_first("#merkloos").expect("merkloos");
    assert!(dom::get_attribute(&merkloos, "style").unwrap_or_default().is_empty());
}

#[test]
fn disabling_a_toggle_reveals_without_advancing_time() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));
    engine.flush();

    engine.set_enabled("filter-gesponsord", false);

    assert!(engine.page().select_all(&Concern::Sponsored.marker_selector()).is_empty());
    assert_eq!(hidden_ids(&engine), vec!["merkloos"]);
}

#[test]
fn unknown_or_unchanged_toggle_is_rejected() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));

    assert!(!engine.set_enabled("filter-does-not-exist", true));
    assert!(!engine.set_enabled("filter-merkloos", true));
}

#[test]
fn toggle_changes_are_persisted() {
    let storage = Rc::new(MemoryStorage::new());
    let (engine, _scheduler) = start(RESULTS_PAGE, storage.clone());

    engine.set_enabled("filter-gesponsord", false);

    let stored = storage.get(TOGGLE_STATE_KEY).expect("read").expect("persisted");
    assert_eq!(stored["filter-gesponsord"], json!(false));
    assert_eq!(stored["filter-merkloos"], json!(true));
}

#[test]
fn persisted_state_is_loaded_on_start() {
    let storage = Rc::new(MemoryStorage::with_values([
        (TOGGLE_STATE_KEY, json!({ "filter-merkloos": false, "filter-gesponsord": false })),
        (BLOCKED_SELLERS_KEY, json!(["Acme Store"])),
    ]));
    let (engine, _scheduler) = start(RESULTS_PAGE, storage);

    engine.flush();

    assert_eq!(hidden_ids(&engine), vec!["acme"]);
    let acme = engine.page().select_first("#acme").expect("acme");
    assert!(has_marker(&acme, Concern::SellerBlock));
}

#[test]
fn combined_markers_keep_listing_hidden_until_all_clear() {
    let storage = Rc::new(MemoryStorage::with_values([(BLOCKED_SELLERS_KEY, json!(["Acme Store"]))]));
    let (engine, _scheduler) = start(RESULTS_PAGE, storage);
    engine.set_enabled("filter-verkoop-door-bol", true);
    engine.flush();

    let page = engine.page();
    let acme = page.select_first("#acme").expect("acme");
    assert!(has_marker(&acme, Concern::VerkoopDoorBol));
    assert!(has_marker(&acme, Concern::SellerBlock));

    engine.set_enabled("filter-verkoop-door-bol", false);
    engine.flush();
    let acme = page.select_first("#acme").expect("acme");
    assert!(!has_marker(&acme, Concern::VerkoopDoorBol));
    assert!(is_display_none(&acme));

    engine.remove_blocked_entry(bol_filter::BlockKind::Seller, "acme store");
    engine.flush();
    let acme = page.select_first("#acme").expect("acme");
    assert!(!is_display_none(&acme));
}

#[test]
fn few_results_notice_is_shown() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));

    engine.flush();

    assert_eq!(
        engine.monitor().last_message().as_deref(),
        Some("Nog 4 resultaten over (2 producten verborgen).")
    );
}

#[test]
fn every_listing_hidden_shows_filtered_no_results() {
    let html = r#"<html><head></head><body><ul>
        <li><a href="/nl/nl/b/merkloos/1/">Merkloos</a><a href="/nl/nl/p/a/1/">A</a></li>
        <li><a href="/nl/nl/b/merkloos/2/">Merkloos</a><a href="/nl/nl/p/b/2/">B</a></li>
    </ul></body></html>"#;
    let (engine, _scheduler) = start(html, Rc::new(MemoryStorage::new()));

    engine.flush();

    assert_eq!(engine.scan_now(), MonitorState::NoResults { filtered: true });
    assert_eq!(
        engine.monitor().last_message().as_deref(),
        Some("Geen resultaten! Met de huidige filters staan er op deze pagina geen producten. Pas je filters aan of ga verder.")
    );
}

#[test]
fn page_without_listings_reports_no_results() {
    let report = filter_html("<html><head></head><body><p>Niets gevonden</p></body></html>");

    assert_eq!(report.listings, 0);
    assert_eq!(report.notice.as_deref(), Some("Geen resultaten gevonden."));
}

#[test]
fn product_detail_page_never_shows_notice() {
    let page = Rc::new(
        Page::with_url(
            r#"<html><head></head><body><ul><li><a href="/nl/nl/b/merkloos/1/">Merkloos</a><a href="/nl/nl/p/a/1/">A</a></li></ul></body></html>"#,
            "https://www.bol.com/nl/nl/p/philips-lamp/9300000012345678/",
        )
        .expect("valid url"),
    );

    let report = filter_page(Rc::clone(&page), Rc::new(MemoryStorage::new()), &Options::default());

    assert_eq!(report.page_kind, "product-detail");
    assert_eq!(report.notice, None);
    assert!(page.select_first(&format!("#{TOAST_ID}")).is_none());
}

#[test]
fn toast_appears_and_is_removed_after_display_time() {
    let (engine, scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));

    // The first empty-page check runs 500 ms after start.
    scheduler.advance(std::time::Duration::from_millis(700));
    assert!(engine.toast().is_visible());
    assert_eq!(
        engine.toast().message().as_deref(),
        Some("Nog 4 resultaten over (2 producten verborgen).")
    );

    scheduler.advance(std::time::Duration::from_millis(5000));
    assert!(!engine.toast().is_visible());

    scheduler.advance(std::time::Duration::from_millis(240));
    assert!(engine.page().select_first(&format!("#{TOAST_ID}")).is_none());
}

#[test]
fn destroy_reveals_everything_and_stops_watching() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));
    engine.flush();
    assert!(!hidden_ids(&engine).is_empty());

    engine.destroy();

    assert!(hidden_ids(&engine).is_empty());
    assert!(engine.page().select_all(&Concern::any_marker_selector()).is_empty());
    assert_eq!(engine.page().observer_count(), 0);

    // Later changes no longer reach the filters.
    engine.set_enabled("filter-verkoop-door-bol", true);
    assert_eq!(engine.flush(), 0);
    assert!(hidden_ids(&engine).is_empty());
}

#[test]
fn rescan_of_settled_page_writes_nothing() {
    let (engine, _scheduler) = start(RESULTS_PAGE, Rc::new(MemoryStorage::new()));
    engine.flush();
    let page = engine.page();
    let (attributes, styles) = (page.attribute_writes(), page.style_writes());

    engine.scan_now();

    assert_eq!(page.attribute_writes(), attributes);
    assert_eq!(page.style_writes(), styles);
}

#[test]
fn report_lists_reasons_per_listing() {
    let report = filter_html(RESULTS_PAGE);

    assert_eq!(report.listings, 6);
    assert_eq!(report.hidden, 2);
    assert_eq!(report.visible, 4);
    assert_eq!(report.hidden_by.get("unbranded"), Some(&1));
    assert_eq!(report.hidden_by.get("sponsored"), Some(&1));
    assert_eq!(report.items[0].title, "USB kabel");
    assert_eq!(report.items[0].reasons, vec!["unbranded"]);
    assert!(!report.items[2].hidden);
}
