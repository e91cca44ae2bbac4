//! The host page.
//!
//! `Page` owns the parsed document and stands in for the browser facilities
//! the engine relies on: subtree mutation notifications, delegated click
//! events and the page URL. Every DOM write made by the engine or by the
//! host goes through `Page` so that observers see it, exactly like a
//! `MutationObserver` would.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use url::Url;

use crate::dom::{self, Document, NodeId, NodeRef, Selection};
use crate::patterns::PRODUCT_PAGE_PATH;
use crate::Result;

/// Which kind of page is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// The shop front page.
    Homepage,
    /// A single product page; listing counts are meaningless here.
    ProductDetail,
    /// Search results, category pages and anything else.
    Listing,
}

impl PageKind {
    /// Classify a page by its URL path.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let path = url.path().to_lowercase();
        if path == "/nl/nl" || path == "/nl/nl/" {
            Self::Homepage
        } else if PRODUCT_PAGE_PATH.is_match(&path) {
            Self::ProductDetail
        } else {
            Self::Listing
        }
    }
}

/// What changed in a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added or removed.
    ChildList,
    /// The named attribute was set or removed.
    Attributes(String),
    /// Text content was edited in place.
    CharacterData,
}

/// A single change notification.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// The node the change happened on.
    pub target: NodeId,
    /// What changed.
    pub kind: MutationKind,
}

/// Which mutations an observer wants to hear about. Observation always
/// covers the whole document subtree.
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    /// Child additions and removals.
    pub child_list: bool,
    /// Attribute changes.
    pub attributes: bool,
    /// In-place text edits.
    pub character_data: bool,
    /// Restrict attribute notifications to these names.
    pub attribute_filter: Option<Vec<String>>,
}

impl ObserveOptions {
    /// Structural changes only.
    #[must_use]
    pub fn child_list() -> Self {
        Self {
            child_list: true,
            ..Self::default()
        }
    }

    /// Structural, attribute and text changes.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            child_list: true,
            attributes: true,
            character_data: true,
            attribute_filter: None,
        }
    }

    fn wants(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes(name) => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|filter| filter.iter().any(|f| f == name))
            }
        }
    }
}

/// Handle of a registered mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

/// Handle of a registered click listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type ObserverFn = Rc<dyn Fn(&MutationRecord)>;
type ClickFn = Rc<dyn Fn(&NodeRef) -> bool>;

/// The host page: document, URL, observers and click delegation.
pub struct Page {
    document: Document,
    kind: PageKind,
    url: Option<Url>,
    next_handle: Cell<u64>,
    observers: RefCell<Vec<(ObserverId, ObserveOptions, ObserverFn)>>,
    click_listeners: RefCell<Vec<(ListenerId, ClickFn)>>,
    attribute_writes: Cell<usize>,
    style_writes: Cell<usize>,
}

impl Page {
    /// Parse `html` as a listing page with no URL.
    #[must_use]
    pub fn new(html: &str) -> Self {
        Self {
            document: dom::parse(html),
            kind: PageKind::Listing,
            url: None,
            next_handle: Cell::new(0),
            observers: RefCell::new(Vec::new()),
            click_listeners: RefCell::new(Vec::new()),
            attribute_writes: Cell::new(0),
            style_writes: Cell::new(0),
        }
    }

    /// Parse `html` loaded from `url`; the URL decides the page kind.
    pub fn with_url(html: &str, url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        let mut page = Self::new(html);
        page.kind = PageKind::from_url(&url);
        page.url = Some(url);
        Ok(page)
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The page URL, when known.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The page kind derived from the URL.
    #[must_use]
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Serialized document.
    #[must_use]
    pub fn html(&self) -> String {
        self.document.html().to_string()
    }

    /// All elements matching `selector`, in document order.
    #[must_use]
    pub fn select_all(&self, selector: &str) -> Vec<NodeRef<'_>> {
        self.document.select(selector).nodes().to_vec()
    }

    /// First element matching `selector`.
    #[must_use]
    pub fn select_first(&self, selector: &str) -> Option<NodeRef<'_>> {
        self.document.select(selector).nodes().first().copied()
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeRef<'_>> {
        self.select_first("body")
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> Option<NodeRef<'_>> {
        self.select_first("head")
    }

    /// Number of attribute writes performed through the page so far,
    /// inline style updates excluded.
    #[must_use]
    pub fn attribute_writes(&self) -> usize {
        self.attribute_writes.get()
    }

    /// Number of inline style updates performed through the page so far.
    #[must_use]
    pub fn style_writes(&self) -> usize {
        self.style_writes.get()
    }

    // === Writes ===

    /// Set an attribute and notify observers.
    pub fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
        Selection::from(*node).set_attr(name, value);
        self.attribute_writes.set(self.attribute_writes.get() + 1);
        self.notify(node.id, MutationKind::Attributes(name.to_string()));
    }

    /// Remove an attribute and notify observers.
    pub fn remove_attribute(&self, node: &NodeRef, name: &str) {
        Selection::from(*node).remove_attr(name);
        self.attribute_writes.set(self.attribute_writes.get() + 1);
        self.notify(node.id, MutationKind::Attributes(name.to_string()));
    }

    /// Replace the inline style of `node`; an empty value removes it.
    pub fn set_inline_style(&self, node: &NodeRef, style: &str) {
        let sel = Selection::from(*node);
        if style.is_empty() {
            sel.remove_attr("style");
        } else {
            sel.set_attr("style", style);
        }
        self.style_writes.set(self.style_writes.get() + 1);
        self.notify(node.id, MutationKind::Attributes("style".to_string()));
    }

    /// Append parsed HTML as the last children of `parent`.
    pub fn append_html(&self, parent: &NodeRef, html: &str) {
        Selection::from(*parent).append_html(html);
        self.notify(parent.id, MutationKind::ChildList);
    }

    /// Replace the children of `node` with parsed HTML.
    pub fn set_inner_html(&self, node: &NodeRef, html: &str) {
        Selection::from(*node).set_html(html);
        self.notify(node.id, MutationKind::ChildList);
    }

    /// Edit the text of `node` in place.
    pub fn set_text(&self, node: &NodeRef, text: &str) {
        Selection::from(*node).set_html(dom::escape_text(text));
        self.notify(node.id, MutationKind::CharacterData);
    }

    /// Detach `node` from the tree.
    pub fn remove(&self, node: &NodeRef) {
        let parent = dom::parent_element(node).map_or(node.id, |p| p.id);
        Selection::from(*node).remove();
        self.notify(parent, MutationKind::ChildList);
    }

    // === Mutation observers ===

    /// Register a mutation observer over the whole document.
    pub fn observe(&self, options: ObserveOptions, callback: impl Fn(&MutationRecord) + 'static) -> ObserverId {
        let id = ObserverId(self.next_handle());
        self.observers.borrow_mut().push((id, options, Rc::new(callback)));
        id
    }

    /// Stop delivering notifications to an observer.
    pub fn disconnect(&self, id: ObserverId) {
        self.observers.borrow_mut().retain(|(oid, _, _)| *oid != id);
    }

    /// Number of connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn notify(&self, target: NodeId, kind: MutationKind) {
        let interested: Vec<ObserverFn> = self
            .observers
            .borrow()
            .iter()
            .filter(|(_, options, _)| options.wants(&kind))
            .map(|(_, _, callback)| Rc::clone(callback))
            .collect();
        if interested.is_empty() {
            return;
        }
        let record = MutationRecord { target, kind };
        for callback in interested {
            callback(&record);
        }
    }

    // === Click delegation ===

    /// Register a document-level click listener. The listener returns
    /// `true` when it handled the click.
    pub fn add_click_listener(&self, listener: impl Fn(&NodeRef) -> bool + 'static) -> ListenerId {
        let id = ListenerId(self.next_handle());
        self.click_listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a click listener.
    pub fn remove_click_listener(&self, id: ListenerId) {
        self.click_listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    /// Dispatch a click on `target`. Returns whether any listener handled it.
    pub fn click(&self, target: &NodeRef) -> bool {
        let listeners: Vec<ClickFn> = self
            .click_listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        let mut handled = false;
        for listener in listeners {
            handled |= listener(target);
        }
        handled
    }

    fn next_handle(&self) -> u64 {
        let id = self.next_handle.get();
        self.next_handle.set(id + 1);
        id
    }
}
