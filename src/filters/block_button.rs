//! Injected "Blokkeer" buttons for sellers and brands.
//!
//! Buttons are written only when their state differs from what is on the
//! page, so a rescan of an unchanged page produces no mutations.

use crate::dom::{self, NodeRef};
use crate::page::Page;
use crate::patterns::{BLOCK_BUTTON_CLASS, BLOCK_BUTTON_STYLE_ID};

const LABEL_BLOCK: &str = "Blokkeer";
const LABEL_BLOCKED: &str = "Geblokkeerd";

const BLOCK_BUTTON_CSS: &str = ".bf-block-btn { margin-left: 6px; padding: 2px 8px; border-radius: 999px; \
border: 1px solid #d5dbe3; background: #ffffff; color: #0f172a; font-size: 0.72rem; font-weight: 600; \
cursor: pointer; line-height: 1.3; } \
.bf-block-btn:hover { background: #f1f5f9; } \
.bf-block-btn[disabled] { background: #e2e8f0; border-color: #e2e8f0; color: #64748b; cursor: default; }";

/// Which block list a button feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Seller,
    Brand,
}

impl BlockKind {
    /// Attribute carrying the name on the button.
    #[must_use]
    pub fn name_attribute(self) -> &'static str {
        match self {
            BlockKind::Seller => "data-bf-seller-name",
            BlockKind::Brand => "data-bf-brand-name",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Seller => "seller",
            BlockKind::Brand => "brand",
        }
    }
}

/// A button change computed during the read pass.
#[derive(Clone)]
pub enum ButtonUpdate<'a> {
    /// Make sure `container` holds a button for `name` in the given state.
    Ensure {
        container: NodeRef<'a>,
        kind: BlockKind,
        name: String,
        blocked: bool,
    },
    /// Drop the button of this kind from `container`.
    Remove { container: NodeRef<'a>, kind: BlockKind },
}

impl<'a> ButtonUpdate<'a> {
    /// Element the button lives in.
    #[must_use]
    pub fn container(&self) -> NodeRef<'a> {
        match self {
            ButtonUpdate::Ensure { container, .. } | ButtonUpdate::Remove { container, .. } => *container,
        }
    }

    /// Apply the update. Returns whether anything was written.
    pub fn apply(&self, page: &Page) -> bool {
        match self {
            ButtonUpdate::Ensure {
                container,
                kind,
                name,
                blocked,
            } => ensure_button(page, container, *kind, name, *blocked),
            ButtonUpdate::Remove { container, kind } => remove_button(page, container, *kind),
        }
    }
}

/// Buttons of one kind. A container may hold a seller and a brand button
/// side by side; each filter only ever touches its own.
fn button_selector(kind: BlockKind) -> String {
    format!(".{BLOCK_BUTTON_CLASS}[{}]", kind.name_attribute())
}

/// Markup of a fresh button.
#[must_use]
pub fn render_button(kind: BlockKind, name: &str, blocked: bool) -> String {
    let label = if blocked { LABEL_BLOCKED } else { LABEL_BLOCK };
    let disabled = if blocked { " disabled" } else { "" };
    format!(
        r#"<button type="button" class="{BLOCK_BUTTON_CLASS}" {}="{}"{disabled}>{label}</button>"#,
        kind.name_attribute(),
        dom::escape_attr(name),
    )
}

fn ensure_button(page: &Page, container: &NodeRef, kind: BlockKind, name: &str, blocked: bool) -> bool {
    let Some(button) = dom::query_selector(container, &button_selector(kind)) else {
        page.append_html(container, &render_button(kind, name, blocked));
        return true;
    };

    let mut changed = false;
    let label = if blocked { LABEL_BLOCKED } else { LABEL_BLOCK };
    if dom::text_content(&button).trim() != label {
        page.set_text(&button, label);
        changed = true;
    }
    let disabled = dom::has_attribute(&button, "disabled");
    if blocked && !disabled {
        page.set_attribute(&button, "disabled", "");
        changed = true;
    } else if !blocked && disabled {
        page.remove_attribute(&button, "disabled");
        changed = true;
    }
    if dom::get_attribute(&button, kind.name_attribute()).as_deref() != Some(name) {
        page.set_attribute(&button, kind.name_attribute(), name);
        changed = true;
    }
    changed
}

fn remove_button(page: &Page, container: &NodeRef, kind: BlockKind) -> bool {
    match dom::query_selector(container, &button_selector(kind)) {
        Some(button) => {
            page.remove(&button);
            true
        }
        None => false,
    }
}

/// Name a click on `target` asks to block, if it hit an enabled button of
/// this kind.
#[must_use]
pub fn clicked_name(target: &NodeRef, kind: BlockKind) -> Option<String> {
    let button = dom::closest(target, &button_selector(kind))?;
    if dom::has_attribute(&button, "disabled") {
        return None;
    }
    dom::get_attribute(&button, kind.name_attribute())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Inject the button style sheet into `<head>` unless present. Returns
/// whether it was injected.
pub fn ensure_styles(page: &Page) -> bool {
    if page.select_first(&format!("#{BLOCK_BUTTON_STYLE_ID}")).is_some() {
        return false;
    }
    let Some(head) = page.head() else {
        return false;
    };
    page.append_html(&head, &format!(r#"<style id="{BLOCK_BUTTON_STYLE_ID}">{BLOCK_BUTTON_CSS}</style>"#));
    true
}
