//! The empty-page notice.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::trace;

use crate::dom::{self, NodeRef};
use crate::page::Page;
use crate::scheduler::{Scheduler, TimerId};
use crate::Options;

/// Element id of the notice.
pub const TOAST_ID: &str = "bol-filter-bubble-notification";

const TOAST_CLASS: &str = "bf-empty-toast";
const TOAST_VISIBLE_CLASS: &str = "bf-empty-toast visible";

/// Something that can show the monitor's message to the user.
pub trait Notice {
    /// Show `message`, replacing whatever is shown.
    fn show(&self, message: &str);

    /// Hide the notice if shown.
    fn hide(&self);
}

struct ToastInner {
    page: Rc<Page>,
    scheduler: Scheduler,
    display: Duration,
    fade: Duration,
    hide_timer: Cell<Option<TimerId>>,
    remove_timer: Cell<Option<TimerId>>,
}

impl ToastInner {
    fn element(&self) -> Option<NodeRef<'_>> {
        self.page.select_first(&format!("#{TOAST_ID}"))
    }

    fn cancel(&self, timer: &Cell<Option<TimerId>>) {
        if let Some(id) = timer.take() {
            self.scheduler.clear_timeout(id);
        }
    }

    /// Drop the `visible` class now and remove the node after the fade.
    fn fade_out(self: &Rc<Self>) {
        self.cancel(&self.hide_timer);
        let Some(toast) = self.element() else {
            return;
        };
        if dom::get_attribute(&toast, "class").as_deref() != Some(TOAST_CLASS) {
            self.page.set_attribute(&toast, "class", TOAST_CLASS);
        }
        if self.remove_timer.get().is_some() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.scheduler.set_timeout(self.fade, move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove_timer.set(None);
                if let Some(toast) = inner.element() {
                    inner.page.remove(&toast);
                    trace!("empty-page notice removed");
                }
            }
        });
        self.remove_timer.set(Some(id));
    }
}

/// Toast rendered into `<body>` that hides itself after a while.
///
/// Cloning yields another handle to the same toast.
#[derive(Clone)]
pub struct EmptyPageToast {
    inner: Rc<ToastInner>,
}

impl EmptyPageToast {
    #[must_use]
    pub fn new(page: Rc<Page>, scheduler: &Scheduler, options: &Options) -> Self {
        Self {
            inner: Rc::new(ToastInner {
                page,
                scheduler: scheduler.clone(),
                display: options.toast_display_duration,
                fade: options.toast_fade_duration,
                hide_timer: Cell::new(None),
                remove_timer: Cell::new(None),
            }),
        }
    }

    /// Whether the toast is on the page with the `visible` class.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner
            .element()
            .is_some_and(|toast| dom::has_class(&toast, "visible"))
    }

    /// Text currently in the toast.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.inner
            .element()
            .map(|toast| dom::text_content(&toast).trim().to_string())
    }
}

impl Notice for EmptyPageToast {
    fn show(&self, message: &str) {
        let inner = &self.inner;
        inner.cancel(&inner.remove_timer);
        inner.cancel(&inner.hide_timer);

        match inner.element() {
            Some(toast) => {
                if dom::text_content(&toast).trim() != message {
                    inner.page.set_text(&toast, message);
                }
                if dom::get_attribute(&toast, "class").as_deref() != Some(TOAST_VISIBLE_CLASS) {
                    inner.page.set_attribute(&toast, "class", TOAST_VISIBLE_CLASS);
                }
            }
            None => {
                let Some(body) = inner.page.body() else {
                    return;
                };
                inner.page.append_html(
                    &body,
                    &format!(
                        r#"<div id="{TOAST_ID}" class="{TOAST_VISIBLE_CLASS}" role="status">{}</div>"#,
                        dom::escape_text(message)
                    ),
                );
            }
        }

        let weak = Rc::downgrade(inner);
        let id = inner.scheduler.set_timeout(inner.display, move || {
            if let Some(inner) = weak.upgrade() {
                inner.hide_timer.set(None);
                inner.fade_out();
            }
        });
        inner.hide_timer.set(Some(id));
    }

    fn hide(&self) {
        self.inner.fade_out();
    }
}
