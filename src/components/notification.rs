use std::cell::RefCell;

use log::{debug, warn};

use crate::config::ToastConfig;
use crate::dom::{Click, Dom};
use crate::timers::Scheduler;

pub const TOAST_ID: &str = "notify";
pub const SHOW: &str = "show";
pub const ERROR: &str = "error";

const SUCCESS_ICON: &str = "✓";
const ERROR_ICON: &str = "!";

#[derive(Clone)]
struct Toast<N> {
    root: N,
    icon: Option<N>,
    text: Option<N>,
}

/// The page's single toast. The element is created on first use and reused after
/// that; each call restarts the auto-hide timer.
pub struct Notifier<D: Dom, S: Scheduler> {
    dom: D,
    scheduler: S,
    hide_after_ms: u32,
    close_label: String,
    toast: RefCell<Option<Toast<D::Node>>>,
    pending_hide: RefCell<Option<S::Handle>>,
}

impl<D: Dom, S: Scheduler> Notifier<D, S> {
    pub fn new(dom: D, scheduler: S, config: &ToastConfig) -> Self {
        Self {
            dom,
            scheduler,
            hide_after_ms: config.hide_after_ms,
            close_label: config.close_label.clone(),
            toast: RefCell::new(None),
            pending_hide: RefCell::new(None),
        }
    }

    pub fn notify(&self, message: &str, is_error: bool) {
        let Some(toast) = self.toast() else {
            warn!("No <body> to attach the notification to: {message}");
            return;
        };

        if let Some(text) = &toast.text {
            self.dom.set_text(text, message);
        }
        if let Some(icon) = &toast.icon {
            self.dom
                .set_text(icon, if is_error { ERROR_ICON } else { SUCCESS_ICON });
        }
        self.dom.remove_class(&toast.root, ERROR);
        if is_error {
            self.dom.add_class(&toast.root, ERROR);
        }
        self.dom.add_class(&toast.root, SHOW);

        let dom = self.dom.clone();
        let root = toast.root.clone();
        let hide = self.scheduler.schedule(
            self.hide_after_ms,
            Box::new(move || dom.remove_class(&root, SHOW)),
        );
        // Dropping the previous handle cancels its hide.
        *self.pending_hide.borrow_mut() = Some(hide);
    }

    fn toast(&self) -> Option<Toast<D::Node>> {
        if let Some(toast) = self.toast.borrow().as_ref() {
            return Some(toast.clone());
        }
        let root = match self.dom.by_id(TOAST_ID) {
            Some(existing) => existing,
            None => self.build()?,
        };
        let toast = Toast {
            icon: self.dom.query(Some(&root), ".notify-icon"),
            text: self.dom.query(Some(&root), ".notify-text"),
            root,
        };
        if let Some(close) = self.dom.query(Some(&toast.root), ".notify-close") {
            let dom = self.dom.clone();
            let root = toast.root.clone();
            self.dom.on_click(
                &close,
                Box::new(move |_: &mut Click<D::Node>| dom.remove_class(&root, SHOW)),
            );
        }
        *self.toast.borrow_mut() = Some(toast.clone());
        Some(toast)
    }

    fn build(&self) -> Option<D::Node> {
        let body = self.dom.body()?;
        let root = self.dom.create_element("div")?;
        self.dom.set_attribute(&root, "id", TOAST_ID);
        self.dom.add_class(&root, "notify");
        self.dom.set_attribute(&root, "role", "status");
        self.dom.set_attribute(&root, "aria-live", "polite");
        self.dom.set_attribute(&root, "aria-atomic", "true");

        let icon = self.dom.create_element("span")?;
        self.dom.add_class(&icon, "notify-icon");
        self.dom.set_text(&icon, SUCCESS_ICON);
        let text = self.dom.create_element("p")?;
        self.dom.add_class(&text, "notify-text");
        let close = self.dom.create_element("button")?;
        self.dom.add_class(&close, "notify-close");
        self.dom.set_attribute(&close, "aria-label", &self.close_label);
        self.dom.set_text(&close, "×");

        for child in [&icon, &text, &close] {
            self.dom.append_child(&root, child);
        }
        self.dom.append_child(&body, &root);
        debug!("Created #{TOAST_ID}");
        Some(root)
    }
}
