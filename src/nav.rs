//! Site header: mobile menu, dropdowns, scroll styling, in-page anchors and the
//! active link for the current page.

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{Click, Dom};

const ACTIVE: &str = "active";
const SCROLLED: &str = "scrolled";

#[derive(Clone)]
pub struct Navigation<D: Dom> {
    dom: D,
    header: Option<D::Node>,
    nav: Option<D::Node>,
    toggle: Option<D::Node>,
    mobile_breakpoint: f64,
    scroll_threshold: f64,
    anchor_offset: f64,
}

impl<D: Dom> Navigation<D> {
    pub fn new(dom: D, config: &SiteConfig) -> Self {
        Self {
            header: dom.query(None, ".header"),
            nav: dom.query(None, ".nav"),
            toggle: dom.query(None, ".mobile-toggle"),
            dom,
            mobile_breakpoint: config.mobile_breakpoint,
            scroll_threshold: config.header_scroll_threshold,
            anchor_offset: config.anchor_offset,
        }
    }

    pub fn init(dom: D, config: &SiteConfig) -> Self {
        let navigation = Self::new(dom, config);
        navigation.bind_mobile_menu();
        navigation.bind_dropdowns();
        navigation.bind_outside_click();
        navigation.bind_header_scroll();
        navigation.bind_anchors();
        navigation.mark_active_links();
        navigation
    }

    pub fn toggle_menu(&self) {
        if let Some(toggle) = &self.toggle {
            self.dom.toggle_class(toggle, ACTIVE);
        }
        if let Some(nav) = &self.nav {
            self.dom.toggle_class(nav, ACTIVE);
        }
    }

    pub fn close_menu(&self) {
        if let Some(nav) = &self.nav {
            self.dom.remove_class(nav, ACTIVE);
        }
        if let Some(toggle) = &self.toggle {
            self.dom.remove_class(toggle, ACTIVE);
        }
    }

    pub fn update_header(&self, scroll_y: f64) {
        let Some(header) = &self.header else { return };
        if scroll_y > self.scroll_threshold {
            self.dom.add_class(header, SCROLLED);
        } else {
            self.dom.remove_class(header, SCROLLED);
        }
    }

    /// Where an in-page target lands so it is not hidden under the fixed header.
    pub fn anchor_position(&self, target: &D::Node) -> f64 {
        let header_height = self
            .header
            .as_ref()
            .map_or(0.0, |h| self.dom.offset_height(h));
        self.dom.offset_top(target) - header_height - self.anchor_offset
    }

    fn bind_mobile_menu(&self) {
        let Some(toggle) = &self.toggle else { return };
        let this = self.clone();
        self.dom.on_click(
            toggle,
            Box::new(move |_: &mut Click<D::Node>| this.toggle_menu()),
        );
    }

    fn bind_dropdowns(&self) {
        for dropdown in self.dom.query_all(None, ".nav-dropdown") {
            let Some(link) = self.dom.query(Some(&dropdown), ".nav-link") else {
                continue;
            };
            let dom = self.dom.clone();
            let breakpoint = self.mobile_breakpoint;
            self.dom.on_click(
                &link,
                Box::new(move |click: &mut Click<D::Node>| {
                    if dom.inner_width() <= breakpoint {
                        click.prevent_default();
                        dom.toggle_class(&dropdown, ACTIVE);
                    }
                }),
            );
        }
    }

    fn bind_outside_click(&self) {
        let this = self.clone();
        self.dom.on_document_click(Box::new(move |click: &mut Click<D::Node>| {
            let inside_header = click
                .target
                .as_ref()
                .is_some_and(|target| this.dom.closest(target, ".header").is_some());
            if !inside_header {
                this.close_menu();
            }
        }));
    }

    fn bind_header_scroll(&self) {
        self.update_header(self.dom.scroll_y());
        let this = self.clone();
        self.dom
            .on_scroll(Box::new(move |scroll_y| this.update_header(scroll_y)));
    }

    fn bind_anchors(&self) {
        for anchor in self.dom.query_all(None, r##"a[href^="#"]"##) {
            let this = self.clone();
            let link = anchor.clone();
            self.dom.on_click(
                &anchor,
                Box::new(move |click: &mut Click<D::Node>| {
                    let Some(href) = this.dom.attribute(&link, "href") else {
                        return;
                    };
                    if href == "#" {
                        return;
                    }
                    click.prevent_default();
                    let Some(target) = this.dom.query(None, &href) else {
                        debug!("No target for anchor {href}");
                        return;
                    };
                    this.dom.scroll_to_smooth(this.anchor_position(&target));
                    this.close_menu();
                }),
            );
        }
    }

    /// Marks links pointing at the current page, including the parent link of a
    /// matching dropdown entry.
    pub fn mark_active_links(&self) {
        let page = current_page(&self.dom.location_path());

        for link in self.dom.query_all(None, ".nav-link") {
            if self.dom.attribute(&link, "href").as_deref() == Some(page.as_str()) {
                self.dom.add_class(&link, ACTIVE);
            }
        }

        for item in self.dom.query_all(None, ".nav-dropdown-item") {
            if self.dom.attribute(&item, "href").as_deref() != Some(page.as_str()) {
                continue;
            }
            self.dom.add_class(&item, ACTIVE);
            let parent_link = self
                .dom
                .closest(&item, ".nav-dropdown")
                .and_then(|dropdown| self.dom.query(Some(&dropdown), ".nav-link"));
            if let Some(link) = parent_link {
                self.dom.add_class(&link, ACTIVE);
            }
        }
    }
}

/// Last path segment, or `index.html` for a directory path.
pub fn current_page(path: &str) -> String {
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => "index.html".to_string(),
    }
}
