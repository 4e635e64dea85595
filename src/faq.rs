//! FAQ accordion.
//!
//! Two nested disclosures live on the page: categories (`.faq-category`, open when
//! they carry `section-active`) and the items inside them (`.faq-item`, open when
//! they carry `active`). The classes on the nodes are the only state. Every
//! transition keeps two invariants:
//!
//! * at most one category on the page is open;
//! * at most one item inside a category is open.
//!
//! Collapsing a category leaves its items alone, so an item that was open is still
//! open (just hidden) when the category is expanded again.

use log::{debug, info};

use crate::config::StaggerConfig;
use crate::dom::{Click, Dom};
use crate::timers::Scheduler;

const CATEGORY: &str = ".faq-category";
const OPEN_CATEGORIES: &str = ".faq-category.section-active";
const HEADER: &str = ".faq-category-header";
const TITLE: &str = ".faq-category-title";
const FALLBACK_TITLE: &str = "h2, h3, h4";
const CONTENT: &str = ".faq-category-content";
const ITEM: &str = ".faq-item";
const QUESTION: &str = ".faq-question";

const HEADER_CLASS: &str = "faq-category-header";
const CONTENT_CLASS: &str = "faq-category-content";
const ITEM_CLASS: &str = "faq-item";
const ICON_CLASS: &str = "category-icon";
const ICON_TEXT: &str = "▼";

pub const CATEGORY_OPEN: &str = "section-active";
pub const ITEM_OPEN: &str = "active";
/// Custom property carrying an item's position inside its category.
pub const INDEX_PROPERTY: &str = "--i";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryState {
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Closed,
    Open,
}

#[derive(Clone)]
pub struct Accordion<D: Dom, S: Scheduler> {
    dom: D,
    scheduler: S,
    stagger: StaggerConfig,
}

impl<D: Dom, S: Scheduler> Accordion<D, S> {
    pub fn new(dom: D, scheduler: S, stagger: StaggerConfig) -> Self {
        Self {
            dom,
            scheduler,
            stagger,
        }
    }

    /// Builds the structure, then wires the click handlers.
    pub fn init(dom: D, scheduler: S, stagger: StaggerConfig) -> Self {
        let accordion = Self::new(dom, scheduler, stagger);
        let categories = accordion.synthesize();
        accordion.bind();
        info!("FAQ accordion ready ({categories} categories)");
        accordion
    }

    pub fn categories(&self) -> Vec<D::Node> {
        self.dom.query_all(None, CATEGORY)
    }

    /// Items of `category` in document order.
    pub fn items(&self, category: &D::Node) -> Vec<D::Node> {
        self.dom.query_all(Some(category), ITEM)
    }

    pub fn category_state(&self, category: &D::Node) -> CategoryState {
        if self.dom.has_class(category, CATEGORY_OPEN) {
            CategoryState::Expanded
        } else {
            CategoryState::Collapsed
        }
    }

    pub fn item_state(&self, item: &D::Node) -> ItemState {
        if self.dom.has_class(item, ITEM_OPEN) {
            ItemState::Open
        } else {
            ItemState::Closed
        }
    }

    /// Gives every category a header and a content wrapper if the markup lacks
    /// them, and stamps item indices. Running it again changes nothing.
    /// Returns the number of categories seen.
    pub fn synthesize(&self) -> usize {
        let categories = self.categories();
        for category in &categories {
            self.synthesize_header(category);
            self.synthesize_content(category);
            self.stamp_indices(category);
        }
        categories.len()
    }

    fn title_of(&self, category: &D::Node) -> Option<D::Node> {
        self.dom.query(Some(category), TITLE).or_else(|| {
            // A heading inside an answer is not the category title.
            self.dom
                .query_all(Some(category), FALLBACK_TITLE)
                .into_iter()
                .find(|h| self.dom.closest(h, ITEM).is_none())
        })
    }

    fn synthesize_header(&self, category: &D::Node) {
        if self.dom.query(Some(category), HEADER).is_some() {
            return;
        }
        let Some(title) = self.title_of(category) else {
            return;
        };
        let (Some(header), Some(icon)) = (
            self.dom.create_element("div"),
            self.dom.create_element("span"),
        ) else {
            return;
        };
        self.dom.add_class(&header, HEADER_CLASS);
        self.dom.append_child(&header, &title);
        self.dom.add_class(&icon, ICON_CLASS);
        self.dom.set_text(&icon, ICON_TEXT);
        self.dom.append_child(&header, &icon);

        let first = self.dom.first_child(category);
        self.dom.insert_before(category, &header, first.as_ref());
        debug!("FAQ: built header for {category:?}");
    }

    fn synthesize_content(&self, category: &D::Node) {
        if self.dom.query(Some(category), CONTENT).is_some() {
            return;
        }
        let direct: Vec<D::Node> = self
            .dom
            .children(category)
            .into_iter()
            .filter(|child| self.dom.has_class(child, ITEM_CLASS))
            .collect();
        if direct.is_empty() {
            return;
        }
        let Some(content) = self.dom.create_element("div") else {
            return;
        };
        self.dom.add_class(&content, CONTENT_CLASS);
        for item in &direct {
            self.dom.append_child(&content, item);
        }

        let after = self
            .dom
            .children(category)
            .into_iter()
            .find(|child| self.dom.has_class(child, HEADER_CLASS))
            .and_then(|header| self.dom.next_sibling(&header));
        self.dom.insert_before(category, &content, after.as_ref());
        debug!("FAQ: wrapped {} items of {category:?}", direct.len());
    }

    fn stamp_indices(&self, category: &D::Node) {
        for (index, item) in self.items(category).iter().enumerate() {
            self.dom.set_style(item, INDEX_PROPERTY, &index.to_string());
        }
    }

    /// Header click: opens `category` and closes every other one, or closes it if
    /// it was already open.
    pub fn toggle_category(&self, category: &D::Node) -> CategoryState {
        let was_open = self.dom.has_class(category, CATEGORY_OPEN);

        for open in self.dom.query_all(None, OPEN_CATEGORIES) {
            if &open != category {
                self.dom.remove_class(&open, CATEGORY_OPEN);
            }
        }

        let state = if was_open {
            self.dom.remove_class(category, CATEGORY_OPEN);
            CategoryState::Collapsed
        } else {
            self.stamp_indices(category);
            self.dom.add_class(category, CATEGORY_OPEN);
            self.stagger_in(category);
            CategoryState::Expanded
        };

        debug_assert!(self.dom.query_all(None, OPEN_CATEGORIES).len() <= 1);
        state
    }

    /// Hides every item, then lets them settle one after another.
    fn stagger_in(&self, category: &D::Node) {
        for (index, item) in self.items(category).into_iter().enumerate() {
            self.dom.set_style(&item, "opacity", "0");
            self.dom.set_style(&item, "transform", "translateY(10px)");
            // Flush layout so the reset below transitions from the hidden state.
            self.dom.offset_height(&item);

            let dom = self.dom.clone();
            self.scheduler.defer(
                self.stagger.delay_for(index),
                Box::new(move || {
                    dom.set_style(&item, "opacity", "");
                    dom.set_style(&item, "transform", "");
                }),
            );
        }
    }

    /// Question click: opens `item` and closes its siblings, or closes it if it
    /// was open. An item outside any category just toggles.
    pub fn toggle_item(&self, item: &D::Node) -> ItemState {
        let was_open = self.dom.has_class(item, ITEM_OPEN);
        let category = self.dom.closest(item, CATEGORY);

        match &category {
            Some(category) => {
                for sibling in self.items(category) {
                    self.dom.remove_class(&sibling, ITEM_OPEN);
                }
            }
            None => self.dom.remove_class(item, ITEM_OPEN),
        }

        let state = if was_open {
            ItemState::Closed
        } else {
            self.dom.add_class(item, ITEM_OPEN);
            ItemState::Open
        };

        debug_assert!(category.map_or(true, |c| {
            self.items(&c)
                .iter()
                .filter(|i| self.dom.has_class(i, ITEM_OPEN))
                .count()
                <= 1
        }));
        state
    }

    /// Resolves the category owning a clicked header. `None` when the header sits
    /// outside any category.
    pub fn on_header_click(&self, header: &D::Node) -> Option<CategoryState> {
        let category = self.dom.closest(header, CATEGORY)?;
        Some(self.toggle_category(&category))
    }

    fn bind(&self) {
        for header in self.dom.query_all(None, HEADER) {
            let accordion = self.clone();
            let target = header.clone();
            self.dom.on_click(
                &header,
                Box::new(move |_: &mut Click<D::Node>| {
                    accordion.on_header_click(&target);
                }),
            );
        }

        for item in self.dom.query_all(None, ITEM) {
            let Some(question) = self.dom.query(Some(&item), QUESTION) else {
                continue;
            };
            let accordion = self.clone();
            self.dom.on_click(
                &question,
                Box::new(move |_: &mut Click<D::Node>| {
                    accordion.toggle_item(&item);
                }),
            );
        }
    }
}
