//! The small slice of the DOM the page behaviors need.
//!
//! Everything in this crate is written against [`Dom`] so the same code runs on the
//! real document ([`browser::BrowserDom`]) and on an in-memory element tree
//! (`memory::MemoryDom`, behind the `test-dom` feature) in tests.

pub mod browser;
#[cfg(feature = "test-dom")]
pub mod memory;

/// A click as seen by a handler. Handlers call [`Click::prevent_default`] instead of
/// touching the underlying browser event.
#[derive(Debug, Clone)]
pub struct Click<N> {
    pub target: Option<N>,
    default_prevented: bool,
}

impl<N> Click<N> {
    pub fn new(target: Option<N>) -> Self {
        Self {
            target,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type ClickHandler<N> = Box<dyn FnMut(&mut Click<N>)>;

/// Options for a one-shot visibility observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    pub threshold: f64,
    pub root_margin: Option<&'static str>,
}

impl ObserveOptions {
    pub fn threshold(threshold: f64) -> Self {
        Self {
            threshold,
            root_margin: None,
        }
    }

    pub fn with_root_margin(mut self, margin: &'static str) -> Self {
        self.root_margin = Some(margin);
        self
    }
}

pub trait Dom: Clone + 'static {
    type Node: Clone + PartialEq + std::fmt::Debug + 'static;

    // Tree queries. `scope = None` searches the whole document.
    fn query(&self, scope: Option<&Self::Node>, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, scope: Option<&Self::Node>, selector: &str) -> Vec<Self::Node>;
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    /// The node itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn head(&self) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;

    // Tree mutation. Inserting a node that already has a parent moves it.
    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    /// Returns whether the class is present afterwards.
    fn toggle_class(&self, node: &Self::Node, class: &str) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, node: &Self::Node, name: &str);
    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);

    /// Sets an inline style property. An empty value clears it.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn offset_top(&self, node: &Self::Node) -> f64;
    /// Reading this forces layout in a browser.
    fn offset_height(&self, node: &Self::Node) -> f64;

    // Events
    fn on_click(&self, node: &Self::Node, handler: ClickHandler<Self::Node>);
    fn on_document_click(&self, handler: ClickHandler<Self::Node>);
    /// The default submit action is always prevented.
    fn on_submit(&self, form: &Self::Node, handler: Box<dyn FnMut()>);
    fn on_scroll(&self, handler: Box<dyn FnMut(f64)>);

    // Viewport
    fn scroll_y(&self) -> f64;
    fn inner_width(&self) -> f64;
    fn location_path(&self) -> String;
    fn scroll_to_smooth(&self, top: f64);
    /// Calls `on_visible` once per node the first time it enters the viewport.
    /// Returns `false` when the platform has no visibility observer.
    fn observe_once(
        &self,
        nodes: Vec<Self::Node>,
        options: ObserveOptions,
        on_visible: Box<dyn FnMut(Self::Node)>,
    ) -> bool;

    // Forms
    fn form_fields(&self, form: &Self::Node) -> Vec<(String, String)>;
    fn reset_form(&self, form: &Self::Node);
}
