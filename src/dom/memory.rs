//! An in-memory element tree implementing [`Dom`].
//!
//! There are no text nodes: every node is an element with its own text, and
//! `text()` concatenates a subtree the way `textContent` does. Layout values,
//! viewport state and visibility are set by hand and events are dispatched with
//! [`MemoryDom::click`], [`MemoryDom::submit`], [`MemoryDom::scroll_to`] and
//! [`MemoryDom::intersect`].
//!
//! Selectors are matched by `scraper`: the tree is rendered to markup with every
//! element tagged by its arena index, parsed, and the matches mapped back. Text is
//! not rendered, and void elements such as `img` drop any children they were given.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use log::warn;
use scraper::{ElementRef, Html, Selector};

use super::{Click, ClickHandler, Dom, ObserveOptions};

/// Attribute carrying a node's arena index through the rendered markup.
const NODE_ATTR: &str = "data-memory-node";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    offset_top: f64,
    offset_height: f64,
}

impl NodeData {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

type SharedClick = Rc<RefCell<ClickHandler<NodeId>>>;
type SharedVisible = Rc<RefCell<Box<dyn FnMut(NodeId)>>>;

struct Observer {
    pending: Vec<NodeId>,
    options: ObserveOptions,
    on_visible: SharedVisible,
}

struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    click_handlers: HashMap<NodeId, Vec<SharedClick>>,
    document_click: Vec<SharedClick>,
    submit_handlers: HashMap<NodeId, Vec<Rc<RefCell<Box<dyn FnMut()>>>>>,
    scroll_handlers: Vec<Rc<RefCell<Box<dyn FnMut(f64)>>>>,
    observers: Vec<Observer>,
    observers_supported: bool,
    scroll_y: f64,
    inner_width: f64,
    location_path: String,
    scroll_requests: Vec<f64>,
    layout_reads: usize,
}

impl Tree {
    fn alloc(&mut self, tag: &str) -> NodeId {
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.node(node).parent {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    fn descendants(&self, start: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.node(start).children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }

    fn text_of(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        out.push_str(&node.text);
        for child in &node.children {
            self.text_of(*child, out);
        }
    }

    fn siblings_after(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let children = &self.node(parent).children;
        let index = children.iter().position(|c| *c == id)?;
        children.get(index + 1).copied()
    }

    fn top(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    fn render(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        let _ = write!(out, "<{} {NODE_ATTR}=\"{}\"", node.tag, id.0);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attr(&node.classes.join(" ")));
        }
        for (name, value) in &node.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&node.tag.as_str()) {
            return;
        }
        for child in &node.children {
            self.render(*child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }

    /// Parses the whole tree `id` belongs to: the document, or a detached subtree.
    fn snapshot(&self, id: NodeId) -> Html {
        let top = self.top(id);
        let mut markup = String::new();
        self.render(top, &mut markup);
        if top == self.root {
            Html::parse_document(&format!("<!DOCTYPE html>{markup}"))
        } else {
            Html::parse_fragment(&markup)
        }
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn parse_selector(selector: &str) -> Option<Selector> {
    Selector::parse(selector)
        .map_err(|e| warn!("Bad selector {selector}: {e:?}"))
        .ok()
}

fn node_id(element: ElementRef<'_>) -> Option<NodeId> {
    element.value().attr(NODE_ATTR)?.parse().ok().map(NodeId)
}

fn find(html: &Html, id: NodeId) -> Option<ElementRef<'_>> {
    let marker = Selector::parse(&format!("[{NODE_ATTR}=\"{}\"]", id.0)).ok()?;
    let found = html.select(&marker).next();
    found
}

#[derive(Clone)]
pub struct MemoryDom {
    tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document: `<html><head></head><body></body></html>`.
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            click_handlers: HashMap::new(),
            document_click: Vec::new(),
            submit_handlers: HashMap::new(),
            scroll_handlers: Vec::new(),
            observers: Vec::new(),
            observers_supported: true,
            scroll_y: 0.0,
            inner_width: 1280.0,
            location_path: "/".to_string(),
            scroll_requests: Vec::new(),
            layout_reads: 0,
        };
        let root = tree.alloc("html");
        let head = tree.alloc("head");
        let body = tree.alloc("body");
        for child in [head, body] {
            tree.node_mut(child).parent = Some(root);
            tree.node_mut(root).children.push(child);
        }
        tree.root = root;
        tree.head = head;
        tree.body = body;
        Self {
            tree: Rc::new(RefCell::new(tree)),
        }
    }

    /// Appends `<tag class="classes">` to `parent`.
    pub fn append(&self, parent: NodeId, tag: &str, classes: &str) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = tree.alloc(tag);
        tree.node_mut(id).classes = classes.split_whitespace().map(str::to_string).collect();
        tree.node_mut(id).parent = Some(parent);
        tree.node_mut(parent).children.push(id);
        id
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).parent
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).tag.clone()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(node)
            .style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    pub fn set_layout(&self, node: NodeId, offset_top: f64, offset_height: f64) {
        let mut tree = self.tree.borrow_mut();
        let data = tree.node_mut(node);
        data.offset_top = offset_top;
        data.offset_height = offset_height;
    }

    pub fn set_inner_width(&self, width: f64) {
        self.tree.borrow_mut().inner_width = width;
    }

    pub fn set_location_path(&self, path: &str) {
        self.tree.borrow_mut().location_path = path.to_string();
    }

    pub fn set_observers_supported(&self, supported: bool) {
        self.tree.borrow_mut().observers_supported = supported;
    }

    /// Smooth-scroll targets requested so far.
    pub fn scroll_requests(&self) -> Vec<f64> {
        self.tree.borrow().scroll_requests.clone()
    }

    /// Number of `offset_height` reads, i.e. forced layouts.
    pub fn layout_reads(&self) -> usize {
        self.tree.borrow().layout_reads
    }

    pub fn count(&self, selector: &str) -> usize {
        self.query_all(None, selector).len()
    }

    /// Nodes still waiting on a visibility observer.
    pub fn observed(&self) -> Vec<NodeId> {
        self.tree
            .borrow()
            .observers
            .iter()
            .flat_map(|o| o.pending.iter().copied())
            .collect()
    }

    /// Threshold of the observer watching `node`, if any.
    pub fn observer_options(&self, node: NodeId) -> Option<ObserveOptions> {
        self.tree
            .borrow()
            .observers
            .iter()
            .find(|o| o.pending.contains(&node))
            .map(|o| o.options.clone())
    }

    /// Dispatches a bubbling click at `node`. Returns whether a handler prevented
    /// the default action.
    pub fn click(&self, node: NodeId) -> bool {
        let mut path = vec![node];
        let handlers: Vec<SharedClick> = {
            let tree = self.tree.borrow();
            let mut current = node;
            while let Some(parent) = tree.node(current).parent {
                path.push(parent);
                current = parent;
            }
            path.iter()
                .flat_map(|n| tree.click_handlers.get(n).cloned().unwrap_or_default())
                .chain(tree.document_click.iter().cloned())
                .collect()
        };
        let mut click = Click::new(Some(node));
        for handler in handlers {
            (*handler.borrow_mut())(&mut click);
        }
        click.default_prevented()
    }

    pub fn submit(&self, form: NodeId) {
        let handlers = self
            .tree
            .borrow()
            .submit_handlers
            .get(&form)
            .cloned()
            .unwrap_or_default();
        for handler in handlers {
            (*handler.borrow_mut())();
        }
    }

    /// Moves the viewport and fires scroll listeners.
    pub fn scroll_to(&self, y: f64) {
        let handlers = {
            let mut tree = self.tree.borrow_mut();
            tree.scroll_y = y;
            tree.scroll_handlers.clone()
        };
        for handler in handlers {
            (*handler.borrow_mut())(y);
        }
    }

    /// Brings `node` into view, firing every observer still watching it.
    pub fn intersect(&self, node: NodeId) {
        let callbacks: Vec<SharedVisible> = {
            let mut tree = self.tree.borrow_mut();
            tree.observers
                .iter_mut()
                .filter(|o| o.pending.contains(&node))
                .map(|o| {
                    o.pending.retain(|n| *n != node);
                    o.on_visible.clone()
                })
                .collect()
        };
        for callback in callbacks {
            (*callback.borrow_mut())(node);
        }
    }

    fn matching(&self, scope: Option<&NodeId>, selector: &str) -> Vec<NodeId> {
        let Some(selector) = parse_selector(selector) else {
            return Vec::new();
        };
        let tree = self.tree.borrow();
        match scope {
            Some(scope) => {
                let html = tree.snapshot(*scope);
                let Some(scope) = find(&html, *scope) else {
                    return Vec::new();
                };
                let found: Vec<NodeId> = scope.select(&selector).filter_map(node_id).collect();
                found
            }
            None => {
                let html = tree.snapshot(tree.root);
                let found: Vec<NodeId> = html.select(&selector).filter_map(node_id).collect();
                found
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn query(&self, scope: Option<&NodeId>, selector: &str) -> Option<NodeId> {
        self.matching(scope, selector).into_iter().next()
    }

    fn query_all(&self, scope: Option<&NodeId>, selector: &str) -> Vec<NodeId> {
        self.matching(scope, selector)
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let mut all = vec![tree.root];
        tree.descendants(tree.root, &mut all);
        all.into_iter()
            .find(|n| tree.node(*n).attribute("id") == Some(id))
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let selector = parse_selector(selector)?;
        let html = self.tree.borrow().snapshot(*node);
        let start = find(&html, *node)?;
        let found = std::iter::once(start)
            .chain(start.ancestors().filter_map(ElementRef::wrap))
            .find(|element| selector.matches(element))
            .and_then(node_id);
        found
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(*node).children.clone()
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow().node(*node).children.first().copied()
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow().siblings_after(*node)
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.tree.borrow().head)
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.tree.borrow().body)
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.tree.borrow_mut().alloc(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(&self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
        let mut tree = self.tree.borrow_mut();
        if parent == child || tree.is_ancestor(*child, *parent) {
            warn!("refusing to insert {child:?} into its own subtree");
            return;
        }
        if reference == Some(child) {
            return;
        }
        tree.detach(*child);
        let children = &tree.node(*parent).children;
        let index = reference
            .and_then(|r| children.iter().position(|c| c == r))
            .unwrap_or(children.len());
        tree.node_mut(*parent).children.insert(index, *child);
        tree.node_mut(*child).parent = Some(*parent);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.tree.borrow().node(*node).has_class(class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        let data = tree.node_mut(*node);
        if !data.has_class(class) {
            data.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*node)
            .classes
            .retain(|c| c != class);
    }

    fn toggle_class(&self, node: &NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        if name == "class" {
            let classes = self.tree.borrow().node(*node).classes.join(" ");
            return Some(classes).filter(|c| !c.is_empty());
        }
        self.tree
            .borrow()
            .node(*node)
            .attribute(name)
            .map(str::to_string)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        if name == "class" {
            tree.node_mut(*node).classes = value.split_whitespace().map(str::to_string).collect();
            return;
        }
        let attrs = &mut tree.node_mut(*node).attrs;
        match attrs.iter().position(|(n, _)| n == name) {
            Some(i) => attrs[i].1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*node)
            .attrs
            .retain(|(n, _)| n != name);
    }

    fn text(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.tree.borrow().text_of(*node, &mut out);
        out
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        let mut tree = self.tree.borrow_mut();
        let children = std::mem::take(&mut tree.node_mut(*node).children);
        for child in children {
            tree.node_mut(child).parent = None;
        }
        tree.node_mut(*node).text = text.to_string();
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let style = &mut tree.node_mut(*node).style;
        style.retain(|(p, _)| p != property);
        if !value.is_empty() {
            style.push((property.to_string(), value.to_string()));
        }
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.tree.borrow().node(*node).offset_top
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        let mut tree = self.tree.borrow_mut();
        tree.layout_reads += 1;
        tree.node(*node).offset_height
    }

    fn on_click(&self, node: &NodeId, handler: ClickHandler<NodeId>) {
        self.tree
            .borrow_mut()
            .click_handlers
            .entry(*node)
            .or_default()
            .push(Rc::new(RefCell::new(handler)));
    }

    fn on_document_click(&self, handler: ClickHandler<NodeId>) {
        self.tree
            .borrow_mut()
            .document_click
            .push(Rc::new(RefCell::new(handler)));
    }

    fn on_submit(&self, form: &NodeId, handler: Box<dyn FnMut()>) {
        self.tree
            .borrow_mut()
            .submit_handlers
            .entry(*form)
            .or_default()
            .push(Rc::new(RefCell::new(handler)));
    }

    fn on_scroll(&self, handler: Box<dyn FnMut(f64)>) {
        self.tree
            .borrow_mut()
            .scroll_handlers
            .push(Rc::new(RefCell::new(handler)));
    }

    fn scroll_y(&self) -> f64 {
        self.tree.borrow().scroll_y
    }

    fn inner_width(&self) -> f64 {
        self.tree.borrow().inner_width
    }

    fn location_path(&self) -> String {
        self.tree.borrow().location_path.clone()
    }

    fn scroll_to_smooth(&self, top: f64) {
        self.tree.borrow_mut().scroll_requests.push(top);
    }

    fn observe_once(
        &self,
        nodes: Vec<NodeId>,
        options: ObserveOptions,
        on_visible: Box<dyn FnMut(NodeId)>,
    ) -> bool {
        let mut tree = self.tree.borrow_mut();
        if !tree.observers_supported {
            return false;
        }
        tree.observers.push(Observer {
            pending: nodes,
            options,
            on_visible: Rc::new(RefCell::new(on_visible)),
        });
        true
    }

    fn form_fields(&self, form: &NodeId) -> Vec<(String, String)> {
        let tree = self.tree.borrow();
        let mut all = Vec::new();
        tree.descendants(*form, &mut all);
        all.into_iter()
            .filter_map(|n| {
                let data = tree.node(n);
                let name = data.attribute("name")?;
                Some((name.to_string(), data.attribute("value").unwrap_or("").to_string()))
            })
            .collect()
    }

    fn reset_form(&self, form: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        let mut all = Vec::new();
        tree.descendants(*form, &mut all);
        for n in all {
            let data = tree.node_mut(n);
            if data.attribute("name").is_some() {
                data.attrs.retain(|(name, _)| name != "value");
            }
        }
    }
}
