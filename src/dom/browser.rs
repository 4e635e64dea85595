use js_sys::Array;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MouseEvent, NodeList, ScrollBehavior, ScrollToOptions, Window,
};

use super::{Click, ClickHandler, Dom, ObserveOptions};

/// [`Dom`] over the live document. Listeners are leaked on purpose: they live as
/// long as the page.
#[derive(Clone, Debug)]
pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn listen<E: JsCast + 'static>(
        &self,
        target: &web_sys::EventTarget,
        event: &str,
        mut handler: impl FnMut(E) + 'static,
    ) {
        let callback = Closure::wrap(Box::new(move |e: Event| {
            if let Ok(e) = e.dyn_into::<E>() {
                handler(e);
            }
        }) as Box<dyn FnMut(Event)>);
        if let Err(e) =
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        {
            warn!("Failed to listen for {event}: {e:?}");
        }
        callback.forget();
    }

    fn html(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

fn elements(list: Result<NodeList, JsValue>, selector: &str) -> Vec<Element> {
    match list {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(e) => {
            warn!("Bad selector {selector}: {e:?}");
            Vec::new()
        }
    }
}

fn click_handler(mut handler: ClickHandler<Element>) -> impl FnMut(MouseEvent) + 'static {
    move |event: MouseEvent| {
        let target = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok());
        let mut click = Click::new(target);
        handler(&mut click);
        if click.default_prevented() {
            event.prevent_default();
        }
    }
}

impl Dom for BrowserDom {
    type Node = Element;

    fn query(&self, scope: Option<&Element>, selector: &str) -> Option<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector(selector),
            None => self.document.query_selector(selector),
        };
        found.unwrap_or_else(|e| {
            warn!("Bad selector {selector}: {e:?}");
            None
        })
    }

    fn query_all(&self, scope: Option<&Element>, selector: &str) -> Vec<Element> {
        let list = match scope {
            Some(scope) => scope.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        elements(list, selector)
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).unwrap_or_else(|e| {
            warn!("Bad selector {selector}: {e:?}");
            None
        })
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn first_child(&self, node: &Element) -> Option<Element> {
        node.first_element_child()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Into::into)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Into::into)
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document
            .create_element(tag)
            .map_err(|e| warn!("Failed to create <{tag}>: {e:?}"))
            .ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        if let Err(e) = parent.append_child(child) {
            warn!("append_child failed: {e:?}");
        }
    }

    fn insert_before(&self, parent: &Element, child: &Element, reference: Option<&Element>) {
        let reference: Option<&web_sys::Node> = reference.map(|r| r.as_ref());
        if let Err(e) = parent.insert_before(child, reference) {
            warn!("insert_before failed: {e:?}");
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn toggle_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().toggle(class).unwrap_or(false)
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            warn!("set_attribute({name}) failed: {e:?}");
        }
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(html) = Self::html(node) else { return };
        let style = html.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(e) = result {
            warn!("Failed to set {property}: {e:?}");
        }
    }

    fn offset_top(&self, node: &Element) -> f64 {
        Self::html(node).map_or(0.0, |h| f64::from(h.offset_top()))
    }

    fn offset_height(&self, node: &Element) -> f64 {
        Self::html(node).map_or(0.0, |h| f64::from(h.offset_height()))
    }

    fn on_click(&self, node: &Element, handler: ClickHandler<Element>) {
        self.listen(node, "click", click_handler(handler));
    }

    fn on_document_click(&self, handler: ClickHandler<Element>) {
        self.listen(&self.document, "click", click_handler(handler));
    }

    fn on_submit(&self, form: &Element, mut handler: Box<dyn FnMut()>) {
        self.listen(form, "submit", move |event: Event| {
            event.prevent_default();
            handler();
        });
    }

    fn on_scroll(&self, mut handler: Box<dyn FnMut(f64)>) {
        let window = self.window.clone();
        self.listen(&self.window, "scroll", move |_: Event| {
            handler(window.scroll_y().unwrap_or(0.0));
        });
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn location_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn scroll_to_smooth(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn observe_once(
        &self,
        nodes: Vec<Element>,
        options: ObserveOptions,
        mut on_visible: Box<dyn FnMut(Element)>,
    ) -> bool {
        let supported = js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        if !supported {
            return false;
        }

        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    let target = entry.target();
                    observer.unobserve(&target);
                    on_visible(target);
                }
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        if let Some(margin) = options.root_margin {
            init.set_root_margin(margin);
        }
        let observer = match IntersectionObserver::new_with_options(
            callback.as_ref().unchecked_ref(),
            &init,
        ) {
            Ok(observer) => observer,
            Err(e) => {
                warn!("IntersectionObserver unavailable: {e:?}");
                return false;
            }
        };
        callback.forget();

        for node in &nodes {
            observer.observe(node);
        }
        true
    }

    fn form_fields(&self, form: &Element) -> Vec<(String, String)> {
        self.query_all(Some(form), "input[name], textarea[name], select[name]")
            .into_iter()
            .filter_map(|field| {
                let name = field.get_attribute("name")?;
                let value = if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
                    let kind = input.type_();
                    if (kind == "checkbox" || kind == "radio") && !input.checked() {
                        return None;
                    }
                    input.value()
                } else if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
                    area.value()
                } else if let Some(select) = field.dyn_ref::<HtmlSelectElement>() {
                    select.value()
                } else {
                    return None;
                };
                Some((name, value))
            })
            .collect()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }
}

/// Exposes the form validators on `window` for inline scripts.
pub fn expose_validators(dom: &BrowserDom) {
    let email = Closure::wrap(
        Box::new(|value: String| crate::validation::validate_email(&value)) as Box<dyn Fn(String) -> bool>,
    );
    let phone = Closure::wrap(
        Box::new(|value: String| crate::validation::validate_phone(&value)) as Box<dyn Fn(String) -> bool>,
    );
    for (name, function) in [("validateEmail", email), ("validatePhone", phone)] {
        if let Err(e) = js_sys::Reflect::set(dom.window(), &JsValue::from_str(name), function.as_ref()) {
            warn!("Failed to expose {name}: {e:?}");
        }
        function.forget();
    }
}
