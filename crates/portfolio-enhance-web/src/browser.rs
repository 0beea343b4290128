//! `Dom` over the live browser document via web-sys.
//!
//! Listeners and observer callbacks live for the rest of the page, so their
//! closures are handed to JS and forgotten.

use std::rc::Rc;

use anyhow::Context;
use js_sys::Array;
use portfolio_enhance::config::CONFIG_BLOCK_SELECTOR;
use portfolio_enhance::dom::{
    Callback, DomEvent, EventKind, Handler, IntersectionCallback, IntersectionEntry, ListenTarget,
    ObserverOptions, ReadyState, ScrollAlign, ScrollBehavior, TimerId, Timers, ViewportObserver,
};
use portfolio_enhance::Dom;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement,
    HtmlFormElement, HtmlInputElement, HtmlTextAreaElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, NodeList,
    ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::logging;

/// Log a failed DOM call instead of propagating it; the modules treat
/// every mutation as best-effort.
fn report<T>(op: &str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{op} failed: {e:?}");
            None
        }
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn web_behavior(behavior: ScrollBehavior) -> web_sys::ScrollBehavior {
    match behavior {
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
    }
}

fn web_align(align: ScrollAlign) -> ScrollLogicalPosition {
    match align {
        ScrollAlign::Start => ScrollLogicalPosition::Start,
        ScrollAlign::Center => ScrollLogicalPosition::Center,
        ScrollAlign::End => ScrollLogicalPosition::End,
        ScrollAlign::Nearest => ScrollLogicalPosition::Nearest,
    }
}

pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    pub fn new() -> anyhow::Result<Rc<Self>> {
        let window = web_sys::window().context("no global window")?;
        let document = window.document().context("window has no document")?;
        Ok(Rc::new(Self { window, document }))
    }

    fn event_target(&self, target: &ListenTarget<Element>) -> EventTarget {
        match target {
            ListenTarget::Window => self.window.clone().into(),
            ListenTarget::Document => self.document.clone().into(),
            ListenTarget::Element(el) => el.clone().into(),
        }
    }

    fn supports_intersection_observer(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }
}

impl Timers for BrowserDom {
    fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_timeout(&self, delay_ms: u32, callback: Callback) -> TimerId {
        let closure = Closure::once_into_js(move || callback());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle = report(
            "setTimeout",
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), delay),
        );
        TimerId(handle.map_or(0, |h| h as u64))
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Ok(handle) = i32::try_from(id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn request_frame(&self, callback: Callback) {
        let closure = Closure::once_into_js(move |_timestamp: f64| callback());
        report(
            "requestAnimationFrame",
            self.window.request_animation_frame(closure.unchecked_ref()),
        );
    }
}

impl Dom for BrowserDom {
    type Element = Element;

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_document(&self.document.ready_state())
    }

    fn on_ready(&self, callback: Callback) {
        let closure = Closure::once_into_js(move || callback());
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        report(
            "addEventListener(DOMContentLoaded)",
            self.document
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "DOMContentLoaded",
                    closure.unchecked_ref(),
                    &options,
                ),
        );
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Option<Element> {
        root.query_selector(selector).ok().flatten()
    }

    fn query_all_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        root.query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn closest(&self, element: &Element, selector: &str) -> Option<Element> {
        element.closest(selector).ok().flatten()
    }

    fn matches(&self, element: &Element, selector: &str) -> bool {
        element.matches(selector).unwrap_or(false)
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &web_sys::Node = node;
        ancestor.contains(Some(node))
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn create_element(&self, tag: &str) -> Element {
        self.document
            .create_element(tag)
            .expect("module tag names are valid")
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        report("appendChild", parent.append_child(child));
    }

    fn insert_after(&self, anchor: &Element, node: &Element) {
        report("after", anchor.after_with_node_1(node));
    }

    fn next_element_sibling(&self, element: &Element) -> Option<Element> {
        element.next_element_sibling()
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        report("setAttribute", element.set_attribute(name, value));
    }

    fn remove_attribute(&self, element: &Element, name: &str) {
        report("removeAttribute", element.remove_attribute(name));
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        report("classList.add", element.class_list().add_1(class));
    }

    fn remove_class(&self, element: &Element, class: &str) {
        report("classList.remove", element.class_list().remove_1(class));
    }

    fn toggle_class(&self, element: &Element, class: &str, force: bool) {
        report(
            "classList.toggle",
            element.class_list().toggle_with_force(class, force),
        );
    }

    fn text(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn value(&self, element: &Element) -> String {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn checked(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(|input| input.checked())
    }

    fn set_checked(&self, element: &Element, checked: bool) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn is_disabled(&self, element: &Element) -> bool {
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.disabled()
        } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.disabled()
        } else {
            element.has_attribute("disabled")
        }
    }

    fn set_disabled(&self, element: &Element, disabled: bool) {
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        } else if disabled {
            self.set_attribute(element, "disabled", "");
        } else {
            self.remove_attribute(element, "disabled");
        }
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn focus(&self, element: &Element) {
        if let Some(el) = element.dyn_ref::<HtmlElement>() {
            report("focus", el.focus());
        }
    }

    fn click(&self, element: &Element) {
        if let Some(el) = element.dyn_ref::<HtmlElement>() {
            el.click();
        }
    }

    fn scroll_into_view(&self, element: &Element, behavior: ScrollBehavior, align: ScrollAlign) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(web_behavior(behavior));
        options.set_block(web_align(align));
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn scroll_to_top(&self, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(web_behavior(behavior));
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn location_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn listen(&self, target: ListenTarget<Element>, kind: EventKind, handler: Handler<Element>) {
        let closure = Closure::<dyn Fn(Event)>::new(move |event: Event| {
            let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
            let mut dom_event = DomEvent::new(kind, target);
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                dom_event = dom_event.with_key(key.key());
            }
            handler(&dom_event);
            if dom_event.default_prevented() {
                event.prevent_default();
            }
        });

        report(
            kind.as_str(),
            self.event_target(&target)
                .add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref()),
        );
        closure.forget();
    }

    fn intersection_observer(
        &self,
        options: ObserverOptions,
        callback: IntersectionCallback<Element>,
    ) -> Option<Rc<dyn ViewportObserver<Element>>> {
        if !self.supports_intersection_observer() {
            return None;
        }

        let closure = Closure::<dyn Fn(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                let entries: Vec<IntersectionEntry<Element>> = entries
                    .iter()
                    .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|e| IntersectionEntry {
                        target: e.target(),
                        is_intersecting: e.is_intersecting(),
                        ratio: e.intersection_ratio(),
                    })
                    .collect();
                let observer = BrowserObserver(observer);
                callback(entries.as_slice(), &observer as &dyn ViewportObserver<Element>);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin());
        init.set_threshold(&JsValue::from_f64(options.threshold));

        let observer = report(
            "IntersectionObserver",
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init),
        )?;
        closure.forget();
        Some(Rc::new(BrowserObserver(observer)))
    }
}

struct BrowserObserver(IntersectionObserver);

impl ViewportObserver<Element> for BrowserObserver {
    fn observe(&self, element: &Element) {
        self.0.observe(element);
    }

    fn unobserve(&self, element: &Element) {
        self.0.unobserve(element);
    }

    fn disconnect(&self) {
        self.0.disconnect();
    }
}

fn console_sink(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

/// Module entry: install console logging, then boot the enhancements.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let dom = BrowserDom::new().map_err(|e| JsValue::from_str(&e.to_string()))?;

    let config_json = dom.query(CONFIG_BLOCK_SELECTOR).map(|block| dom.text(&block));
    let directive = logging::log_directive(config_json.as_deref());
    if let Err(e) = logging::init(&directive, console_sink) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("{e:#}")));
    }

    portfolio_enhance::start(dom);
    Ok(())
}
