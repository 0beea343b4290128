//! In-memory document implementing [`Dom`].
//!
//! `MemoryDom` keeps the parsed `scraper::Html` tree as its element store
//! and matches selectors with `scraper::Selector`, adding a virtual clock,
//! a frame queue, bubbling event dispatch and scriptable viewport
//! intersection. It lets every feature module run without a browser:
//! build a page from HTML, initialize modules against it, then drive it
//! with [`MemoryDom::click`], [`MemoryDom::advance`],
//! [`MemoryDom::set_in_view`] and friends.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node, Selector};

use crate::dom::{
    Callback, Dom, DomEvent, EventKind, Handler, IntersectionCallback, IntersectionEntry,
    ListenTarget, ObserverOptions, ReadyState, ScrollAlign, ScrollBehavior, TimerId, Timers,
    ViewportObserver,
};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Handle to an element of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(NodeId);

/// Live state of a form control, separate from its markup defaults.
#[derive(Debug, Clone, Default)]
struct ControlState {
    value: String,
    default_value: String,
    checked: bool,
    default_checked: bool,
}

impl ControlState {
    fn new(value: &str, checked: bool) -> Self {
        Self {
            value: value.to_string(),
            default_value: value.to_string(),
            checked,
            default_checked: checked,
        }
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Selector {selector:?} matches nothing: {e}");
            None
        }
    }
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

fn put_attribute(attrs: &mut Vec<Attribute>, name: &str, value: &str) {
    let value = StrTendril::from_slice(value);
    match attrs.iter_mut().find(|a| &*a.name.local == name) {
        Some(existing) => existing.value = value,
        None => attrs.push(Attribute {
            name: attribute_name(name),
            value,
        }),
    }
}

struct Listener {
    target: ListenTarget<NodeRef>,
    kind: EventKind,
    handler: Handler<NodeRef>,
}

struct PendingTimer {
    id: TimerId,
    due: f64,
    callback: Callback,
}

struct ObserverSlot {
    options: ObserverOptions,
    callback: IntersectionCallback<NodeRef>,
    watched: Vec<NodeRef>,
}

/// Observer handle given out by [`MemoryDom::intersection_observer`].
#[derive(Clone)]
pub struct MemoryObserver(Rc<RefCell<ObserverSlot>>);

impl ViewportObserver<NodeRef> for MemoryObserver {
    fn observe(&self, element: &NodeRef) {
        let mut slot = self.0.borrow_mut();
        if !slot.watched.contains(element) {
            slot.watched.push(*element);
        }
    }

    fn unobserve(&self, element: &NodeRef) {
        self.0.borrow_mut().watched.retain(|e| e != element);
    }

    fn disconnect(&self) {
        self.0.borrow_mut().watched.clear();
    }
}

struct Inner {
    html: Html,
    controls: HashMap<NodeId, ControlState>,
    ready_state: ReadyState,
    ready_callbacks: Vec<Callback>,
    listeners: Vec<Listener>,
    now_ms: f64,
    next_timer: u64,
    timers: Vec<PendingTimer>,
    frames: Vec<Callback>,
    observers: Vec<Rc<RefCell<ObserverSlot>>>,
    intersection_supported: bool,
    scroll_y: f64,
    location_path: String,
    focused: Option<NodeRef>,
    scroll_into_view_log: Vec<(NodeRef, ScrollBehavior, ScrollAlign)>,
    scroll_to_top_log: Vec<ScrollBehavior>,
    attribute_writes: Vec<(NodeRef, String, String)>,
    navigations: Vec<String>,
    native_submissions: usize,
}

impl Inner {
    fn new(html: Html) -> Self {
        let controls = control_defaults(&html);
        Self {
            html,
            controls,
            ready_state: ReadyState::Complete,
            ready_callbacks: Vec::new(),
            listeners: Vec::new(),
            now_ms: 0.0,
            next_timer: 1,
            timers: Vec::new(),
            frames: Vec::new(),
            observers: Vec::new(),
            intersection_supported: true,
            scroll_y: 0.0,
            location_path: "/".to_string(),
            focused: None,
            scroll_into_view_log: Vec::new(),
            scroll_to_top_log: Vec::new(),
            attribute_writes: Vec::new(),
            navigations: Vec::new(),
            native_submissions: 0,
        }
    }

    fn document(&self) -> NodeId {
        self.html.tree.root().id()
    }

    fn element(&self, node: NodeRef) -> Option<ElementRef<'_>> {
        self.html.tree.get(node.0).and_then(ElementRef::wrap)
    }

    fn attr(&self, node: NodeRef, name: &str) -> Option<&str> {
        self.element(node)?.value().attr(name)
    }

    fn tag(&self, node: NodeRef) -> &str {
        self.element(node).map_or("", |el| el.value().name())
    }

    fn is_checkable(&self, node: NodeRef) -> bool {
        self.tag(node) == "input" && matches!(self.attr(node, "type"), Some("checkbox" | "radio"))
    }

    /// Elements below `scope` matching `selector`, in document order.
    fn select(&self, scope: NodeId, selector: &str) -> Vec<NodeRef> {
        let (Some(selector), Some(root)) = (parse_selector(selector), self.html.tree.get(scope))
        else {
            return Vec::new();
        };
        root.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| NodeRef(el.id()))
            .collect()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeRef, node: NodeRef) -> bool {
        std::iter::successors(self.html.tree.get(node.0), |n| n.parent())
            .any(|n| n.id() == ancestor.0)
    }

    fn text_content(&self, node: NodeRef) -> String {
        self.element(node)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    /// Rewrite an element's attributes. `Element` caches its id and class
    /// list, so the element is rebuilt rather than edited in place.
    fn edit_attributes(&mut self, node: NodeRef, edit: impl FnOnce(&mut Vec<Attribute>)) {
        let Some(mut handle) = self.html.tree.get_mut(node.0) else {
            return;
        };
        if let Node::Element(element) = handle.value() {
            let mut attrs: Vec<Attribute> = element
                .attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect();
            edit(&mut attrs);
            let name = element.name.clone();
            *element = Element::new(name, attrs);
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(mut handle) = self.html.tree.get_mut(node) {
            handle.detach();
        }
    }

    /// Path an event bubbles along, from the target up to the window.
    fn propagation_path(&self, target: Option<NodeRef>) -> Vec<ListenTarget<NodeRef>> {
        let mut path = Vec::new();
        let start = target.and_then(|t| self.html.tree.get(t.0));
        for hop in std::iter::successors(start, |n| n.parent()) {
            if hop.value().is_document() {
                path.push(ListenTarget::Document);
            } else if hop.value().is_element() {
                path.push(ListenTarget::Element(NodeRef(hop.id())));
            }
        }
        path.push(ListenTarget::Window);
        path
    }
}

/// Initial value and checkedness of every form control in parsed markup.
fn control_defaults(html: &Html) -> HashMap<NodeId, ControlState> {
    html.tree
        .nodes()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| {
            let element = el.value();
            let state = match element.name() {
                "input" => ControlState::new(
                    element.attr("value").unwrap_or_default(),
                    element.attr("checked").is_some(),
                ),
                "textarea" => ControlState::new(&el.text().collect::<String>(), false),
                "select" => ControlState::default(),
                _ => return None,
            };
            Some((el.id(), state))
        })
        .collect()
}

/// In-memory page. Construct with [`MemoryDom::new`] or
/// [`MemoryDom::from_html`]; both hand back an `Rc` ready to share with
/// feature modules.
pub struct MemoryDom {
    inner: RefCell<Inner>,
}

impl MemoryDom {
    /// An empty, fully loaded page with `<html>`, `<head>` and `<body>`.
    pub fn new() -> Rc<Self> {
        Self::from_html("")
    }

    /// Build a fully loaded page from HTML markup.
    pub fn from_html(html: &str) -> Rc<Self> {
        Rc::new(Self {
            inner: RefCell::new(Inner::new(Html::parse_document(html))),
        })
    }

    // ── lifecycle ─────────────────────────

    /// Put the document back into the loading phase.
    pub fn begin_loading(&self) {
        self.inner.borrow_mut().ready_state = ReadyState::Loading;
    }

    /// Finish parsing: become interactive and fire structural-ready callbacks.
    pub fn finish_loading(&self) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.ready_state = ReadyState::Interactive;
            std::mem::take(&mut inner.ready_callbacks)
        };
        for callback in callbacks {
            callback();
        }
    }

    // ── time ──────────────────────────────

    /// Move the virtual clock forward, firing due timers in deadline order.
    pub fn advance(&self, ms: u32) {
        let target = self.now_ms() + f64::from(ms);
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by(|(_, a), (_, b)| {
                        a.due
                            .partial_cmp(&b.due)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then(a.id.cmp(&b.id))
                    })
                    .map(|(i, _)| i);
                due.map(|i| {
                    let timer = inner.timers.remove(i);
                    inner.now_ms = inner.now_ms.max(timer.due);
                    timer.callback
                })
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.inner.borrow_mut().now_ms = target;
    }

    /// Run every frame callback queued so far. Callbacks requested while
    /// running land in the next frame.
    pub fn run_frame(&self) {
        let frames = std::mem::take(&mut self.inner.borrow_mut().frames);
        for callback in frames {
            callback();
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    // ── user input ────────────────────────

    /// Dispatch an event, bubbling from `target` through its ancestors to
    /// the document and window. Returns whether the default was prevented.
    pub fn dispatch(&self, event: DomEvent<NodeRef>) -> bool {
        let kind = event.kind;
        let handlers: Vec<Handler<NodeRef>> = {
            let inner = self.inner.borrow();
            inner
                .propagation_path(event.target)
                .iter()
                .flat_map(|hop| {
                    inner
                        .listeners
                        .iter()
                        .filter(move |l| l.kind == kind && &l.target == hop)
                        .map(|l| l.handler.clone())
                })
                .collect()
        };

        for handler in handlers {
            handler(&event);
        }
        event.default_prevented()
    }

    /// Press a key with focus on `target`, or on `<body>` when `None`.
    pub fn press_key(&self, target: Option<&NodeRef>, key: &str) -> bool {
        let target = target.copied().or_else(|| self.body());
        self.dispatch(DomEvent::new(EventKind::KeyDown, target).with_key(key))
    }

    /// Submit a form the way pressing its submit button would.
    pub fn submit(&self, form: &NodeRef) -> bool {
        let prevented = self.dispatch(DomEvent::new(EventKind::Submit, Some(*form)));
        if !prevented {
            self.inner.borrow_mut().native_submissions += 1;
        }
        prevented
    }

    /// Set a form control's current value, as typing would.
    pub fn set_value(&self, element: &NodeRef, value: &str) {
        self.inner
            .borrow_mut()
            .controls
            .entry(element.0)
            .or_default()
            .value = value.to_string();
    }

    /// Scroll the page and fire a window `scroll` event.
    pub fn scroll_to(&self, y: f64) {
        self.inner.borrow_mut().scroll_y = y;
        self.dispatch(DomEvent::new(EventKind::Scroll, None));
    }

    pub fn set_location_path(&self, path: &str) {
        self.inner.borrow_mut().location_path = path.to_string();
    }

    /// Same-page fragment navigation: fires a window `hashchange` event.
    pub fn navigate_hash(&self) {
        self.dispatch(DomEvent::new(EventKind::HashChange, None));
    }

    // ── viewport ──────────────────────────

    pub fn set_intersection_supported(&self, supported: bool) {
        self.inner.borrow_mut().intersection_supported = supported;
    }

    /// Notify every observer watching `element` that it entered or left
    /// the viewport.
    pub fn set_in_view(&self, element: &NodeRef, visible: bool) {
        let entry = IntersectionEntry {
            target: *element,
            is_intersecting: visible,
            ratio: if visible { 1.0 } else { 0.0 },
        };
        self.deliver(std::slice::from_ref(&entry));
    }

    /// Deliver one batch of entries, possibly naming an element more than
    /// once. Each observer receives the entries for elements it watches.
    pub fn deliver(&self, entries: &[IntersectionEntry<NodeRef>]) {
        let slots = self.inner.borrow().observers.clone();
        for slot in slots {
            let (callback, batch) = {
                let s = slot.borrow();
                let batch: Vec<_> = entries
                    .iter()
                    .filter(|e| s.watched.contains(&e.target))
                    .cloned()
                    .collect();
                (s.callback.clone(), batch)
            };
            if !batch.is_empty() {
                let observer = MemoryObserver(slot.clone());
                callback(batch.as_slice(), &observer as &dyn ViewportObserver<NodeRef>);
            }
        }
    }

    pub fn is_observed(&self, element: &NodeRef) -> bool {
        self.inner
            .borrow()
            .observers
            .iter()
            .any(|slot| slot.borrow().watched.contains(element))
    }

    /// Options of every observer created so far, in creation order.
    pub fn observer_options(&self) -> Vec<ObserverOptions> {
        self.inner
            .borrow()
            .observers
            .iter()
            .map(|slot| slot.borrow().options)
            .collect()
    }

    // ── inspection ────────────────────────

    pub fn focused(&self) -> Option<NodeRef> {
        self.inner.borrow().focused
    }

    pub fn scroll_into_view_log(&self) -> Vec<(NodeRef, ScrollBehavior, ScrollAlign)> {
        self.inner.borrow().scroll_into_view_log.clone()
    }

    pub fn scroll_to_top_log(&self) -> Vec<ScrollBehavior> {
        self.inner.borrow().scroll_to_top_log.clone()
    }

    /// Number of `set_attribute(element, name, _)` calls so far.
    pub fn attribute_writes(&self, element: &NodeRef, name: &str) -> usize {
        self.inner
            .borrow()
            .attribute_writes
            .iter()
            .filter(|(e, n, _)| e == element && n == name)
            .count()
    }

    /// Hrefs of links whose default navigation was not prevented.
    pub fn navigations(&self) -> Vec<String> {
        self.inner.borrow().navigations.clone()
    }

    /// Submissions whose default was not prevented.
    pub fn native_submissions(&self) -> usize {
        self.inner.borrow().native_submissions
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl Timers for MemoryDom {
    fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    fn set_timeout(&self, delay_ms: u32, callback: Callback) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_timer);
        inner.next_timer += 1;
        let due = inner.now_ms + f64::from(delay_ms);
        inner.timers.push(PendingTimer { id, due, callback });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.inner.borrow_mut().timers.retain(|t| t.id != id);
    }

    fn request_frame(&self, callback: Callback) {
        self.inner.borrow_mut().frames.push(callback);
    }
}

impl Dom for MemoryDom {
    type Element = NodeRef;

    fn ready_state(&self) -> ReadyState {
        self.inner.borrow().ready_state
    }

    fn on_ready(&self, callback: Callback) {
        self.inner.borrow_mut().ready_callbacks.push(callback);
    }

    fn query(&self, selector: &str) -> Option<NodeRef> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeRef> {
        let inner = self.inner.borrow();
        inner.select(inner.document(), selector)
    }

    fn query_within(&self, root: &NodeRef, selector: &str) -> Option<NodeRef> {
        self.query_all_within(root, selector).into_iter().next()
    }

    fn query_all_within(&self, root: &NodeRef, selector: &str) -> Vec<NodeRef> {
        self.inner.borrow().select(root.0, selector)
    }

    fn closest(&self, element: &NodeRef, selector: &str) -> Option<NodeRef> {
        let inner = self.inner.borrow();
        let selector = parse_selector(selector)?;
        std::iter::successors(inner.html.tree.get(element.0), |n| n.parent())
            .filter_map(ElementRef::wrap)
            .find(|el| selector.matches(el))
            .map(|el| NodeRef(el.id()))
    }

    fn matches(&self, element: &NodeRef, selector: &str) -> bool {
        let inner = self.inner.borrow();
        match (parse_selector(selector), inner.element(*element)) {
            (Some(selector), Some(el)) => selector.matches(&el),
            _ => false,
        }
    }

    fn contains(&self, ancestor: &NodeRef, node: &NodeRef) -> bool {
        self.inner.borrow().is_ancestor_or_self(*ancestor, *node)
    }

    fn body(&self) -> Option<NodeRef> {
        self.query("body")
    }

    fn create_element(&self, tag: &str) -> NodeRef {
        let name = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(tag.to_ascii_lowercase()),
        );
        let mut inner = self.inner.borrow_mut();
        let id = inner
            .html
            .tree
            .orphan(Node::Element(Element::new(name, Vec::new())))
            .id();
        if is_form_control(&tag.to_ascii_lowercase()) {
            inner.controls.insert(id, ControlState::default());
        }
        NodeRef(id)
    }

    fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
        let mut inner = self.inner.borrow_mut();
        if inner.is_ancestor_or_self(*child, *parent) {
            return;
        }
        if let Some(mut handle) = inner.html.tree.get_mut(parent.0) {
            handle.append_id(child.0);
        }
    }

    fn insert_after(&self, anchor: &NodeRef, node: &NodeRef) {
        let mut inner = self.inner.borrow_mut();
        let has_parent = inner
            .html
            .tree
            .get(anchor.0)
            .is_some_and(|a| a.parent().is_some());
        if !has_parent || inner.is_ancestor_or_self(*node, *anchor) {
            return;
        }
        if let Some(mut handle) = inner.html.tree.get_mut(anchor.0) {
            handle.insert_id_after(node.0);
        }
    }

    fn next_element_sibling(&self, element: &NodeRef) -> Option<NodeRef> {
        let inner = self.inner.borrow();
        inner
            .html
            .tree
            .get(element.0)?
            .next_siblings()
            .find(|n| n.value().is_element())
            .map(|n| NodeRef(n.id()))
    }

    fn remove(&self, element: &NodeRef) {
        self.inner.borrow_mut().detach(element.0);
    }

    fn attribute(&self, element: &NodeRef, name: &str) -> Option<String> {
        self.inner.borrow().attr(*element, name).map(str::to_string)
    }

    fn set_attribute(&self, element: &NodeRef, name: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.edit_attributes(*element, |attrs| put_attribute(attrs, name, value));
        inner
            .attribute_writes
            .push((*element, name.to_string(), value.to_string()));
    }

    fn remove_attribute(&self, element: &NodeRef, name: &str) {
        self.inner
            .borrow_mut()
            .edit_attributes(*element, |attrs| attrs.retain(|a| &*a.name.local != name));
    }

    fn has_class(&self, element: &NodeRef, class: &str) -> bool {
        self.inner
            .borrow()
            .attr(*element, "class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    fn add_class(&self, element: &NodeRef, class: &str) {
        if self.has_class(element, class) {
            return;
        }
        let mut inner = self.inner.borrow_mut();
        let updated = match inner.attr(*element, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        inner.edit_attributes(*element, |attrs| put_attribute(attrs, "class", &updated));
    }

    fn remove_class(&self, element: &NodeRef, class: &str) {
        let mut inner = self.inner.borrow_mut();
        let Some(existing) = inner.attr(*element, "class") else {
            return;
        };
        let updated = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        inner.edit_attributes(*element, |attrs| put_attribute(attrs, "class", &updated));
    }

    fn text(&self, element: &NodeRef) -> String {
        self.inner.borrow().text_content(*element)
    }

    fn set_text(&self, element: &NodeRef, text: &str) {
        let mut inner = self.inner.borrow_mut();
        let children: Vec<NodeId> = inner
            .html
            .tree
            .get(element.0)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default();
        for child in children {
            inner.detach(child);
        }
        if text.is_empty() {
            return;
        }
        if let Some(mut handle) = inner.html.tree.get_mut(element.0) {
            handle.append(Node::Text(Text {
                text: StrTendril::from_slice(text),
            }));
        }
    }

    fn value(&self, element: &NodeRef) -> String {
        let inner = self.inner.borrow();
        if !is_form_control(inner.tag(*element)) {
            return String::new();
        }
        inner
            .controls
            .get(&element.0)
            .map(|state| state.value.clone())
            .unwrap_or_default()
    }

    fn checked(&self, element: &NodeRef) -> bool {
        self.inner
            .borrow()
            .controls
            .get(&element.0)
            .is_some_and(|state| state.checked)
    }

    fn set_checked(&self, element: &NodeRef, checked: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.is_checkable(*element) {
            inner.controls.entry(element.0).or_default().checked = checked;
        }
    }

    fn is_disabled(&self, element: &NodeRef) -> bool {
        self.inner.borrow().attr(*element, "disabled").is_some()
    }

    fn set_disabled(&self, element: &NodeRef, disabled: bool) {
        self.inner.borrow_mut().edit_attributes(*element, |attrs| {
            if disabled {
                put_attribute(attrs, "disabled", "");
            } else {
                attrs.retain(|a| &*a.name.local != "disabled");
            }
        });
    }

    fn reset_form(&self, form: &NodeRef) {
        let mut inner = self.inner.borrow_mut();
        let fields: Vec<NodeId> = match inner.html.tree.get(form.0) {
            Some(root) => root.descendants().skip(1).map(|n| n.id()).collect(),
            None => return,
        };
        for id in fields {
            if let Some(state) = inner.controls.get_mut(&id) {
                state.value = state.default_value.clone();
                state.checked = state.default_checked;
            }
        }
    }

    fn focus(&self, element: &NodeRef) {
        self.inner.borrow_mut().focused = Some(*element);
    }

    fn click(&self, element: &NodeRef) {
        if self.is_disabled(element) {
            return;
        }

        // Checkboxes flip before listeners run and flip back if the click
        // is cancelled.
        let checkable = self.inner.borrow().is_checkable(*element);
        let was_checked = self.checked(element);
        if checkable {
            self.set_checked(element, !was_checked);
        }

        if self.dispatch(DomEvent::new(EventKind::Click, Some(*element))) {
            if checkable {
                self.set_checked(element, was_checked);
            }
            return;
        }

        if checkable {
            self.dispatch(DomEvent::new(EventKind::Change, Some(*element)));
            return;
        }

        if let Some(link) = self.closest(element, "a[href]") {
            if let Some(href) = self.attribute(&link, "href") {
                self.inner.borrow_mut().navigations.push(href);
            }
            return;
        }

        let is_submit = self.matches(element, "button, input[type=\"submit\"]")
            && self.attribute(element, "type").as_deref().unwrap_or("submit") == "submit";
        if is_submit {
            if let Some(form) = self.closest(element, "form") {
                self.submit(&form);
            }
        }
    }

    fn scroll_into_view(&self, element: &NodeRef, behavior: ScrollBehavior, align: ScrollAlign) {
        self.inner
            .borrow_mut()
            .scroll_into_view_log
            .push((*element, behavior, align));
    }

    fn scroll_to_top(&self, behavior: ScrollBehavior) {
        self.inner.borrow_mut().scroll_to_top_log.push(behavior);
        self.scroll_to(0.0);
    }

    fn scroll_y(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    fn location_path(&self) -> String {
        self.inner.borrow().location_path.clone()
    }

    fn listen(&self, target: ListenTarget<NodeRef>, kind: EventKind, handler: Handler<NodeRef>) {
        self.inner.borrow_mut().listeners.push(Listener {
            target,
            kind,
            handler,
        });
    }

    fn intersection_observer(
        &self,
        options: ObserverOptions,
        callback: IntersectionCallback<NodeRef>,
    ) -> Option<Rc<dyn ViewportObserver<NodeRef>>> {
        let mut inner = self.inner.borrow_mut();
        if !inner.intersection_supported {
            return None;
        }
        let slot = Rc::new(RefCell::new(ObserverSlot {
            options,
            callback,
            watched: Vec::new(),
        }));
        inner.observers.push(slot.clone());
        Some(Rc::new(MemoryObserver(slot)))
    }
}
