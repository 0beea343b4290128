//! DOM capability surface.
//!
//! Defines the `Timers` and `Dom` traits every feature module is written
//! against. The browser implementation lives in the web crate; the
//! in-memory one in [`crate::memory`] drives the tests. Execution is
//! single-threaded and event-driven, so handles are `Rc` and nothing here is
//! `Send`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A one-shot deferred callback.
pub type Callback = Box<dyn FnOnce()>;

/// Event handler attached with [`Dom::listen`].
pub type Handler<E> = Rc<dyn Fn(&DomEvent<E>)>;

/// Intersection callback: the batch of entries plus the observer that
/// produced them, so a handler can unobserve what it has dealt with.
pub type IntersectionCallback<E> = Rc<dyn Fn(&[IntersectionEntry<E>], &dyn ViewportObserver<E>)>;

/// Wrap a closure as an event [`Handler`].
pub fn handler<E, F>(f: F) -> Handler<E>
where
    F: Fn(&DomEvent<E>) + 'static,
{
    Rc::new(f)
}

/// Wrap a closure as an [`IntersectionCallback`].
pub fn intersection_callback<E, F>(f: F) -> IntersectionCallback<E>
where
    F: Fn(&[IntersectionEntry<E>], &dyn ViewportObserver<E>) + 'static,
{
    Rc::new(f)
}

/// Identifier of a pending timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Clock and scheduling capabilities.
pub trait Timers {
    /// Milliseconds on a monotonic clock.
    fn now_ms(&self) -> f64;
    /// Run `callback` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u32, callback: Callback) -> TimerId;
    /// Cancel a pending timeout. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
    /// Run `callback` once before the next repaint.
    fn request_frame(&self, callback: Callback);
}

/// Document loading phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Map `document.readyState`. Unknown values count as complete.
    pub fn from_document(state: &str) -> Self {
        match state {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }
}

/// Events the enhancement layer listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Submit,
    KeyDown,
    Scroll,
    HashChange,
}

impl EventKind {
    /// The DOM event type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Submit => "submit",
            EventKind::KeyDown => "keydown",
            EventKind::Scroll => "scroll",
            EventKind::HashChange => "hashchange",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenTarget<E> {
    Window,
    Document,
    Element(E),
}

/// A dispatched event as seen by a handler.
#[derive(Debug)]
pub struct DomEvent<E> {
    pub kind: EventKind,
    /// The element the event was dispatched at, if any.
    pub target: Option<E>,
    /// `KeyboardEvent.key` for key events.
    pub key: Option<String>,
    default_prevented: Cell<bool>,
}

impl<E> DomEvent<E> {
    pub fn new(kind: EventKind, target: Option<E>) -> Self {
        Self {
            kind,
            target,
            key: None,
            default_prevented: Cell::new(false),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Suppress the browser's default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    Nearest,
}

/// Options for a viewport-intersection observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Pre-trigger margin around the viewport, in CSS pixels.
    pub root_margin_px: u32,
    /// Fraction of the element that must be visible, in `[0.0, 1.0]`.
    pub threshold: f64,
}

impl ObserverOptions {
    /// The `rootMargin` string form, e.g. `"50px"`.
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

/// One intersection notification.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// A live viewport-intersection observer.
pub trait ViewportObserver<E> {
    fn observe(&self, element: &E);
    fn unobserve(&self, element: &E);
    fn disconnect(&self);
}

/// Everything the feature modules need from a page.
///
/// Lookups that miss, and selectors the engine cannot parse, resolve to
/// `None` or an empty list. Setters on elements of the wrong kind (say,
/// `set_checked` on a `div`) are no-ops.
pub trait Dom: Timers {
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    // ── lifecycle ─────────────────────────
    fn ready_state(&self) -> ReadyState;
    /// Run `callback` once the element tree is parsed.
    fn on_ready(&self, callback: Callback);

    // ── lookup ────────────────────────────
    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn query_within(&self, root: &Self::Element, selector: &str) -> Option<Self::Element>;
    fn query_all_within(&self, root: &Self::Element, selector: &str) -> Vec<Self::Element>;
    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, element: &Self::Element, selector: &str) -> Option<Self::Element>;
    fn matches(&self, element: &Self::Element, selector: &str) -> bool;
    /// Inclusive containment: an element contains itself.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;
    fn body(&self) -> Option<Self::Element>;

    // ── tree mutation ─────────────────────
    fn create_element(&self, tag: &str) -> Self::Element;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);
    fn insert_after(&self, anchor: &Self::Element, node: &Self::Element);
    fn next_element_sibling(&self, element: &Self::Element) -> Option<Self::Element>;
    fn remove(&self, element: &Self::Element);

    // ── attributes, classes, text ─────────
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&self, element: &Self::Element, name: &str);
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);
    fn toggle_class(&self, element: &Self::Element, class: &str, force: bool) {
        if force {
            self.add_class(element, class);
        } else {
            self.remove_class(element, class);
        }
    }
    fn text(&self, element: &Self::Element) -> String;
    fn set_text(&self, element: &Self::Element, text: &str);

    // ── form controls ─────────────────────
    fn value(&self, element: &Self::Element) -> String;
    fn checked(&self, element: &Self::Element) -> bool;
    fn set_checked(&self, element: &Self::Element, checked: bool);
    fn is_disabled(&self, element: &Self::Element) -> bool;
    fn set_disabled(&self, element: &Self::Element, disabled: bool);
    fn reset_form(&self, form: &Self::Element);

    // ── behaviour ─────────────────────────
    fn focus(&self, element: &Self::Element);
    /// Activate the element's default action, as a user click would.
    fn click(&self, element: &Self::Element);
    fn scroll_into_view(&self, element: &Self::Element, behavior: ScrollBehavior, align: ScrollAlign);
    fn scroll_to_top(&self, behavior: ScrollBehavior);
    /// Vertical scroll offset of the page.
    fn scroll_y(&self) -> f64;
    /// `location.pathname`.
    fn location_path(&self) -> String;

    // ── events ────────────────────────────
    fn listen(&self, target: ListenTarget<Self::Element>, kind: EventKind, handler: Handler<Self::Element>);

    /// Create an intersection observer, or `None` when the capability is
    /// absent.
    fn intersection_observer(
        &self,
        options: ObserverOptions,
        callback: IntersectionCallback<Self::Element>,
    ) -> Option<Rc<dyn ViewportObserver<Self::Element>>>;
}
