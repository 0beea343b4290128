//! Floating scroll-to-top button.
//!
//! Visibility is recomputed at most once per animation frame: scroll events
//! only schedule a recomputation when none is pending.

use std::cell::Cell;
use std::rc::Rc;

use crate::bootstrap::Enhancement;
use crate::config::EnhanceConfig;
use crate::dom::{handler, Dom, EventKind, ListenTarget, ScrollBehavior};
use crate::types::{EnhanceError, EnhanceResult};

pub const BUTTON_LABEL: &str = "Scroll to top";
pub const BUTTON_TITLE: &str = "Back to top";
const BUTTON_GLYPH: &str = "\u{2191}";

/// Whether the button should show at scroll offset `scroll_y`.
pub fn should_show(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

pub struct ScrollTopController {
    threshold: f64,
    button_class: String,
    visible_class: String,
}

impl ScrollTopController {
    pub const NAME: &'static str = "scroll_top";

    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            threshold: config.scroll_threshold,
            button_class: config.classes.scroll_top.clone(),
            visible_class: config.classes.visible.clone(),
        }
    }
}

/// `visible` and `ticking` for the one button on the page.
#[derive(Debug, Default)]
pub struct ScrollButtonState {
    visible: Cell<bool>,
    ticking: Cell<bool>,
}

impl ScrollButtonState {
    pub fn visible(&self) -> bool {
        self.visible.get()
    }

    /// Whether a recomputation is queued for the next frame.
    pub fn ticking(&self) -> bool {
        self.ticking.get()
    }
}

struct ScrollMonitor<D: Dom> {
    dom: Rc<D>,
    button: D::Element,
    threshold: f64,
    visible_class: String,
    state: ScrollButtonState,
}

impl<D: Dom + 'static> ScrollMonitor<D> {
    fn on_scroll(self: &Rc<Self>) {
        if self.state.ticking.replace(true) {
            return;
        }
        let monitor = self.clone();
        self.dom.request_frame(Box::new(move || monitor.update()));
    }

    fn update(&self) {
        let visible = should_show(self.dom.scroll_y(), self.threshold);
        self.dom
            .toggle_class(&self.button, &self.visible_class, visible);
        self.state.visible.set(visible);
        self.state.ticking.set(false);
    }
}

impl ScrollTopController {
    fn build_button<D: Dom>(&self, dom: &D) -> D::Element {
        let button = dom.create_element("button");
        dom.set_attribute(&button, "type", "button");
        dom.add_class(&button, &self.button_class);
        dom.set_attribute(&button, "aria-label", BUTTON_LABEL);
        dom.set_attribute(&button, "title", BUTTON_TITLE);
        dom.set_text(&button, BUTTON_GLYPH);
        button
    }
}

impl<D: Dom + 'static> Enhancement<D> for ScrollTopController {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()> {
        let body = dom
            .body()
            .ok_or_else(|| EnhanceError::missing(Self::NAME, "body"))?;

        let button = self.build_button(&**dom);
        dom.append_child(&body, &button);

        let d = dom.clone();
        dom.listen(
            ListenTarget::Element(button.clone()),
            EventKind::Click,
            handler(move |_| d.scroll_to_top(ScrollBehavior::Smooth)),
        );

        let monitor = Rc::new(ScrollMonitor {
            dom: dom.clone(),
            button,
            threshold: self.threshold,
            visible_class: self.visible_class.clone(),
            state: ScrollButtonState::default(),
        });
        monitor.update();

        dom.listen(
            ListenTarget::Window,
            EventKind::Scroll,
            handler(move |_| monitor.on_scroll()),
        );

        tracing::debug!("Scroll-to-top button added (threshold {}px)", self.threshold);
        Ok(())
    }
}
