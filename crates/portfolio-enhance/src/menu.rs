//! Mobile navigation menu.
//!
//! The menu is a checkbox toggle plus a nav container. The checkbox's
//! `checked` flag is the source of truth; the container's active class
//! mirrors it at all times.

use std::rc::Rc;

use crate::bootstrap::Enhancement;
use crate::config::EnhanceConfig;
use crate::dom::{handler, Dom, EventKind, ListenTarget};
use crate::types::{EnhanceError, EnhanceResult};

pub struct MobileMenuController {
    toggle_selector: String,
    nav_selector: String,
    link_selector: String,
    active_class: String,
}

impl MobileMenuController {
    pub const NAME: &'static str = "mobile_menu";

    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            toggle_selector: config.selectors.menu_toggle.clone(),
            nav_selector: config.selectors.nav_menu.clone(),
            link_selector: config.selectors.nav_links.clone(),
            active_class: config.classes.active.clone(),
        }
    }
}

/// The wired-up toggle/container pair.
struct Menu<D: Dom> {
    dom: Rc<D>,
    toggle: D::Element,
    nav: D::Element,
    active_class: String,
}

impl<D: Dom> Menu<D> {
    fn is_open(&self) -> bool {
        self.dom.checked(&self.toggle)
    }

    fn set_open(&self, open: bool) {
        self.dom.set_checked(&self.toggle, open);
        self.dom.toggle_class(&self.nav, &self.active_class, open);
    }

    /// Mirror the toggle onto the container.
    fn sync(&self) {
        self.dom
            .toggle_class(&self.nav, &self.active_class, self.is_open());
    }

    fn close(&self) {
        self.set_open(false);
    }

    /// Whether a click on `target` landed outside both the menu and its toggle.
    fn is_outside(&self, target: &D::Element) -> bool {
        !self.dom.contains(&self.nav, target) && !self.dom.contains(&self.toggle, target)
    }
}

impl<D: Dom + 'static> Enhancement<D> for MobileMenuController {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()> {
        let toggle = dom
            .query(&self.toggle_selector)
            .ok_or_else(|| EnhanceError::missing(Self::NAME, &self.toggle_selector))?;
        let nav = dom
            .query(&self.nav_selector)
            .ok_or_else(|| EnhanceError::missing(Self::NAME, &self.nav_selector))?;

        let menu = Rc::new(Menu {
            dom: dom.clone(),
            toggle: toggle.clone(),
            nav: nav.clone(),
            active_class: self.active_class.clone(),
        });
        menu.sync();

        let m = menu.clone();
        dom.listen(
            ListenTarget::Element(toggle),
            EventKind::Change,
            handler(move |_| m.sync()),
        );

        // One delegated listener for every link in the menu.
        let m = menu.clone();
        let links = self.link_selector.clone();
        dom.listen(
            ListenTarget::Element(nav),
            EventKind::Click,
            handler(move |event| {
                let on_link = event
                    .target
                    .as_ref()
                    .is_some_and(|t| m.dom.closest(t, &links).is_some());
                if on_link {
                    m.close();
                }
            }),
        );

        let m = menu.clone();
        dom.listen(
            ListenTarget::Document,
            EventKind::Click,
            handler(move |event| {
                let Some(target) = &event.target else {
                    return;
                };
                if m.is_open() && m.is_outside(target) {
                    m.close();
                }
            }),
        );

        let m = menu;
        dom.listen(
            ListenTarget::Document,
            EventKind::KeyDown,
            handler(move |event| {
                if event.key.as_deref() == Some("Escape") && m.is_open() {
                    m.close();
                }
            }),
        );

        tracing::debug!("Mobile menu wired");
        Ok(())
    }
}
