//! Keyboard operability and labels for generic interactive elements.

use std::rc::Rc;

use crate::bootstrap::Enhancement;
use crate::config::EnhanceConfig;
use crate::dom::{handler, Dom, EventKind, ListenTarget};
use crate::types::{EnhanceError, EnhanceResult};

/// Label used when a button has neither text, label nor title.
pub const FALLBACK_LABEL: &str = "Button";

/// Set on elements whose key handler is attached, so a later pass skips them.
pub const KEYS_WIRED_ATTRIBUTE: &str = "data-keys-wired";

/// Whether a key activates a `role="button"` element. `"Spacebar"` is the
/// legacy name some browsers report for the space key.
pub fn activation_key(key: &str) -> Option<ActivationKey> {
    match key {
        "Enter" => Some(ActivationKey::Enter),
        " " | "Spacebar" => Some(ActivationKey::Space),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKey {
    Enter,
    /// Space also scrolls the page unless its default is suppressed.
    Space,
}

pub struct AccessibilityAugmenter {
    role_selector: String,
    labelled_selector: String,
}

impl AccessibilityAugmenter {
    pub const NAME: &'static str = "accessibility";

    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            role_selector: config.selectors.role_buttons.clone(),
            labelled_selector: config.selectors.labelled_buttons.clone(),
        }
    }

    fn make_keyboard_operable<D: Dom + 'static>(&self, dom: &Rc<D>, elements: Vec<D::Element>) {
        for el in elements {
            if dom.attribute(&el, KEYS_WIRED_ATTRIBUTE).is_some() {
                continue;
            }
            dom.set_attribute(&el, KEYS_WIRED_ATTRIBUTE, "");
            if dom.attribute(&el, "tabindex").is_none() {
                dom.set_attribute(&el, "tabindex", "0");
            }

            let d = dom.clone();
            let target = el.clone();
            dom.listen(
                ListenTarget::Element(el),
                EventKind::KeyDown,
                handler(move |event| {
                    if event.target.as_ref() != Some(&target) {
                        return;
                    }
                    match event.key.as_deref().and_then(activation_key) {
                        Some(ActivationKey::Enter) => d.click(&target),
                        Some(ActivationKey::Space) => {
                            event.prevent_default();
                            d.click(&target);
                        }
                        None => {}
                    }
                }),
            );
        }
    }

    fn label_buttons<D: Dom>(&self, dom: &D, buttons: Vec<D::Element>) {
        for button in buttons {
            let has_text = !dom.text(&button).trim().is_empty();
            let has_label = dom
                .attribute(&button, "aria-label")
                .is_some_and(|l| !l.trim().is_empty());
            if has_text || has_label {
                continue;
            }

            let label = dom
                .attribute(&button, "title")
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_LABEL.to_string());
            dom.set_attribute(&button, "aria-label", &label);
        }
    }
}

impl<D: Dom + 'static> Enhancement<D> for AccessibilityAugmenter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()> {
        let role_buttons = dom.query_all(&self.role_selector);
        let labelled = dom.query_all(&self.labelled_selector);
        if role_buttons.is_empty() && labelled.is_empty() {
            return Err(EnhanceError::missing(
                Self::NAME,
                format!("{}, {}", self.role_selector, self.labelled_selector),
            ));
        }

        tracing::debug!(
            "Augmenting {} role buttons and {} call-to-action buttons",
            role_buttons.len(),
            labelled.len()
        );
        self.make_keyboard_operable(dom, role_buttons);
        self.label_buttons(&**dom, labelled);
        Ok(())
    }
}
