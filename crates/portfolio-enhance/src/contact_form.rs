//! Contact form validation and the simulated "sent" state.
//!
//! Submission never leaves the page: a valid form flips its submit button
//! to a confirmation label, then resets after a delay.

use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::bootstrap::Enhancement;
use crate::config::EnhanceConfig;
use crate::dom::{handler, Dom, EventKind, ListenTarget};
use crate::timing::ScheduledTask;
use crate::types::{EnhanceError, EnhanceResult, ValidationOutcome};

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email";
pub const MESSAGE_REQUIRED: &str = "Message is required";

const EMAIL_FIELD_SELECTOR: &str = "input[type=\"email\"]";
const MESSAGE_FIELD_SELECTOR: &str = "textarea";
const SUBMIT_SELECTOR: &str = "button[type=\"submit\"], input[type=\"submit\"]";

/// Which field a failed check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Message,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"))
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Check field values in order, stopping at the first failure. `None`
/// means the form has no such field.
pub fn check_fields(email: Option<&str>, message: Option<&str>) -> Result<(), (Field, &'static str)> {
    let email = email.map(str::trim).unwrap_or("");
    if email.is_empty() {
        return Err((Field::Email, EMAIL_REQUIRED));
    }
    if !is_valid_email(email) {
        return Err((Field::Email, EMAIL_INVALID));
    }
    if message.map(str::trim).unwrap_or("").is_empty() {
        return Err((Field::Message, MESSAGE_REQUIRED));
    }
    Ok(())
}

/// Validate the first email input and first textarea of `form`.
pub fn validate_form<D: Dom>(dom: &D, form: &D::Element) -> ValidationOutcome<D::Element> {
    let email = dom.query_within(form, EMAIL_FIELD_SELECTOR);
    let message = dom.query_within(form, MESSAGE_FIELD_SELECTOR);
    let email_value = email.as_ref().map(|e| dom.value(e));
    let message_value = message.as_ref().map(|m| dom.value(m));

    match check_fields(email_value.as_deref(), message_value.as_deref()) {
        Ok(()) => ValidationOutcome::Valid,
        Err((field, message_text)) => ValidationOutcome::Invalid {
            field: match field {
                Field::Email => email,
                Field::Message => message,
            },
            message: message_text,
        },
    }
}

pub struct ContactFormValidator {
    form_selector: String,
    reset_delay_ms: u32,
    sent_label: String,
    error_class: String,
    error_message_class: String,
}

impl ContactFormValidator {
    pub const NAME: &'static str = "contact_form";

    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            form_selector: config.selectors.forms.clone(),
            reset_delay_ms: config.form_reset_delay_ms,
            sent_label: config.sent_label.clone(),
            error_class: config.classes.error.clone(),
            error_message_class: config.classes.error_message.clone(),
        }
    }
}

/// One intercepted form and its pending reset.
struct ContactForm<D: Dom> {
    dom: Rc<D>,
    form: D::Element,
    submit: Option<D::Element>,
    original_label: String,
    reset: ScheduledTask<D>,
    reset_delay_ms: u32,
    sent_label: String,
    error_class: String,
    error_message_class: String,
}

impl<D: Dom + 'static> ContactForm<D> {
    fn on_submit(self: &Rc<Self>) {
        self.clear_errors();
        match validate_form(&*self.dom, &self.form) {
            ValidationOutcome::Valid => self.mark_sent(),
            ValidationOutcome::Invalid {
                field: Some(field),
                message,
            } => self.show_error(&field, message),
            ValidationOutcome::Invalid { field: None, message } => {
                tracing::debug!("Form is missing a field; not submitting ({message})");
            }
        }
    }

    /// Mark `field` invalid and make sure exactly one message follows it.
    fn show_error(&self, field: &D::Element, message: &str) {
        let dom = &self.dom;
        dom.add_class(field, &self.error_class);
        dom.set_attribute(field, "aria-invalid", "true");

        let existing = dom
            .next_element_sibling(field)
            .filter(|sibling| dom.has_class(sibling, &self.error_message_class));
        match existing {
            Some(note) => dom.set_text(&note, message),
            None => {
                let note = dom.create_element("span");
                dom.add_class(&note, &self.error_message_class);
                dom.set_attribute(&note, "role", "alert");
                dom.set_text(&note, message);
                dom.insert_after(field, &note);
            }
        }
    }

    fn clear_errors(&self) {
        let dom = &self.dom;
        for field in dom.query_all_within(&self.form, &format!(".{}", self.error_class)) {
            dom.remove_class(&field, &self.error_class);
            dom.remove_attribute(&field, "aria-invalid");
        }
        for note in dom.query_all_within(&self.form, &format!(".{}", self.error_message_class)) {
            dom.remove(&note);
        }
    }

    fn mark_sent(self: &Rc<Self>) {
        if let Some(button) = &self.submit {
            set_button_label(&*self.dom, button, &self.sent_label);
            self.dom.set_disabled(button, true);
        }

        let this = self.clone();
        self.reset.schedule(self.reset_delay_ms, move || this.restore());
    }

    fn restore(&self) {
        self.dom.reset_form(&self.form);
        if let Some(button) = &self.submit {
            set_button_label(&*self.dom, button, &self.original_label);
            self.dom.set_disabled(button, false);
        }
    }
}

fn button_label<D: Dom>(dom: &D, button: &D::Element) -> String {
    if dom.matches(button, "input") {
        dom.attribute(button, "value").unwrap_or_default()
    } else {
        dom.text(button)
    }
}

fn set_button_label<D: Dom>(dom: &D, button: &D::Element, label: &str) {
    if dom.matches(button, "input") {
        dom.set_attribute(button, "value", label);
    } else {
        dom.set_text(button, label);
    }
}

impl<D: Dom + 'static> Enhancement<D> for ContactFormValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()> {
        let forms = dom.query_all(&self.form_selector);
        if forms.is_empty() {
            return Err(EnhanceError::missing(Self::NAME, &self.form_selector));
        }

        for form in forms {
            let submit = dom
                .query_within(&form, SUBMIT_SELECTOR)
                .or_else(|| dom.query_within(&form, "button"));
            let original_label = submit
                .as_ref()
                .map(|b| button_label(&**dom, b))
                .unwrap_or_default();

            let contact = Rc::new(ContactForm {
                dom: dom.clone(),
                form: form.clone(),
                submit,
                original_label,
                reset: ScheduledTask::new(dom.clone()),
                reset_delay_ms: self.reset_delay_ms,
                sent_label: self.sent_label.clone(),
                error_class: self.error_class.clone(),
                error_message_class: self.error_message_class.clone(),
            });

            dom.listen(
                ListenTarget::Element(form),
                EventKind::Submit,
                handler(move |event| {
                    event.prevent_default();
                    contact.on_submit();
                }),
            );
        }

        Ok(())
    }
}
