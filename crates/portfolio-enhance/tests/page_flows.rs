//! Whole-page integration tests for portfolio-enhance.
//!
//! Each test boots every module against one HTML fixture, then drives the
//! page the way a visitor would: clicks, keys, scrolling, viewport entries
//! and the passage of time.

use std::cell::RefCell;
use std::rc::Rc;

use portfolio_enhance::dom::{handler, EventKind, ListenTarget, ScrollAlign, ScrollBehavior};
use portfolio_enhance::memory::NodeRef;
use portfolio_enhance::*;

// ─────────────────────── helpers ───────────────────────

const PORTFOLIO: &str = r##"
<!DOCTYPE html>
<html>
<head><title>Jane Doe</title></head>
<body>
  <header>
    <input type="checkbox" id="menu-toggle">
    <nav class="nav-menu">
      <a class="nav-link" href="index.html">Home</a>
      <a class="nav-link" href="about.html">About</a>
      <a class="nav-link" href="#contact">Contact</a>
    </nav>
  </header>
  <main>
    <section id="hero">
      <img id="portrait" data-src="/img/portrait.jpg" alt="Portrait">
      <a class="cta-button" id="cv" role="button" href="cv.pdf" title="Download CV"></a>
    </section>
    <section id="projects">
      <div class="project-card" id="card-1">Compiler</div>
      <div class="project-card" id="card-2">Database</div>
    </section>
    <section id="contact">
      <form id="contact-form">
        <input type="email" name="email">
        <textarea name="message"></textarea>
        <button type="submit">Send Message</button>
      </form>
    </section>
  </main>
</body>
</html>
"##;

/// Load a fixture, point the location at `path` and boot every module.
fn boot(html: &str, path: &str) -> (Rc<MemoryDom>, BootReport) {
    let dom = MemoryDom::from_html(html);
    dom.set_location_path(path);
    let report = start(dom.clone()).expect("document is ready");
    (dom, report)
}

fn el(dom: &MemoryDom, selector: &str) -> NodeRef {
    dom.query(selector)
        .unwrap_or_else(|| panic!("fixture has no {selector}"))
}

// ═══════════════════════════════════════════════════════
// BOOT
// ═══════════════════════════════════════════════════════

#[test]
fn test_01_full_page_wires_every_module() {
    let (_dom, report) = boot(PORTFOLIO, "/about.html");
    assert_eq!(
        report.wired(),
        vec![
            "mobile_menu",
            "navigation",
            "scroll_top",
            "contact_form",
            "lazy_media",
            "accessibility"
        ]
    );
    assert!(report.failed().is_empty());
}

#[test]
fn test_02_boot_waits_for_structural_ready() {
    let dom = MemoryDom::from_html(PORTFOLIO);
    dom.begin_loading();
    assert!(start(dom.clone()).is_none());
    assert!(dom.query(".scroll-top").is_none());
    assert_eq!(dom.listener_count(), 0);

    dom.finish_loading();
    assert!(dom.query(".scroll-top").is_some());
    let portrait = el(&dom, "#portrait");
    assert!(dom.is_observed(&portrait));
}

#[test]
fn test_03_bare_page_skips_what_it_lacks() {
    let (dom, report) = boot("<main><p>Under construction</p></main>", "/");
    assert_eq!(report.skipped(), vec!["mobile_menu", "contact_form", "lazy_media"]);
    assert_eq!(report.wired(), vec!["navigation", "scroll_top", "accessibility"]);

    // The injected button is still reachable and labelled.
    let button = el(&dom, ".scroll-top");
    assert_eq!(dom.attribute(&button, "aria-label").as_deref(), Some("Scroll to top"));
}

#[test]
fn test_04_inline_config_overrides_threshold() {
    let html = PORTFOLIO.replace(
        "<head>",
        r#"<head><script type="application/json" id="enhance-config">{"scroll_threshold": 500}</script>"#,
    );
    let (dom, _) = boot(&html, "/");
    let button = el(&dom, ".scroll-top");

    dom.scroll_to(400.0);
    dom.run_frame();
    assert!(!dom.has_class(&button, "visible"));

    dom.scroll_to(501.0);
    dom.run_frame();
    assert!(dom.has_class(&button, "visible"));
}

#[test]
fn test_05_one_failing_module_does_not_stop_the_rest() {
    struct Exploding;
    impl Enhancement<MemoryDom> for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }
        fn init(&self, _dom: &Rc<MemoryDom>) -> EnhanceResult<()> {
            panic!("boom");
        }
    }

    let dom = MemoryDom::from_html(PORTFOLIO);
    let config = EnhanceConfig::default();
    let modules: Vec<Box<dyn Enhancement<MemoryDom>>> = vec![
        Box::new(Exploding),
        Box::new(MobileMenuController::new(&config)),
        Box::new(ScrollTopController::new(&config)),
    ];
    let report = Bootstrapper::with_modules(dom.clone(), modules).run();

    assert_eq!(report.failed(), vec!["exploding"]);
    assert_eq!(report.wired(), vec!["mobile_menu", "scroll_top"]);

    let toggle = el(&dom, "#menu-toggle");
    dom.click(&toggle);
    assert!(dom.has_class(&el(&dom, ".nav-menu"), "active"));
}

// ═══════════════════════════════════════════════════════
// NAVIGATION
// ═══════════════════════════════════════════════════════

#[test]
fn test_06_menu_link_to_section_closes_menu_and_scrolls() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let toggle = el(&dom, "#menu-toggle");
    let nav = el(&dom, ".nav-menu");
    let contact = el(&dom, "#contact");

    dom.click(&toggle);
    assert!(dom.has_class(&nav, "active"));

    dom.click(&el(&dom, ".nav-link[href=\"#contact\"]"));
    assert!(!dom.checked(&toggle));
    assert!(!dom.has_class(&nav, "active"));
    assert_eq!(
        dom.scroll_into_view_log(),
        vec![(contact, ScrollBehavior::Smooth, ScrollAlign::Start)]
    );
    assert_eq!(dom.focused(), Some(contact));
    assert!(dom.navigations().is_empty());
}

#[test]
fn test_07_active_link_tracks_location() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let home = el(&dom, ".nav-link[href=\"index.html\"]");
    let about = el(&dom, ".nav-link[href=\"about.html\"]");
    assert_eq!(dom.attribute(&home, "aria-current").as_deref(), Some("page"));
    assert_eq!(dom.attribute(&about, "aria-current").as_deref(), Some("false"));

    dom.set_location_path("/about.html");
    dom.navigate_hash();
    assert!(dom.has_class(&about, "active"));
    assert!(!dom.has_class(&home, "active"));
    assert_eq!(dom.attribute(&home, "aria-current").as_deref(), Some("false"));
}

#[test]
fn test_08_escape_and_outside_click() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let toggle = el(&dom, "#menu-toggle");

    dom.click(&toggle);
    dom.press_key(None, "Escape");
    assert!(!dom.checked(&toggle));

    dom.click(&toggle);
    dom.click(&el(&dom, "#card-1"));
    assert!(!dom.checked(&toggle));
}

// ═══════════════════════════════════════════════════════
// CONTACT FORM
// ═══════════════════════════════════════════════════════

#[test]
fn test_09_invalid_then_valid_submission() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let form = el(&dom, "#contact-form");
    let email = el(&dom, "input[type=\"email\"]");
    let message = el(&dom, "textarea");
    let button = el(&dom, "button[type=\"submit\"]");

    for attempt in ["", "abc", "a@b", "a @b.co"] {
        dom.set_value(&email, attempt);
        dom.click(&button);
        assert_eq!(dom.query_all_within(&form, ".error-message").len(), 1);
        assert_eq!(dom.attribute(&email, "aria-invalid").as_deref(), Some("true"));
    }

    dom.set_value(&email, "a@b.co");
    dom.click(&button);
    let notes = dom.query_all_within(&form, ".error-message");
    assert_eq!(notes.len(), 1);
    assert_eq!(dom.text(&notes[0]), "Message is required");
    assert!(!dom.has_class(&email, "error"));
    assert!(dom.has_class(&message, "error"));

    dom.set_value(&message, "Let's build something.");
    dom.click(&button);
    assert!(dom.query_all_within(&form, ".error-message").is_empty());
    assert_eq!(dom.text(&button), "Message Sent!");
    assert!(dom.is_disabled(&button));
    assert_eq!(dom.native_submissions(), 0);
}

#[test]
fn test_10_sent_state_resets_after_exact_delay() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let email = el(&dom, "input[type=\"email\"]");
    let message = el(&dom, "textarea");
    let button = el(&dom, "button[type=\"submit\"]");

    dom.set_value(&email, "jane@example.com");
    dom.set_value(&message, "Hello");
    dom.click(&button);

    // Disabled buttons ignore clicks while the form is in the sent state.
    dom.click(&button);
    assert_eq!(dom.pending_timers(), 1);

    dom.advance(1999);
    assert_eq!(dom.text(&button), "Message Sent!");
    assert_eq!(dom.value(&email), "jane@example.com");

    dom.advance(1);
    assert_eq!(dom.text(&button), "Send Message");
    assert!(!dom.is_disabled(&button));
    assert_eq!(dom.value(&email), "");
    assert_eq!(dom.value(&message), "");
}

// ═══════════════════════════════════════════════════════
// MEDIA & ACCESSIBILITY
// ═══════════════════════════════════════════════════════

#[test]
fn test_11_portrait_loads_once_and_cards_fade_in() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let portrait = el(&dom, "#portrait");
    let card = el(&dom, "#card-2");

    for _ in 0..3 {
        dom.set_in_view(&portrait, true);
        dom.set_in_view(&card, true);
    }
    assert_eq!(dom.attribute(&portrait, "src").as_deref(), Some("/img/portrait.jpg"));
    assert_eq!(dom.attribute_writes(&portrait, "src"), 1);
    assert!(dom.has_class(&card, "fade-in"));
    assert!(!dom.has_class(&el(&dom, "#card-1"), "fade-in"));
}

#[test]
fn test_12_without_viewport_observation_images_load_eagerly() {
    let dom = MemoryDom::from_html(PORTFOLIO);
    dom.set_intersection_supported(false);
    let report = start(dom.clone()).expect("document is ready");
    assert_eq!(report.status_of("lazy_media"), Some(&ModuleStatus::Wired));

    let portrait = el(&dom, "#portrait");
    assert!(dom.has_class(&portrait, "loaded"));
    assert!(!dom.has_class(&el(&dom, "#card-1"), "fade-in"));
}

#[test]
fn test_13_keyboard_activates_role_button() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let cv = el(&dom, "#cv");
    assert_eq!(dom.attribute(&cv, "tabindex").as_deref(), Some("0"));
    assert_eq!(dom.attribute(&cv, "aria-label").as_deref(), Some("Download CV"));

    dom.press_key(Some(&cv), "Enter");
    assert!(dom.press_key(Some(&cv), " "));
    assert_eq!(dom.navigations(), vec!["cv.pdf".to_string(), "cv.pdf".to_string()]);
}

// ═══════════════════════════════════════════════════════
// RATE LIMITERS ON LIVE LISTENERS
// ═══════════════════════════════════════════════════════

#[test]
fn test_14_throttled_scroll_listener() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let d = dom.clone();
    let throttle = ThrottleGuard::new(dom.clone(), 100, move |()| s.borrow_mut().push(d.scroll_y()));
    dom.listen(
        ListenTarget::Window,
        EventKind::Scroll,
        handler(move |_| {
            throttle.call(());
        }),
    );

    dom.scroll_to(10.0);
    dom.scroll_to(20.0);
    dom.advance(100);
    dom.scroll_to(30.0);
    assert_eq!(*seen.borrow(), vec![10.0, 30.0]);
}

#[test]
fn test_15_debounced_scroll_listener() {
    let (dom, _) = boot(PORTFOLIO, "/");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let debounce = DebounceGuard::new(dom.clone(), 250, move |y: f64| s.borrow_mut().push(y));
    let d = dom.clone();
    dom.listen(
        ListenTarget::Window,
        EventKind::Scroll,
        handler(move |_| debounce.call(d.scroll_y())),
    );

    for y in [100.0, 200.0, 300.0] {
        dom.scroll_to(y);
        dom.advance(100);
    }
    assert!(seen.borrow().is_empty());
    dom.advance(150);
    assert_eq!(*seen.borrow(), vec![300.0]);
}

// ═══════════════════════════════════════════════════════
// CONFIGURED SELECTORS AND REPEATED PASSES
// ═══════════════════════════════════════════════════════

#[test]
fn test_16_configured_selector_uses_full_css() {
    let html = PORTFOLIO.replace(
        "<head>",
        r##"<head><script type="application/json" id="enhance-config">{"selectors": {"reveal_cards": "#projects > .project-card:first-child, .skill-card:not(.static)"}}</script>"##,
    );
    let (dom, _) = boot(&html, "/");
    let first = el(&dom, "#card-1");
    let second = el(&dom, "#card-2");
    assert!(dom.is_observed(&first));
    assert!(!dom.is_observed(&second));

    dom.set_in_view(&first, true);
    assert!(dom.has_class(&first, "fade-in"));
}

#[test]
fn test_17_second_accessibility_pass_keeps_single_activation() {
    let (dom, _) = boot(PORTFOLIO, "/");
    AccessibilityAugmenter::new(&EnhanceConfig::default())
        .init(&dom)
        .unwrap();

    let cv = el(&dom, "#cv");
    dom.press_key(Some(&cv), "Enter");
    assert_eq!(dom.navigations(), vec!["cv.pdf".to_string()]);
}
