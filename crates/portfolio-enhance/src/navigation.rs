//! Active-link highlighting and smooth scrolling for same-page anchors.

use std::rc::Rc;

use crate::bootstrap::Enhancement;
use crate::config::EnhanceConfig;
use crate::dom::{handler, Dom, EventKind, ListenTarget, ScrollAlign, ScrollBehavior};
use crate::types::EnhanceResult;

/// Links that point at a fragment of the current page.
const FRAGMENT_LINK_SELECTOR: &str = "a[href^=\"#\"]";

/// Last segment of a location path; empty for `/` and directory paths.
pub fn current_page(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Whether a nav link's `href` names the current page.
pub fn is_active_link(href: &str, page: &str, home_page: &str) -> bool {
    href == page || (page.is_empty() && href == home_page)
}

pub struct NavigationHighlighter {
    link_selector: String,
    home_page: String,
    active_class: String,
}

impl NavigationHighlighter {
    pub const NAME: &'static str = "navigation";

    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            link_selector: config.selectors.nav_links.clone(),
            home_page: config.home_page.clone(),
            active_class: config.classes.active.clone(),
        }
    }
}

struct Highlighter<D: Dom> {
    dom: Rc<D>,
    link_selector: String,
    home_page: String,
    active_class: String,
}

impl<D: Dom> Highlighter<D> {
    /// Mark the link for the current page and clear the rest.
    fn highlight(&self) {
        let path = self.dom.location_path();
        let page = current_page(&path);

        for link in self.dom.query_all(&self.link_selector) {
            let href = self.dom.attribute(&link, "href").unwrap_or_default();
            if is_active_link(&href, page, &self.home_page) {
                self.dom.add_class(&link, &self.active_class);
                self.dom.set_attribute(&link, "aria-current", "page");
            } else {
                self.dom.remove_class(&link, &self.active_class);
                self.dom.set_attribute(&link, "aria-current", "false");
            }
        }
    }
}

/// Scroll to and focus the section a fragment link points at.
fn follow_fragment<D: Dom>(dom: &D, href: &str) {
    match dom.query(href) {
        Some(section) => {
            dom.scroll_into_view(&section, ScrollBehavior::Smooth, ScrollAlign::Start);
            dom.focus(&section);
        }
        None => tracing::debug!("No section matches {href}"),
    }
}

impl<D: Dom + 'static> Enhancement<D> for NavigationHighlighter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()> {
        let highlighter = Rc::new(Highlighter {
            dom: dom.clone(),
            link_selector: self.link_selector.clone(),
            home_page: self.home_page.clone(),
            active_class: self.active_class.clone(),
        });
        highlighter.highlight();

        let h = highlighter;
        dom.listen(
            ListenTarget::Window,
            EventKind::HashChange,
            handler(move |_| h.highlight()),
        );

        let d = dom.clone();
        dom.listen(
            ListenTarget::Document,
            EventKind::Click,
            handler(move |event| {
                let Some(target) = &event.target else {
                    return;
                };
                let Some(link) = d.closest(target, FRAGMENT_LINK_SELECTOR) else {
                    return;
                };
                let href = d.attribute(&link, "href").unwrap_or_default();
                if href == "#" {
                    return;
                }
                event.prevent_default();
                follow_fragment(&*d, &href);
            }),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    const NAV: &str = r##"
        <nav class="nav-menu">
          <a class="nav-link" href="index.html">Home</a>
          <a class="nav-link active" href="about.html">About</a>
          <a class="nav-link" href="projects.html">Projects</a>
        </nav>
        <a id="to-contact" href="#contact">Get in touch</a>
        <a id="to-missing" href="#nowhere">Lost</a>
        <a id="to-top" href="#">Top</a>
        <a id="to-bad" href="#1-invalid">Bad</a>
        <section id="contact">Contact me</section>
    "##;

    fn setup(path: &str) -> Rc<MemoryDom> {
        let dom = MemoryDom::from_html(NAV);
        dom.set_location_path(path);
        NavigationHighlighter::new(&EnhanceConfig::default())
            .init(&dom)
            .unwrap();
        dom
    }

    fn link(dom: &MemoryDom, href: &str) -> crate::memory::NodeRef {
        dom.query(&format!(".nav-link[href=\"{href}\"]")).unwrap()
    }

    #[test]
    fn test_current_page() {
        assert_eq!(current_page("/about.html"), "about.html");
        assert_eq!(current_page("/portfolio/projects.html"), "projects.html");
        assert_eq!(current_page("/"), "");
        assert_eq!(current_page(""), "");
        assert_eq!(current_page("/blog/"), "");
    }

    #[test]
    fn test_is_active_link() {
        assert!(is_active_link("about.html", "about.html", "index.html"));
        assert!(is_active_link("index.html", "", "index.html"));
        assert!(!is_active_link("about.html", "", "index.html"));
        assert!(!is_active_link("index.html", "about.html", "index.html"));
    }

    #[test]
    fn test_highlights_current_page() {
        let dom = setup("/about.html");
        let about = link(&dom, "about.html");
        assert!(dom.has_class(&about, "active"));
        assert_eq!(dom.attribute(&about, "aria-current").as_deref(), Some("page"));
        for other in ["index.html", "projects.html"] {
            let el = link(&dom, other);
            assert!(!dom.has_class(&el, "active"));
            assert_eq!(dom.attribute(&el, "aria-current").as_deref(), Some("false"));
        }
    }

    #[test]
    fn test_root_path_highlights_home() {
        let dom = setup("/");
        let home = link(&dom, "index.html");
        assert!(dom.has_class(&home, "active"));
        assert_eq!(dom.attribute(&home, "aria-current").as_deref(), Some("page"));
        // The stale server-rendered class is cleared.
        assert!(!dom.has_class(&link(&dom, "about.html"), "active"));
    }

    #[test]
    fn test_hashchange_reruns_highlight() {
        let dom = setup("/about.html");
        dom.set_location_path("/projects.html");
        dom.navigate_hash();
        assert!(dom.has_class(&link(&dom, "projects.html"), "active"));
        assert!(!dom.has_class(&link(&dom, "about.html"), "active"));
    }

    #[test]
    fn test_fragment_click_scrolls_and_focuses_target() {
        let dom = setup("/");
        let anchor = dom.query("#to-contact").unwrap();
        let section = dom.query("#contact").unwrap();
        dom.click(&anchor);

        assert_eq!(
            dom.scroll_into_view_log(),
            vec![(section, ScrollBehavior::Smooth, ScrollAlign::Start)]
        );
        assert_eq!(dom.focused(), Some(section));
        assert!(dom.navigations().is_empty());
    }

    #[test]
    fn test_fragment_click_without_target_is_absorbed() {
        let dom = setup("/");
        for id in ["#to-missing", "#to-bad"] {
            let anchor = dom.query(id).unwrap();
            dom.click(&anchor);
        }
        assert!(dom.scroll_into_view_log().is_empty());
        assert_eq!(dom.focused(), None);
        assert!(dom.navigations().is_empty());
    }

    #[test]
    fn test_bare_hash_link_navigates_normally() {
        let dom = setup("/");
        let anchor = dom.query("#to-top").unwrap();
        dom.click(&anchor);
        assert_eq!(dom.navigations(), vec!["#".to_string()]);
        assert!(dom.scroll_into_view_log().is_empty());
    }
}
