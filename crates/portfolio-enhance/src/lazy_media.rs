//! Deferred image loading and entrance animations.
//!
//! Both passes are one-shot per element: a handled element is unobserved
//! before the callback returns, and an image whose `src` already holds its
//! pending source is left alone when a batch names it twice.

use std::rc::Rc;

use crate::bootstrap::Enhancement;
use crate::config::EnhanceConfig;
use crate::dom::{intersection_callback, Dom, ObserverOptions};
use crate::types::{EnhanceError, EnhanceResult};

pub struct LazyMediaLoader {
    image_selector: String,
    card_selector: String,
    source_attribute: String,
    image_margin_px: u32,
    reveal_threshold: f64,
    loaded_class: String,
    fade_in_class: String,
}

impl LazyMediaLoader {
    pub const NAME: &'static str = "lazy_media";

    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            image_selector: config.selectors.lazy_images.clone(),
            card_selector: config.selectors.reveal_cards.clone(),
            source_attribute: config.pending_source_attribute.clone(),
            image_margin_px: config.image_root_margin_px,
            reveal_threshold: config.reveal_threshold,
            loaded_class: config.classes.loaded.clone(),
            fade_in_class: config.classes.fade_in.clone(),
        }
    }

    pub fn image_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: self.image_margin_px,
            threshold: 0.0,
        }
    }

    pub fn reveal_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: 0,
            threshold: self.reveal_threshold,
        }
    }
}

/// Swap an image's pending source in and mark it loaded. Returns `false`
/// when `src` already held that source.
fn load_image<D: Dom>(dom: &D, image: &D::Element, source_attribute: &str, loaded_class: &str) -> bool {
    let pending = dom
        .attribute(image, source_attribute)
        .or_else(|| dom.attribute(image, "src"));
    let current = dom.attribute(image, "src");
    let swapped = match pending {
        Some(source) if current.as_deref() != Some(source.as_str()) => {
            dom.set_attribute(image, "src", &source);
            true
        }
        _ => false,
    };
    dom.add_class(image, loaded_class);
    swapped
}

impl LazyMediaLoader {
    fn defer_images<D: Dom + 'static>(&self, dom: &Rc<D>, images: Vec<D::Element>) {
        let d = dom.clone();
        let source_attribute = self.source_attribute.clone();
        let loaded_class = self.loaded_class.clone();
        let callback = intersection_callback(move |entries, observer| {
            for entry in entries.iter().filter(|e| e.is_intersecting) {
                if load_image(&*d, &entry.target, &source_attribute, &loaded_class) {
                    tracing::debug!("Loaded deferred image {:?}", entry.target);
                }
                observer.unobserve(&entry.target);
            }
        });

        match dom.intersection_observer(self.image_options(), callback) {
            Some(observer) => {
                for image in &images {
                    observer.observe(image);
                }
                tracing::debug!("Watching {} deferred images", images.len());
            }
            None => {
                tracing::debug!(
                    "Viewport observation unavailable; loading {} images now",
                    images.len()
                );
                for image in &images {
                    load_image(&**dom, image, &self.source_attribute, &self.loaded_class);
                }
            }
        }
    }

    fn reveal_cards<D: Dom + 'static>(&self, dom: &Rc<D>, cards: Vec<D::Element>) {
        let d = dom.clone();
        let fade_in_class = self.fade_in_class.clone();
        let callback = intersection_callback(move |entries, observer| {
            for entry in entries.iter().filter(|e| e.is_intersecting) {
                d.add_class(&entry.target, &fade_in_class);
                observer.unobserve(&entry.target);
            }
        });

        let Some(observer) = dom.intersection_observer(self.reveal_options(), callback) else {
            tracing::debug!("Viewport observation unavailable; card animations disabled");
            return;
        };
        for card in &cards {
            observer.observe(card);
        }
    }
}

impl<D: Dom + 'static> Enhancement<D> for LazyMediaLoader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()> {
        let images = dom.query_all(&self.image_selector);
        let cards = dom.query_all(&self.card_selector);
        if images.is_empty() && cards.is_empty() {
            return Err(EnhanceError::missing(
                Self::NAME,
                format!("{}, {}", self.image_selector, self.card_selector),
            ));
        }

        if !images.is_empty() {
            self.defer_images(dom, images);
        }
        if !cards.is_empty() {
            self.reveal_cards(dom, cards);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::IntersectionEntry;
    use crate::memory::{MemoryDom, NodeRef};

    const GALLERY: &str = r#"
        <section>
          <img id="hero" data-src="/img/hero.jpg" src="/img/placeholder.svg" alt="Hero">
          <img id="thumb" data-src="/img/thumb.jpg" alt="Thumb">
          <img id="eager" src="/img/logo.png" alt="Logo">
          <div class="project-card" id="p1">One</div>
          <div class="skill-card" id="s1">Rust</div>
        </section>
    "#;

    fn setup(html: &str) -> Rc<MemoryDom> {
        let dom = MemoryDom::from_html(html);
        LazyMediaLoader::new(&EnhanceConfig::default())
            .init(&dom)
            .unwrap();
        dom
    }

    fn entry(target: NodeRef) -> IntersectionEntry<NodeRef> {
        IntersectionEntry {
            target,
            is_intersecting: true,
            ratio: 1.0,
        }
    }

    #[test]
    fn test_image_loads_on_entry() {
        let dom = setup(GALLERY);
        let hero = dom.query("#hero").unwrap();
        assert_eq!(dom.attribute(&hero, "src").as_deref(), Some("/img/placeholder.svg"));
        assert!(dom.is_observed(&hero));

        dom.set_in_view(&hero, true);
        assert_eq!(dom.attribute(&hero, "src").as_deref(), Some("/img/hero.jpg"));
        assert!(dom.has_class(&hero, "loaded"));
        assert!(!dom.is_observed(&hero));
    }

    #[test]
    fn test_image_loads_exactly_once() {
        let dom = setup(GALLERY);
        let thumb = dom.query("#thumb").unwrap();
        dom.deliver(&[entry(thumb), entry(thumb)]);
        dom.set_in_view(&thumb, true);
        dom.set_in_view(&thumb, true);
        assert_eq!(dom.attribute_writes(&thumb, "src"), 1);
    }

    #[test]
    fn test_authored_loaded_class_still_loads() {
        let dom = setup(r#"<img id="pre" class="loaded" data-src="/img/pre.jpg" alt="Pre">"#);
        let pre = dom.query("#pre").unwrap();
        dom.set_in_view(&pre, true);
        assert_eq!(dom.attribute(&pre, "src").as_deref(), Some("/img/pre.jpg"));
        assert_eq!(dom.attribute_writes(&pre, "src"), 1);
    }

    #[test]
    fn test_leaving_viewport_does_not_load() {
        let dom = setup(GALLERY);
        let thumb = dom.query("#thumb").unwrap();
        dom.set_in_view(&thumb, false);
        assert_eq!(dom.attribute_writes(&thumb, "src"), 0);
        assert!(dom.is_observed(&thumb));
    }

    #[test]
    fn test_untagged_images_are_ignored() {
        let dom = setup(GALLERY);
        let eager = dom.query("#eager").unwrap();
        assert!(!dom.is_observed(&eager));
        dom.set_in_view(&eager, true);
        assert!(!dom.has_class(&eager, "loaded"));
    }

    #[test]
    fn test_fallback_loads_everything_immediately() {
        let dom = MemoryDom::from_html(GALLERY);
        dom.set_intersection_supported(false);
        LazyMediaLoader::new(&EnhanceConfig::default())
            .init(&dom)
            .unwrap();

        for (id, src) in [("#hero", "/img/hero.jpg"), ("#thumb", "/img/thumb.jpg")] {
            let img = dom.query(id).unwrap();
            assert_eq!(dom.attribute(&img, "src").as_deref(), Some(src));
            assert!(dom.has_class(&img, "loaded"));
        }
        // Cards have no fallback.
        let card = dom.query("#p1").unwrap();
        assert!(!dom.has_class(&card, "fade-in"));
    }

    #[test]
    fn test_cards_fade_in_once() {
        let dom = setup(GALLERY);
        let card = dom.query("#s1").unwrap();
        dom.set_in_view(&card, true);
        assert!(dom.has_class(&card, "fade-in"));
        assert!(!dom.is_observed(&card));

        dom.remove_class(&card, "fade-in");
        dom.set_in_view(&card, true);
        assert!(!dom.has_class(&card, "fade-in"));
    }

    #[test]
    fn test_observer_options() {
        let dom = setup(GALLERY);
        let options = dom.observer_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].root_margin(), "50px");
        assert_eq!(options[0].threshold, 0.0);
        assert_eq!(options[1].threshold, 0.1);
    }

    #[test]
    fn test_page_without_media_is_skipped() {
        let dom = MemoryDom::from_html("<main><p>Text only</p></main>");
        let err = LazyMediaLoader::new(&EnhanceConfig::default())
            .init(&dom)
            .unwrap_err();
        assert!(err.is_missing_markup());
        assert!(dom.observer_options().is_empty());
    }
}
