//! Configuration loading and validation.
//!
//! A page may carry an inline JSON block to override defaults:
//!
//! ```html
//! <script type="application/json" id="enhance-config">
//!   { "scroll_threshold": 480, "selectors": { "nav_menu": "#site-nav" } }
//! </script>
//! ```

use serde::{Deserialize, Serialize};

use crate::dom::Dom;
use crate::types::{EnhanceError, EnhanceResult};

/// Selector of the inline configuration block.
pub const CONFIG_BLOCK_SELECTOR: &str = "#enhance-config";

const DEFAULT_SCROLL_THRESHOLD: f64 = 300.0;
const DEFAULT_FORM_RESET_DELAY_MS: u32 = 2000;
const DEFAULT_IMAGE_ROOT_MARGIN_PX: u32 = 50;
const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;

/// Runtime configuration. Every field has a default, so a partial JSON
/// block overrides only what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Scroll offset (px) above which the scroll-to-top button is shown.
    pub scroll_threshold: f64,
    /// Delay before a successfully "sent" form resets.
    pub form_reset_delay_ms: u32,
    /// Submit button text while a form is in the sent state.
    pub sent_label: String,
    /// Pre-trigger margin for deferred image loads.
    pub image_root_margin_px: u32,
    /// Attribute holding a deferred image's real source.
    pub pending_source_attribute: String,
    /// Visible fraction at which content cards fade in.
    pub reveal_threshold: f64,
    /// Page name assumed when the location path has no last segment.
    pub home_page: String,
    pub selectors: Selectors,
    pub classes: Classes,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            form_reset_delay_ms: DEFAULT_FORM_RESET_DELAY_MS,
            sent_label: "Message Sent!".to_string(),
            image_root_margin_px: DEFAULT_IMAGE_ROOT_MARGIN_PX,
            pending_source_attribute: "data-src".to_string(),
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            home_page: "index.html".to_string(),
            selectors: Selectors::default(),
            classes: Classes::default(),
        }
    }
}

/// Markup contract: where each module looks for its elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub menu_toggle: String,
    pub nav_menu: String,
    pub nav_links: String,
    pub forms: String,
    pub lazy_images: String,
    pub reveal_cards: String,
    pub role_buttons: String,
    pub labelled_buttons: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            menu_toggle: "#menu-toggle".to_string(),
            nav_menu: ".nav-menu".to_string(),
            nav_links: ".nav-link".to_string(),
            forms: "form".to_string(),
            lazy_images: "img[data-src]".to_string(),
            reveal_cards: ".project-card, .skill-card, .timeline-item, .card".to_string(),
            role_buttons: "[role=\"button\"]".to_string(),
            labelled_buttons: ".cta-button, .scroll-top".to_string(),
        }
    }
}

/// CSS state classes the modules toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classes {
    pub active: String,
    pub visible: String,
    pub error: String,
    pub error_message: String,
    pub loaded: String,
    pub fade_in: String,
    pub scroll_top: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            active: "active".to_string(),
            visible: "visible".to_string(),
            error: "error".to_string(),
            error_message: "error-message".to_string(),
            loaded: "loaded".to_string(),
            fade_in: "fade-in".to_string(),
            scroll_top: "scroll-top".to_string(),
        }
    }
}

impl EnhanceConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> EnhanceResult<Self> {
        let config: EnhanceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the page's inline configuration block, falling back to defaults
    /// when it is absent or unusable.
    pub fn from_document<D: Dom>(dom: &D) -> Self {
        let Some(block) = dom.query(CONFIG_BLOCK_SELECTOR) else {
            return Self::default();
        };

        let json = dom.text(&block);
        if json.trim().is_empty() {
            return Self::default();
        }

        match Self::from_json(&json) {
            Ok(config) => {
                tracing::debug!("Loaded inline configuration from {CONFIG_BLOCK_SELECTOR}");
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring inline configuration: {e}");
                Self::default()
            }
        }
    }

    /// Reject values no module can work with.
    pub fn validate(&self) -> EnhanceResult<()> {
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            return Err(EnhanceError::Config(format!(
                "scroll_threshold must be a non-negative number, got {}",
                self.scroll_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(EnhanceError::Config(format!(
                "reveal_threshold must be within [0, 1], got {}",
                self.reveal_threshold
            )));
        }
        if self.form_reset_delay_ms == 0 {
            return Err(EnhanceError::Config(
                "form_reset_delay_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_defaults() {
        let config = EnhanceConfig::default();
        assert_eq!(config.scroll_threshold, 300.0);
        assert_eq!(config.form_reset_delay_ms, 2000);
        assert_eq!(config.image_root_margin_px, 50);
        assert_eq!(config.home_page, "index.html");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_named_fields() {
        let config =
            EnhanceConfig::from_json(r##"{"scroll_threshold": 480, "selectors": {"nav_menu": "#site-nav"}}"##)
                .unwrap();
        assert_eq!(config.scroll_threshold, 480.0);
        assert_eq!(config.selectors.nav_menu, "#site-nav");
        assert_eq!(config.selectors.menu_toggle, "#menu-toggle");
        assert_eq!(config.form_reset_delay_ms, 2000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EnhanceConfig::from_json(r#"{"scroll_threshold": -1}"#).is_err());
        assert!(EnhanceConfig::from_json(r#"{"reveal_threshold": 1.5}"#).is_err());
        assert!(EnhanceConfig::from_json(r#"{"form_reset_delay_ms": 0}"#).is_err());
        assert!(matches!(
            EnhanceConfig::from_json("{not json"),
            Err(EnhanceError::Json(_))
        ));
    }

    #[test]
    fn test_from_document_reads_inline_block() {
        let dom = MemoryDom::from_html(
            r#"<script type="application/json" id="enhance-config">{"sent_label": "Thanks!"}</script>"#,
        );
        let config = EnhanceConfig::from_document(&*dom);
        assert_eq!(config.sent_label, "Thanks!");
    }

    #[test]
    fn test_from_document_falls_back_on_malformed_block() {
        let dom = MemoryDom::from_html(
            r#"<script type="application/json" id="enhance-config">{"sent_label": </script>"#,
        );
        assert_eq!(EnhanceConfig::from_document(&*dom), EnhanceConfig::default());
    }

    #[test]
    fn test_from_document_without_block() {
        let dom = MemoryDom::from_html("<main></main>");
        assert_eq!(EnhanceConfig::from_document(&*dom), EnhanceConfig::default());
    }
}
