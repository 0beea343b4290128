//! Portfolio Enhance: client-side enhancement layer for static portfolio sites.
//!
//! Feature modules are written against the [`Dom`] capability surface, so
//! the same code drives a real browser page and the in-memory `MemoryDom`
//! used in tests. `MemoryDom` is built only with the `memory` feature.

pub mod accessibility;
pub mod bootstrap;
pub mod config;
pub mod contact_form;
pub mod dom;
pub mod lazy_media;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod menu;
pub mod navigation;
pub mod scroll_top;
pub mod timing;
pub mod types;

use std::rc::Rc;

pub use accessibility::AccessibilityAugmenter;
pub use bootstrap::{Bootstrapper, Enhancement};
pub use config::EnhanceConfig;
pub use contact_form::ContactFormValidator;
pub use dom::{Dom, ReadyState, Timers};
pub use lazy_media::LazyMediaLoader;
#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryDom;
pub use menu::MobileMenuController;
pub use navigation::NavigationHighlighter;
pub use scroll_top::ScrollTopController;
pub use timing::{DebounceGuard, ScheduledTask, ThrottleGuard};
pub use types::*;

/// Read the page's configuration and boot every module.
///
/// Returns `None` when the document is still loading. Configuration is
/// then read, and the modules run, on the structural-ready notification.
pub fn start<D: Dom + 'static>(dom: Rc<D>) -> Option<BootReport> {
    if dom.ready_state() == ReadyState::Loading {
        tracing::debug!("Document still loading; deferring enhancements");
        let d = dom.clone();
        dom.on_ready(Box::new(move || {
            boot(d);
        }));
        return None;
    }
    Some(boot(dom))
}

fn boot<D: Dom + 'static>(dom: Rc<D>) -> BootReport {
    let config = EnhanceConfig::from_document(&*dom);
    Bootstrapper::new(dom, &config).run()
}
