//! Startup sequencing.
//!
//! [`Bootstrapper`] initializes each feature module in a fixed order.
//! Waiting for the element tree is the caller's job; see [`crate::start`].
//! Every module runs behind its own isolation boundary: an error is logged
//! and recorded in the [`BootReport`], and the remaining modules still run.
//!
//! Panics are caught only where they unwind. `wasm32-unknown-unknown`
//! aborts on panic, so in the browser a module must report failure through
//! its `Result`.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::accessibility::AccessibilityAugmenter;
use crate::config::EnhanceConfig;
use crate::contact_form::ContactFormValidator;
use crate::dom::Dom;
use crate::lazy_media::LazyMediaLoader;
use crate::menu::MobileMenuController;
use crate::navigation::NavigationHighlighter;
use crate::scroll_top::ScrollTopController;
use crate::types::{BootReport, EnhanceError, EnhanceResult, ModuleStatus};

/// A self-contained feature wired onto the page once.
pub trait Enhancement<D: Dom> {
    /// Stable identifier used in logs and the boot report.
    fn name(&self) -> &'static str;

    /// Locate markup and attach listeners. [`EnhanceError::MissingMarkup`]
    /// means the page does not use this feature; nothing was attached.
    fn init(&self, dom: &Rc<D>) -> EnhanceResult<()>;
}

pub struct Bootstrapper<D: Dom> {
    dom: Rc<D>,
    modules: Vec<Box<dyn Enhancement<D>>>,
}

impl<D: Dom + 'static> Bootstrapper<D> {
    /// Every feature module, in initialization order. Accessibility runs
    /// last so it also covers the injected scroll-to-top button.
    pub fn new(dom: Rc<D>, config: &EnhanceConfig) -> Self {
        let modules: Vec<Box<dyn Enhancement<D>>> = vec![
            Box::new(MobileMenuController::new(config)),
            Box::new(NavigationHighlighter::new(config)),
            Box::new(ScrollTopController::new(config)),
            Box::new(ContactFormValidator::new(config)),
            Box::new(LazyMediaLoader::new(config)),
            Box::new(AccessibilityAugmenter::new(config)),
        ];
        Self::with_modules(dom, modules)
    }

    pub fn with_modules(dom: Rc<D>, modules: Vec<Box<dyn Enhancement<D>>>) -> Self {
        Self { dom, modules }
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Initialize every module, isolating each from the others' failures.
    pub fn run(&self) -> BootReport {
        let mut report = BootReport::default();

        for module in &self.modules {
            let name = module.name();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| module.init(&self.dom)))
                .unwrap_or_else(|_| Err(EnhanceError::InitPanicked { module: name }));

            let status = match outcome {
                Ok(()) => ModuleStatus::Wired,
                Err(e) if e.is_missing_markup() => {
                    tracing::debug!("Skipping {name}: {e}");
                    ModuleStatus::Skipped {
                        reason: e.to_string(),
                    }
                }
                Err(e) => {
                    tracing::warn!("Module {name} failed to initialize: {e}");
                    ModuleStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.modules.push((name.to_string(), status));
        }

        tracing::info!(
            "Portfolio enhancements initialized ({} wired, {} skipped, {} failed)",
            report.wired().len(),
            report.skipped().len(),
            report.failed().len()
        );
        report
    }
}
