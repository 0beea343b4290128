//! Shared value types and the error taxonomy for the enhancement layer.

use serde::{Deserialize, Serialize};

/// Outcome of validating one contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome<E> {
    /// Every checked field passed.
    Valid,
    /// The first failing check. `field` is `None` when the form lacks the
    /// element entirely, in which case nothing can be marked.
    Invalid {
        field: Option<E>,
        message: &'static str,
    },
}

impl<E> ValidationOutcome<E> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// The user-facing message of a failed check.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid { message, .. } => Some(message),
        }
    }
}

/// Per-module result of a boot pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleStatus {
    /// The module found its markup and attached its listeners.
    Wired,
    /// The module's markup was absent; it did nothing.
    Skipped { reason: String },
    /// The module failed; sibling modules were still initialized.
    Failed { error: String },
}

/// Summary of one [`crate::Bootstrapper::run`] pass, in initialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootReport {
    pub modules: Vec<(String, ModuleStatus)>,
}

impl BootReport {
    pub fn status_of(&self, module: &str) -> Option<&ModuleStatus> {
        self.modules
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, status)| status)
    }

    pub fn wired(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, ModuleStatus::Wired))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, ModuleStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, ModuleStatus::Failed { .. }))
    }

    fn names_where(&self, pred: impl Fn(&ModuleStatus) -> bool) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|(_, status)| pred(status))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Errors that can occur while wiring up the page.
#[derive(thiserror::Error, Debug)]
pub enum EnhanceError {
    #[error("{module}: required markup not found ({selector})")]
    MissingMarkup {
        module: &'static str,
        selector: String,
    },

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{module}: initialization panicked")]
    InitPanicked { module: &'static str },
}

impl EnhanceError {
    pub fn missing(module: &'static str, selector: impl Into<String>) -> Self {
        EnhanceError::MissingMarkup {
            module,
            selector: selector.into(),
        }
    }

    /// Missing markup is an expected condition, not a failure.
    pub fn is_missing_markup(&self) -> bool {
        matches!(self, EnhanceError::MissingMarkup { .. })
    }
}

/// Convenience result type.
pub type EnhanceResult<T> = Result<T, EnhanceError>;
