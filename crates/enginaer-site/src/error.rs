//! Error types for site generation.

use enginaer_page::{PageError, VisitError};

use crate::template::TemplateError;

/// Result type alias using `SiteError`.
pub type Result<T> = std::result::Result<T, SiteError>;

/// Errors that abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Visit(#[from] VisitError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Enricher {enricher}: '{key}' does not exist in metadata of page {page}")]
    MissingKey {
        enricher: String,
        key: String,
        page: String,
    },

    #[error("Enricher {enricher} failed on page {page}: {message}")]
    Enricher {
        enricher: String,
        page: String,
        message: String,
    },

    #[error("The {kind} '{name}' has already been registered")]
    DuplicateRegistration { kind: &'static str, name: String },

    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("Page {page} uses unknown layout '{layout}'")]
    UnknownLayout { page: String, layout: String },

    #[error("Page {page} has an invalid permalink '{permalink}'")]
    InvalidPermalink { page: String, permalink: String },

    #[error("Cannot {operation} while the generator is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl SiteError {
    /// Create a configuration validation error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a duplicate registration error.
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            kind,
            name: name.into(),
        }
    }
}
