//! Page visitors: named mutators applied to processed pages.

use crate::page::Page;

/// A named mutator over a processed [`Page`].
///
/// Visitors run in registration order, so a visitor observes every change
/// made by the visitors registered before it.
pub trait PageVisitor {
    /// Registration name. A later visitor with the same name replaces this one.
    fn name(&self) -> &str;

    /// Mutate the page.
    fn visit(&self, page: &mut Page) -> Result<(), VisitError>;
}

/// Check that a page can be visited.
///
/// Only processed pages carry parsed metadata and a rendered body.
pub fn ensure_target(visitor: &str, page: &Page) -> Result<(), VisitError> {
    if page.is_processed() {
        Ok(())
    } else {
        Err(VisitError::InvalidTarget {
            visitor: visitor.to_string(),
            page: page.name().to_string(),
        })
    }
}

/// Errors returned by visitors.
#[derive(Debug, thiserror::Error)]
pub enum VisitError {
    #[error("Visitor {visitor}: page {page} is not a processed page")]
    InvalidTarget { visitor: String, page: String },

    #[error("Visitor {visitor}: cannot parse date {value:?} in page {page}")]
    InvalidDate {
        visitor: String,
        page: String,
        value: String,
    },

    #[error("Visitor {visitor}: unknown language {language:?} in page {page}")]
    UnknownLanguage {
        visitor: String,
        page: String,
        language: String,
    },

    #[error("Visitor {visitor}: {message}")]
    Failed { visitor: String, message: String },
}
