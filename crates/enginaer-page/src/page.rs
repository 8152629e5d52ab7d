//! Content pages.

use std::path::Path;

use crate::frontmatter::{split_front_matter, FrontMatterError, DELIMITER};
use crate::markdown::{render_markdown, MarkdownOptions};
use crate::metadata::{Metadata, Value};
use crate::resource::{RawFile, ResourceError};
use crate::visitor::{ensure_target, PageVisitor, VisitError};

/// Lifecycle of a page.
///
/// Rendering reads an enriched page without changing it, so there is no
/// rendered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Unvalidated,
    Validated,
    Processed,
    /// Visitors and enrichers have run.
    Enriched,
}

/// Errors that can occur while validating or processing a page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("{path}: {source}")]
    Format {
        path: String,
        #[source]
        source: FrontMatterError,
    },

    #[error("The mandatory metadata is missing in {path}: {}", .keys.join(", "))]
    MissingMetadata {
        path: String,
        keys: Vec<&'static str>,
    },

    #[error("Page {name} cannot be processed in state {state:?}")]
    InvalidState { name: String, state: PageState },
}

/// One content file: metadata plus rendered HTML body.
#[derive(Debug)]
pub struct Page {
    name: String,
    file: RawFile,
    metadata: Metadata,
    content: String,
    state: PageState,
}

impl Page {
    /// Create an unvalidated page from a raw file.
    pub fn new(file: RawFile) -> Self {
        Self {
            name: file.name(),
            file,
            metadata: Metadata::new(),
            content: String::new(),
            state: PageState::Unvalidated,
        }
    }

    /// Page name, derived from the file name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Rendered HTML body. Empty until processed.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the rendered body.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Whether metadata and body are available.
    pub fn is_processed(&self) -> bool {
        matches!(self.state, PageState::Processed | PageState::Enriched)
    }

    /// Record that visitors and enrichers are done with this page.
    pub fn mark_enriched(&mut self) -> Result<(), PageError> {
        if !self.is_processed() {
            return Err(PageError::InvalidState {
                name: self.name.clone(),
                state: self.state,
            });
        }

        self.state = PageState::Enriched;
        Ok(())
    }

    /// Check structural preconditions on the raw file.
    pub fn validate(&mut self) -> Result<(), PageError> {
        let text = self.file.text()?;

        if !text.starts_with(DELIMITER) {
            return Err(PageError::Format {
                path: self.file.path.display().to_string(),
                source: FrontMatterError::MissingDelimiter,
            });
        }

        self.state = PageState::Validated;
        Ok(())
    }

    /// Parse metadata and render the Markdown body.
    pub fn process(&mut self, options: &MarkdownOptions) -> Result<(), PageError> {
        if self.state != PageState::Validated {
            return Err(PageError::InvalidState {
                name: self.name.clone(),
                state: self.state,
            });
        }

        let path = self.file.path.display().to_string();
        let text = self.file.text()?;

        let (metadata, body) =
            split_front_matter(text).map_err(|source| PageError::Format {
                path: path.clone(),
                source,
            })?;

        let missing = metadata.missing_mandatory();
        if !missing.is_empty() {
            return Err(PageError::MissingMetadata {
                path,
                keys: missing,
            });
        }

        self.content = render_markdown(body, options);
        self.metadata = metadata;
        self.state = PageState::Processed;

        tracing::debug!("Processed page {} ({} metadata keys)", self.name, self.metadata.len());
        Ok(())
    }

    /// Whether the page is published.
    ///
    /// True only when the `published` value is exactly the text `true`.
    /// `None` until the page has been processed.
    pub fn published(&self) -> Option<bool> {
        if !self.is_processed() {
            return None;
        }

        Some(matches!(self.metadata.get("published"), Some(Value::Text(v)) if v == "true"))
    }

    /// Let a visitor mutate this page. Only processed pages accept visitors.
    pub fn accept(&mut self, visitor: &dyn PageVisitor) -> Result<(), VisitError> {
        ensure_target(visitor.name(), self)?;
        visitor.visit(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.metadata.set(key, value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.metadata.has(key)
    }
}
