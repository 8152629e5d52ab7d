//! Layout and partial templates.
//!
//! Templates are rendered with minijinja. Output is HTML-escaped by default;
//! use `{{ content | safe }}` for the pre-rendered page body and
//! `{% include "name" %}` to pull in another template by bare name.

use std::path::PathBuf;

use enginaer_page::{Page, RawFile, ResourceError};
use minijinja::{AutoEscape, Environment, Value};

use crate::context::TemplateData;
use crate::registry::TemplateRegistry;

/// File extension every template must carry.
pub const TEMPLATE_EXTENSION: &str = "jinja";

/// Lifecycle of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateState {
    Unvalidated,
    Validated,
    Processed,
}

/// Errors that can occur when loading or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("Only .{TEMPLATE_EXTENSION} templates are supported: {}", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("Template {name} has not been processed")]
    NotProcessed { name: String },

    #[error("Failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// A layout or partial template.
#[derive(Debug)]
pub struct Template {
    name: String,
    file: RawFile,
    content: String,
    state: TemplateState,
}

impl Template {
    /// Create an unvalidated template from a raw file.
    pub fn new(file: RawFile) -> Self {
        Self {
            name: file.name(),
            file,
            content: String::new(),
            state: TemplateState::Unvalidated,
        }
    }

    /// Template name: the file name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template source. Empty until processed.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> TemplateState {
        self.state
    }

    /// Check that the file is materialized and has the template extension.
    pub fn validate(&mut self) -> Result<(), TemplateError> {
        self.file.text()?;

        if self.file.extension() != Some(TEMPLATE_EXTENSION) {
            return Err(TemplateError::UnsupportedExtension {
                path: self.file.path.clone(),
            });
        }

        self.state = TemplateState::Validated;
        Ok(())
    }

    /// Capture the template source.
    pub fn process(&mut self) -> Result<(), TemplateError> {
        if self.state == TemplateState::Unvalidated {
            self.validate()?;
        }

        self.content = self.file.text()?.to_string();
        self.state = TemplateState::Processed;
        Ok(())
    }

    /// Render this template for a page.
    ///
    /// The data context is the page metadata, then `extra` on top of it,
    /// then `content` set to the page body. Partials are looked up by
    /// name in `partials`.
    pub fn execute(
        &self,
        page: &Page,
        extra: &Value,
        partials: &TemplateRegistry,
    ) -> Result<String, TemplateError> {
        let data = TemplateData::new()
            .with_metadata(page.metadata())
            .with_value(extra)
            .with_content(page.content());

        let env = environment(partials.values().chain(std::iter::once(self)))?;
        render(&env, &self.name, data.into_value())
    }
}

/// Build a template environment holding every given template.
///
/// Later templates with the same name replace earlier ones.
pub fn environment<'a>(
    templates: impl IntoIterator<Item = &'a Template>,
) -> Result<Environment<'static>, TemplateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    for template in templates {
        if template.state != TemplateState::Processed {
            return Err(TemplateError::NotProcessed {
                name: template.name.clone(),
            });
        }

        env.add_template_owned(template.name.clone(), template.content.clone())
            .map_err(|source| TemplateError::Render {
                name: template.name.clone(),
                source,
            })?;
    }

    Ok(env)
}

/// Render a named template from an environment.
pub fn render(env: &Environment<'_>, name: &str, data: Value) -> Result<String, TemplateError> {
    let wrap = |source| TemplateError::Render {
        name: name.to_string(),
        source,
    };

    env.get_template(name).map_err(wrap)?.render(data).map_err(wrap)
}
