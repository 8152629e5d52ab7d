//! Post-render text fixers.

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, SiteError};

/// A fixer as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixerDecl {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
}

/// A named regex replacement applied to every rendered page.
#[derive(Debug, Clone)]
pub struct Fixer {
    name: String,
    pattern: Regex,
    replacement: String,
}

impl Fixer {
    pub fn new(name: impl Into<String>, pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern)
            .map_err(|e| SiteError::config(format!("fixer '{name}' has an invalid pattern: {e}")))?;

        Ok(Self {
            name,
            pattern,
            replacement: replacement.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement.as_str()).into_owned()
    }
}

/// Fixers in registration order. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct FixerRegistry {
    fixers: Vec<Fixer>,
}

impl FixerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_decls<'a>(decls: impl IntoIterator<Item = &'a FixerDecl>) -> Result<Self> {
        let mut registry = Self::new();
        for decl in decls {
            registry.register(Fixer::new(&decl.name, &decl.pattern, &decl.replacement)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, fixer: Fixer) -> Result<()> {
        if self.fixers.iter().any(|f| f.name == fixer.name) {
            return Err(SiteError::duplicate("fixer", fixer.name));
        }
        self.fixers.push(fixer);
        Ok(())
    }

    /// Run every fixer over `text`, in order.
    pub fn apply(&self, text: String) -> String {
        self.fixers.iter().fold(text, |text, fixer| fixer.apply(&text))
    }

    pub fn len(&self) -> usize {
        self.fixers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixers.is_empty()
    }
}
