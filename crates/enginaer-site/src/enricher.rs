//! Configuration-declared page enrichers.
//!
//! An enricher pairs a metadata key (or a source/target pair) with a
//! handler from the built-in catalog. Declarations are resolved eagerly so
//! an unknown handler fails before any page is touched.
//!
//! Per page, enrichers run by category: raw, menu, metadata, generate.

use std::sync::LazyLock;

use enginaer_page::visitors::extract_title;
use enginaer_page::{ensure_target, slugify, Page, Value};
use regex::Regex;
use serde::Deserialize;

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::generator::normalize_permalink;
use crate::menu::{MenuBuilder, MenuChild};

static FIRST_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>(.*?)</p>").expect("Invalid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// Reads the rendered body. `None` leaves the page untouched.
pub type RawHandler = fn(&str, &SiteConfig) -> Option<Value>;

/// Maps one metadata value to another.
pub type ValueHandler = fn(&Value, &SiteConfig) -> std::result::Result<Value, String>;

/// Contributes a page to the site menu.
pub type MenuHandler = fn(&Page, &mut MenuBuilder, &SiteConfig) -> Result<()>;

/// An enricher as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EnricherDecl {
    Raw { key: String, handler: String },
    Menu { handler: String },
    Metadata { key: String, handler: String },
    Generate {
        source: String,
        target: String,
        handler: String,
    },
}

/// A resolved enricher.
#[derive(Debug, Clone)]
pub enum Enricher {
    /// Writes `key` from the rendered body.
    Raw {
        key: String,
        name: String,
        handler: RawHandler,
    },
    /// Mutates the shared menu.
    Menu { name: String, handler: MenuHandler },
    /// Transforms `key` in place.
    Metadata {
        key: String,
        name: String,
        handler: ValueHandler,
    },
    /// Derives `target` from `source`.
    Generate {
        source: String,
        target: String,
        name: String,
        handler: ValueHandler,
    },
}

impl Enricher {
    /// Resolve a declaration against the handler catalog.
    pub fn resolve(decl: &EnricherDecl) -> Result<Self> {
        match decl {
            EnricherDecl::Raw { key, handler } => Ok(Self::Raw {
                key: key.clone(),
                name: handler.clone(),
                handler: raw_handler(handler).ok_or_else(|| unknown("raw", handler))?,
            }),
            EnricherDecl::Menu { handler } => Ok(Self::Menu {
                name: handler.clone(),
                handler: menu_handler(handler).ok_or_else(|| unknown("menu", handler))?,
            }),
            EnricherDecl::Metadata { key, handler } => Ok(Self::Metadata {
                key: key.clone(),
                name: handler.clone(),
                handler: metadata_handler(handler).ok_or_else(|| unknown("metadata", handler))?,
            }),
            EnricherDecl::Generate {
                source,
                target,
                handler,
            } => Ok(Self::Generate {
                source: source.clone(),
                target: target.clone(),
                name: handler.clone(),
                handler: generate_handler(handler).ok_or_else(|| unknown("generate", handler))?,
            }),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Raw { .. } => "raw",
            Self::Menu { .. } => "menu",
            Self::Metadata { .. } => "metadata",
            Self::Generate { .. } => "generate",
        }
    }

    /// Display label, e.g. `generate:iso-date`.
    pub fn label(&self) -> String {
        let name = match self {
            Self::Raw { name, .. }
            | Self::Menu { name, .. }
            | Self::Metadata { name, .. }
            | Self::Generate { name, .. } => name,
        };
        format!("{}:{}", self.category(), name)
    }

    /// Apply to one page.
    pub fn apply(&self, page: &mut Page, menu: &mut MenuBuilder, config: &SiteConfig) -> Result<()> {
        ensure_target(&self.label(), page)?;

        match self {
            Self::Raw { key, handler, .. } => {
                if let Some(value) = handler(page.content(), config) {
                    page.set(key.as_str(), value);
                }
                Ok(())
            }
            Self::Menu { handler, .. } => handler(page, menu, config),
            Self::Metadata { key, handler, .. } => {
                let value = self.transform(page, key, *handler, config)?;
                page.set(key.as_str(), value);
                Ok(())
            }
            Self::Generate {
                source,
                target,
                handler,
                ..
            } => {
                let value = self.transform(page, source, *handler, config)?;
                page.set(target.as_str(), value);
                Ok(())
            }
        }
    }

    fn transform(
        &self,
        page: &Page,
        key: &str,
        handler: ValueHandler,
        config: &SiteConfig,
    ) -> Result<Value> {
        let value = page.get(key).ok_or_else(|| SiteError::MissingKey {
            enricher: self.label(),
            key: key.to_string(),
            page: page.name().to_string(),
        })?;

        handler(value, config).map_err(|message| SiteError::Enricher {
            enricher: self.label(),
            page: page.name().to_string(),
            message,
        })
    }
}

fn unknown(category: &str, handler: &str) -> SiteError {
    let hint = [
        ("raw", raw_handler(handler).is_some()),
        ("menu", menu_handler(handler).is_some()),
        ("metadata", metadata_handler(handler).is_some()),
        ("generate", generate_handler(handler).is_some()),
    ]
    .into_iter()
    .find(|(_, found)| *found)
    .map(|(other, _)| format!(" (it is a {other} handler)"))
    .unwrap_or_default();

    SiteError::config(format!("unknown {category} enricher handler '{handler}'{hint}"))
}

/// Enrichers grouped by category, applied in category order.
#[derive(Debug, Clone, Default)]
pub struct EnricherPipeline {
    raw: Vec<Enricher>,
    menu: Vec<Enricher>,
    metadata: Vec<Enricher>,
    generate: Vec<Enricher>,
}

impl EnricherPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every declaration, failing on the first unknown handler.
    pub fn from_decls<'a>(decls: impl IntoIterator<Item = &'a EnricherDecl>) -> Result<Self> {
        let mut pipeline = Self::new();
        for decl in decls {
            pipeline.register(Enricher::resolve(decl)?);
        }
        Ok(pipeline)
    }

    pub fn register(&mut self, enricher: Enricher) {
        tracing::debug!("Registered enricher {}", enricher.label());
        match enricher {
            Enricher::Raw { .. } => self.raw.push(enricher),
            Enricher::Menu { .. } => self.menu.push(enricher),
            Enricher::Metadata { .. } => self.metadata.push(enricher),
            Enricher::Generate { .. } => self.generate.push(enricher),
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len() + self.menu.len() + self.metadata.len() + self.generate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every enricher over a page.
    pub fn apply(&self, page: &mut Page, menu: &mut MenuBuilder, config: &SiteConfig) -> Result<()> {
        self.raw
            .iter()
            .chain(&self.menu)
            .chain(&self.metadata)
            .chain(&self.generate)
            .try_for_each(|enricher| enricher.apply(page, menu, config))
    }
}

/// Look up a raw handler by name.
pub fn raw_handler(name: &str) -> Option<RawHandler> {
    match name {
        "first-heading" => Some(first_heading),
        "excerpt" => Some(excerpt),
        _ => None,
    }
}

/// Look up a metadata handler by name.
pub fn metadata_handler(name: &str) -> Option<ValueHandler> {
    match name {
        "trim" => Some(trim),
        "lowercase" => Some(lowercase),
        "slug" => Some(slug),
        _ => None,
    }
}

/// Look up a generate handler by name.
pub fn generate_handler(name: &str) -> Option<ValueHandler> {
    match name {
        "iso-date" => Some(iso_date),
        "slug" => Some(slug),
        "absolute-url" => Some(absolute_url),
        _ => None,
    }
}

/// Look up a menu handler by name.
pub fn menu_handler(name: &str) -> Option<MenuHandler> {
    match name {
        "page-menu" => Some(page_menu),
        _ => None,
    }
}

fn first_heading(html: &str, _: &SiteConfig) -> Option<Value> {
    extract_title(html).map(Value::from)
}

fn excerpt(html: &str, _: &SiteConfig) -> Option<Value> {
    let paragraph = FIRST_PARAGRAPH.captures(html)?.get(1)?.as_str();
    Some(Value::from(TAG.replace_all(paragraph, "").trim()))
}

fn map_text(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::Text(s) => Value::Text(f(s)),
        Value::List(items) => Value::List(items.iter().map(|s| f(s)).collect()),
        other => other.clone(),
    }
}

fn trim(value: &Value, _: &SiteConfig) -> std::result::Result<Value, String> {
    Ok(map_text(value, |s| s.trim().to_string()))
}

fn lowercase(value: &Value, _: &SiteConfig) -> std::result::Result<Value, String> {
    Ok(map_text(value, str::to_lowercase))
}

fn slug(value: &Value, _: &SiteConfig) -> std::result::Result<Value, String> {
    Ok(Value::Text(slugify(&value.to_string())))
}

fn iso_date(value: &Value, _: &SiteConfig) -> std::result::Result<Value, String> {
    value
        .as_date()
        .map(|date| Value::Text(date.format("%Y-%m-%d").to_string()))
        .ok_or_else(|| format!("'{value}' is not a date"))
}

fn absolute_url(value: &Value, config: &SiteConfig) -> std::result::Result<Value, String> {
    Ok(Value::Text(config.url_for(&value.to_string())))
}

fn page_menu(page: &Page, menu: &mut MenuBuilder, config: &SiteConfig) -> Result<()> {
    const LABEL: &str = "menu:page-menu";

    let leaf = page.get("menu").map(Value::to_string);
    let branch = page.get("menu-group").map(Value::to_string);
    if leaf.is_none() && branch.is_none() {
        return Ok(());
    }

    let title = ["menu-title", "title"]
        .iter()
        .find_map(|key| page.get(key).map(Value::to_string))
        .unwrap_or_else(|| page.name().to_string());
    let url = config.url_for(&normalize_permalink(page)?);

    let order = |keys: &[&str]| -> Result<i64> {
        let key = keys.iter().find(|key| page.has(key)).ok_or_else(|| SiteError::MissingKey {
            enricher: LABEL.to_string(),
            key: keys.join(" or "),
            page: page.name().to_string(),
        })?;

        page.get(key)
            .and_then(Value::as_integer)
            .ok_or_else(|| SiteError::Enricher {
                enricher: LABEL.to_string(),
                page: page.name().to_string(),
                message: format!("'{key}' must be an integer"),
            })
    };

    let conflict = |e: crate::menu::MenuError| SiteError::Enricher {
        enricher: LABEL.to_string(),
        page: page.name().to_string(),
        message: e.to_string(),
    };

    if let Some(name) = leaf {
        menu.add_leaf(&name, title.clone(), url.clone(), order(&["order"])?)
            .map_err(conflict)?;
    }

    if let Some(name) = branch {
        let child = MenuChild {
            title,
            url,
            date: page.get("date").and_then(Value::as_date),
        };
        let order = if menu.contains(&name) {
            0
        } else {
            order(&["menu-group-order", "order"])?
        };
        menu.add_child(&name, order, child).map_err(conflict)?;
    }

    Ok(())
}
