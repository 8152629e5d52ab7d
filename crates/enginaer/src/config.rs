//! Configuration file (enginaer.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use enginaer_page::{visitors, MarkdownOptions, PageVisitor};
use enginaer_site::{
    helpers, EnricherDecl, EnricherPipeline, FixerDecl, FixerRegistry, GeneratorOptions,
    HelperSet, SiteConfig, SiteError,
};

/// Default config file name.
pub const CONFIG_FILE: &str = "enginaer.toml";

/// One glob or a list of globs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Globs {
    One(String),
    Many(Vec<String>),
}

impl Default for Globs {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Globs {
    pub fn patterns(&self) -> Vec<String> {
        match self {
            Self::One(pattern) => vec![pattern.clone()],
            Self::Many(patterns) => patterns.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(pattern) => pattern.trim().is_empty(),
            Self::Many(patterns) => patterns.iter().all(|p| p.trim().is_empty()),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_base")]
    pub base: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    pub page: Option<PageSection>,
    pub template: Option<TemplateSection>,
    #[serde(default)]
    pub asset: AssetSection,
    #[serde(default)]
    pub fixers: Vec<FixerDecl>,
    #[serde(default)]
    pub site: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageSection {
    #[serde(default)]
    pub path: Globs,
    /// Built-in visitor names, in application order.
    #[serde(default)]
    pub visitors: Vec<String>,
    #[serde(default)]
    pub markdown: MarkdownOptions,
    #[serde(default)]
    pub enrichers: Vec<EnricherDecl>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateSection {
    #[serde(default)]
    pub path: Globs,
    /// Built-in helper set names, merged in order.
    #[serde(default)]
    pub helpers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetSection {
    #[serde(default)]
    pub path: Globs,
    /// Directory asset paths are made relative to. Defaults to `base`.
    pub base: Option<PathBuf>,
}

fn default_base() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl ConfigFile {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: ConfigFile = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> enginaer_site::Result<()> {
        if self.page.as_ref().map_or(true, |page| page.path.is_empty()) {
            return Err(SiteError::config("the mandatory key 'page.path' is missing"));
        }
        if self.template.as_ref().map_or(true, |template| template.path.is_empty()) {
            return Err(SiteError::config("the mandatory key 'template.path' is missing"));
        }
        if !self.site.contains_key(enginaer_site::BASE_URL_KEY) {
            return Err(SiteError::config(format!(
                "the mandatory key 'site.{}' is missing",
                enginaer_site::BASE_URL_KEY
            )));
        }
        Ok(())
    }

    pub fn page_patterns(&self) -> Vec<String> {
        self.page.as_ref().map(|p| p.path.patterns()).unwrap_or_default()
    }

    pub fn template_patterns(&self) -> Vec<String> {
        self.template.as_ref().map(|t| t.path.patterns()).unwrap_or_default()
    }

    /// Site options from `[site]` plus command-line definitions.
    pub fn site_config(&self, defines: &[(String, String)]) -> enginaer_site::Result<SiteConfig> {
        let options = self
            .site
            .iter()
            .map(|(key, value)| {
                serde_json::to_value(value)
                    .map(|value| (key.clone(), value))
                    .map_err(|e| SiteError::config(format!("site.{key}: {e}")))
            })
            .collect::<enginaer_site::Result<Vec<_>>>()?;

        let mut site = SiteConfig::new(options)?;
        for (key, value) in defines {
            site.define(key.as_str(), serde_json::Value::String(value.clone()))?;
        }
        Ok(site)
    }

    /// Instantiate the configured visitors.
    pub fn visitors(&self) -> enginaer_site::Result<Vec<Box<dyn PageVisitor>>> {
        let names = self.page.as_ref().map(|p| p.visitors.as_slice()).unwrap_or_default();

        names
            .iter()
            .map(|name| {
                visitors::builtin(name).ok_or_else(|| {
                    SiteError::config(format!(
                        "unknown visitor '{name}', expected one of {}",
                        visitors::BUILTIN_VISITORS.join(", ")
                    ))
                })
            })
            .collect()
    }

    /// Instantiate the configured helper sets.
    pub fn helpers(&self) -> enginaer_site::Result<Vec<HelperSet>> {
        let names = self.template.as_ref().map(|t| t.helpers.as_slice()).unwrap_or_default();

        names
            .iter()
            .map(|name| {
                helpers::builtin(name).ok_or_else(|| {
                    SiteError::config(format!(
                        "unknown helper set '{name}', expected one of {}",
                        helpers::BUILTIN_HELPER_SETS.join(", ")
                    ))
                })
            })
            .collect()
    }

    /// Everything the generator needs besides the source files.
    pub fn generator_options(&self, defines: &[(String, String)]) -> enginaer_site::Result<GeneratorOptions> {
        let page = self.page.as_ref();

        Ok(GeneratorOptions {
            site: self.site_config(defines)?,
            markdown: page.map(|p| p.markdown.clone()).unwrap_or_default(),
            enrichers: EnricherPipeline::from_decls(page.map(|p| p.enrichers.as_slice()).unwrap_or_default())?,
            fixers: FixerRegistry::from_decls(&self.fixers)?,
        })
    }
}

/// Parse a `key=value` command-line definition.
pub fn parse_define(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{input}'")),
    }
}
