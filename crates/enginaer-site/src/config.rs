//! Site-wide configuration consumed by the generator.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::error::{Result, SiteError};

/// Key of the mandatory base URL option.
pub const BASE_URL_KEY: &str = "base-url";

/// Site-wide key/value options, exposed to every template.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    values: BTreeMap<String, JsonValue>,
}

impl SiteConfig {
    /// Build a config from options.
    ///
    /// Fails if an option appears twice or the base URL is absent.
    pub fn new(options: impl IntoIterator<Item = (String, JsonValue)>) -> Result<Self> {
        let mut config = Self {
            values: BTreeMap::new(),
        };

        for (key, value) in options {
            config.define(key, value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Config with only a base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new([(BASE_URL_KEY.to_string(), JsonValue::String(base_url.into()))])
    }

    /// Add an option that must not exist yet.
    pub fn define(&mut self, key: impl Into<String>, value: JsonValue) -> Result<()> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(SiteError::duplicate("config option", key));
        }
        self.values.insert(key, value);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match self.values.get(BASE_URL_KEY) {
            Some(JsonValue::String(url)) if !url.trim().is_empty() => Ok(()),
            Some(_) => Err(SiteError::config(format!(
                "'{BASE_URL_KEY}' must be a non-empty string"
            ))),
            None => Err(SiteError::config(format!(
                "the mandatory key '{BASE_URL_KEY}' is missing in the site config"
            ))),
        }
    }

    /// The site base URL.
    pub fn base_url(&self) -> &str {
        self.get_str(BASE_URL_KEY).unwrap_or_default()
    }

    /// Join a site-relative path onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url();
        let path = path.trim_start_matches("./").trim_start_matches('/');
        if base.ends_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(JsonValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
