//! Template data contexts.

use std::collections::BTreeMap;

use enginaer_page::Metadata;
use minijinja::value::ValueKind;
use minijinja::Value;

use crate::config::SiteConfig;
use crate::helpers::HelperTable;

/// Reserved key holding the rendered page body.
pub const CONTENT_KEY: &str = "content";

/// A data context assembled layer by layer.
///
/// Each layer overwrites keys set by earlier layers, so callers control
/// precedence through call order. Keys containing `-` are also stored with
/// `_` in its place, since templates cannot name `base-url` directly.
#[derive(Debug, Default, Clone)]
pub struct TemplateData {
    values: BTreeMap<String, Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    fn insert(&mut self, key: String, value: Value) {
        if key.contains('-') {
            self.values.insert(key.replace('-', "_"), value.clone());
        }
        self.values.insert(key, value);
    }

    /// Layer the site-wide options.
    pub fn with_config(mut self, config: &SiteConfig) -> Self {
        for (key, value) in config.iter() {
            self.insert(key.to_string(), Value::from_serialize(value));
        }
        self
    }

    /// Layer the template helper functions.
    pub fn with_helpers(mut self, helpers: &HelperTable) -> Self {
        for (name, function) in helpers.iter() {
            self.insert(name.to_string(), function.clone());
        }
        self
    }

    /// Layer page metadata.
    pub fn with_metadata(mut self, metadata: &Metadata) -> Self {
        for (key, value) in metadata.iter() {
            self.insert(key.to_string(), Value::from_serialize(value));
        }
        self
    }

    /// Layer every entry of a map value. Non-map values are ignored.
    pub fn with_value(mut self, value: &Value) -> Self {
        if value.kind() != ValueKind::Map {
            return self;
        }

        if let Ok(keys) = value.try_iter() {
            for key in keys {
                if let Ok(item) = value.get_item(&key) {
                    self.insert(key.to_string(), item);
                }
            }
        }
        self
    }

    /// Set the rendered body. Always the last layer.
    pub fn with_content(self, content: &str) -> Self {
        self.with(CONTENT_KEY, Value::from_safe_string(content.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::from_iter(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use pretty_assertions::assert_eq;

    #[test]
    fn later_layers_win() {
        let config = SiteConfig::with_base_url("https://example.com/").unwrap();
        let mut metadata = Metadata::new();
        metadata.set("base-url", "https://page.example.com/");
        metadata.set("content", "stray");

        let data = TemplateData::new()
            .with_config(&config)
            .with_metadata(&metadata)
            .with_content("<p>body</p>");

        assert_eq!(
            data.get("base-url").and_then(|v| v.as_str()),
            Some("https://page.example.com/")
        );
        assert_eq!(
            data.get("base_url").and_then(|v| v.as_str()),
            Some("https://page.example.com/")
        );
        assert_eq!(data.get("content").and_then(|v| v.as_str()), Some("<p>body</p>"));
    }

    #[test]
    fn merges_map_values() {
        let data = TemplateData::new()
            .with("a", 1)
            .with_value(&context! { a => 2, b => "x" })
            .with_value(&Value::from(3));

        assert_eq!(data.get("a"), Some(&Value::from(2)));
        assert_eq!(data.get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn content_renders_unescaped() {
        let mut env = minijinja::Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::Html);
        env.add_template("t", "{{ content }}").unwrap();

        let data = TemplateData::new().with_content("<h1>Heading</h1>");
        let output = env.get_template("t").unwrap().render(data.into_value()).unwrap();

        assert_eq!(output, "<h1>Heading</h1>");
    }
}
