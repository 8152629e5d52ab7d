//! Template helper functions.
//!
//! Helpers are callable template values grouped into named sets. All
//! loaded sets are flattened into one [`HelperTable`] that is layered into
//! every page's data context.

use std::collections::BTreeMap;

use minijinja::Value;

/// Names accepted by [`builtin`].
pub const BUILTIN_HELPER_SETS: [&str; 1] = ["menu"];

/// A named group of helper functions.
#[derive(Debug, Clone)]
pub struct HelperSet {
    name: String,
    functions: Vec<(String, Value)>,
}

impl HelperSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Add a callable value built with [`Value::from_function`].
    pub fn with_function(mut self, name: impl Into<String>, function: Value) -> Self {
        self.functions.push((name.into(), function));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Flat name → function table.
#[derive(Debug, Clone, Default)]
pub struct HelperTable {
    functions: BTreeMap<String, Value>,
}

impl HelperTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a set into the table. Later keys overwrite earlier ones.
    pub fn merge(&mut self, set: HelperSet) {
        for (name, function) in set.functions {
            if self.functions.insert(name.clone(), function).is_some() {
                tracing::debug!("Helper '{}' overwritten by set '{}'", name, set.name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.functions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Instantiate a built-in helper set by name.
pub fn builtin(name: &str) -> Option<HelperSet> {
    match name {
        "menu" => Some(menu_helpers()),
        _ => None,
    }
}

/// Helpers for rendering menu entries.
///
/// - `separator(item)`: the item's `role` is `separator`
/// - `has_children(item)`: the item has a non-empty `children` list
/// - `url(item)`: the item's `url`, or `javascript:;` when it has none
pub fn menu_helpers() -> HelperSet {
    HelperSet::new("menu")
        .with_function("separator", Value::from_function(separator))
        .with_function("has_children", Value::from_function(has_children))
        .with_function("url", Value::from_function(url))
}

fn separator(item: Value) -> bool {
    item.get_attr("role")
        .ok()
        .and_then(|role| role.as_str().map(|r| r == "separator"))
        .unwrap_or(false)
}

fn has_children(item: Value) -> bool {
    item.get_attr("children")
        .ok()
        .and_then(|children| children.len())
        .is_some_and(|len| len > 0)
}

fn url(item: Value) -> String {
    match item.get_attr("url") {
        Ok(url) if !url.is_undefined() && !url.is_none() => url.to_string(),
        _ => "javascript:;".to_string(),
    }
}
