//! Name-keyed registries populated during the load phase.

use std::collections::HashMap;

use enginaer_page::{Page, PageVisitor};

use crate::template::Template;

/// An insertion-ordered, name-keyed collection.
///
/// Registering an existing name replaces the entry in place: the newcomer
/// wins but the original position is kept.
#[derive(Debug)]
pub struct NamedRegistry<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for NamedRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> NamedRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry. Returns the replaced entry, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.index.get(name).map(|&pos| &mut self.entries[pos].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Processed pages keyed by page name.
pub type PageRegistry = NamedRegistry<Page>;

/// Processed templates keyed by template name.
pub type TemplateRegistry = NamedRegistry<Template>;

/// Page visitors keyed by visitor name, in application order.
pub type VisitorRegistry = NamedRegistry<Box<dyn PageVisitor>>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_registration_order() {
        let mut registry = NamedRegistry::new();
        registry.insert("b", 1);
        registry.insert("a", 2);
        registry.insert("c", 3);

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_name_overwrites_in_place() {
        let mut registry = NamedRegistry::new();
        registry.insert("first", 1);
        registry.insert("second", 2);

        let replaced = registry.insert("first", 10);

        assert_eq!(replaced, Some(1));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec![("first", &10), ("second", &2)]
        );
    }

    #[test]
    fn clear_empties_registry() {
        let mut registry = NamedRegistry::new();
        registry.insert("a", 1);

        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
    }
}
