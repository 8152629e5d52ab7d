//! Site menu built from page metadata during load.

use chrono::NaiveDateTime;
use minijinja::Value;
use serde::Serialize;

use crate::registry::NamedRegistry;

/// A page linked from a menu branch.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuChild {
    pub title: String,
    pub url: String,
    pub date: Option<NaiveDateTime>,
}

/// A top-level menu entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// A single link.
    Leaf {
        title: String,
        url: String,
        order: i64,
    },
    /// A group of links, sorted by date.
    Branch {
        title: String,
        order: i64,
        children: Vec<MenuChild>,
    },
}

impl MenuEntry {
    pub fn order(&self) -> i64 {
        match self {
            Self::Leaf { order, .. } | Self::Branch { order, .. } => *order,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Leaf { title, .. } | Self::Branch { title, .. } => title,
        }
    }
}

/// Errors raised while building the menu.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("Menu entry '{0}' is a link and cannot hold children")]
    NotABranch(String),

    #[error("Menu entry '{0}' is a group and cannot be a link")]
    NotALeaf(String),
}

/// Accumulates menu entries while pages are loaded.
#[derive(Debug, Default)]
pub struct MenuBuilder {
    entries: NamedRegistry<MenuEntry>,
}

impl MenuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link. A later link with the same name replaces it.
    pub fn add_leaf(
        &mut self,
        name: &str,
        title: impl Into<String>,
        url: impl Into<String>,
        order: i64,
    ) -> Result<(), MenuError> {
        if let Some(MenuEntry::Branch { .. }) = self.entries.get(name) {
            return Err(MenuError::NotALeaf(name.to_string()));
        }

        let leaf = MenuEntry::Leaf {
            title: title.into(),
            url: url.into(),
            order,
        };
        if self.entries.insert(name, leaf).is_some() {
            tracing::warn!("Menu entry '{}' registered twice, keeping the last one", name);
        }
        Ok(())
    }

    /// Add a child to a branch, creating the branch on first use.
    ///
    /// The branch takes its order from the first child that creates it.
    pub fn add_child(&mut self, branch: &str, order: i64, child: MenuChild) -> Result<(), MenuError> {
        if !self.entries.contains(branch) {
            self.entries.insert(
                branch,
                MenuEntry::Branch {
                    title: branch.to_string(),
                    order,
                    children: Vec::new(),
                },
            );
        }

        match self.entries.get_mut(branch) {
            Some(MenuEntry::Branch { children, .. }) => {
                children.push(child);
                Ok(())
            }
            _ => Err(MenuError::NotABranch(branch.to_string())),
        }
    }

    /// Whether an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Sort and freeze the menu.
    ///
    /// Entries are ordered by `order`, branch children by date; undated
    /// children go last. Both sorts are stable.
    pub fn finish(self) -> Menu {
        let mut entries: Vec<(String, MenuEntry)> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect();

        entries.sort_by_key(|(_, entry)| entry.order());

        for (_, entry) in &mut entries {
            if let MenuEntry::Branch { children, .. } = entry {
                children.sort_by_key(|child| (child.date.is_none(), child.date));
            }
        }

        Menu { entries }
    }
}

/// The finalized, sorted menu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    entries: Vec<(String, MenuEntry)>,
}

#[derive(Serialize)]
struct ItemView<'a> {
    name: &'a str,
    title: &'a str,
    url: Option<&'a str>,
    order: i64,
    children: Vec<ChildView<'a>>,
    has_children: bool,
}

#[derive(Serialize)]
struct ChildView<'a> {
    title: &'a str,
    url: &'a str,
    date: Option<NaiveDateTime>,
}

impl Menu {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &MenuEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Template representation: a list of entries with their children.
    pub fn to_value(&self) -> Value {
        let items: Vec<ItemView> = self
            .entries
            .iter()
            .map(|(name, entry)| match entry {
                MenuEntry::Leaf { title, url, order } => ItemView {
                    name,
                    title,
                    url: Some(url),
                    order: *order,
                    children: Vec::new(),
                    has_children: false,
                },
                MenuEntry::Branch {
                    title,
                    order,
                    children,
                } => ItemView {
                    name,
                    title,
                    url: None,
                    order: *order,
                    children: children
                        .iter()
                        .map(|c| ChildView {
                            title: &c.title,
                            url: &c.url,
                            date: c.date,
                        })
                        .collect(),
                    has_children: !children.is_empty(),
                },
            })
            .collect();

        Value::from_serialize(&items)
    }
}
