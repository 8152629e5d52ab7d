//! Scaffold a new site.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::CONFIG_FILE;

const SCAFFOLD: [(&str, &str); 7] = [
    (CONFIG_FILE, DEFAULT_CONFIG),
    ("pages/index.md", DEFAULT_PAGE),
    ("posts/hello-world.md", DEFAULT_POST),
    ("templates/page.jinja", DEFAULT_PAGE_LAYOUT),
    ("templates/post.jinja", DEFAULT_POST_LAYOUT),
    ("templates/_menu.jinja", DEFAULT_MENU_PARTIAL),
    ("assets/style.css", DEFAULT_STYLE),
];

/// Run the init command in the current directory.
pub fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing enginaer...");

    let created = scaffold(Path::new("."), yes)?;
    if created.is_empty() {
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'enginaer build' to generate the site.");
    Ok(())
}

/// Write the starter files under `root`.
///
/// Refuses to touch an existing config unless `yes` is set; other existing
/// files are only overwritten with `yes`.
pub fn scaffold(root: &Path, yes: bool) -> Result<Vec<PathBuf>> {
    if root.join(CONFIG_FILE).exists() && !yes {
        tracing::warn!("{} already exists. Use --yes to overwrite.", CONFIG_FILE);
        return Ok(Vec::new());
    }

    let mut created = Vec::new();
    for (relative, content) in SCAFFOLD {
        let path = root.join(relative);
        if path.exists() && !yes {
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {relative}"))?;
        tracing::info!("Created {}", relative);
        created.push(path);
    }

    Ok(created)
}

const DEFAULT_CONFIG: &str = r#"# enginaer configuration

# Directory all paths below are relative to
base = "."

# Output directory for the built site
output = "dist"

[page]
path = ["pages/**/*.md", "posts/**/*.md"]

# Applied in order to every page
visitors = ["title", "date", "tag"]

[page.markdown]
breaks = true
header-ids = false

[[page.enrichers]]
kind = "menu"
handler = "page-menu"

[[page.enrichers]]
kind = "generate"
source = "date"
target = "iso-date"
handler = "iso-date"

[template]
path = "templates/*.jinja"
helpers = ["menu"]

[asset]
path = "assets/**/*"
base = "assets"

[[fixers]]
name = "external-links"
pattern = '<a href="(https?://[^"]+)">'
replacement = '<a href="$1" rel="noopener">'

[site]
base-url = "/"
site-name = "My Site"
"#;

const DEFAULT_PAGE: &str = r#"---
layout: page
published: true
author: Your Name
date: 2024-01-01
permalink: /index.html
menu: home
menu-title: Home
order: 1
---
# Welcome

This site is built with **enginaer**. Edit `pages/index.md` to change this page.
"#;

const DEFAULT_POST: &str = r#"---
layout: post
published: true
author: Your Name
date: 2024-01-02
permalink: /posts/hello-world.html
tags: getting_started notes
menu-group: Posts
menu-group-order: 2
---
# Hello, world

Posts live in `posts/` and are grouped under *Posts* in the menu, oldest first.

Visit [the enginaer docs](https://example.com) to learn more.
"#;

const DEFAULT_PAGE_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }} | {{ site_name }}</title>
<link rel="stylesheet" href="{{ base_path | safe }}style.css">
</head>
<body>
{% include "_menu" %}
<main>
{{ content | safe }}
</main>
</body>
</html>
"#;

const DEFAULT_POST_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }} | {{ site_name }}</title>
<link rel="stylesheet" href="{{ base_path | safe }}style.css">
</head>
<body>
{% include "_menu" %}
<article>
<p class="meta">{{ author }} on {{ iso_date }}</p>
{{ content | safe }}
<ul class="tags">{% for tag in tags %}<li>{{ tag }}</li>{% endfor %}</ul>
</article>
</body>
</html>
"#;

const DEFAULT_MENU_PARTIAL: &str = r#"<nav>
<ul>
{% for item in menu %}{% if has_children(item) %}<li>{{ item.title }}
<ul>
{% for child in item.children %}<li><a href="{{ child.url | safe }}">{{ child.title }}</a></li>
{% endfor %}</ul>
</li>
{% elif not separator(item) %}<li><a href="{{ url(item) | safe }}">{{ item.title }}</a></li>
{% endif %}{% endfor %}</ul>
</nav>
"#;

const DEFAULT_STYLE: &str = r#"body {
  font-family: sans-serif;
  max-width: 48rem;
  margin: 0 auto;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build::build;
    use crate::config::ConfigFile;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn scaffolds_every_file() {
        let dir = TempDir::new().unwrap();

        let created = scaffold(dir.path(), false).unwrap();

        assert_eq!(created.len(), SCAFFOLD.len());
        assert!(dir.path().join("templates/_menu.jinja").exists());
    }

    #[test]
    fn keeps_existing_site_without_yes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "custom").unwrap();

        let created = scaffold(dir.path(), false).unwrap();

        assert!(created.is_empty());
        assert_eq!(fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(), "custom");

        let created = scaffold(dir.path(), true).unwrap();
        assert_eq!(created.len(), SCAFFOLD.len());
    }

    #[test]
    fn scaffolded_site_builds() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), false).unwrap();

        let config = ConfigFile::load(&dir.path().join(CONFIG_FILE)).unwrap();
        let result = build(&config, dir.path(), None, &[]).unwrap();

        assert_eq!(result.pages, 2);
        assert_eq!(result.assets, 1);

        let post = fs::read_to_string(result.output_dir.join("posts/hello-world.html")).unwrap();
        assert!(post.contains("<title>Hello, world | My Site</title>"));
        assert!(post.contains("<li>getting started</li>"));
        assert!(post.contains("Your Name on 2024-01-02"));
        assert!(post.contains(r#"<a href="https://example.com" rel="noopener">"#));
        assert!(post.contains(r#"<a href="/posts/hello-world.html">Hello, world</a>"#));
        assert!(post.contains(r#"<a href="/index.html">Home</a>"#));
        assert!(result.output_dir.join("style.css").exists());
    }
}
