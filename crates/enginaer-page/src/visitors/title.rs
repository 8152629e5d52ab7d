use std::sync::LazyLock;

use regex::Regex;

use crate::page::Page;
use crate::visitor::{ensure_target, PageVisitor, VisitError};

static H1_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<h1\s*.*>(.*)</h1>").expect("Invalid regex")
});

/// Text of the first `<h1>` element in rendered HTML.
pub fn extract_title(html: &str) -> Option<String> {
    H1_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Copies the first `<h1>` of the rendered body into `title`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleVisitor;

impl PageVisitor for TitleVisitor {
    fn name(&self) -> &str {
        "title"
    }

    fn visit(&self, page: &mut Page) -> Result<(), VisitError> {
        ensure_target(self.name(), page)?;

        if let Some(title) = extract_title(page.content()) {
            page.set("title", title);
        }

        Ok(())
    }
}
