use crate::metadata::Value;
use crate::page::Page;
use crate::visitor::{ensure_target, PageVisitor, VisitError};

/// Splits the space-delimited `tags` value into a list.
///
/// Underscores inside a tag become spaces: `open_source rust` yields
/// `["open source", "rust"]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagVisitor;

impl PageVisitor for TagVisitor {
    fn name(&self) -> &str {
        "tag"
    }

    fn visit(&self, page: &mut Page) -> Result<(), VisitError> {
        ensure_target(self.name(), page)?;

        let Some(Value::Text(raw)) = page.get("tags") else {
            return Ok(());
        };

        let tags: Vec<String> = raw
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(|t| t.replace('_', " "))
            .collect();

        page.set("tags", tags);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownOptions;
    use crate::resource::RawFile;
    use pretty_assertions::assert_eq;

    fn page(extra: &str) -> Page {
        let content = format!(
            "---\nlayout: page\npublished: true\nauthor: A\ndate: 2000-01-01\npermalink: a.html\n{extra}---\n# A"
        );
        let mut page = Page::new(RawFile::new("sample.md", content));
        page.validate().unwrap();
        page.process(&MarkdownOptions::default()).unwrap();
        page
    }

    #[test]
    fn splits_tags_and_replaces_underscores() {
        let mut page = page("tags: rust open_source  static_site_generator\n");

        page.accept(&TagVisitor).unwrap();

        assert_eq!(
            page.get("tags"),
            Some(&Value::List(vec![
                "rust".to_string(),
                "open source".to_string(),
                "static site generator".to_string(),
            ]))
        );
    }

    #[test]
    fn missing_tags_is_a_no_op() {
        let mut page = page("");

        page.accept(&TagVisitor).unwrap();

        assert!(!page.has("tags"));
    }
}
