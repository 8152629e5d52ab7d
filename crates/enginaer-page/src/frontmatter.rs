//! Front matter extraction and parsing.
//!
//! A content file starts with a `---` line, followed by `key: value` lines,
//! followed by a closing `---`. Everything after the closing delimiter is
//! the Markdown body.

use crate::metadata::Metadata;

/// Delimiter that opens and closes the front matter block.
pub const DELIMITER: &str = "---";

/// Separator between a key and its value.
const SEPARATOR: &str = ": ";

/// Split raw text into parsed metadata and the remaining body.
pub fn split_front_matter(source: &str) -> Result<(Metadata, &str), FrontMatterError> {
    if !source.starts_with(DELIMITER) {
        return Err(FrontMatterError::MissingDelimiter);
    }

    // Search from offset 1 so the opening delimiter is skipped.
    let close = source[1..]
        .find(DELIMITER)
        .map(|pos| pos + 1)
        .ok_or(FrontMatterError::Unclosed)?;

    let block = source.get(DELIMITER.len()..close).unwrap_or("");
    let body = &source[close + DELIMITER.len()..];

    Ok((parse_metadata(block), body))
}

/// Parse a front matter block into metadata.
///
/// Lines are trimmed, then split on the first `": "`. Blank lines and
/// lines with an empty key are skipped. A line without a separator that
/// ends in `:` yields a key with an empty value; any other line without a
/// separator is skipped.
pub fn parse_metadata(block: &str) -> Metadata {
    let mut metadata = Metadata::new();

    for line in block.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        let (key, value) = match line.split_once(SEPARATOR) {
            Some((key, value)) => (key.trim(), value),
            None => match line.strip_suffix(':') {
                Some(key) => (key.trim(), ""),
                None => {
                    tracing::debug!("Skipping front matter line without separator: {:?}", line);
                    continue;
                }
            },
        };

        if key.is_empty() {
            continue;
        }

        metadata.set(key, value);
    }

    metadata
}

/// Errors that can occur when parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("The file must be started with metadata section.")]
    MissingDelimiter,

    #[error("Unclosed metadata section - missing closing ---")]
    Unclosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(metadata: &Metadata) -> Vec<(String, String)> {
        metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn splits_metadata_and_body() {
        let source = "---\nlayout: page\nauthor: Someone\n---\n# Heading\n";

        let (metadata, body) = split_front_matter(source).unwrap();

        assert_eq!(
            pairs(&metadata),
            vec![
                ("layout".to_string(), "page".to_string()),
                ("author".to_string(), "Someone".to_string()),
            ]
        );
        assert_eq!(body, "\n# Heading\n");
    }

    #[test]
    fn splits_on_first_separator_only() {
        let (metadata, _) = split_front_matter("---\ntitle: Part 1: Intro\n---\n").unwrap();

        assert_eq!(metadata.get_str("title"), Some("Part 1: Intro"));
    }

    #[test]
    fn trims_keys() {
        let source = "---\n            layout: page\n            published: false\n            ---\n# Heading";

        let (metadata, body) = split_front_matter(source).unwrap();

        assert_eq!(metadata.get_str("layout"), Some("page"));
        assert_eq!(metadata.get_str("published"), Some("false"));
        assert_eq!(body, "\n# Heading");
    }

    // Empty keys are tolerated rather than rejected.
    #[test]
    fn skips_lines_with_empty_key() {
        let source = "---\n: orphan value\nlayout: page\n\n---\n";

        let (metadata, _) = split_front_matter(source).unwrap();

        assert!(!metadata.has(""));
        assert_eq!(pairs(&metadata), vec![("layout".to_string(), "page".to_string())]);
    }

    #[test]
    fn drops_trailing_whitespace_from_values() {
        let source = "---\nlayout: post \npublished: true\t\ntitle:   Padded  \n---\n";

        let (metadata, _) = split_front_matter(source).unwrap();

        assert_eq!(metadata.get_str("layout"), Some("post"));
        assert_eq!(metadata.get_str("published"), Some("true"));
        assert_eq!(metadata.get_str("title"), Some("  Padded"));
    }

    #[test]
    fn keeps_blank_values() {
        let (metadata, _) = split_front_matter("---\npublished: \n---\n").unwrap();

        assert_eq!(metadata.get_str("published"), Some(""));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let source = "---\r\nlayout: post\r\ndate: 2000-01-01\r\n---\r\nBody";

        let (metadata, _) = split_front_matter(source).unwrap();

        assert_eq!(metadata.get_str("layout"), Some("post"));
        assert_eq!(metadata.get_str("date"), Some("2000-01-01"));
    }

    #[test]
    fn errors_without_opening_delimiter() {
        let result = split_front_matter("# Heading\n\nNo metadata.");

        assert!(matches!(result, Err(FrontMatterError::MissingDelimiter)));
    }

    #[test]
    fn errors_on_unclosed_block() {
        let result = split_front_matter("---\nlayout: page\n# Heading");

        assert!(matches!(result, Err(FrontMatterError::Unclosed)));
    }
}
