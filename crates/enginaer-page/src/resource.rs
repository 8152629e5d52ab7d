//! Raw input files handed to the pipeline by the file-loading layer.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Contents of a raw file.
pub enum Contents {
    /// The file carries no contents at all.
    Null,
    /// Fully materialized bytes.
    Buffer(Vec<u8>),
    /// A streaming source. Never read by the pipeline.
    Stream(Box<dyn Read>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A file path together with its contents.
#[derive(Debug)]
pub struct RawFile {
    /// Path the file was loaded from
    pub path: PathBuf,

    /// File contents
    pub contents: Contents,
}

impl RawFile {
    /// Create a file from materialized bytes.
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Buffer(bytes.into()),
        }
    }

    /// Create a file without contents.
    pub fn null(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Null,
        }
    }

    /// Create a file backed by a stream.
    pub fn stream(path: impl Into<PathBuf>, reader: impl Read + 'static) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Stream(Box::new(reader)),
        }
    }

    /// File name without its last extension.
    ///
    /// `about.tr.md` yields `about.tr`.
    pub fn name(&self) -> String {
        file_stem(&self.path)
    }

    /// Last extension of the file name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Check that the contents are materialized and non-empty.
    pub fn ensure_materialized(&self) -> Result<&[u8], ResourceError> {
        match &self.contents {
            Contents::Null => Err(ResourceError::EmptyFile(self.path.clone())),
            Contents::Stream(_) => Err(ResourceError::UnsupportedStream(self.path.clone())),
            Contents::Buffer(bytes) if bytes.is_empty() => {
                Err(ResourceError::EmptyFile(self.path.clone()))
            }
            Contents::Buffer(bytes) => Ok(bytes),
        }
    }

    /// Materialized contents decoded as UTF-8.
    pub fn text(&self) -> Result<&str, ResourceError> {
        let bytes = self.ensure_materialized()?;
        std::str::from_utf8(bytes).map_err(|_| ResourceError::InvalidUtf8(self.path.clone()))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Errors raised while checking a raw file.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("The file is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("The stream is not supported: {}", .0.display())]
    UnsupportedStream(PathBuf),

    #[error("The file is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_from_stem() {
        assert_eq!(RawFile::new("page/about.tr.md", "---").name(), "about.tr");
        assert_eq!(RawFile::new("post.jinja", "x").extension(), Some("jinja"));
    }

    #[test]
    fn rejects_null_and_empty_contents() {
        let null = RawFile::null("a.md");
        assert!(matches!(
            null.ensure_materialized(),
            Err(ResourceError::EmptyFile(_))
        ));

        let empty = RawFile::new("a.md", Vec::new());
        assert!(matches!(
            empty.ensure_materialized(),
            Err(ResourceError::EmptyFile(_))
        ));
    }

    #[test]
    fn rejects_streams() {
        let file = RawFile::stream("stream.md", std::io::Cursor::new(b"# Heading".to_vec()));

        assert!(matches!(
            file.ensure_materialized(),
            Err(ResourceError::UnsupportedStream(_))
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let file = RawFile::new("a.md", vec![0xff, 0xfe]);

        assert!(matches!(file.text(), Err(ResourceError::InvalidUtf8(_))));
    }
}
