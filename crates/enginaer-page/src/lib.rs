//! Page model for the enginaer static site generator.
//!
//! This crate turns raw content files into processed pages: it validates the
//! file, splits the front matter from the body, renders the Markdown body to
//! HTML and lets visitors enrich the resulting metadata.

pub mod frontmatter;
pub mod markdown;
pub mod metadata;
pub mod page;
pub mod resource;
pub mod visitor;
pub mod visitors;

pub use frontmatter::{split_front_matter, FrontMatterError};
pub use markdown::{render_markdown, slugify, MarkdownOptions};
pub use metadata::{parse_date, Metadata, Value, MANDATORY_KEYS};
pub use page::{Page, PageError, PageState};
pub use resource::{Contents, RawFile, ResourceError};
pub use visitor::{ensure_target, PageVisitor, VisitError};
