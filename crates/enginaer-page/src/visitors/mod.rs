//! Built-in page visitors.

mod date;
mod tag;
mod title;

pub use date::DateVisitor;
pub use tag::TagVisitor;
pub use title::{extract_title, TitleVisitor};

use crate::visitor::PageVisitor;

/// Names accepted by [`builtin`].
pub const BUILTIN_VISITORS: [&str; 3] = ["title", "date", "tag"];

/// Instantiate a built-in visitor by name.
pub fn builtin(name: &str) -> Option<Box<dyn PageVisitor>> {
    match name {
        "title" => Some(Box::new(TitleVisitor)),
        "date" => Some(Box::new(DateVisitor)),
        "tag" => Some(Box::new(TagVisitor)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_resolve() {
        for name in BUILTIN_VISITORS {
            let visitor = builtin(name).unwrap();
            assert_eq!(visitor.name(), name);
        }
        assert!(builtin("unknown").is_none());
    }
}
