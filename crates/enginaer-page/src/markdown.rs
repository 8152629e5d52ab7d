//! Markdown to HTML rendering.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;

/// Markdown renderer options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkdownOptions {
    /// Render single line breaks as `<br />`
    pub breaks: bool,

    /// Add slug ids to headings
    pub header_ids: bool,

    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,

    /// Curly quotes and dashes
    pub smart_punctuation: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            breaks: true,
            header_ids: false,
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
        }
    }
}

impl MarkdownOptions {
    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options
    }
}

/// Render Markdown source to HTML.
pub fn render_markdown(source: &str, options: &MarkdownOptions) -> String {
    let parser = Parser::new_ext(source, options.parser_options());

    let mut events: Vec<Event> = parser
        .map(|event| match event {
            Event::SoftBreak if options.breaks => Event::HardBreak,
            other => other,
        })
        .collect();

    if options.header_ids {
        assign_heading_ids(&mut events);
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

/// Give every heading without an explicit id a slug of its text.
fn assign_heading_ids(events: &mut [Event]) {
    let mut i = 0;
    while i < events.len() {
        if let Event::Start(Tag::Heading { id: None, .. }) = &events[i] {
            let mut text = String::new();
            for event in &events[i + 1..] {
                match event {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
            }

            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(slugify(&text)));
            }
        }
        i += 1;
    }
}

/// Lowercase `text` and join its alphanumeric runs with `-`.
///
/// Apostrophes are dropped so a contraction stays one word; any other
/// non-alphanumeric run becomes a single separator.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separate = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if separate && !slug.is_empty() {
                slug.push('-');
            }
            separate = false;
            slug.extend(c.to_lowercase());
        } else if c != '\'' && c != '\u{2019}' {
            separate = true;
        }
    }

    slug
}
