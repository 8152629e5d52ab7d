//! Site generation: load sources, render pages, collect artifacts.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use enginaer_page::{MarkdownOptions, Page, PageVisitor, RawFile};
use minijinja::Value;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::context::TemplateData;
use crate::enricher::EnricherPipeline;
use crate::error::{Result, SiteError};
use crate::fixer::FixerRegistry;
use crate::helpers::{HelperSet, HelperTable};
use crate::menu::{Menu, MenuBuilder};
use crate::registry::{PageRegistry, TemplateRegistry, VisitorRegistry};
use crate::template::{self, Template};

/// Settings fixed for the lifetime of a generator.
#[derive(Debug)]
pub struct GeneratorOptions {
    /// Site-wide options exposed to every template.
    pub site: SiteConfig,

    /// Markdown renderer options.
    pub markdown: MarkdownOptions,

    /// Enrichers applied to every page after the visitors.
    pub enrichers: EnricherPipeline,

    /// Text fixers applied to every rendered page.
    pub fixers: FixerRegistry,
}

impl GeneratorOptions {
    pub fn new(site: SiteConfig) -> Self {
        Self {
            site,
            markdown: MarkdownOptions::default(),
            enrichers: EnricherPipeline::new(),
            fixers: FixerRegistry::new(),
        }
    }
}

/// Everything consumed by one load.
#[derive(Default)]
pub struct SiteSources {
    pub templates: Vec<RawFile>,
    pub helpers: Vec<HelperSet>,
    pub visitors: Vec<Box<dyn PageVisitor>>,
    pub pages: Vec<RawFile>,
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Output path relative to the site root.
    pub path: PathBuf,

    /// Rendered bytes.
    pub bytes: Vec<u8>,
}

/// Where a generator is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Unloaded,
    Loaded,
    Generated,
}

impl GeneratorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Generated => "generated",
        }
    }
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything built by a successful load.
#[derive(Default)]
struct Loaded {
    templates: TemplateRegistry,
    helpers: HelperTable,
    visitors: VisitorRegistry,
    pages: PageRegistry,
    menu: Menu,
}

/// Drives a run: `load` then `generate`.
pub struct SiteGenerator {
    options: GeneratorOptions,
    state: GeneratorState,
    loaded: Loaded,
}

impl SiteGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            state: GeneratorState::Unloaded,
            loaded: Loaded::default(),
        }
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.loaded.templates
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.loaded.pages
    }

    pub fn menu(&self) -> &Menu {
        &self.loaded.menu
    }

    /// Drop everything loaded and return to `Unloaded`.
    pub fn reset(&mut self) {
        self.loaded = Loaded::default();
        self.state = GeneratorState::Unloaded;
    }

    /// Load templates, helpers, visitors and pages.
    ///
    /// Any failure aborts the whole load and leaves the generator
    /// unloaded.
    pub fn load(&mut self, sources: SiteSources) -> Result<()> {
        self.reset();
        let start = Instant::now();

        let mut loaded = Loaded::default();

        for file in sources.templates {
            let mut template = Template::new(file);
            template.process()?;
            tracing::debug!("Loaded template {}", template.name());

            let name = template.name().to_string();
            if loaded.templates.insert(name.as_str(), template).is_some() {
                tracing::warn!("Template '{}' loaded twice, keeping the last one", name);
            }
        }

        for set in sources.helpers {
            tracing::debug!("Loaded helper set {}", set.name());
            loaded.helpers.merge(set);
        }

        for visitor in sources.visitors {
            let name = visitor.name().to_string();
            tracing::debug!("Registered visitor {}", name);
            if loaded.visitors.insert(name.as_str(), visitor).is_some() {
                tracing::warn!("Visitor '{}' registered twice, keeping the last one", name);
            }
        }

        for file in sources.pages {
            let mut page = Page::new(file);
            page.validate()?;
            page.process(&self.options.markdown)?;
            tracing::debug!("Loaded page {}", page.name());

            let name = page.name().to_string();
            if loaded.pages.insert(name.as_str(), page).is_some() {
                tracing::warn!("Page '{}' loaded twice, keeping the last one", name);
            }
        }

        for page in loaded.pages.values_mut() {
            for visitor in loaded.visitors.values() {
                page.accept(visitor.as_ref())?;
            }
        }

        let mut menu = MenuBuilder::new();
        for page in loaded.pages.values_mut() {
            self.options.enrichers.apply(page, &mut menu, &self.options.site)?;
            page.mark_enriched()?;
        }
        loaded.menu = menu.finish();

        tracing::info!(
            "Loaded {} pages, {} templates, {} visitors in {}ms",
            loaded.pages.len(),
            loaded.templates.len(),
            loaded.visitors.len(),
            start.elapsed().as_millis()
        );

        self.loaded = loaded;
        self.state = GeneratorState::Loaded;
        Ok(())
    }

    /// Render every loaded page through its layout.
    ///
    /// Artifacts come out in page registration order.
    pub fn generate(&mut self) -> Result<Vec<Artifact>> {
        if self.state != GeneratorState::Loaded {
            return Err(SiteError::InvalidState {
                operation: "generate",
                state: self.state.as_str(),
            });
        }

        let start = Instant::now();
        let site = &self.options.site;
        let env = template::environment(self.loaded.templates.values())?;

        let pages = self.page_list()?;
        let menu = self.loaded.menu.to_value();

        let mut seen = HashSet::new();
        let mut artifacts = Vec::with_capacity(self.loaded.pages.len());

        for page in self.loaded.pages.values() {
            let layout = page.metadata().get_str("layout").unwrap_or_default();
            if !self.loaded.templates.contains(layout) {
                return Err(SiteError::UnknownLayout {
                    page: page.name().to_string(),
                    layout: layout.to_string(),
                });
            }

            let permalink = normalize_permalink(page)?;
            if !seen.insert(permalink.clone()) {
                tracing::warn!("Permalink '{}' is used by more than one page", permalink);
            }

            let data = TemplateData::new()
                .with_config(site)
                .with_helpers(&self.loaded.helpers)
                .with("pages", pages.clone())
                .with("menu", menu.clone())
                .with_metadata(page.metadata())
                .with("base-path", site.base_url())
                .with("permalink", permalink.as_str())
                .with("url", site.url_for(&permalink))
                .with_content(page.content());

            let output = template::render(&env, layout, data.into_value())?;
            let output = self.options.fixers.apply(output);
            tracing::debug!("Rendered {} -> {}", page.name(), permalink);

            artifacts.push(Artifact {
                path: PathBuf::from(permalink),
                bytes: output.into_bytes(),
            });
        }

        tracing::info!(
            "Generated {} pages in {}ms",
            artifacts.len(),
            start.elapsed().as_millis()
        );

        self.state = GeneratorState::Generated;
        Ok(artifacts)
    }

    /// All pages sorted by date, undated pages last.
    fn page_list(&self) -> Result<Value> {
        #[derive(Serialize)]
        struct Entry<'a> {
            #[serde(flatten)]
            metadata: &'a enginaer_page::Metadata,
            name: &'a str,
            published: bool,
            content: &'a str,
            url: String,
        }

        let mut pages: Vec<&Page> = self.loaded.pages.values().collect();
        pages.sort_by_key(|page| {
            let date = page.get("date").and_then(|d| d.as_date());
            (date.is_none(), date)
        });

        let entries = pages
            .into_iter()
            .map(|page| {
                Ok(Entry {
                    metadata: page.metadata(),
                    name: page.name(),
                    published: page.published().unwrap_or(false),
                    content: page.content(),
                    url: self.options.site.url_for(&normalize_permalink(page)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Value::from_serialize(&entries))
    }
}

/// The page's permalink as a clean relative path.
///
/// Leading `./` and `/` are stripped. Empty permalinks and permalinks
/// climbing out of the site root are rejected.
pub fn normalize_permalink(page: &Page) -> Result<String> {
    let raw = page.get("permalink").map(ToString::to_string).unwrap_or_default();

    let mut permalink = raw.trim();
    loop {
        let stripped = permalink.trim_start_matches('/');
        let stripped = stripped.strip_prefix("./").unwrap_or(stripped);
        if stripped == permalink {
            break;
        }
        permalink = stripped;
    }

    let invalid = permalink.is_empty()
        || Path::new(permalink)
            .components()
            .any(|c| matches!(c, Component::ParentDir));
    if invalid {
        return Err(SiteError::InvalidPermalink {
            page: page.name().to_string(),
            permalink: raw,
        });
    }

    Ok(permalink.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::EnricherDecl;
    use crate::helpers::menu_helpers;
    use enginaer_page::visitors::{DateVisitor, TitleVisitor};
    use enginaer_page::{FrontMatterError, PageError, PageState, VisitError};
    use pretty_assertions::assert_eq;

    fn page(name: &str, date: &str, body: &str) -> RawFile {
        page_with(name, date, "", body)
    }

    /// Lines in `extra` override the defaults.
    fn page_with(name: &str, date: &str, extra: &str, body: &str) -> RawFile {
        RawFile::new(
            format!("{name}.md"),
            format!(
                "---\nlayout: post\npublished: true\nauthor: Someone\ndate: {date}\npermalink: /{name}.html\n{extra}---\n{body}"
            ),
        )
    }

    fn template(name: &str, source: &str) -> RawFile {
        RawFile::new(format!("{name}.jinja"), source)
    }

    fn generator() -> SiteGenerator {
        SiteGenerator::new(GeneratorOptions::new(
            SiteConfig::with_base_url("https://example.com/").unwrap(),
        ))
    }

    fn text(artifact: &Artifact) -> &str {
        std::str::from_utf8(&artifact.bytes).unwrap()
    }

    /// Reads `title` written by an earlier visitor.
    struct TitleCopier;

    impl PageVisitor for TitleCopier {
        fn name(&self) -> &str {
            "title-copier"
        }

        fn visit(&self, page: &mut Page) -> std::result::Result<(), VisitError> {
            let copy = page
                .get("title")
                .map(ToString::to_string)
                .unwrap_or_else(|| "undefined".to_string());
            page.set("heading", copy);
            Ok(())
        }
    }

    #[test]
    fn pages_list_is_sorted_by_date() {
        let mut generator = generator();
        generator
            .load(SiteSources {
                templates: vec![template(
                    "post",
                    "{% for p in pages %}{{ p.name }}:{{ p.date }};{% endfor %}",
                )],
                pages: vec![
                    page("later", "2000-01-03", "b"),
                    page("undated", "someday", "c"),
                    page("earlier", "2000-01-01", "a"),
                ],
                ..Default::default()
            })
            .unwrap();

        let artifacts = generator.generate().unwrap();

        assert_eq!(artifacts.len(), 3);
        assert_eq!(
            text(&artifacts[0]),
            "earlier:2000-01-01;later:2000-01-03;undated:someday;"
        );
        assert_eq!(generator.state(), GeneratorState::Generated);
    }

    #[test]
    fn visitor_order_is_registration_order() {
        let render = |visitors: Vec<Box<dyn PageVisitor>>| {
            let mut generator = generator();
            generator
                .load(SiteSources {
                    templates: vec![template("post", "{{ heading }}")],
                    visitors,
                    pages: vec![page("a", "2000-01-01", "# Heading")],
                    ..Default::default()
                })
                .unwrap();
            let artifacts = generator.generate().unwrap();
            text(&artifacts[0]).to_string()
        };

        assert_eq!(render(vec![Box::new(TitleVisitor), Box::new(TitleCopier)]), "Heading");
        assert_eq!(render(vec![Box::new(TitleCopier), Box::new(TitleVisitor)]), "undefined");
    }

    /// Writes its own label under `stamp`.
    struct Stamp(&'static str);

    impl PageVisitor for Stamp {
        fn name(&self) -> &str {
            "stamp"
        }

        fn visit(&self, page: &mut Page) -> std::result::Result<(), VisitError> {
            page.set("stamp", self.0);
            Ok(())
        }
    }

    #[test]
    fn last_loaded_template_and_visitor_win() {
        let mut generator = generator();
        generator
            .load(SiteSources {
                templates: vec![
                    RawFile::new("old/post.jinja", "old {{ stamp }}"),
                    RawFile::new("new/post.jinja", "new {{ stamp }}"),
                ],
                visitors: vec![Box::new(Stamp("first")), Box::new(Stamp("second"))],
                pages: vec![page("a", "2000-01-01", "body")],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(generator.templates().len(), 1);
        let artifacts = generator.generate().unwrap();

        assert_eq!(text(&artifacts[0]), "new second");
    }

    #[test]
    fn loaded_pages_are_enriched() {
        let mut generator = generator();
        generator
            .load(SiteSources {
                templates: vec![template("post", "{{ content | safe }}")],
                pages: vec![page("a", "2000-01-01", "body")],
                ..Default::default()
            })
            .unwrap();

        let page = generator.pages().get("a").unwrap();
        assert_eq!(page.state(), PageState::Enriched);
    }

    #[test]
    fn renders_context_layers() {
        let mut options = GeneratorOptions::new(
            SiteConfig::new([
                ("base-url".to_string(), "https://example.com".into()),
                ("site-name".to_string(), "Demo".into()),
                ("author".to_string(), "Site Owner".into()),
            ])
            .unwrap(),
        );
        options.fixers = FixerRegistry::from_decls(&[crate::fixer::FixerDecl {
            name: "em".into(),
            pattern: "<(/?)em>".into(),
            replacement: "<${1}i>".into(),
        }])
        .unwrap();
        let mut generator = SiteGenerator::new(options);

        generator
            .load(SiteSources {
                templates: vec![
                    template(
                        "post",
                        "{{ site_name }}{{ author }}|{{ url | safe }}|{{ permalink }}|{% include \"_footer\" %}|{{ content | safe }}",
                    ),
                    template("_footer", "{{ base_path | safe }}"),
                ],
                pages: vec![page("a", "2000-01-01", "*hi*")],
                ..Default::default()
            })
            .unwrap();

        let artifacts = generator.generate().unwrap();

        assert_eq!(artifacts[0].path, PathBuf::from("a.html"));
        assert_eq!(
            text(&artifacts[0]),
            "DemoSomeone|https://example.com/a.html|a.html|https://example.com|<p><i>hi</i></p>\n"
        );
    }

    #[test]
    fn menu_and_helpers_reach_templates() {
        let mut options = GeneratorOptions::new(SiteConfig::with_base_url("/").unwrap());
        options.enrichers = EnricherPipeline::from_decls(&[EnricherDecl::Menu {
            handler: "page-menu".into(),
        }])
        .unwrap();
        let mut generator = SiteGenerator::new(options);

        let about = page_with("about", "2000-01-01", "menu: about\norder: 1\n", "About");

        generator
            .load(SiteSources {
                templates: vec![template(
                    "post",
                    "{% for item in menu %}<a href=\"{{ url(item) }}\">{{ item.title }}</a>{% endfor %}",
                )],
                helpers: vec![menu_helpers()],
                pages: vec![about],
                ..Default::default()
            })
            .unwrap();

        let artifacts = generator.generate().unwrap();

        assert_eq!(text(&artifacts[0]), "<a href=\"&#x2f;about.html\">about</a>");
    }

    #[test]
    fn load_fails_fast() {
        let mut generator = generator();
        let result = generator.load(SiteSources {
            templates: vec![template("post", "x")],
            pages: vec![
                page("good", "2000-01-01", "ok"),
                RawFile::new("bad.md", "no front matter"),
            ],
            ..Default::default()
        });

        assert!(matches!(
            result,
            Err(SiteError::Page(PageError::Format {
                source: FrontMatterError::MissingDelimiter,
                ..
            }))
        ));
        assert_eq!(generator.state(), GeneratorState::Unloaded);
        assert!(generator.pages().is_empty());
    }

    #[test]
    fn visitor_errors_abort_the_load() {
        let mut generator = generator();
        let result = generator.load(SiteSources {
            templates: vec![template("post", "x")],
            visitors: vec![Box::new(DateVisitor)],
            pages: vec![page("a", "not a date", "x")],
            ..Default::default()
        });

        assert!(matches!(
            result,
            Err(SiteError::Visit(VisitError::InvalidDate { .. }))
        ));
    }

    #[test]
    fn unknown_layout_fails_generation() {
        let mut generator = generator();
        generator
            .load(SiteSources {
                templates: vec![template("page", "x")],
                pages: vec![page("a", "2000-01-01", "x")],
                ..Default::default()
            })
            .unwrap();

        assert!(matches!(
            generator.generate(),
            Err(SiteError::UnknownLayout { .. })
        ));
    }

    #[test]
    fn generate_requires_a_load() {
        let mut generator = generator();

        assert!(matches!(
            generator.generate(),
            Err(SiteError::InvalidState {
                operation: "generate",
                state: "unloaded"
            })
        ));

        generator
            .load(SiteSources {
                templates: vec![template("post", "x")],
                pages: vec![page("a", "2000-01-01", "x")],
                ..Default::default()
            })
            .unwrap();
        generator.generate().unwrap();

        assert!(matches!(
            generator.generate(),
            Err(SiteError::InvalidState { state: "generated", .. })
        ));

        generator.reset();
        assert_eq!(generator.state(), GeneratorState::Unloaded);
        assert!(generator.templates().is_empty());
    }

    #[test]
    fn duplicate_permalinks_still_render() {
        let first = page_with("a", "2000-01-01", "permalink: /same.html\n", "one");
        let second = page_with("b", "2000-01-02", "permalink: same.html\n", "two");

        let mut generator = generator();
        generator
            .load(SiteSources {
                templates: vec![template("post", "{{ content | safe }}")],
                pages: vec![first, second],
                ..Default::default()
            })
            .unwrap();

        let artifacts = generator.generate().unwrap();

        assert_eq!(artifacts.len(), 2);
        assert!(artifacts.iter().all(|a| a.path == PathBuf::from("same.html")));
    }

    #[test]
    fn permalinks_are_normalized() {
        let permalink = |value: &str| {
            let extra = format!("permalink: {value}\n");
            let mut page = Page::new(page_with("a", "2000-01-01", &extra, "x"));
            page.validate().unwrap();
            page.process(&MarkdownOptions::default()).unwrap();
            normalize_permalink(&page)
        };

        assert_eq!(permalink("./posts/a.html").unwrap(), "posts/a.html");
        assert_eq!(permalink("//a.html").unwrap(), "a.html");
        assert!(matches!(
            permalink("../escape.html"),
            Err(SiteError::InvalidPermalink { .. })
        ));
        assert!(matches!(
            permalink("/"),
            Err(SiteError::InvalidPermalink { .. })
        ));
    }
}
