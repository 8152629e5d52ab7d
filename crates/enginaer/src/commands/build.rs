//! Static site build command.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use enginaer_site::{SiteGenerator, SiteSources};

use crate::config::ConfigFile;
use crate::files;

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of templates loaded
    pub templates: usize,

    /// Number of assets copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Run the build command.
pub fn run(config_path: &Path, output: Option<PathBuf>, defines: &[(String, String)]) -> Result<()> {
    tracing::info!("Building site...");

    let config = ConfigFile::load(config_path)?;
    let root = config_path.parent().unwrap_or(Path::new("."));

    let result = build(&config, root, output, defines)?;

    tracing::info!(
        "Built {} pages from {} templates, copied {} assets in {}ms",
        result.pages,
        result.templates,
        result.assets,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

/// Build the site described by `config`.
///
/// Relative `base` and `output` paths resolve against `root`, the
/// directory holding the config file.
pub fn build(
    config: &ConfigFile,
    root: &Path,
    output: Option<PathBuf>,
    defines: &[(String, String)],
) -> Result<BuildResult> {
    let start = Instant::now();
    let base = root.join(&config.base);
    let output_dir = output.unwrap_or_else(|| base.join(&config.output));

    let options = config.generator_options(defines)?;
    let visitors = config.visitors()?;
    let helpers = config.helpers()?;

    let template_files = files::expand(&base, &config.template_patterns())?;
    let page_files = files::expand(&base, &config.page_patterns())?;
    if page_files.is_empty() {
        tracing::warn!("No pages matched {:?}", config.page_patterns());
    }
    let templates = template_files.len();

    let sources = SiteSources {
        templates: files::read_files(&template_files)?,
        helpers,
        visitors,
        pages: files::read_files(&page_files)?,
    };

    let mut generator = SiteGenerator::new(options);
    generator.load(sources)?;
    let artifacts = generator.generate()?;

    let pages = files::write_artifacts(&output_dir, &artifacts)?;

    let asset_patterns = config.asset.path.patterns();
    let assets = if asset_patterns.is_empty() {
        0
    } else {
        let asset_base = config
            .asset
            .base
            .as_ref()
            .map(|b| base.join(b))
            .unwrap_or_else(|| base.clone());
        let asset_files = files::expand(&base, &asset_patterns)?;
        files::copy_assets(&asset_files, &asset_base, &output_dir)?
    };

    Ok(BuildResult {
        pages,
        templates,
        assets,
        duration_ms: start.elapsed().as_millis() as u64,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use enginaer_site::SiteError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[page]
path = "pages/*.md"
visitors = ["title", "date"]

[[page.enrichers]]
kind = "generate"
source = "date"
target = "day"
handler = "iso-date"

[template]
path = "templates/*.jinja"

[asset]
path = "static/**/*"
base = "static"

[site]
base-url = "https://example.com/"
"#;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "pages/hello.md",
            "---\nlayout: page\npublished: true\nauthor: A\ndate: 2000-01-02 10:00:00\npermalink: /blog/hello.html\n---\n# Hello\n\nWorld",
        );
        write(dir.path(), "templates/page.jinja", "{{ title }} {{ day }} {{ env }}|{{ content | safe }}");
        write(dir.path(), "static/site.css", "body {}");
        dir
    }

    #[test]
    fn builds_pages_and_assets() {
        let dir = project();
        let config = ConfigFile::parse(CONFIG).unwrap();

        let result = build(&config, dir.path(), None, &[("env".to_string(), "test".to_string())]).unwrap();

        assert_eq!(result.pages, 1);
        assert_eq!(result.templates, 1);
        assert_eq!(result.assets, 1);
        assert_eq!(result.output_dir, dir.path().join("./dist"));
        assert_eq!(
            fs::read_to_string(result.output_dir.join("blog/hello.html")).unwrap(),
            "Hello 2000-01-02 test|<h1>Hello</h1>\n<p>World</p>\n"
        );
        assert!(result.output_dir.join("site.css").exists());
    }

    #[test]
    fn output_override_wins() {
        let dir = project();
        let config = ConfigFile::parse(CONFIG).unwrap();
        let output = dir.path().join("public");

        let result = build(&config, dir.path(), Some(output.clone()), &[]).unwrap();

        assert_eq!(result.output_dir, output);
        assert!(output.join("blog/hello.html").exists());
    }

    #[test]
    fn invalid_page_aborts_without_output() {
        let dir = project();
        write(dir.path(), "pages/broken.md", "no front matter");
        let config = ConfigFile::parse(CONFIG).unwrap();

        let error = build(&config, dir.path(), None, &[]).unwrap_err();

        assert!(error.downcast_ref::<SiteError>().is_some());
        assert!(!dir.path().join("dist").exists());
    }
}
