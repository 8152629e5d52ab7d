//! File discovery, reading and writing.
//!
//! Glob patterns support `*` and `?` within a path segment and `**` across
//! segments. Patterns are matched against `/`-separated paths relative to
//! the base directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use enginaer_page::RawFile;
use enginaer_site::Artifact;

/// Translate a glob pattern into an anchored regex.
pub fn glob_regex(pattern: &str) -> Result<Regex> {
    let pattern = pattern.trim().trim_start_matches("./");
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');

    Regex::new(&regex).with_context(|| format!("Invalid glob pattern '{pattern}'"))
}

/// Files under `base` matching any pattern, sorted and deduplicated.
pub fn expand(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let matchers = patterns
        .iter()
        .map(|p| glob_regex(p))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(base).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", base.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_slash_path(base, entry.path());
        if matchers.iter().any(|m| m.is_match(&relative)) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn relative_slash_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read each file fully into memory.
pub fn read_files(paths: &[PathBuf]) -> Result<Vec<RawFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(RawFile::new(path.clone(), bytes))
        })
        .collect()
}

/// Write artifacts under `output`, creating directories as needed.
pub fn write_artifacts(output: &Path, artifacts: &[Artifact]) -> Result<usize> {
    for artifact in artifacts {
        let path = output.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &artifact.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Wrote {}", path.display());
    }

    Ok(artifacts.len())
}

/// Copy files to `output`, keeping their path relative to `asset_base`.
pub fn copy_assets(files: &[PathBuf], asset_base: &Path, output: &Path) -> Result<usize> {
    for file in files {
        let relative = match file.strip_prefix(asset_base) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => PathBuf::from(file.file_name().unwrap_or_default()),
        };
        let target = output.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(file, &target)
            .with_context(|| format!("Failed to copy {} to {}", file.display(), target.display()))?;
        tracing::debug!("Copied {}", target.display());
    }

    Ok(files.len())
}
