use crate::app::models::{FileEntry, RuntimeConfig};
use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub struct Scanner {
    root: PathBuf,
    pattern: GlobMatcher,
    exclude_set: GlobSet,
    respect_gitignore: bool,
}

impl Scanner {
    pub fn new(root: PathBuf, config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            root,
            pattern: build_pattern(&config.pattern)?,
            exclude_set: build_globset(&config.exclude)?,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Walks the root and returns every entry matching the pattern, sorted by path.
    /// Excluded directories are pruned along with everything below them.
    /// Any walk error aborts the scan.
    pub fn scan(&self) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();

        let root = self.root.clone();
        let exclude_set = self.exclude_set.clone();
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(self.respect_gitignore)
            .hidden(false)
            .filter_entry(move |entry| {
                if entry.file_name() == OsStr::new(".git") {
                    return false;
                }
                let path = entry.path();
                path == root
                    || !diff_paths(path, &root).is_some_and(|rel| exclude_set.is_match(rel))
            })
            .build();

        for result in walker {
            let entry = result.context("Failed to walk directory")?;
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if let Some(processed) = self.process_entry(entry.path(), is_file) {
                entries.push(processed);
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn process_entry(&self, path: &Path, is_file: bool) -> Option<FileEntry> {
        if path == self.root {
            return None;
        }

        let relative = diff_paths(path, &self.root)?;

        if self.exclude_set.is_match(&relative) || !self.pattern.is_match(&relative) {
            return None;
        }

        Some(FileEntry {
            path: path.to_path_buf(),
            relative_path: relative.to_string_lossy().to_string(),
            is_file,
        })
    }
}

/// Compiles the user pattern so it matches at any depth below the root.
fn build_pattern(pattern: &str) -> Result<GlobMatcher> {
    let anchored = if pattern.starts_with("**/") || pattern == "**" {
        pattern.to_string()
    } else {
        format!("**/{}", pattern)
    };
    let glob = GlobBuilder::new(&anchored)
        .literal_separator(true)
        .build()
        .context(format!("Invalid glob pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}
