// Declare modules
pub mod cli;
pub mod config;
pub mod indent;
pub mod models;
pub mod reporter;
pub mod rewriter;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;

use self::cli::Cli;
use self::config::resolve_config;
use self::models::{FileEntry, RuntimeConfig};
use self::reporter::{reporter_for, Reporter};
use self::rewriter::reindent_file;
use self::scanner::Scanner;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Identify Project Root & Name
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let project_name = current_dir.file_name().and_then(|n| n.to_str());

    // 3. Resolve Configuration
    let config = resolve_config(args, project_name)?;
    log::debug!(
        "Converting {} to {} in '{}' ({})",
        config.from,
        config.to,
        config.pattern,
        config.encoding.name()
    );

    // 4. Scan Directory
    let scanner = Scanner::new(current_dir, &config)?;
    let entries = scanner.scan()?;

    if entries.is_empty() {
        log::warn!("No files matched '{}'", config.pattern);
        return Ok(());
    }

    // 5. Rewrite Files
    let reporter = reporter_for(config.quiet);
    let count = process_entries(&entries, &config, reporter.as_ref())?;
    log::debug!("Reindented {} file(s)", count);

    Ok(())
}

/// Reindents every regular file in `entries`, one at a time, reporting each entry.
/// Stops at the first failure.
pub fn process_entries(
    entries: &[FileEntry],
    config: &RuntimeConfig,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let mut count = 0;
    for entry in entries {
        if !entry.is_file {
            reporter.skipped(&entry.path);
            continue;
        }
        reporter.processing(&entry.path);
        reindent_file(&entry.path, config.encoding, &config.from, &config.to)
            .with_context(|| format!("Failed to reindent {}", entry.relative_path))?;
        count += 1;
    }
    Ok(count)
}
