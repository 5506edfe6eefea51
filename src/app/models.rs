use crate::app::indent::IndentUnit;
use encoding_rs::Encoding;
use std::path::PathBuf;

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub pattern: String,
    pub from: IndentUnit,
    pub to: IndentUnit,
    pub encoding: &'static Encoding,
    pub quiet: bool,
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
}

/// Represents a single filesystem entry matched by the scan.
#[derive(Debug)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative_path: String,
    pub is_file: bool, // False for directories and symlinks, which are skipped
}
