use crate::app::indent::IndentUnit;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "reindent",
    author,
    version,
    about = "Convert leading indentation between tabs and spaces"
)]
pub struct Cli {
    /// A glob pattern of files to reindent, matched recursively from the current directory
    pub files: String,

    /// The indentation to convert from. Parsed as either "tab" or a number of spaces
    #[arg(value_name = "FROM")]
    pub from: IndentUnit,

    /// The indentation to convert to. Parsed as either "tab" or a number of spaces
    #[arg(value_name = "TO")]
    pub to: IndentUnit,

    /// Don't print progress messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Text encoding of the files (default: utf-8)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Pattern for files or directories to leave alone (e.g., 'vendor'); repeatable
    #[arg(long, num_args = 1, action = ArgAction::Append)]
    pub exclude: Option<Vec<String>>,

    /// Honour .gitignore and .ignore files while walking
    #[arg(long)]
    pub gitignore: bool,
}
