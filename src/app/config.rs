use crate::app::cli::Cli;
use crate::app::models::RuntimeConfig;
use crate::app::rewriter::is_utf16;
use anyhow::{bail, Context, Result};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

const DEFAULT_ENCODING: &str = "utf-8";

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct PresetConfig {
    encoding: Option<String>,
    exclude: Option<Vec<String>>,
    gitignore: Option<bool>,
}

fn load_presets_file() -> Result<HashMap<String, PresetConfig>> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_path = home.join(".config").join("reindent").join("presets.toml");

    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    parse_presets(&content)
}

fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content).context("Failed to parse presets.toml")?;
    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// Looks up a WHATWG encoding label, rejecting encodings that can't be written back as themselves.
/// UTF-16 is written by the rewriter itself, so it is allowed.
fn lookup_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .with_context(|| format!("Unknown encoding: {}", label))?;
    if encoding.output_encoding() != encoding && !is_utf16(encoding) {
        bail!("Encoding {} cannot be used to write files", encoding.name());
    }
    Ok(encoding)
}

/// Picks the preset named by `--preset`, else the one named after the current directory.
/// An explicit name must exist; the directory-name fallback is optional.
fn select_preset<'a>(
    explicit: Option<&'a str>,
    project_name: Option<&'a str>,
    presets: &HashMap<String, PresetConfig>,
) -> Result<Option<(&'a str, PresetConfig)>> {
    if let Some(key) = explicit {
        let preset = presets
            .get(key)
            .cloned()
            .with_context(|| format!("Unknown preset: {}", key))?;
        return Ok(Some((key, preset)));
    }
    Ok(project_name.and_then(|key| presets.get(key).map(|p| (key, p.clone()))))
}

pub fn resolve_config(cli: Cli, project_name: Option<&str>) -> Result<RuntimeConfig> {
    let presets = load_presets_file()?;
    resolve_with_presets(cli, project_name, &presets)
}

fn resolve_with_presets(
    cli: Cli,
    project_name: Option<&str>,
    presets: &HashMap<String, PresetConfig>,
) -> Result<RuntimeConfig> {
    if cli.from.is_empty() {
        bail!("Cannot convert from an indent of 0 spaces");
    }

    let preset = match select_preset(cli.preset.as_deref(), project_name, presets)? {
        Some((name, preset)) => {
            log::debug!("Applying preset '{}'", name);
            preset
        }
        None => PresetConfig::default(),
    };

    let label = cli
        .encoding
        .or(preset.encoding)
        .unwrap_or_else(|| DEFAULT_ENCODING.to_string());

    let config = RuntimeConfig {
        pattern: cli.files,
        from: cli.from,
        to: cli.to,
        encoding: lookup_encoding(&label)?,
        quiet: cli.quiet,
        exclude: merge_vecs(preset.exclude, cli.exclude),
        respect_gitignore: cli.gitignore || preset.gitignore.unwrap_or(false),
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::indent::IndentUnit;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("reindent").chain(args.iter().copied())).unwrap()
    }

    const PRESETS: &str = r#"
        [legacy]
        encoding = "latin1"
        exclude = ["vendor/**", "*.min.js"]
        gitignore = true

        [plain]
    "#;

    #[test]
    fn defaults_without_presets() {
        let config =
            resolve_with_presets(cli(&["*.py", "4", "tab"]), None, &HashMap::new()).unwrap();
        assert_eq!(config.pattern, "*.py");
        assert_eq!(config.from, IndentUnit::spaces(4));
        assert_eq!(config.to, IndentUnit::tab());
        assert_eq!(config.encoding, encoding_rs::UTF_8);
        assert!(!config.quiet);
        assert!(config.exclude.is_empty());
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn short_flags() {
        let config = resolve_with_presets(
            cli(&["*.c", "TAB", "2", "-q", "-e", "windows-1252"]),
            None,
            &HashMap::new(),
        )
        .unwrap();
        assert!(config.quiet);
        assert_eq!(config.encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn preset_selected_by_project_name() {
        let presets = parse_presets(PRESETS).unwrap();
        let config = resolve_with_presets(
            cli(&["*.js", "2", "4", "--exclude", "dist/**", "--exclude", "*.min.js"]),
            Some("legacy"),
            &presets,
        )
        .unwrap();
        assert_eq!(config.encoding, encoding_rs::WINDOWS_1252);
        assert_eq!(config.exclude, vec!["vendor/**", "*.min.js", "dist/**"]);
        assert!(config.respect_gitignore);
    }

    #[test]
    fn exclude_before_positionals() {
        let config = resolve_with_presets(
            cli(&["--exclude", "vendor", "--exclude", "gen/**", "*.py", "4", "tab"]),
            None,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(config.pattern, "*.py");
        assert_eq!(config.from, IndentUnit::spaces(4));
        assert_eq!(config.to, IndentUnit::tab());
        assert_eq!(config.exclude, vec!["vendor", "gen/**"]);
    }

    #[test]
    fn selected_preset_is_named() {
        let presets = parse_presets(PRESETS).unwrap();

        let (name, preset) = select_preset(None, Some("legacy"), &presets).unwrap().unwrap();
        assert_eq!(name, "legacy");
        assert_eq!(preset.encoding.as_deref(), Some("latin1"));

        let (name, _) = select_preset(Some("plain"), Some("legacy"), &presets)
            .unwrap()
            .unwrap();
        assert_eq!(name, "plain");

        assert!(select_preset(None, Some("other"), &presets).unwrap().is_none());
        assert!(select_preset(None, None, &presets).unwrap().is_none());
    }

    #[test]
    fn cli_encoding_beats_preset() {
        let presets = parse_presets(PRESETS).unwrap();
        let config = resolve_with_presets(
            cli(&["*.js", "2", "4", "--preset", "legacy", "-e", "utf-8"]),
            None,
            &presets,
        )
        .unwrap();
        assert_eq!(config.encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn empty_preset_uses_defaults() {
        let presets = parse_presets(PRESETS).unwrap();
        let config =
            resolve_with_presets(cli(&["*", "tab", "4"]), Some("plain"), &presets).unwrap();
        assert_eq!(config.encoding, encoding_rs::UTF_8);
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn unknown_explicit_preset_fails() {
        let err = resolve_with_presets(
            cli(&["*", "tab", "4", "--preset", "nope"]),
            None,
            &HashMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown preset"));
    }

    #[test]
    fn zero_width_source_is_rejected() {
        let err = resolve_with_presets(cli(&["*", "0", "tab"]), None, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("0 spaces"));
    }

    #[test]
    fn zero_width_destination_is_allowed() {
        let config = resolve_with_presets(cli(&["*", "tab", "0"]), None, &HashMap::new()).unwrap();
        assert!(config.to.is_empty());
    }

    #[test]
    fn bad_encodings_are_rejected() {
        assert!(lookup_encoding("klingon").is_err());
        // WHATWG maps this label to the write-less "replacement" encoding
        assert!(lookup_encoding("iso-2022-kr").is_err());
        assert_eq!(lookup_encoding(" UTF8 ").unwrap(), encoding_rs::UTF_8);
    }

    #[test]
    fn utf16_encodings_are_accepted() {
        assert_eq!(lookup_encoding("utf-16").unwrap(), encoding_rs::UTF_16LE);
        assert_eq!(lookup_encoding("utf-16le").unwrap(), encoding_rs::UTF_16LE);
        assert_eq!(lookup_encoding("UTF-16BE").unwrap(), encoding_rs::UTF_16BE);
    }

    #[test]
    fn invalid_indent_token_fails_parsing() {
        assert!(Cli::try_parse_from(["reindent", "*", "four", "tab"]).is_err());
    }

    #[test]
    fn malformed_presets_fail() {
        assert!(parse_presets("[broken\n").is_err());
    }
}
