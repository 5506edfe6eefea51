use crate::app::indent::{reindent_line, IndentUnit};
use anyhow::{bail, Context, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TEMP_SUFFIX: &str = ".reindent.tmp";

const BOM: &str = "\u{feff}";

/// Sibling path the new content is staged in before replacing `file`.
pub fn temp_path(file: &Path) -> PathBuf {
    let mut name = OsString::from(file.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Splits `text` into lines ending in `\n`, `\r\n` or a lone `\r`, terminators included.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let ends_line = match byte {
            b'\n' => true,
            b'\r' => bytes.get(i + 1) != Some(&b'\n'),
            _ => false,
        };
        if ends_line {
            lines.push(&text[start..=i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Applies the line transform to every line of `text`, keeping line terminators.
pub fn reindent_text(text: &str, from: &IndentUnit, to: &IndentUnit) -> String {
    split_lines(text)
        .into_iter()
        .map(|line| reindent_line(line, from, to))
        .collect()
}

pub fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// For UTF-16, a byte order mark in the file overrides the endianness of the label.
fn sniff_encoding(bytes: &[u8], requested: &'static Encoding) -> &'static Encoding {
    if is_utf16(requested) {
        if let Some((bom, _)) = Encoding::for_bom(bytes) {
            if is_utf16(bom) {
                return bom;
            }
        }
    }
    requested
}

fn decode(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> Result<String> {
    match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Ok(text.into_owned()),
        None => bail!("{} is not valid {}", path.display(), encoding.name()),
    }
}

fn encode(text: &str, encoding: &'static Encoding, path: &Path) -> Result<Vec<u8>> {
    // encoding_rs only encodes UTF-16 as UTF-8
    if is_utf16(encoding) {
        let big_endian = encoding == UTF_16BE;
        return Ok(text
            .encode_utf16()
            .flat_map(|unit| {
                if big_endian {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                }
            })
            .collect());
    }

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        bail!(
            "{} contains characters that cannot be encoded as {}",
            path.display(),
            encoding.name()
        );
    }
    Ok(bytes.into_owned())
}

/// Rewrites `path` in place with its indentation converted from `from` to `to`.
///
/// The new content goes to a synced temp file that is then renamed over the
/// original, so a failure at any step leaves the original intact.
pub fn reindent_file(
    path: &Path,
    encoding: &'static Encoding,
    from: &IndentUnit,
    to: &IndentUnit,
) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let encoding = sniff_encoding(&bytes, encoding);
    let text = decode(&bytes, encoding, path)?;

    // A byte order mark is kept but doesn't count as part of the first line.
    let (bom, body) = match text.strip_prefix(BOM) {
        Some(body) => (BOM, body),
        None => ("", text.as_str()),
    };
    let reindented = format!("{}{}", bom, reindent_text(body, from, to));
    let changed = split_lines(&text)
        .into_iter()
        .zip(split_lines(&reindented))
        .filter(|(old, new)| old != new)
        .count();
    log::debug!("{}: {} line(s) changed", path.display(), changed);

    let output = encode(&reindented, encoding, path)?;

    let tmp = temp_path(path);
    if let Err(err) = write_synced(&tmp, &output, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err)
            .with_context(|| format!("Failed to replace {} with {}", path.display(), tmp.display()));
    }
    Ok(())
}

fn write_synced(tmp: &Path, contents: &[u8], original: &Path) -> Result<()> {
    let mut file =
        File::create(tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;

    let permissions = fs::metadata(original)
        .with_context(|| format!("Failed to read metadata of {}", original.display()))?
        .permissions();
    fs::set_permissions(tmp, permissions)
        .with_context(|| format!("Failed to set permissions on {}", tmp.display()))?;

    file.sync_all()
        .with_context(|| format!("Failed to sync {}", tmp.display()))?;
    Ok(())
}
