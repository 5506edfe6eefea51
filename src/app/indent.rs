use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid indent '{0}': expected \"tab\" or a number of spaces")]
pub struct IndentParseError(String);

/// One level of indentation: a tab, or a fixed run of spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentUnit {
    text: String,
}

impl IndentUnit {
    pub fn tab() -> Self {
        Self {
            text: "\t".to_string(),
        }
    }

    pub fn spaces(count: usize) -> Self {
        Self {
            text: " ".repeat(count),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl FromStr for IndentUnit {
    type Err = IndentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tab") {
            return Ok(Self::tab());
        }
        s.parse::<usize>()
            .map(Self::spaces)
            .map_err(|_| IndentParseError(s.to_string()))
    }
}

impl fmt::Display for IndentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text == "\t" {
            write!(f, "tab")
        } else {
            write!(f, "{} spaces", self.text.len())
        }
    }
}

/// Counts how many times `unit` repeats back to back at the start of `line`.
///
/// An empty unit counts as zero rather than matching forever.
pub fn count_indent(line: &str, unit: &IndentUnit) -> usize {
    let unit = unit.as_str();
    if unit.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(unit) {
        count += 1;
        rest = stripped;
    }
    count
}

/// Replaces the leading `from` units of `line` with the same number of `to` units.
/// Everything after the indentation, line terminator included, is kept as is.
pub fn reindent_line(line: &str, from: &IndentUnit, to: &IndentUnit) -> String {
    let count = count_indent(line, from);
    let stripped = &line[count * from.as_str().len()..];

    let mut out = to.as_str().repeat(count);
    out.push_str(stripped);
    out
}
