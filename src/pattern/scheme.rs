//! Pattern compilation and application.

use std::fs;
use std::path::Path;

use regex::{Captures, Regex};

use crate::error::PatternError;

use super::fields::{Extraction, FilenameFields};

// =============================================================================
// Index Bases
// =============================================================================

/// Whether a dimension counts from 0 or from 1 in the filenames.
///
/// Internally everything is zero-based; one-based sources are shifted down
/// during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    /// First position is written as 1 (the default for most acquisitions).
    #[default]
    OneBased,

    /// First position is written as 0.
    ZeroBased,
}

impl IndexBase {
    /// Build from a `--*-zero` style flag.
    pub fn from_zero_flag(zero_based: bool) -> Self {
        if zero_based {
            IndexBase::ZeroBased
        } else {
            IndexBase::OneBased
        }
    }

    /// Shift a raw index to zero-based.
    ///
    /// Returns `None` for 0 under one-based numbering, which has no valid
    /// zero-based equivalent.
    pub fn normalize(self, raw: u32) -> Option<u32> {
        match self {
            IndexBase::ZeroBased => Some(raw),
            IndexBase::OneBased => raw.checked_sub(1),
        }
    }
}

/// How the `row` group is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    /// Plate row letters: A/a -> 0, B/b -> 1, ...
    Alphabetic,

    /// Plain integers with their own base.
    Numeric(IndexBase),
}

impl Default for RowMode {
    fn default() -> Self {
        RowMode::Alphabetic
    }
}

/// Per-dimension index bases for the integer groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexBases {
    pub col: IndexBase,
    pub field: IndexBase,
    pub channel: IndexBase,
    pub z: IndexBase,
    pub t: IndexBase,
}

// =============================================================================
// NamingPattern
// =============================================================================

/// A compiled filename pattern plus its index configuration.
pub struct NamingPattern {
    regex: Regex,
    row_mode: RowMode,
    bases: IndexBases,
}

impl NamingPattern {
    /// Compile a pattern string.
    pub fn new(pattern: &str, row_mode: RowMode, bases: IndexBases) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            regex,
            row_mode,
            bases,
        })
    }

    /// Load and compile a pattern from a file holding exactly one
    /// regular expression (surrounding whitespace trimmed).
    pub fn from_file(
        path: &Path,
        row_mode: RowMode,
        bases: IndexBases,
    ) -> Result<Self, PatternError> {
        let pattern = fs::read_to_string(path).map_err(|source| PatternError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(pattern.trim(), row_mode, bases)
    }

    /// The pattern source string.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern matches at the start of `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.captures(name).is_some()
    }

    /// Captures for `name`, with match-at-start semantics: a match that
    /// begins anywhere past offset 0 does not count.
    fn captures<'t>(&self, name: &'t str) -> Option<Captures<'t>> {
        self.regex
            .captures(name)
            .filter(|caps| caps.get(0).map(|m| m.start() == 0).unwrap_or(false))
    }

    /// Named groups and their captured values for `name`, for diagnostics.
    pub fn group_values(&self, name: &str) -> Vec<(String, Option<String>)> {
        let caps = match self.captures(name) {
            Some(caps) => caps,
            None => return Vec::new(),
        };
        self.regex
            .capture_names()
            .flatten()
            .map(|group| {
                let value = caps.name(group).map(|m| m.as_str().to_string());
                (group.to_string(), value)
            })
            .collect()
    }

    /// Apply the pattern to one filename and normalize the captures.
    pub fn extract(&self, name: &str) -> Extraction {
        let caps = match self.captures(name) {
            Some(caps) => caps,
            None => return Extraction::NoMatch,
        };

        // col first, then row, mirroring their diagnostic precedence
        let col = match group_str(&caps, "col") {
            Some(raw) => match parse_index(raw, "col", self.bases.col) {
                Ok(col) => col,
                Err(bad) => return bad,
            },
            None => return Extraction::MissingCol,
        };

        let row_label = match group_str(&caps, "row") {
            Some(raw) => raw.to_string(),
            None => return Extraction::MissingRow,
        };
        let row = match self.row_index(&row_label) {
            Ok(row) => row,
            Err(bad) => return bad,
        };

        let field = match optional_index(&caps, "field", self.bases.field) {
            Ok(field) => field,
            Err(bad) => return bad,
        };
        let z = match optional_index(&caps, "z", self.bases.z) {
            Ok(z) => z,
            Err(bad) => return bad,
        };
        let t = match optional_index(&caps, "t", self.bases.t) {
            Ok(t) => t,
            Err(bad) => return bad,
        };
        let channel_index = match optional_index(&caps, "channel_index", self.bases.channel) {
            Ok(c) => c,
            Err(bad) => return bad,
        };
        let channel_name = group_str(&caps, "channel_name").map(str::to_string);

        Extraction::Parsed(FilenameFields {
            row_label,
            row,
            col,
            field,
            z,
            t,
            channel_index,
            channel_name,
        })
    }

    fn row_index(&self, label: &str) -> Result<u32, Extraction> {
        match self.row_mode {
            RowMode::Alphabetic => {
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        Ok(c.to_ascii_lowercase() as u32 - 'a' as u32)
                    }
                    _ => Err(Extraction::BadValue {
                        group: "row",
                        value: label.to_string(),
                    }),
                }
            }
            RowMode::Numeric(base) => parse_index(label, "row", base),
        }
    }
}

/// A named group's value, with empty matches normalized to "not present".
fn group_str<'t>(caps: &Captures<'t>, group: &str) -> Option<&'t str> {
    caps.name(group)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

fn parse_index(raw: &str, group: &'static str, base: IndexBase) -> Result<u32, Extraction> {
    let value: u32 = raw.parse().map_err(|_| Extraction::BadValue {
        group,
        value: raw.to_string(),
    })?;
    base.normalize(value).ok_or(Extraction::BadValue {
        group,
        value: raw.to_string(),
    })
}

fn optional_index(
    caps: &Captures<'_>,
    group: &'static str,
    base: IndexBase,
) -> Result<Option<u32>, Extraction> {
    match group_str(caps, group) {
        Some(raw) => parse_index(raw, group, base).map(Some),
        None => Ok(None),
    }
}

// =============================================================================
// Tests
// =============================================================================
