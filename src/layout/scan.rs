//! Single-pass filename aggregation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::warn;

use crate::error::LayoutError;
use crate::pattern::{Extraction, FilenameFields, NamingPattern};

use super::channels::ChannelMap;

// =============================================================================
// ImageKey
// =============================================================================

/// Identity of one logical image: a field within a well.
///
/// All components are zero-based. Multiple filenames (differing by
/// channel/z/t) map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageKey {
    pub row: u32,
    pub col: u32,
    pub field: u32,
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.row, self.col, self.field)
    }
}

/// One accepted filename with its extracted values and resolved channel.
///
/// The channel index is resolved once here so the plane-building phase
/// never re-applies the pattern.
#[derive(Debug, Clone)]
pub struct ParsedFilename {
    pub filename: String,
    pub fields: FilenameFields,
    /// Channel the file's planes belong to: the explicit index, or the
    /// index assigned to the channel name, or `None` without channel info.
    pub channel: Option<u32>,
}

/// Filenames grouped by image identity, in input order per bucket.
pub type ImageBuckets = BTreeMap<ImageKey, Vec<ParsedFilename>>;

// =============================================================================
// PlateScan
// =============================================================================

/// Aggregate of one pass over the filename list.
///
/// Counts are running maxima over zero-based indices plus one; a dimension
/// that never appeared stays 0 so the reconciler can tell "absent" from
/// "size 1".
#[derive(Debug, Default)]
pub struct PlateScan {
    /// Column count (max seen column index + 1).
    pub columns: u32,

    /// Distinct raw row labels, case preserved.
    pub rows: BTreeSet<String>,

    /// Field count, 0 when no filename carried a field group.
    pub fields: u32,

    /// Z count, 0 when no filename carried a z group.
    pub z_planes: u32,

    /// T count, 0 when no filename carried a t group.
    pub timepoints: u32,

    pub channels: ChannelMap,

    pub buckets: ImageBuckets,
}

impl PlateScan {
    /// Aggregate all `lines` using `pattern`.
    ///
    /// Lines that fail to match, lack row/col, or carry malformed values
    /// are skipped with a warning; channel identity conflicts abort the
    /// scan.
    pub fn run<I, S>(pattern: &NamingPattern, lines: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scan = PlateScan::default();
        for line in lines {
            let line = line.as_ref().trim();
            match pattern.extract(line) {
                Extraction::Parsed(fields) => scan.accept(line, fields)?,
                Extraction::NoMatch => warn!("Skipping, no match in line: {line}"),
                Extraction::MissingCol => warn!("Skipping, no column info in line: {line}"),
                Extraction::MissingRow => warn!("Skipping, no row info in line: {line}"),
                Extraction::BadValue { group, value } => {
                    warn!("Skipping, bad {group} value {value:?} in line: {line}")
                }
            }
        }
        Ok(scan)
    }

    fn accept(&mut self, filename: &str, fields: FilenameFields) -> Result<(), LayoutError> {
        self.columns = self.columns.max(fields.col + 1);
        self.rows.insert(fields.row_label.clone());

        if let Some(field) = fields.field {
            self.fields = self.fields.max(field + 1);
        }
        if let Some(z) = fields.z {
            self.z_planes = self.z_planes.max(z + 1);
        }
        if let Some(t) = fields.t {
            self.timepoints = self.timepoints.max(t + 1);
        }

        let channel = self
            .channels
            .observe(fields.channel_index, fields.channel_name.as_deref())?;

        let key = ImageKey {
            row: fields.row,
            col: fields.col,
            field: fields.field_or_default(),
        };
        self.buckets.entry(key).or_default().push(ParsedFilename {
            filename: filename.to_string(),
            fields,
            channel,
        });
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
