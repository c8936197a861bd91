//! Extracted per-filename dimension indices.

/// Normalized values captured from one filename.
///
/// All indices are zero-based regardless of how the source numbers them;
/// optional dimensions stay `None` when the pattern has no group for them
/// or the group matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameFields {
    /// Row label exactly as it appeared (display uses this, indexing does not).
    pub row_label: String,

    /// Zero-based row index.
    pub row: u32,

    /// Zero-based column index.
    pub col: u32,

    pub field: Option<u32>,
    pub z: Option<u32>,
    pub t: Option<u32>,
    pub channel_index: Option<u32>,
    pub channel_name: Option<String>,
}

impl FilenameFields {
    /// Field index used for grouping; files without a field group land in
    /// field 0.
    pub fn field_or_default(&self) -> u32 {
        self.field.unwrap_or(0)
    }
}

/// Outcome of applying the pattern to one filename.
///
/// Only `Parsed` contributes to the aggregation; every other variant is a
/// per-line skip that callers log as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Parsed(FilenameFields),

    /// The pattern did not match at the start of the name.
    NoMatch,

    /// Matched, but the mandatory `row` group is missing or empty.
    MissingRow,

    /// Matched, but the mandatory `col` group is missing or empty.
    MissingCol,

    /// A captured value could not be turned into an index (not a number,
    /// not a plate row letter, or 0 under one-based numbering).
    BadValue {
        group: &'static str,
        value: String,
    },
}
