//! Filename pattern loading and field extraction.
//!
//! Plate filenames encode their position through a user-supplied regular
//! expression with named capture groups (`row`, `col`, `field`,
//! `channel_index`, `channel_name`, `z`, `t`). This module compiles the
//! pattern, applies it with match-at-start semantics, and normalizes the
//! captured values to zero-based indices according to the per-dimension
//! base configuration.
//!
//! A group that is absent from the pattern and a group that matched the
//! empty string are indistinguishable to callers: both count as "not
//! present".

mod fields;
mod scheme;

pub use fields::{Extraction, FilenameFields};
pub use scheme::{IndexBase, IndexBases, NamingPattern, RowMode};
