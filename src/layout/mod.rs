//! Plate layout inference.
//!
//! Everything between filename extraction and metadata construction lives
//! here: the channel index/name bookkeeping, the single-pass aggregation of
//! all filenames into per-image buckets, and the reconciliation of the
//! aggregate against the sample image's geometry.

mod channels;
mod scan;
mod spec;

pub use channels::ChannelMap;
pub use scan::{ImageBuckets, ImageKey, ParsedFilename, PlateScan};
pub use spec::PlateSpec;
