//! # OME Companion
//!
//! Generate OME-XML metadata companion files describing microscopy
//! plate/well/image layouts.
//!
//! Two independent front ends feed the same metadata model:
//!
//! - **Filename inference**: a user-supplied regular expression with named
//!   capture groups is applied to a list of TIFF filenames, one sample file
//!   is probed for pixel geometry, and a consistent grid of rows, columns,
//!   fields, channels, Z-planes and timepoints is recovered from the
//!   combination — with contradictions between the two sources rejected.
//! - **NGFF extraction**: an existing OME-Zarr store's JSON attribute
//!   sidecars already carry axis names, sizes and dtype; these are read
//!   directly, for single images or whole plates.
//!
//! ## Architecture
//!
//! - [`config`] - CLI and configuration types
//! - [`pattern`] - regex loading and per-filename field extraction
//! - [`tiff`] - sample TIFF metadata probe (classic TIFF and BigTIFF)
//! - [`layout`] - filename aggregation and dimension reconciliation
//! - [`model`] - the OME metadata graph, its builder and XML writer
//! - [`zarr`] - NGFF attribute reading
//! - [`io`] - positional file reading shared by the TIFF probe
//!
//! The pipeline is single-threaded and single-pass: every entity is built
//! in one scan over the inputs, held in memory, and consumed once by the
//! XML writer. Fatal contradictions surface before the output file is
//! opened, so no partial document is ever written.

pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod pattern;
pub mod prompt;
pub mod tiff;
pub mod zarr;

// Re-export commonly used types
pub use config::{Cli, Command, PlateConfig, ZarrConfig, DEFAULT_DIMENSION_ORDER};
pub use error::{CompanionError, LayoutError, NgffError, PatternError, TiffError, XmlError};
pub use layout::{ChannelMap, ImageBuckets, ImageKey, ParsedFilename, PlateScan, PlateSpec};
pub use model::{
    build_plate_companion, to_xml, Channel, IdAllocator, Image, Ome, Pixels, PixelType, Plane,
    Plate, TiffData, Well, WellSample,
};
pub use pattern::{Extraction, FilenameFields, IndexBase, IndexBases, NamingPattern, RowMode};
pub use tiff::SampleInfo;
pub use zarr::{zarr_companion, DirectoryStore, ZarrCompanion};
