use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when probing a sample TIFF file
#[derive(Debug, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Requested range exceeds file bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// BitsPerSample/SampleFormat combination has no OME pixel type
    #[error("Unsupported pixel format: {bits} bits per sample, sample format {format}")]
    UnsupportedPixelFormat { bits: u32, format: u32 },
}

/// Errors related to loading and applying the filename pattern
#[derive(Debug, Error)]
pub enum PatternError {
    /// Pattern file could not be read
    #[error("Failed to read pattern file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pattern is not a valid regular expression
    #[error("Invalid regular expression: {0}")]
    Invalid(#[from] regex::Error),

    /// Sample image name does not match the pattern (fatal, unlike per-line misses)
    #[error("Regex does not match sample image name {name:?}")]
    SampleMismatch { name: String },
}

/// Fatal contradictions detected while aggregating filenames and
/// reconciling them against the sample image
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The same channel name was paired with two different indices
    #[error("Channel {name:?} has multiple indices: {first} and {second}")]
    ChannelConflict {
        name: String,
        first: u32,
        second: u32,
    },

    /// Z specified both by the multi-page sample and by filenames
    #[error("Z planes specified in filenames, but sample image already has Z planes")]
    ZDoubleSpecified,

    /// T specified both by the multi-page sample and by filenames
    #[error("Timepoints specified in filenames, but sample image already has timepoints")]
    TDoubleSpecified,

    /// Channels specified by filenames while the sample is already multichannel
    #[error("Channels specified in filenames, but sample image already is multichannel")]
    ChannelsDoubleSpecified,

    /// No rows or no columns discovered after the full scan
    #[error("Columns and rows must be specified in filenames")]
    PlateLayoutIncomplete,
}

/// Errors reading NGFF attribute documents from a Zarr store
#[derive(Debug, Error)]
pub enum NgffError {
    /// Attribute or array document could not be read
    #[error("Failed to read {key} from store: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON or has an unexpected shape
    #[error("Invalid JSON in {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Image group carries no multiscales metadata
    #[error("No multiscales metadata at {0}")]
    MissingMultiscales(String),

    /// Multiscales metadata lists no datasets
    #[error("No datasets in multiscales metadata at {0}")]
    MissingDatasets(String),

    /// Zarr dtype string has no OME pixel type
    #[error("Unsupported Zarr dtype {0:?}")]
    UnsupportedDtype(String),
}

/// Errors while rendering the OME-XML document
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML write error: {0}")]
    Write(String),
}

/// Top-level error for one companion-file run
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Tiff(#[from] TiffError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Ngff(#[from] NgffError),

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
