//! In-memory OME metadata graph.
//!
//! This module holds the plate/well/image/pixels graph that both front ends
//! (filename scanning and Zarr attribute reading) build and the XML writer
//! consumes. The shape follows the OME 2016-06 data model restricted to the
//! elements a companion file needs: Plate, Well, WellSample, Image, Pixels,
//! Channel, TiffData, Plane.
//!
//! All identifiers are allocated per run through [`IdAllocator`]; nothing in
//! here is global or shared between runs.

mod builder;
mod xml;

pub use builder::build_plate_companion;
pub use xml::to_xml;

use uuid::Uuid;

use crate::error::TiffError;

// =============================================================================
// PixelType
// =============================================================================

/// OME pixel type names.
///
/// Both the TIFF probe (BitsPerSample × SampleFormat) and the Zarr reader
/// (dtype strings) normalize to this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float,
    Double,
}

impl PixelType {
    /// The lowercase schema name used in the `Type` attribute.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::Int16 => "int16",
            PixelType::Int32 => "int32",
            PixelType::UInt8 => "uint8",
            PixelType::UInt16 => "uint16",
            PixelType::UInt32 => "uint32",
            PixelType::Float => "float",
            PixelType::Double => "double",
        }
    }

    /// Derive the pixel type from TIFF BitsPerSample and SampleFormat values.
    ///
    /// SampleFormat 1 is unsigned integer (also the default when the tag is
    /// absent), 2 is signed integer, 3 is IEEE floating point.
    pub fn from_tiff(bits: u32, format: u32) -> Result<Self, TiffError> {
        match (bits, format) {
            (8, 1) => Ok(PixelType::UInt8),
            (16, 1) => Ok(PixelType::UInt16),
            (32, 1) => Ok(PixelType::UInt32),
            (8, 2) => Ok(PixelType::Int8),
            (16, 2) => Ok(PixelType::Int16),
            (32, 2) => Ok(PixelType::Int32),
            (32, 3) => Ok(PixelType::Float),
            (64, 3) => Ok(PixelType::Double),
            _ => Err(TiffError::UnsupportedPixelFormat { bits, format }),
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Graph Nodes
// =============================================================================

/// Root of the metadata document: one optional plate plus its images.
#[derive(Debug, Clone)]
pub struct Ome {
    /// Document UUID (`urn:uuid:…`), written on the root element.
    pub uuid: String,
    pub plates: Vec<Plate>,
    pub images: Vec<Image>,
}

impl Ome {
    pub fn new() -> Self {
        Self {
            uuid: format!("urn:uuid:{}", Uuid::new_v4()),
            plates: Vec::new(),
            images: Vec::new(),
        }
    }
}

impl Default for Ome {
    fn default() -> Self {
        Self::new()
    }
}

/// A rectangular grid of wells.
#[derive(Debug, Clone)]
pub struct Plate {
    pub id: String,
    pub name: String,
    /// Number of distinct row labels discovered.
    pub rows: u32,
    /// Number of columns discovered.
    pub columns: u32,
    pub wells: Vec<Well>,
}

/// One grid cell of a plate.
///
/// The sample vector is pre-sized to the plate's field count; slots for
/// field positions that were never imaged stay `None`.
#[derive(Debug, Clone)]
pub struct Well {
    pub id: String,
    pub row: u32,
    pub column: u32,
    pub samples: Vec<Option<WellSample>>,
}

impl Well {
    /// Create a well with `field_count` empty sample slots.
    pub fn new(ordinal: u32, row: u32, column: u32, field_count: u32) -> Self {
        Self {
            id: format!("Well:{ordinal}"),
            row,
            column,
            samples: vec![None; field_count as usize],
        }
    }
}

/// A slot in a well's sample list, referencing one image by id.
#[derive(Debug, Clone)]
pub struct WellSample {
    pub id: String,
    pub index: u32,
    /// Id of the referenced [`Image`] (reference, not ownership).
    pub image_ref: String,
}

/// One logical image (one field of one well in plate mode).
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub pixels: Pixels,
}

/// Per-image pixel geometry and plane bookkeeping.
#[derive(Debug, Clone)]
pub struct Pixels {
    pub id: String,
    pub dimension_order: String,
    pub pixel_type: PixelType,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub size_c: u32,
    pub size_t: u32,
    pub channels: Vec<Channel>,
    pub tiff_data: Vec<TiffData>,
    pub planes: Vec<Plane>,
    /// True for Zarr-derived pixels that carry no plane/file bookkeeping.
    pub metadata_only: bool,
}

/// One logical channel of an image.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: String,
    pub name: Option<String>,
    pub samples_per_pixel: u32,
}

/// Links one source file to a contiguous run of planes.
#[derive(Debug, Clone)]
pub struct TiffData {
    pub first_c: u32,
    pub first_t: u32,
    pub first_z: u32,
    pub plane_count: u32,
    /// `urn:uuid:…` value identifying the file.
    pub uuid: String,
    pub file_name: String,
}

impl TiffData {
    /// Create a block for `file_name` with a fresh v4 UUID.
    pub fn new(file_name: &str, first_c: u32, first_t: u32, first_z: u32, plane_count: u32) -> Self {
        Self {
            first_c,
            first_t,
            first_z,
            plane_count,
            uuid: format!("urn:uuid:{}", Uuid::new_v4()),
            file_name: file_name.to_string(),
        }
    }
}

/// One physical 2D slice at a (channel, Z, T) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    pub the_c: u32,
    pub the_z: u32,
    pub the_t: u32,
}

// =============================================================================
// Id Allocation
// =============================================================================

/// Sequential id counters for one run.
///
/// Each run constructs its own allocator; image ordinals are shared between
/// the `Image:` and `Pixels:` ids and prefix the channel ids.
#[derive(Debug, Default)]
pub struct IdAllocator {
    images: u32,
    wells: u32,
    well_samples: u32,
}

impl IdAllocator {
    pub fn next_image(&mut self) -> u32 {
        let n = self.images;
        self.images += 1;
        n
    }

    pub fn next_well(&mut self) -> u32 {
        let n = self.wells;
        self.wells += 1;
        n
    }

    pub fn next_well_sample(&mut self) -> u32 {
        let n = self.well_samples;
        self.well_samples += 1;
        n
    }
}

// =============================================================================
// Tests
// =============================================================================
