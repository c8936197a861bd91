//! Serde models for the NGFF attribute documents.
//!
//! Only the fields the companion generator consumes are modelled; unknown
//! fields are ignored. Field naming follows the NGFF 0.4 metadata spec
//! (camelCase keys, `bioformats2raw.layout` marker).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::NgffError;
use crate::model::PixelType;

/// Root (or image-group) `.zattrs` document.
#[derive(Debug, Deserialize)]
pub struct RootAttrs {
    #[serde(default)]
    pub multiscales: Option<Vec<Multiscale>>,

    #[serde(default)]
    pub plate: Option<PlateAttrs>,

    #[serde(rename = "bioformats2raw.layout", default)]
    pub bioformats2raw_layout: Option<i64>,
}

impl RootAttrs {
    /// Whether the store follows the bioformats2raw layout, with the image
    /// group nested under `0/`.
    pub fn is_bioformats2raw(&self) -> bool {
        self.bioformats2raw_layout == Some(3)
    }
}

/// One entry of `multiscales`.
#[derive(Debug, Deserialize)]
pub struct Multiscale {
    #[serde(default)]
    pub name: Option<String>,

    pub axes: Vec<Axis>,

    // ordered by largest (i.e. highest resolution) to smallest
    pub datasets: Vec<Dataset>,
}

/// One axis of a multiscale image.
#[derive(Debug, Deserialize)]
pub struct Axis {
    pub name: String,

    #[serde(rename = "type", default)]
    pub axis_type: Option<String>,

    #[serde(default)]
    pub unit: Option<String>,
}

/// One resolution level of a multiscale image.
#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub path: String,
}

/// The `plate` document of an HCS store.
#[derive(Debug, Deserialize)]
pub struct PlateAttrs {
    pub rows: Vec<PlateName>,
    pub columns: Vec<PlateName>,
    pub wells: Vec<PlateWellEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PlateName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlateWellEntry {
    pub path: String,

    #[serde(rename = "rowIndex")]
    pub row_index: u32,

    #[serde(rename = "columnIndex")]
    pub column_index: u32,
}

/// A well group's `.zattrs` document.
#[derive(Debug, Deserialize)]
pub struct WellAttrs {
    pub well: WellImages,
}

#[derive(Debug, Deserialize)]
pub struct WellImages {
    pub images: Vec<FieldImage>,
}

/// One field image of a well.
#[derive(Debug, Deserialize)]
pub struct FieldImage {
    pub path: String,

    #[serde(default)]
    pub acquisition: Option<u64>,
}

/// The `.zarray` document of a Zarr v2 array.
#[derive(Debug, Deserialize)]
pub struct ArrayMeta {
    pub shape: Vec<u64>,
    pub dtype: String,
}

impl ArrayMeta {
    /// Axis-name → size mapping, zipping the multiscale axes with the
    /// array shape. Extra entries on either side are ignored.
    pub fn sizes(&self, axes: &[Axis]) -> BTreeMap<String, u64> {
        axes.iter()
            .zip(self.shape.iter())
            .map(|(axis, &size)| (axis.name.clone(), size))
            .collect()
    }

    pub fn pixel_type(&self) -> Result<PixelType, NgffError> {
        pixel_type_from_dtype(&self.dtype)
    }
}

/// Map a Zarr v2 dtype string (e.g. `<u2`, `|u1`, `<f4`) to an OME pixel
/// type. The byte-order prefix is irrelevant for metadata and stripped.
pub fn pixel_type_from_dtype(dtype: &str) -> Result<PixelType, NgffError> {
    let kind = dtype.trim_start_matches(['<', '>', '|', '=']);
    match kind {
        "u1" => Ok(PixelType::UInt8),
        "u2" => Ok(PixelType::UInt16),
        "u4" => Ok(PixelType::UInt32),
        "i1" => Ok(PixelType::Int8),
        "i2" => Ok(PixelType::Int16),
        "i4" => Ok(PixelType::Int32),
        "f4" => Ok(PixelType::Float),
        "f8" => Ok(PixelType::Double),
        _ => Err(NgffError::UnsupportedDtype(dtype.to_string())),
    }
}

// =============================================================================
// Tests
// =============================================================================
