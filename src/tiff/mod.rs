//! Sample TIFF inspection.
//!
//! The filename pipeline never decodes pixel data; it opens exactly one
//! representative file and reads the geometry every image of the plate is
//! assumed to share: width, height, samples per pixel, pixel type, and the
//! number of pages (IFDs). Classic TIFF and BigTIFF are supported in both
//! byte orders.

mod parser;
mod tags;

pub use parser::{
    entry_first_u32, ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE,
};
pub use tags::{FieldType, TiffTag};

use std::path::Path;

use tracing::debug;

use crate::error::TiffError;
use crate::io::{FileReader, ReadAt};
use crate::model::PixelType;

/// Maximum number of IFDs to walk (safety limit)
const MAX_IFDS: usize = 10_000;

// =============================================================================
// SampleInfo
// =============================================================================

/// Geometry extracted from the sample image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInfo {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Interleaved samples per pixel (e.g. 3 for RGB)
    pub samples_per_pixel: u32,

    /// Pixel datatype of the first page
    pub pixel_type: PixelType,

    /// Number of pages (IFDs) in the file
    pub pages: u32,
}

impl SampleInfo {
    /// Probe the TIFF file at `path`.
    pub fn probe_path(path: &Path) -> Result<Self, TiffError> {
        let mut reader = FileReader::open(path)?;
        Self::probe(&mut reader)
    }

    /// Probe a TIFF from any positional reader.
    pub fn probe<R: ReadAt>(reader: &mut R) -> Result<Self, TiffError> {
        let file_size = reader.size();
        if file_size < TIFF_HEADER_SIZE as u64 {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: file_size,
            });
        }

        let head_len = (BIGTIFF_HEADER_SIZE as u64).min(file_size) as usize;
        let head = reader.read_exact_at(0, head_len)?;
        let header = TiffHeader::parse(&head, file_size)?;

        // Walk the IFD chain; the first IFD carries the geometry, the chain
        // length is the page count.
        let mut pages: u32 = 0;
        let mut offset = header.first_ifd_offset;
        let mut first_ifd: Option<Ifd> = None;

        while offset != 0 && (pages as usize) < MAX_IFDS {
            let ifd = Ifd::parse_at(reader, &header, offset)?;
            offset = ifd.next_ifd_offset;
            if first_ifd.is_none() {
                first_ifd = Some(ifd);
            }
            pages += 1;
        }

        let ifd = first_ifd.ok_or(TiffError::InvalidIfdOffset(header.first_ifd_offset))?;

        let width = require_u32(reader, &header, &ifd, TiffTag::ImageWidth)?;
        let height = require_u32(reader, &header, &ifd, TiffTag::ImageLength)?;
        let samples_per_pixel =
            optional_u32(reader, &header, &ifd, TiffTag::SamplesPerPixel)?.unwrap_or(1);
        // BitsPerSample defaults to 1 (bilevel) per the TIFF baseline; such
        // files have no OME pixel type and fail in from_tiff below.
        let bits = optional_u32(reader, &header, &ifd, TiffTag::BitsPerSample)?.unwrap_or(1);
        let format = optional_u32(reader, &header, &ifd, TiffTag::SampleFormat)?.unwrap_or(1);
        let pixel_type = PixelType::from_tiff(bits, format)?;

        debug!(
            pages,
            width, height, samples_per_pixel, %pixel_type, "probed sample image"
        );

        Ok(Self {
            width,
            height,
            samples_per_pixel,
            pixel_type,
            pages,
        })
    }

    /// Number of physical planes each source file contributes.
    ///
    /// Multi-page files contribute one plane per page, times the samples per
    /// pixel when pixels are interleaved. Single-page files contribute 1.
    pub fn planes_per_file(&self) -> u32 {
        if self.pages > 1 {
            if self.samples_per_pixel > 1 {
                self.samples_per_pixel * self.pages
            } else {
                self.pages
            }
        } else {
            1
        }
    }
}

fn require_u32<R: ReadAt>(
    reader: &mut R,
    header: &TiffHeader,
    ifd: &Ifd,
    tag: TiffTag,
) -> Result<u32, TiffError> {
    let entry = ifd.entry(tag).ok_or(TiffError::MissingTag(tag.name()))?;
    entry_first_u32(reader, header, entry, tag.name())
}

fn optional_u32<R: ReadAt>(
    reader: &mut R,
    header: &TiffHeader,
    ifd: &Ifd,
    tag: TiffTag,
) -> Result<Option<u32>, TiffError> {
    match ifd.entry(tag) {
        Some(entry) => entry_first_u32(reader, header, entry, tag.name()).map(Some),
        None => Ok(None),
    }
}

// =============================================================================
// Tests
// =============================================================================
