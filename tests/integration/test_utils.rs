//! Test utilities for integration tests.
//!
//! This module synthesizes minimal classic little-endian TIFF files and
//! on-disk Zarr stores so the pipeline can be driven end-to-end without
//! binary fixtures in the repository.

use std::fs;
use std::path::{Path, PathBuf};

/// Description of one synthesized TIFF page.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
    /// TIFF SampleFormat value; None omits the tag (unsigned by default)
    pub sample_format: Option<u16>,
}

impl PageSpec {
    pub fn gray8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_sample: 8,
            samples_per_pixel: 1,
            sample_format: None,
        }
    }

    pub fn gray16(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_sample: 16,
            samples_per_pixel: 1,
            sample_format: None,
        }
    }

    pub fn rgb8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits_per_sample: 8,
            samples_per_pixel: 3,
            sample_format: None,
        }
    }

    fn entry_count(&self) -> u16 {
        if self.sample_format.is_some() {
            5
        } else {
            4
        }
    }

    fn ifd_len(&self) -> usize {
        2 + self.entry_count() as usize * 12 + 4
    }

    /// Bytes needed outside the IFD for the BitsPerSample array.
    fn extra_len(&self) -> usize {
        if self.samples_per_pixel > 2 {
            2 * self.samples_per_pixel as usize
        } else {
            0
        }
    }
}

/// Synthesize a classic little-endian multi-page TIFF.
///
/// BitsPerSample arrays with more than two entries are written out-of-line
/// after the IFD chain, the way real writers store RGB metadata.
pub fn create_tiff(pages: &[PageSpec]) -> Vec<u8> {
    let mut data = vec![0x49, 0x49, 0x2A, 0x00];
    data.extend_from_slice(&8u32.to_le_bytes());

    let ifds_end: usize = 8 + pages.iter().map(PageSpec::ifd_len).sum::<usize>();
    let mut extra_offset = ifds_end;
    let mut extras: Vec<u8> = Vec::new();
    let mut offset = 8usize;

    for (i, page) in pages.iter().enumerate() {
        assert_eq!(data.len(), offset);
        let next = if i + 1 < pages.len() {
            (offset + page.ifd_len()) as u32
        } else {
            0
        };

        data.extend_from_slice(&page.entry_count().to_le_bytes());

        let entry = |data: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: [u8; 4]| {
            data.extend_from_slice(&tag.to_le_bytes());
            data.extend_from_slice(&field_type.to_le_bytes());
            data.extend_from_slice(&count.to_le_bytes());
            data.extend_from_slice(&value);
        };

        entry(&mut data, 256, 4, 1, page.width.to_le_bytes());
        entry(&mut data, 257, 4, 1, page.height.to_le_bytes());

        let spp = page.samples_per_pixel;
        if spp > 2 {
            // Out-of-line BitsPerSample array
            entry(&mut data, 258, 3, spp as u32, (extra_offset as u32).to_le_bytes());
            for _ in 0..spp {
                extras.extend_from_slice(&page.bits_per_sample.to_le_bytes());
            }
            extra_offset += page.extra_len();
        } else {
            let mut value = [0u8; 4];
            value[..2].copy_from_slice(&page.bits_per_sample.to_le_bytes());
            value[2..].copy_from_slice(&page.bits_per_sample.to_le_bytes());
            entry(&mut data, 258, 3, spp.max(1) as u32, value);
        }

        let mut spp_value = [0u8; 4];
        spp_value[..2].copy_from_slice(&spp.to_le_bytes());
        entry(&mut data, 277, 3, 1, spp_value);

        if let Some(format) = page.sample_format {
            let mut value = [0u8; 4];
            value[..2].copy_from_slice(&format.to_le_bytes());
            entry(&mut data, 339, 3, 1, value);
        }

        data.extend_from_slice(&next.to_le_bytes());
        offset += page.ifd_len();
    }

    assert_eq!(data.len(), ifds_end);
    data.extend_from_slice(&extras);
    data
}

/// Write a sample TIFF, a filename list and a pattern file into `dir`.
///
/// Returns (sample, input_file, regex_file) paths.
pub fn write_plate_fixtures(
    dir: &Path,
    sample_name: &str,
    pages: &[PageSpec],
    filenames: &[&str],
    pattern: &str,
) -> (PathBuf, PathBuf, PathBuf) {
    let sample = dir.join(sample_name);
    fs::write(&sample, create_tiff(pages)).unwrap();

    let input_file = dir.join("files.txt");
    fs::write(&input_file, filenames.join("\n")).unwrap();

    let regex_file = dir.join("pattern.txt");
    fs::write(&regex_file, pattern).unwrap();

    (sample, input_file, regex_file)
}

/// The regex used by most plate tests, matching names like
/// `B02_1-z1-t2-ch1-DAPI.tiff`.
pub const FULL_PATTERN: &str = r"(?P<row>[a-zA-Z]+)(?P<col>\d+)_(?P<field>\d+)-z(?P<z>\d+)-t(?P<t>\d+)-ch(?P<channel_index>\d+)-(?P<channel_name>.+)\.";

/// Write one file into a Zarr store directory, creating parents.
pub fn write_store_key(root: &Path, key: &str, contents: &str) {
    let path = root.join(key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Image-group `.zattrs` with a t/c/z/y/x multiscale.
pub const IMAGE_ATTRS: &str = r#"{
    "multiscales": [{
        "version": "0.4",
        "axes": [
            {"name": "t", "type": "time"},
            {"name": "c", "type": "channel"},
            {"name": "z", "type": "space"},
            {"name": "y", "type": "space"},
            {"name": "x", "type": "space"}
        ],
        "datasets": [{"path": "0"}]
    }]
}"#;
