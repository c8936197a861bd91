//! Reconciliation of sample-derived and filename-derived dimensions.

use std::collections::BTreeSet;

use crate::error::LayoutError;
use crate::model::PixelType;
use crate::tiff::SampleInfo;

use super::channels::ChannelMap;
use super::scan::{ImageBuckets, PlateScan};

/// The reconciled per-run dimension set.
///
/// One value of this struct is built per invocation from the sample probe
/// and the filename scan; nothing here is shared or reused across runs.
#[derive(Debug, Clone)]
pub struct PlateSpec {
    pub size_x: u32,
    pub size_y: u32,
    pub samples_per_pixel: u32,
    pub pixel_type: PixelType,
    pub dimension_order: String,

    /// Z plane count (from sample pages or filenames, default 1).
    pub z_planes: u32,

    /// Timepoint count (from sample pages or filenames, default 1).
    pub timepoints: u32,

    /// Logical channel count.
    pub channel_count: u32,

    /// Field (well sample slot) count, minimum 1.
    pub fields: u32,

    /// Contiguous planes recorded per source file.
    pub planes_per_tiff: u32,

    pub columns: u32,
    pub rows: BTreeSet<String>,
    pub channels: ChannelMap,

    /// Whether extra pages of a multi-page file sweep T (true) or Z (false).
    pub pages_as_timepoints: bool,
}

impl PlateSpec {
    /// Merge sample and scan results, applying the contradiction rules in
    /// order. Returns the reconciled dimensions together with the scan's
    /// image buckets.
    ///
    /// # Errors
    /// - `ZDoubleSpecified` / `TDoubleSpecified` when the multi-page sample
    ///   already fixes the axis the filenames also sweep
    /// - `ChannelsDoubleSpecified` when filenames name channels but the
    ///   sample pixels are already interleaved multichannel
    /// - `PlateLayoutIncomplete` when the scan found no rows or no columns
    pub fn reconcile(
        sample: &SampleInfo,
        scan: PlateScan,
        dimension_order: &str,
        pages_as_timepoints: bool,
    ) -> Result<(Self, ImageBuckets), LayoutError> {
        let mut z_planes = 1;
        let mut timepoints = 1;
        let mut planes_per_tiff = 1;

        if sample.pages > 1 {
            if pages_as_timepoints {
                timepoints = sample.pages;
            } else {
                z_planes = sample.pages;
            }
            planes_per_tiff = sample.planes_per_file();
        }

        if scan.z_planes > 0 {
            if z_planes > 1 {
                return Err(LayoutError::ZDoubleSpecified);
            }
            z_planes = scan.z_planes;
        }
        if scan.timepoints > 0 {
            if timepoints > 1 {
                return Err(LayoutError::TDoubleSpecified);
            }
            timepoints = scan.timepoints;
        }

        let mut channel_count = 1;
        if !scan.channels.is_empty() {
            if sample.samples_per_pixel > 1 {
                return Err(LayoutError::ChannelsDoubleSpecified);
            }
            channel_count = scan.channels.len() as u32;
        }

        if scan.columns == 0 || scan.rows.is_empty() {
            return Err(LayoutError::PlateLayoutIncomplete);
        }

        let fields = if scan.fields > 0 { scan.fields } else { 1 };

        Ok((
            Self {
                size_x: sample.width,
                size_y: sample.height,
                samples_per_pixel: sample.samples_per_pixel,
                pixel_type: sample.pixel_type,
                dimension_order: dimension_order.to_string(),
                z_planes,
                timepoints,
                channel_count,
                fields,
                planes_per_tiff,
                columns: scan.columns,
                rows: scan.rows,
                channels: scan.channels,
                pages_as_timepoints,
            },
            scan.buckets,
        ))
    }

    /// The dimension summary shown before the confirmation prompt.
    pub fn summary(&self) -> String {
        let rows: Vec<&String> = self.rows.iter().collect();
        format!(
            "Summary:\n  X: {}\n  Y: {}\n  Number of channels: {}\n  Channels: {}\n  \
             Samples per pixel: {}\n  Planes per tiff: {}\n  Z planes: {}\n  Timepoints: {}\n  \
             Pixeltype: {}\n  Dimension order: {}\n  Columns: {}\n  Rows: {:?}\n  Fields: {}",
            self.size_x,
            self.size_y,
            self.channel_count,
            self.channels,
            self.samples_per_pixel,
            self.planes_per_tiff,
            self.z_planes,
            self.timepoints,
            self.pixel_type,
            self.dimension_order,
            self.columns,
            rows,
            self.fields,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
