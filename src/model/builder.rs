//! Construction of the metadata graph from a reconciled plate.

use std::collections::BTreeMap;

use crate::layout::{ImageBuckets, ImageKey, ParsedFilename, PlateSpec};

use super::{Channel, IdAllocator, Image, Ome, Pixels, Plane, Plate, TiffData, Well, WellSample};

/// Build the complete plate/well/image graph for one run.
///
/// Wells are created lazily on first sighting of a (row, column) pair, with
/// their sample slots pre-sized to the field count. Every bucket becomes one
/// image attached at its field slot.
pub fn build_plate_companion(plate_name: &str, spec: &PlateSpec, buckets: &ImageBuckets) -> Ome {
    let mut ids = IdAllocator::default();
    let mut ome = Ome::new();

    let mut plate = Plate {
        id: "Plate:0".to_string(),
        name: plate_name.to_string(),
        rows: spec.rows.len() as u32,
        columns: spec.columns,
        wells: Vec::new(),
    };

    let mut well_slots: BTreeMap<(u32, u32), usize> = BTreeMap::new();

    for (key, files) in buckets {
        let slot = *well_slots.entry((key.row, key.col)).or_insert_with(|| {
            plate
                .wells
                .push(Well::new(ids.next_well(), key.row, key.col, spec.fields));
            plate.wells.len() - 1
        });

        let image = build_image(spec, key, files, &mut ids);
        plate.wells[slot].samples[key.field as usize] = Some(WellSample {
            id: format!("WellSample:{}", ids.next_well_sample()),
            index: key.field,
            image_ref: image.id.clone(),
        });
        ome.images.push(image);
    }

    ome.plates.push(plate);
    ome
}

/// Build one image from its bucket of source files.
fn build_image(
    spec: &PlateSpec,
    key: &ImageKey,
    files: &[ParsedFilename],
    ids: &mut IdAllocator,
) -> Image {
    let ordinal = ids.next_image();

    // Interleaved samples win over filename-derived channels
    let pixels_c = if spec.samples_per_pixel > 1 {
        spec.samples_per_pixel
    } else {
        spec.channel_count
    };

    let mut channels: Vec<Channel> = (0..spec.channel_count)
        .map(|i| Channel {
            id: format!("Channel:{ordinal}:{i}"),
            name: None,
            samples_per_pixel: spec.samples_per_pixel,
        })
        .collect();
    for (index, name) in spec.channels.iter() {
        if let Some(channel) = channels.get_mut(index as usize) {
            *channel = Channel {
                id: format!("Channel:{ordinal}:{index}"),
                name: name.map(str::to_string),
                samples_per_pixel: 1,
            };
        }
    }

    let mut tiff_data = Vec::with_capacity(files.len());
    let mut planes = Vec::new();

    for file in files {
        let first_c = file.channel.unwrap_or(0);
        let mut z = file.fields.z.unwrap_or(0);
        let mut t = file.fields.t.unwrap_or(0);

        tiff_data.push(TiffData::new(
            &file.filename,
            first_c,
            t,
            z,
            spec.planes_per_tiff,
        ));

        for page in 0..spec.planes_per_tiff {
            for sample in 0..spec.samples_per_pixel {
                let the_c = if spec.samples_per_pixel > 1 {
                    sample
                } else {
                    first_c
                };
                if spec.planes_per_tiff > 1 {
                    if spec.pages_as_timepoints {
                        t = page;
                    } else {
                        z = page;
                    }
                }
                planes.push(Plane {
                    the_c,
                    the_z: z,
                    the_t: t,
                });
            }
        }
    }

    Image {
        id: format!("Image:{ordinal}"),
        name: key.to_string(),
        pixels: Pixels {
            id: format!("Pixels:{ordinal}"),
            dimension_order: spec.dimension_order.clone(),
            pixel_type: spec.pixel_type,
            size_x: spec.size_x,
            size_y: spec.size_y,
            size_z: spec.z_planes,
            size_c: pixels_c,
            size_t: spec.timepoints,
            channels,
            tiff_data,
            planes,
            metadata_only: false,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
