//! Companion-file generation from an existing NGFF store.

use std::path::Path;

use tracing::debug;

use crate::error::NgffError;
use crate::model::{
    IdAllocator, Image, Ome, Pixels, PixelType, Plate, Well, WellSample,
};

use super::metadata::{ArrayMeta, Multiscale, RootAttrs, WellAttrs};
use super::store::DirectoryStore;

/// Dimension order used for Zarr-derived pixels.
const ZARR_DIMENSION_ORDER: &str = "XYZCT";

/// Result of reading one store: the object name (used for the output file
/// name) and the finished metadata graph.
#[derive(Debug)]
pub struct ZarrCompanion {
    pub name: String,
    pub ome: Ome,
}

/// Build the companion document for the store at `path`.
///
/// A store whose root attributes carry a `plate` document becomes a plate
/// companion; otherwise it is treated as a single image, descending into
/// `0/` first for bioformats2raw-layout stores.
pub fn zarr_companion(path: &Path) -> Result<ZarrCompanion, NgffError> {
    let name = object_name(path);
    let store = DirectoryStore::open(path);
    let attrs: RootAttrs = store.get_json(".zattrs")?;

    let ome = if attrs.plate.is_some() {
        plate_companion(&store, attrs, &name)?
    } else {
        let (store, attrs) = if attrs.is_bioformats2raw() {
            let inner = store.sub("0");
            let attrs = inner.get_json(".zattrs")?;
            (inner, attrs)
        } else {
            (store, attrs)
        };
        image_companion(&store, attrs, &name)?
    };

    Ok(ZarrCompanion { name, ome })
}

/// Single-image companion: one Image with MetadataOnly pixels.
fn image_companion(
    store: &DirectoryStore,
    attrs: RootAttrs,
    name: &str,
) -> Result<Ome, NgffError> {
    let multiscale = first_multiscale(attrs, "")?;
    let mut ids = IdAllocator::default();

    let mut ome = Ome::new();
    ome.images
        .push(read_image(store, &multiscale, "", name, &mut ids)?);
    Ok(ome)
}

/// Whole-plate companion: wells and field images from the plate document.
fn plate_companion(
    store: &DirectoryStore,
    attrs: RootAttrs,
    name: &str,
) -> Result<Ome, NgffError> {
    // Checked by the caller
    let plate_attrs = match attrs.plate {
        Some(plate) => plate,
        None => return Err(NgffError::MissingMultiscales(".zattrs".to_string())),
    };

    let mut ids = IdAllocator::default();
    let mut ome = Ome::new();
    let mut plate = Plate {
        id: "Plate:0".to_string(),
        name: name.to_string(),
        rows: plate_attrs.rows.len() as u32,
        columns: plate_attrs.columns.len() as u32,
        wells: Vec::new(),
    };

    for well_entry in &plate_attrs.wells {
        let well_attrs: WellAttrs = store.get_json(&format!("{}/.zattrs", well_entry.path))?;
        let field_count = well_attrs.well.images.len();
        let mut well = Well::new(
            ids.next_well(),
            well_entry.row_index,
            well_entry.column_index,
            field_count as u32,
        );

        for (index, field) in well_attrs.well.images.iter().enumerate() {
            let image_path = format!("{}/{}", well_entry.path, field.path);
            let image_attrs: RootAttrs = store.get_json(&format!("{image_path}/.zattrs"))?;
            let multiscale = first_multiscale(image_attrs, &image_path)?;

            let image = read_image(store, &multiscale, &image_path, &image_path, &mut ids)?;
            well.samples[index] = Some(WellSample {
                id: format!("WellSample:{}", ids.next_well_sample()),
                index: index as u32,
                image_ref: image.id.clone(),
            });
            ome.images.push(image);
        }

        plate.wells.push(well);
    }

    ome.plates.push(plate);
    Ok(ome)
}

/// Read shape and dtype of the full-resolution dataset under `prefix` and
/// turn them into a MetadataOnly image.
fn read_image(
    store: &DirectoryStore,
    multiscale: &Multiscale,
    prefix: &str,
    name: &str,
    ids: &mut IdAllocator,
) -> Result<Image, NgffError> {
    let dataset = &multiscale.datasets[0];
    let array_key = if prefix.is_empty() {
        format!("{}/.zarray", dataset.path)
    } else {
        format!("{prefix}/{}/.zarray", dataset.path)
    };
    let array: ArrayMeta = store.get_json(&array_key)?;

    let sizes = array.sizes(&multiscale.axes);
    let pixel_type = array.pixel_type()?;

    debug!(name, ?sizes, %pixel_type, "read image metadata");

    let ordinal = ids.next_image();
    Ok(Image {
        id: format!("Image:{ordinal}"),
        name: name.to_string(),
        pixels: metadata_only_pixels(ordinal, pixel_type, &sizes),
    })
}

fn metadata_only_pixels(
    ordinal: u32,
    pixel_type: PixelType,
    sizes: &std::collections::BTreeMap<String, u64>,
) -> Pixels {
    let size = |axis: &str| sizes.get(axis).copied().unwrap_or(1) as u32;
    Pixels {
        id: format!("Pixels:{ordinal}"),
        dimension_order: ZARR_DIMENSION_ORDER.to_string(),
        pixel_type,
        size_x: size("x"),
        size_y: size("y"),
        size_z: size("z"),
        size_c: size("c"),
        size_t: size("t"),
        channels: Vec::new(),
        tiff_data: Vec::new(),
        planes: Vec::new(),
        metadata_only: true,
    }
}

fn first_multiscale(attrs: RootAttrs, at: &str) -> Result<Multiscale, NgffError> {
    let mut multiscales = attrs
        .multiscales
        .ok_or_else(|| NgffError::MissingMultiscales(location(at)))?;
    if multiscales.is_empty() {
        return Err(NgffError::MissingMultiscales(location(at)));
    }
    let multiscale = multiscales.remove(0);
    if multiscale.datasets.is_empty() {
        return Err(NgffError::MissingDatasets(location(at)));
    }
    Ok(multiscale)
}

fn location(at: &str) -> String {
    if at.is_empty() {
        ".zattrs".to_string()
    } else {
        format!("{at}/.zattrs")
    }
}

/// Object name derived from the store path: the last component minus any
/// extension, e.g. `/data/plate.zarr/` -> `plate`.
fn object_name(path: &Path) -> String {
    let last = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    match last.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => last,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, key: &str, contents: &str) {
        let path = root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    const IMAGE_ATTRS: &str = r#"{
        "multiscales": [{
            "axes": [
                {"name": "t"}, {"name": "c"}, {"name": "z"},
                {"name": "y"}, {"name": "x"}
            ],
            "datasets": [{"path": "0"}]
        }]
    }"#;

    #[test]
    fn object_name_strips_extension() {
        assert_eq!(object_name(Path::new("/data/plate.ome.zarr")), "plate");
        assert_eq!(object_name(Path::new("volume.zarr")), "volume");
        assert_eq!(object_name(Path::new("/data/noext")), "noext");
    }

    #[test]
    fn single_image_store() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("img.zarr");
        write(&root, ".zattrs", IMAGE_ATTRS);
        write(
            &root,
            "0/.zarray",
            r#"{"zarr_format": 2, "shape": [1, 2, 5, 256, 512], "dtype": "<u2", "chunks": [1,1,1,256,512], "compressor": null, "fill_value": 0, "order": "C", "filters": null}"#,
        );

        let companion = zarr_companion(&root).unwrap();
        assert_eq!(companion.name, "img");
        assert_eq!(companion.ome.images.len(), 1);
        assert!(companion.ome.plates.is_empty());

        let pixels = &companion.ome.images[0].pixels;
        assert!(pixels.metadata_only);
        assert_eq!(pixels.dimension_order, "XYZCT");
        assert_eq!(pixels.pixel_type, PixelType::UInt16);
        assert_eq!(pixels.size_x, 512);
        assert_eq!(pixels.size_y, 256);
        assert_eq!(pixels.size_z, 5);
        assert_eq!(pixels.size_c, 2);
        assert_eq!(pixels.size_t, 1);
    }

    #[test]
    fn bioformats2raw_store_descends_into_zero() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("conv.zarr");
        write(&root, ".zattrs", r#"{"bioformats2raw.layout": 3}"#);
        write(&root, "0/.zattrs", IMAGE_ATTRS);
        write(
            &root,
            "0/0/.zarray",
            r#"{"shape": [1, 1, 1, 64, 64], "dtype": "|u1"}"#,
        );

        let companion = zarr_companion(&root).unwrap();
        assert_eq!(companion.ome.images.len(), 1);
        assert_eq!(companion.ome.images[0].pixels.pixel_type, PixelType::UInt8);
        assert_eq!(companion.ome.images[0].name, "conv");
    }

    #[test]
    fn plate_store_builds_wells_and_field_images() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("screen.zarr");
        write(
            &root,
            ".zattrs",
            r#"{
                "plate": {
                    "rows": [{"name": "A"}, {"name": "B"}],
                    "columns": [{"name": "1"}],
                    "wells": [
                        {"path": "A/1", "rowIndex": 0, "columnIndex": 0},
                        {"path": "B/1", "rowIndex": 1, "columnIndex": 0}
                    ]
                }
            }"#,
        );
        for well in ["A/1", "B/1"] {
            write(
                &root,
                &format!("{well}/.zattrs"),
                r#"{"well": {"images": [{"path": "0"}, {"path": "1"}], "version": "0.4"}}"#,
            );
            for field in ["0", "1"] {
                write(&root, &format!("{well}/{field}/.zattrs"), IMAGE_ATTRS);
                write(
                    &root,
                    &format!("{well}/{field}/0/.zarray"),
                    r#"{"shape": [1, 3, 1, 128, 128], "dtype": "<f4"}"#,
                );
            }
        }

        let companion = zarr_companion(&root).unwrap();
        assert_eq!(companion.name, "screen");
        assert_eq!(companion.ome.plates.len(), 1);

        let plate = &companion.ome.plates[0];
        assert_eq!(plate.rows, 2);
        assert_eq!(plate.columns, 1);
        assert_eq!(plate.wells.len(), 2);
        assert_eq!(companion.ome.images.len(), 4);

        let well = &plate.wells[1];
        assert_eq!((well.row, well.column), (1, 0));
        assert_eq!(well.samples.len(), 2);
        let sample = well.samples[0].as_ref().unwrap();
        assert_eq!(sample.index, 0);
        // Field images are named by their store path
        let image = companion
            .ome
            .images
            .iter()
            .find(|img| img.id == sample.image_ref)
            .unwrap();
        assert_eq!(image.name, "B/1/0");
        assert_eq!(image.pixels.pixel_type, PixelType::Float);
        assert_eq!(image.pixels.size_c, 3);
    }

    #[test]
    fn missing_multiscales_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("bad.zarr");
        write(&root, ".zattrs", "{}");
        let err = zarr_companion(&root).unwrap_err();
        assert!(matches!(err, NgffError::MissingMultiscales(_)));
    }
}
