//! End-to-end tests for the NGFF extraction pipeline.

use ome_companion::{to_xml, zarr_companion};

use super::test_utils::{write_store_key, IMAGE_ATTRS};

#[test]
fn single_image_store_to_xml() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("volume.zarr");
    write_store_key(&root, ".zattrs", IMAGE_ATTRS);
    write_store_key(
        &root,
        "0/.zarray",
        r#"{"zarr_format": 2, "shape": [2, 3, 10, 256, 512], "dtype": "<u2", "chunks": [1, 1, 1, 256, 512], "compressor": null, "fill_value": 0, "order": "C"}"#,
    );

    let companion = zarr_companion(&root).unwrap();
    assert_eq!(companion.name, "volume");

    let xml = to_xml(&companion.ome).unwrap();
    assert!(xml.contains(r#"<Image ID="Image:0" Name="volume">"#));
    assert!(xml.contains(r#"DimensionOrder="XYZCT""#));
    assert!(xml.contains(r#"Type="uint16""#));
    assert!(xml.contains(r#"SizeX="512""#));
    assert!(xml.contains(r#"SizeY="256""#));
    assert!(xml.contains(r#"SizeZ="10""#));
    assert!(xml.contains(r#"SizeC="3""#));
    assert!(xml.contains(r#"SizeT="2""#));
    assert!(xml.contains("<MetadataOnly/>"));
    assert!(!xml.contains("<Plate"));
    assert!(!xml.contains("<TiffData"));
}

#[test]
fn bioformats2raw_store_uses_nested_image() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("converted.zarr");
    write_store_key(&root, ".zattrs", r#"{"bioformats2raw.layout": 3}"#);
    write_store_key(&root, "0/.zattrs", IMAGE_ATTRS);
    write_store_key(
        &root,
        "0/0/.zarray",
        r#"{"shape": [1, 1, 1, 32, 32], "dtype": "|u1"}"#,
    );

    let companion = zarr_companion(&root).unwrap();
    assert_eq!(companion.name, "converted");

    let xml = to_xml(&companion.ome).unwrap();
    assert!(xml.contains(r#"Type="uint8""#));
    assert!(xml.contains(r#"SizeX="32""#));
}

#[test]
fn plate_store_to_xml() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("screen.zarr");
    write_store_key(
        &root,
        ".zattrs",
        r#"{
            "plate": {
                "version": "0.4",
                "name": "screen",
                "field_count": 2,
                "rows": [{"name": "A"}, {"name": "B"}],
                "columns": [{"name": "1"}, {"name": "2"}],
                "wells": [
                    {"path": "A/1", "rowIndex": 0, "columnIndex": 0},
                    {"path": "B/2", "rowIndex": 1, "columnIndex": 1}
                ]
            }
        }"#,
    );
    for well in ["A/1", "B/2"] {
        write_store_key(
            &root,
            &format!("{well}/.zattrs"),
            r#"{"well": {"images": [{"path": "0"}, {"path": "1"}], "version": "0.4"}}"#,
        );
        for field in ["0", "1"] {
            write_store_key(&root, &format!("{well}/{field}/.zattrs"), IMAGE_ATTRS);
            write_store_key(
                &root,
                &format!("{well}/{field}/0/.zarray"),
                r#"{"shape": [1, 2, 1, 64, 64], "dtype": "<u2"}"#,
            );
        }
    }

    let companion = zarr_companion(&root).unwrap();
    let ome = &companion.ome;
    assert_eq!(ome.plates.len(), 1);
    assert_eq!(ome.images.len(), 4);

    let xml = to_xml(ome).unwrap();
    assert!(xml.contains(r#"<Plate ID="Plate:0" Name="screen" Rows="2""#));
    assert!(xml.contains(r#"Rows="2""#));
    assert!(xml.contains(r#"Columns="2""#));
    assert_eq!(xml.matches("<Well ").count(), 2);
    assert_eq!(xml.matches("<WellSample ").count(), 4);
    assert_eq!(xml.matches("<Image ").count(), 4);
    assert!(xml.contains(r#"Name="A/1/0""#));
    assert!(xml.contains(r#"Name="B/2/1""#));

    // Cross-reference integrity: every ImageRef points at an Image
    for well in &ome.plates[0].wells {
        for sample in well.samples.iter().flatten() {
            assert!(ome.images.iter().any(|img| img.id == sample.image_ref));
            assert!(xml.contains(&format!(r#"<ImageRef ID="{}"/>"#, sample.image_ref)));
        }
    }
}

#[test]
fn missing_store_attrs_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("empty.zarr");
    std::fs::create_dir_all(&root).unwrap();
    assert!(zarr_companion(&root).is_err());
}
