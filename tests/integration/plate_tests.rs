//! End-to-end tests for the filename-based plate pipeline.

use ome_companion::{
    build_plate_companion, to_xml, IndexBase, IndexBases, LayoutError, NamingPattern, PlateScan,
    PlateSpec, RowMode, SampleInfo,
};

use super::test_utils::{create_tiff, write_plate_fixtures, PageSpec, FULL_PATTERN};

#[test]
fn round_trip_plate_generation() {
    let dir = tempfile::tempdir().unwrap();
    let (sample, input_file, regex_file) = write_plate_fixtures(
        dir.path(),
        "B02_1-z1-t1-ch1-DAPI.tiff",
        &[PageSpec::gray8(640, 480)],
        &[
            "B02_1-z1-t1-ch1-DAPI.tiff",
            "B02_1-z1-t1-ch2-GFP.tiff",
            "B02_2-z1-t1-ch1-DAPI.tiff",
        ],
        FULL_PATTERN,
    );

    let pattern =
        NamingPattern::from_file(&regex_file, RowMode::Alphabetic, IndexBases::default()).unwrap();
    assert!(pattern.matches(sample.file_name().unwrap().to_str().unwrap()));

    let info = SampleInfo::probe_path(&sample).unwrap();
    assert_eq!(info.width, 640);
    assert_eq!(info.pages, 1);

    let input = std::fs::read_to_string(&input_file).unwrap();
    let scan = PlateScan::run(&pattern, input.lines()).unwrap();
    let (spec, buckets) = PlateSpec::reconcile(&info, scan, "XYCZT", false).unwrap();

    assert_eq!(spec.rows.iter().collect::<Vec<_>>(), ["B"]);
    assert_eq!(spec.columns, 2);
    assert_eq!(spec.fields, 2);
    assert_eq!(spec.channel_count, 2);
    assert_eq!(spec.z_planes, 1);
    assert_eq!(spec.timepoints, 1);

    let ome = build_plate_companion("screen-1", &spec, &buckets);
    let xml = to_xml(&ome).unwrap();

    assert!(xml.contains(r#"<Plate ID="Plate:0" Name="screen-1" Rows="1" Columns="2">"#));
    assert_eq!(xml.matches("<Image ").count(), 2);
    assert!(xml.contains(r#"Name="DAPI""#));
    assert!(xml.contains(r#"Name="GFP""#));
    assert!(xml.contains(r#"SizeX="640""#));
    assert!(xml.contains(r#"SizeC="2""#));

    // Every ImageRef must resolve to an emitted Image element
    for image in &ome.images {
        assert!(xml.contains(&format!(r#"<Image ID="{}""#, image.id)));
    }
    for well in &ome.plates[0].wells {
        for sample in well.samples.iter().flatten() {
            assert!(xml.contains(&format!(r#"<ImageRef ID="{}"/>"#, sample.image_ref)));
        }
    }
}

#[test]
fn z_contradiction_is_fatal() {
    // Three-page sample interpreted as Z, and filenames also sweep z1..z3
    let dir = tempfile::tempdir().unwrap();
    let pages = [
        PageSpec::gray16(64, 64),
        PageSpec::gray16(64, 64),
        PageSpec::gray16(64, 64),
    ];
    let (sample, input_file, regex_file) = write_plate_fixtures(
        dir.path(),
        "B02_1-z1-t1-ch1-DAPI.tiff",
        &pages,
        &[
            "B02_1-z1-t1-ch1-DAPI.tiff",
            "B02_1-z2-t1-ch1-DAPI.tiff",
            "B02_1-z3-t1-ch1-DAPI.tiff",
        ],
        FULL_PATTERN,
    );

    let pattern =
        NamingPattern::from_file(&regex_file, RowMode::Alphabetic, IndexBases::default()).unwrap();
    let info = SampleInfo::probe_path(&sample).unwrap();
    assert_eq!(info.pages, 3);

    let input = std::fs::read_to_string(&input_file).unwrap();
    let scan = PlateScan::run(&pattern, input.lines()).unwrap();
    let err = PlateSpec::reconcile(&info, scan, "XYCZT", false).unwrap_err();
    assert_eq!(err, LayoutError::ZDoubleSpecified);

    // Nothing was written
    assert!(!dir.path().join("plate.ome.xml").exists());
}

#[test]
fn no_matching_lines_is_layout_incomplete() {
    let dir = tempfile::tempdir().unwrap();
    let (_, input_file, regex_file) = write_plate_fixtures(
        dir.path(),
        "B02_1-z1-t1-ch1-DAPI.tiff",
        &[PageSpec::gray8(16, 16)],
        &["one.tiff", "two.tiff", ""],
        FULL_PATTERN,
    );

    let pattern =
        NamingPattern::from_file(&regex_file, RowMode::Alphabetic, IndexBases::default()).unwrap();
    let info = SampleInfo {
        width: 16,
        height: 16,
        samples_per_pixel: 1,
        pixel_type: ome_companion::PixelType::UInt8,
        pages: 1,
    };

    let input = std::fs::read_to_string(&input_file).unwrap();
    let scan = PlateScan::run(&pattern, input.lines()).unwrap();
    assert!(scan.rows.is_empty());

    let err = PlateSpec::reconcile(&info, scan, "XYCZT", false).unwrap_err();
    assert_eq!(err, LayoutError::PlateLayoutIncomplete);
}

#[test]
fn column_base_toggle_is_respected() {
    let pattern_str = r"(?P<row>[a-zA-Z])(?P<col>\d+)";

    // One-based (default): column "1" becomes index 0
    let pattern =
        NamingPattern::new(pattern_str, RowMode::Alphabetic, IndexBases::default()).unwrap();
    let scan = PlateScan::run(&pattern, ["B1"]).unwrap();
    assert_eq!(scan.columns, 1);

    // Zero-based: column "1" stays index 1
    let bases = IndexBases {
        col: IndexBase::ZeroBased,
        ..IndexBases::default()
    };
    let pattern = NamingPattern::new(pattern_str, RowMode::Alphabetic, bases).unwrap();
    let scan = PlateScan::run(&pattern, ["B1"]).unwrap();
    assert_eq!(scan.columns, 2);
}

#[test]
fn rgb_sample_supplies_the_channel_dimension() {
    let dir = tempfile::tempdir().unwrap();
    let (sample, input_file, regex_file) = write_plate_fixtures(
        dir.path(),
        "B02_1.tiff",
        &[PageSpec::rgb8(128, 96)],
        &["B02_1.tiff", "B03_1.tiff"],
        r"(?P<row>[a-zA-Z])(?P<col>\d+)_(?P<field>\d+)",
    );

    let pattern =
        NamingPattern::from_file(&regex_file, RowMode::Alphabetic, IndexBases::default()).unwrap();
    let info = SampleInfo::probe_path(&sample).unwrap();
    assert_eq!(info.samples_per_pixel, 3);

    let input = std::fs::read_to_string(&input_file).unwrap();
    let scan = PlateScan::run(&pattern, input.lines()).unwrap();
    let (spec, buckets) = PlateSpec::reconcile(&info, scan, "XYCZT", false).unwrap();

    let ome = build_plate_companion("rgb", &spec, &buckets);
    let xml = to_xml(&ome).unwrap();

    assert!(xml.contains(r#"SizeC="3""#));
    assert!(xml.contains(r#"SamplesPerPixel="3""#));
    // Planes sweep the interleaved sample index
    assert!(xml.contains(r#"<Plane TheC="2" TheZ="0" TheT="0"/>"#));
}

#[test]
fn multi_page_sample_as_timepoints() {
    let dir = tempfile::tempdir().unwrap();
    let pages = [
        PageSpec::gray16(32, 32),
        PageSpec::gray16(32, 32),
        PageSpec::gray16(32, 32),
        PageSpec::gray16(32, 32),
    ];
    let (sample, input_file, regex_file) = write_plate_fixtures(
        dir.path(),
        "A01_1.tiff",
        &pages,
        &["A01_1.tiff"],
        r"(?P<row>[a-zA-Z])(?P<col>\d+)_(?P<field>\d+)",
    );

    let pattern =
        NamingPattern::from_file(&regex_file, RowMode::Alphabetic, IndexBases::default()).unwrap();
    let info = SampleInfo::probe_path(&sample).unwrap();

    let input = std::fs::read_to_string(&input_file).unwrap();
    let scan = PlateScan::run(&pattern, input.lines()).unwrap();
    let (spec, buckets) = PlateSpec::reconcile(&info, scan, "XYCZT", true).unwrap();
    assert_eq!(spec.timepoints, 4);
    assert_eq!(spec.z_planes, 1);
    assert_eq!(spec.planes_per_tiff, 4);

    let ome = build_plate_companion("timelapse", &spec, &buckets);
    let xml = to_xml(&ome).unwrap();
    assert!(xml.contains(r#"SizeT="4""#));
    assert!(xml.contains(r#"PlaneCount="4""#));
    assert!(xml.contains(r#"<Plane TheC="0" TheZ="0" TheT="3"/>"#));
}

#[test]
fn pattern_file_is_trimmed_and_sample_checked() {
    let dir = tempfile::tempdir().unwrap();
    let regex_file = dir.path().join("pattern.txt");
    std::fs::write(&regex_file, format!("{FULL_PATTERN}\n")).unwrap();

    let pattern =
        NamingPattern::from_file(&regex_file, RowMode::Alphabetic, IndexBases::default()).unwrap();
    assert!(pattern.matches("B02_1-z1-t1-ch1-DAPI.tiff"));
    assert!(!pattern.matches("unrelated-name.tiff"));
}

#[test]
fn probe_failure_surfaces_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let sample = dir.path().join("broken.tiff");
    std::fs::write(&sample, b"not a tiff").unwrap();
    assert!(SampleInfo::probe_path(&sample).is_err());
}

#[test]
fn synthesized_tiff_is_well_formed() {
    // Sanity-check the fixture builder itself: a 2-page gray16 stack
    let data = create_tiff(&[PageSpec::gray16(10, 20), PageSpec::gray16(10, 20)]);
    let mut reader = ome_companion::io::SliceReader::new(&data);
    let info = SampleInfo::probe(&mut reader).unwrap();
    assert_eq!(info.width, 10);
    assert_eq!(info.height, 20);
    assert_eq!(info.pages, 2);
}
