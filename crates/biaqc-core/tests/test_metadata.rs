use serde_json::json;

use biaqc_core::metadata::{
    extract_plane_metadata, series_metadata, MetadataAnalysis, MetadataTable, PlaneMetadata,
    Status,
};
use biaqc_core::series::{ArraySeries, SeriesPath};

fn nd2_plane(image: &str, instrument: &str, t: usize, delta_ms: f64) -> PlaneMetadata {
    PlaneMetadata {
        file_path: format!("/data/{image}.nd2"),
        image_name: image.into(),
        extension: "nd2".into(),
        instrument_model: Some(instrument.into()),
        objective_lens_na: Some(1.4),
        objective_nominal_magnification: Some(60.0),
        significant_bits: Some(12.0),
        size_t: Some(4.0),
        size_c: Some(1.0),
        size_z: Some(1.0),
        size_x: Some(512.0),
        size_y: Some(512.0),
        physical_size_x: Some(0.1083),
        physical_size_y: Some(0.1083),
        the_t: Some(t as f64),
        the_c: Some(0.0),
        the_z: Some(0.0),
        delta_t: Some(delta_ms),
        delta_t_unit: Some("UnitsTime.MILLISECOND".into()),
        ..Default::default()
    }
}

fn two_instrument_table() -> MetadataTable {
    let mut rows = Vec::new();
    for (image, instrument) in [("a", "Ti2 Eclipse"), ("b", "Ti2 Eclipse"), ("c", "Nikon A1")] {
        for (t, ms) in [0.0, 8030.0, 16080.0, 24150.0].into_iter().enumerate() {
            rows.push(nd2_plane(image, instrument, t, ms));
        }
    }
    MetadataTable::new(rows)
}

#[test]
fn test_full_report() {
    let table = two_instrument_table();
    let report = MetadataAnalysis::new(&table).report();
    let lines: Vec<String> = report.lines.iter().map(|l| l.to_string()).collect();

    assert_eq!(
        lines,
        vec![
            "[v] All images are of nd2 type.",
            "[x] More than one instrument found. Found instruments are [Ti2 Eclipse, Nikon A1].",
            "[v] All images are acquired with 1.4 objective.",
            "[v] All images are acquired with 60x.",
            "[v] All images are acquired with 12 bit depth.",
            "[?] Time series data with 4 frames per image.",
            "[?] Not a z-stack.",
            "[?] Single channel image.",
            "[v] Images have width 512.",
            "[v] Images have height 512.",
            "[v] All images acquired have 0.1083 micrometers physical size x.",
            "[v] All images acquired have 0.1083 micrometers physical size y.",
            "[v] Time between frames: 8.05 +/- 0.0173 seconds.",
        ]
    );
    assert!(!report.is_consistent());
    assert_eq!(report.failures().count(), 1);
}

#[test]
fn test_extension_mismatch_lists_both() {
    let mut rows = vec![nd2_plane("a", "Ti2", 0, 0.0)];
    let mut tif = nd2_plane("b", "Ti2", 0, 0.0);
    tif.extension = "tif".into();
    rows.push(tif);
    let table = MetadataTable::new(rows);

    let line = MetadataAnalysis::new(&table).check_extension();
    assert_eq!(line.status, Status::Fail);
    assert_eq!(
        line.text,
        "More than one image type found. Found extensions are [nd2, tif]."
    );
}

#[test]
fn test_all_missing_fields_use_could_not_find_lines() {
    let table = MetadataTable::new(vec![PlaneMetadata {
        file_path: "/d/x.ser".into(),
        image_name: "x".into(),
        extension: "ser".into(),
        ..Default::default()
    }]);
    let report = MetadataAnalysis::new(&table).report();
    let lines: Vec<String> = report.lines.iter().map(|l| l.to_string()).collect();

    assert_eq!(lines[1], "[x] Could not find the instrument name.");
    assert_eq!(lines[2], "[x] Could not find the lens objective.");
    assert_eq!(lines[5], "[?] Could not find t or not a time series.");
    assert_eq!(lines[6], "[?] Could not find z-depth or not a z-stack.");
    assert_eq!(lines[7], "[x] Could not find number of channels.");
    assert_eq!(lines[12], "[x] Could not find time delta.");
}

#[test]
fn test_unknown_time_unit_fails_interval() {
    let mut rows: Vec<PlaneMetadata> = (0..4)
        .map(|t| nd2_plane("a", "Ti2", t, t as f64 * 100.0))
        .collect();
    for r in &mut rows {
        r.delta_t_unit = Some("UnitsTime.FORTNIGHT".into());
    }
    let table = MetadataTable::new(rows);
    let analysis = MetadataAnalysis::new(&table);
    assert!(analysis.frame_interval().is_err());
    assert_eq!(analysis.check_frame_interval().status, Status::Fail);
}

#[test]
fn test_metadata_csv_round_trip() {
    let table = two_instrument_table();
    let mut buf = Vec::new();
    table.write_csv_to(&mut buf).unwrap();
    let read = MetadataTable::from_reader(buf.as_slice()).unwrap();
    assert_eq!(read, table);
}

#[test]
fn test_in_memory_series_metadata() {
    let tree = json!({
        "instruments": [{ "detectors": [{ "model": "Ti2" }] }],
        "images": [{ "pixels": {
            "size_c": 2,
            "planes": [
                { "the_t": 0, "the_c": 0, "the_z": 0 },
                { "the_t": 0, "the_c": 1, "the_z": 0 }
            ]
        }}]
    });
    let data = ndarray::Array5::<f32>::zeros((1, 2, 1, 4, 4)).into_dyn();
    let series = ArraySeries::new("/d/w.nd2", "TCZYX", data)
        .unwrap()
        .with_metadata(tree.clone());

    let rows = series_metadata(&series).unwrap();
    assert_eq!(rows, extract_plane_metadata(&SeriesPath::new("/d/w.nd2"), &tree).unwrap());
    assert_eq!(rows[1].the_c, Some(1.0));

    let bare = ArraySeries::new(
        "/d/bare.tif",
        "TCZYX",
        ndarray::Array5::<f32>::zeros((1, 1, 1, 2, 2)).into_dyn(),
    )
    .unwrap();
    assert!(series_metadata(&bare).is_err());
}
