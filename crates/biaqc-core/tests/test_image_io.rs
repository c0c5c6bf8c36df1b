use image::{ImageBuffer, Luma, Rgb};

use biaqc_core::config::QcConfig;
use biaqc_core::io::image_io::load_image;
use biaqc_core::io::open_series;
use biaqc_core::pipeline::{process_batch, ExtractionContext, NoOpReporter};
use biaqc_core::series::SeriesSource;

#[test]
fn test_gray16_png_keeps_raw_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate_01.png");
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(10, 6, |x, y| Luma([(x * 400 + y * 10) as u16]));
    img.save(&path).unwrap();

    let series = load_image(&path).unwrap();
    assert_eq!(series.dimensions().shape(), &[1, 1, 1, 6, 10]);
    assert_eq!(series.path().image_name, "plate_01");
    assert_eq!(series.path().extension, "png");

    let plane = series.read_plane(0, 0, 0).unwrap();
    assert_eq!(plane[[2, 9]], 3620.0);
}

#[test]
fn test_rgb_png_has_three_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colour.png");
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(4, 4, |x, _| Rgb([x as u8, 50, 200]));
    img.save(&path).unwrap();

    let series = open_series(&path).unwrap();
    assert_eq!(series.dimensions().size('C'), Some(3));
    assert_eq!(series.read_plane(0, 0, 0).unwrap()[[0, 3]], 3.0);
    assert_eq!(series.read_plane(0, 1, 0).unwrap()[[1, 1]], 50.0);
    assert_eq!(series.read_plane(0, 2, 0).unwrap()[[2, 2]], 200.0);
}

#[test]
fn test_raster_file_through_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cells.tif");
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(32, 32, |x, y| Luma([((x * 97 + y * 31 + x * y) % 4096) as u16]));
    img.save(&path).unwrap();

    let ctx = ExtractionContext::new(&QcConfig::default());
    let outcome = process_batch(&[path], &ctx, &NoOpReporter);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.table.len(), 1);

    let row = &outcome.table.rows()[0];
    assert!(row.is_complete());
    assert_eq!(row.identity.extension, "tif");
    let intensity = row.intensity.as_ref().unwrap();
    assert_eq!(intensity.histogram.iter().sum::<u64>(), 1024);
}
