use std::path::Path;

use image::DynamicImage;
use ndarray::{Array2, Array5};

use crate::error::Result;
use crate::series::ArraySeries;

/// Load a single-plane raster file (TIFF, PNG, ...) as a `1 × C × 1 × Y × X`
/// series. Gray images have one channel, colour images three (alpha is
/// dropped). Sample values are kept as stored for 8- and 16-bit data.
pub fn load_image(path: &Path) -> Result<ArraySeries> {
    let img = image::open(path)?;
    let channels = channels_of(&img);
    let (h, w) = channels[0].dim();

    let mut data = Array5::<f32>::zeros((1, channels.len(), 1, h, w));
    for (c, plane) in channels.iter().enumerate() {
        data.slice_mut(ndarray::s![0, c, 0, .., ..]).assign(plane);
    }

    tracing::debug!(
        path = %path.display(),
        width = w,
        height = h,
        channels = channels.len(),
        "loaded raster image"
    );
    ArraySeries::new(path, "TCZYX", data.into_dyn())
}

fn channels_of(img: &DynamicImage) -> Vec<Array2<f32>> {
    match img {
        DynamicImage::ImageLuma8(buf) => vec![plane(buf.width(), buf.height(), |x, y| {
            buf.get_pixel(x, y).0[0] as f32
        })],
        DynamicImage::ImageLumaA8(buf) => vec![plane(buf.width(), buf.height(), |x, y| {
            buf.get_pixel(x, y).0[0] as f32
        })],
        DynamicImage::ImageLuma16(buf) => vec![plane(buf.width(), buf.height(), |x, y| {
            buf.get_pixel(x, y).0[0] as f32
        })],
        DynamicImage::ImageLumaA16(buf) => vec![plane(buf.width(), buf.height(), |x, y| {
            buf.get_pixel(x, y).0[0] as f32
        })],
        DynamicImage::ImageRgb16(buf) => (0..3)
            .map(|c| plane(buf.width(), buf.height(), |x, y| buf.get_pixel(x, y).0[c] as f32))
            .collect(),
        DynamicImage::ImageRgba16(buf) => (0..3)
            .map(|c| plane(buf.width(), buf.height(), |x, y| buf.get_pixel(x, y).0[c] as f32))
            .collect(),
        other => {
            let rgb = other.to_rgb8();
            (0..3)
                .map(|c| plane(rgb.width(), rgb.height(), |x, y| rgb.get_pixel(x, y).0[c] as f32))
                .collect()
        }
    }
}

fn plane(width: u32, height: u32, sample: impl Fn(u32, u32) -> f32) -> Array2<f32> {
    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        sample(col as u32, row as u32)
    })
}
