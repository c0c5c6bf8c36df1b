use ndarray::Array2;
use tracing::{debug, warn};

use crate::config::{QcConfig, TextureConfig};
use crate::error::Result;
use crate::features::{extract_intensity, extract_noise, extract_sharpness, extract_texture};
use crate::series::{SeriesPath, SeriesSource, Slice};
use crate::table::{FeatureRow, SliceIdentity};
use crate::traversal::slices;

/// Everything needed to turn a slice into a feature row. Holds no per-file
/// state, so one context serves every worker thread.
#[derive(Clone, Debug)]
pub struct ExtractionContext {
    bit_depth: u32,
    texture: TextureConfig,
}

impl ExtractionContext {
    pub fn new(config: &QcConfig) -> Self {
        Self {
            bit_depth: config.intensity.default_bit_depth,
            texture: config.texture.clone(),
        }
    }

    pub fn lbp_points(&self) -> usize {
        self.texture.lbp_points
    }

    /// Run all four extractors on one slice. A failing extractor leaves its
    /// family empty and does not affect the others.
    pub fn extract_slice(&self, path: &SeriesPath, slice: &Slice) -> FeatureRow {
        let mut row = FeatureRow::new(SliceIdentity::new(path, slice.coord));
        let data = &slice.data;
        row.intensity = self.guard(&row.identity, "intensity", || {
            extract_intensity(data, Some(self.bit_depth))
        });
        row.noise = self.guard(&row.identity, "noise", || extract_noise(data));
        row.sharpness = self.guard(&row.identity, "sharpness", || extract_sharpness(data));
        row.texture = self.guard(&row.identity, "texture", || extract_texture(data, &self.texture));
        row
    }

    /// Rows for every slice of a series, in traversal order. Fails as a whole
    /// when the series cannot be traversed or a plane cannot be read.
    pub fn process_series<S: SeriesSource + ?Sized>(&self, source: &S) -> Result<Vec<FeatureRow>> {
        let path = source.path();
        let iter = slices(source)?;
        let mut rows = Vec::with_capacity(iter.len());
        for slice in iter {
            rows.push(self.extract_slice(path, &slice?));
        }
        debug!(path = %path.display_path(), rows = rows.len(), "processed series");
        Ok(rows)
    }

    /// Rows for a single in-memory plane.
    pub fn process_plane(&self, path: &SeriesPath, data: Array2<f32>) -> FeatureRow {
        let slice = Slice {
            coord: Default::default(),
            data,
        };
        self.extract_slice(path, &slice)
    }

    fn guard<T>(
        &self,
        identity: &SliceIdentity,
        family: &str,
        run: impl FnOnce() -> Result<T>,
    ) -> Option<T> {
        match run() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(slice = %identity, family, error = %e, "feature extraction failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::ArraySeries;
    use ndarray::Array5;

    #[test]
    fn failing_family_is_isolated() {
        let config = QcConfig {
            texture: TextureConfig {
                lbp_points: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let ctx = ExtractionContext::new(&config);
        let data = Array2::from_shape_fn((16, 16), |(r, c)| ((r * 7 + c * 3) % 11) as f32);
        let row = ctx.process_plane(&SeriesPath::new("/tmp/x.tif"), data);

        assert!(row.texture.is_none());
        assert!(row.intensity.is_some());
        assert!(row.noise.is_some());
        assert!(row.sharpness.is_some());
    }

    #[test]
    fn series_yields_one_row_per_slice() {
        let data = Array5::<f32>::from_elem((2, 3, 1, 8, 8), 5.0).into_dyn();
        let series = ArraySeries::new("/data/cells.ome.tif", "TCZYX", data).unwrap();
        let ctx = ExtractionContext::new(&QcConfig::default());
        let rows = ctx.process_series(&series).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].identity.image_name, "cells");
        assert_eq!(rows[0].identity.extension, "tif");
        assert!(rows.iter().all(FeatureRow::is_complete));
    }
}
