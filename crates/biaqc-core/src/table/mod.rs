//! Row-per-slice feature table and its columnar view.

pub mod csv_io;

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{QcError, Result};
use crate::features::{
    FeatureSet, IntensityFeatures, NoiseFeatures, SharpnessFeatures, TextureFeatures,
};
use crate::series::{SeriesPath, SliceCoord};

/// Identity columns shared by every table, in output order.
pub const IDENTITY_COLUMNS: [&str; 6] = ["file_path", "image_name", "extension", "T", "C", "Z"];

/// Column holding the raw intensity histogram. Never used as a numeric feature.
pub const HISTOGRAM_COLUMN: &str = "histogram";

/// Which file and which plane a row describes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SliceIdentity {
    pub file_path: String,
    pub image_name: String,
    pub extension: String,
    pub t: usize,
    pub c: usize,
    pub z: usize,
}

impl SliceIdentity {
    pub fn new(path: &SeriesPath, coord: SliceCoord) -> Self {
        Self {
            file_path: path.display_path(),
            image_name: path.image_name.clone(),
            extension: path.extension.clone(),
            t: coord.t,
            c: coord.c,
            z: coord.z,
        }
    }

    pub fn key(&self) -> (&str, usize, usize, usize) {
        (&self.file_path, self.t, self.c, self.z)
    }

    pub(crate) fn cells(&self) -> [String; 6] {
        [
            self.file_path.clone(),
            self.image_name.clone(),
            self.extension.clone(),
            self.t.to_string(),
            self.c.to_string(),
            self.z.to_string(),
        ]
    }
}

impl std::fmt::Display for SliceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (T={}, C={}, Z={})",
            self.file_path, self.t, self.c, self.z
        )
    }
}

/// Features of one slice. A family is `None` when its extractor failed.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRow {
    pub identity: SliceIdentity,
    pub intensity: Option<IntensityFeatures>,
    pub noise: Option<NoiseFeatures>,
    pub sharpness: Option<SharpnessFeatures>,
    pub texture: Option<TextureFeatures>,
}

impl FeatureRow {
    pub fn new(identity: SliceIdentity) -> Self {
        Self {
            identity,
            intensity: None,
            noise: None,
            sharpness: None,
            texture: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.intensity.is_some()
            && self.noise.is_some()
            && self.sharpness.is_some()
            && self.texture.is_some()
    }

    /// Scalar feature values laid out like [`feature_columns`], with `None`
    /// for every column of a missing family.
    pub fn feature_values(&self, lbp_points: usize) -> Vec<Option<f64>> {
        fn family<F: FeatureSet>(set: Option<&F>, width: usize) -> Vec<Option<f64>> {
            match set {
                Some(s) => s.values().into_iter().map(Some).collect(),
                None => vec![None; width],
            }
        }

        let texture_width = TextureFeatures::column_names_for(lbp_points).len();
        let mut out = family(self.intensity.as_ref(), IntensityFeatures::COLUMNS.len());
        out.extend(family(self.noise.as_ref(), NoiseFeatures::COLUMNS.len()));
        out.extend(family(self.sharpness.as_ref(), SharpnessFeatures::COLUMNS.len()));
        let mut texture = family(self.texture.as_ref(), texture_width);
        texture.resize(texture_width, None);
        out.extend(texture);
        out
    }
}

/// Scalar feature column names in table order: intensity, noise, sharpness,
/// texture.
pub fn feature_columns(lbp_points: usize) -> Vec<String> {
    IntensityFeatures::COLUMNS
        .iter()
        .chain(NoiseFeatures::COLUMNS.iter())
        .chain(SharpnessFeatures::COLUMNS.iter())
        .map(|c| c.to_string())
        .chain(TextureFeatures::column_names_for(lbp_points))
        .collect()
}

/// Append-only collector that refuses a second row for the same
/// `(file_path, T, C, Z)`.
#[derive(Debug)]
pub struct FeatureTableBuilder {
    rows: Vec<FeatureRow>,
    seen: HashSet<(String, usize, usize, usize)>,
    lbp_points: usize,
}

impl FeatureTableBuilder {
    pub fn new(lbp_points: usize) -> Self {
        Self {
            rows: Vec::new(),
            seen: HashSet::new(),
            lbp_points,
        }
    }

    pub fn push(&mut self, row: FeatureRow) -> Result<()> {
        let id = &row.identity;
        let key = (id.file_path.clone(), id.t, id.c, id.z);
        if !self.seen.insert(key) {
            return Err(QcError::DuplicateRow(id.to_string()));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append all rows of one file, or none of them if any key collides.
    pub fn extend(&mut self, rows: Vec<FeatureRow>) -> Result<()> {
        let mut batch_keys = HashSet::with_capacity(rows.len());
        for row in &rows {
            let id = &row.identity;
            let key = (id.file_path.clone(), id.t, id.c, id.z);
            if self.seen.contains(&key) || !batch_keys.insert(key) {
                return Err(QcError::DuplicateRow(id.to_string()));
            }
        }
        self.seen.extend(batch_keys);
        self.rows.extend(rows);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn finish(self) -> FeatureTable {
        FeatureTable {
            rows: self.rows,
            lbp_points: self.lbp_points,
        }
    }
}

/// One row per processed slice.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    lbp_points: usize,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lbp_points(&self) -> usize {
        self.lbp_points
    }

    pub fn feature_columns(&self) -> Vec<String> {
        feature_columns(self.lbp_points)
    }

    /// Numeric view of the table. Missing families become NaN.
    pub fn to_columns(&self) -> ColumnTable {
        let names = self.feature_columns();
        let mut values = Array2::<f64>::from_elem((self.rows.len(), names.len()), f64::NAN);
        for (mut out, row) in values.axis_iter_mut(Axis(0)).zip(&self.rows) {
            for (cell, v) in out.iter_mut().zip(row.feature_values(self.lbp_points)) {
                if let Some(v) = v {
                    *cell = v;
                }
            }
        }
        ColumnTable {
            identity: self.rows.iter().map(|r| r.identity.clone()).collect(),
            names,
            values,
        }
    }
}

/// Identity columns plus a dense matrix of numeric columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnTable {
    identity: Vec<SliceIdentity>,
    names: Vec<String>,
    values: Array2<f64>,
}

impl ColumnTable {
    pub fn new(identity: Vec<SliceIdentity>, names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != identity.len() || values.ncols() != names.len() {
            return Err(QcError::Precondition(format!(
                "column table of {} rows and {} columns cannot hold a {:?} matrix",
                identity.len(),
                names.len(),
                values.dim()
            )));
        }
        Ok(Self {
            identity,
            names,
            values,
        })
    }

    pub fn identity(&self) -> &[SliceIdentity] {
        &self.identity
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.identity.len()
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values.column(i))
    }

    /// Copy the named columns into a `rows × names.len()` matrix.
    pub fn select(&self, names: &[String]) -> Result<Array2<f64>> {
        let mut out = Array2::<f64>::zeros((self.nrows(), names.len()));
        for (j, name) in names.iter().enumerate() {
            let col = self
                .column(name)
                .ok_or_else(|| QcError::MissingColumn(name.clone()))?;
            out.column_mut(j).assign(&col);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::NoiseFeatures;

    fn identity(file: &str, t: usize) -> SliceIdentity {
        SliceIdentity {
            file_path: file.into(),
            image_name: "a".into(),
            extension: "ser".into(),
            t,
            c: 0,
            z: 0,
        }
    }

    #[test]
    fn builder_rejects_duplicate_keys() {
        let mut builder = FeatureTableBuilder::new(8);
        builder.push(FeatureRow::new(identity("a.ser", 0))).unwrap();
        assert!(matches!(
            builder.push(FeatureRow::new(identity("a.ser", 0))),
            Err(QcError::DuplicateRow(_))
        ));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut builder = FeatureTableBuilder::new(8);
        builder.push(FeatureRow::new(identity("a.ser", 1))).unwrap();
        let rows = vec![
            FeatureRow::new(identity("a.ser", 0)),
            FeatureRow::new(identity("a.ser", 1)),
        ];
        assert!(builder.extend(rows).is_err());
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn missing_families_become_nan() {
        let mut row = FeatureRow::new(identity("a.ser", 0));
        row.noise = Some(NoiseFeatures {
            noise_level: 1.5,
            snr: 3.0,
        });
        let mut builder = FeatureTableBuilder::new(8);
        builder.push(row).unwrap();
        let cols = builder.finish().to_columns();

        assert_eq!(cols.names().len(), 12 + 2 + 4 + 6 + 10);
        assert_eq!(cols.column("snr").unwrap()[0], 3.0);
        assert!(cols.column("mean_intensity").unwrap()[0].is_nan());
        assert!(cols.column("lbp_bin_9").unwrap()[0].is_nan());
    }

    #[test]
    fn select_reports_missing_column() {
        let table = FeatureTableBuilder::new(8).finish().to_columns();
        let err = table.select(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, QcError::MissingColumn(name) if name == "nope"));
    }
}
