//! Per-family dimensionality reduction of a feature table.

mod pca;

use std::io::Write;
use std::path::Path;

use ndarray::{concatenate, Array2, ArrayView1, Axis};
use tracing::{info, warn};

use crate::error::{QcError, Result};
use crate::features::{IntensityFeatures, NoiseFeatures, SharpnessFeatures, TextureFeatures};
use crate::table::{ColumnTable, SliceIdentity, HISTOGRAM_COLUMN, IDENTITY_COLUMNS};

pub use pca::principal_components;

/// A set of feature columns that is reduced together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Intensity,
    Texture,
    Noise,
    Sharpness,
    /// Every numeric column that is not identity or histogram.
    All,
}

impl FeatureGroup {
    /// Output order of the combined projection.
    pub const ORDER: [FeatureGroup; 5] = [
        FeatureGroup::Intensity,
        FeatureGroup::Texture,
        FeatureGroup::Noise,
        FeatureGroup::Sharpness,
        FeatureGroup::All,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Intensity => "intensity",
            Self::Texture => "texture",
            Self::Noise => "noise",
            Self::Sharpness => "sharpness",
            Self::All => "all",
        }
    }

    /// Columns of this group as found in `table`. Texture picks up however
    /// many `lbp_bin_*` columns the table carries.
    pub fn columns(self, table: &ColumnTable) -> Vec<String> {
        let fixed = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        match self {
            Self::Intensity => fixed(&IntensityFeatures::COLUMNS),
            Self::Noise => fixed(&NoiseFeatures::COLUMNS),
            Self::Sharpness => fixed(&SharpnessFeatures::COLUMNS),
            Self::Texture => {
                let mut cols = fixed(&TextureFeatures::GLCM_COLUMNS);
                cols.extend(
                    table
                        .names()
                        .iter()
                        .filter(|n| n.starts_with("lbp_bin_"))
                        .cloned(),
                );
                cols
            }
            Self::All => table
                .names()
                .iter()
                .filter(|n| !IDENTITY_COLUMNS.contains(&n.as_str()) && *n != HISTOGRAM_COLUMN)
                .cloned()
                .collect(),
        }
    }

    /// Noise has only two columns and is carried through unreduced.
    pub fn is_passthrough(self) -> bool {
        self == Self::Noise
    }
}

impl std::fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reduced (or passed-through) columns of one group.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub group: FeatureGroup,
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

/// Reduce one group. Fails if a group column is missing or holds a
/// non-finite value.
pub fn project_group(
    table: &ColumnTable,
    group: FeatureGroup,
    n_components: usize,
) -> Result<Projection> {
    let columns = group.columns(table);
    let data = table.select(&columns)?;
    if let Some(((row, col), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(QcError::NonFiniteValue {
            column: columns[col].clone(),
            row,
        });
    }

    if group.is_passthrough() {
        let names = columns.iter().map(|c| format!("noise_{c}")).collect();
        return Ok(Projection {
            group,
            names,
            values: data,
        });
    }

    let values = principal_components(data.view(), n_components);
    let names = (1..=n_components)
        .map(|k| format!("{}_pca_{k}", group.name()))
        .collect();
    Ok(Projection {
        group,
        names,
        values,
    })
}

/// Identity columns plus every successfully reduced group, in group order.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedTable {
    pub identity: Vec<SliceIdentity>,
    pub names: Vec<String>,
    pub values: Array2<f64>,
    /// Groups that could not be reduced, with the reason.
    pub skipped: Vec<(FeatureGroup, String)>,
}

impl ProjectedTable {
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values.column(i))
    }

    pub fn nrows(&self) -> usize {
        self.identity.len()
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)?;
        info!(path = %path.display(), rows = self.nrows(), "wrote projection");
        Ok(())
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let table = ColumnTable::new(self.identity.clone(), self.names.clone(), self.values.clone())?;
        table.write_csv_to(writer)
    }
}

/// Reduce every group of `table` independently and join the results.
/// A group that fails is logged and left out; the rest still appear.
pub fn reduce_features(table: &ColumnTable, n_components: usize) -> ProjectedTable {
    let mut parts = Vec::new();
    let mut skipped = Vec::new();
    for group in FeatureGroup::ORDER {
        match project_group(table, group, n_components) {
            Ok(p) => parts.push(p),
            Err(e) => {
                warn!(group = %group, error = %e, "skipping feature group");
                skipped.push((group, e.to_string()));
            }
        }
    }
    combine(table.identity().to_vec(), parts, skipped)
}

fn combine(
    identity: Vec<SliceIdentity>,
    parts: Vec<Projection>,
    skipped: Vec<(FeatureGroup, String)>,
) -> ProjectedTable {
    let names = parts.iter().flat_map(|p| p.names.iter().cloned()).collect();
    let views: Vec<_> = parts.iter().map(|p| p.values.view()).collect();
    let values = if views.is_empty() {
        Array2::zeros((identity.len(), 0))
    } else {
        concatenate(Axis(1), &views).unwrap_or_else(|_| Array2::zeros((identity.len(), 0)))
    };
    ProjectedTable {
        identity,
        names,
        values,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::feature_columns;

    fn table(rows: usize) -> ColumnTable {
        let names = feature_columns(8);
        let values = Array2::from_shape_fn((rows, names.len()), |(r, c)| {
            ((r * 31 + c * 17) % 13) as f64 + r as f64
        });
        let identity = (0..rows)
            .map(|t| SliceIdentity {
                file_path: "/d/a.ser".into(),
                image_name: "a".into(),
                extension: "ser".into(),
                t,
                c: 0,
                z: 0,
            })
            .collect();
        ColumnTable::new(identity, names, values).unwrap()
    }

    #[test]
    fn texture_group_includes_lbp_bins() {
        let cols = FeatureGroup::Texture.columns(&table(1));
        assert_eq!(cols.len(), 6 + 10);
        assert_eq!(cols.last().unwrap(), "lbp_bin_9");
    }

    #[test]
    fn combined_projection_has_expected_columns() {
        let t = table(6);
        let out = reduce_features(&t, 2);
        assert_eq!(
            out.names,
            vec![
                "intensity_pca_1",
                "intensity_pca_2",
                "texture_pca_1",
                "texture_pca_2",
                "noise_noise_level",
                "noise_snr",
                "sharpness_pca_1",
                "sharpness_pca_2",
                "all_pca_1",
                "all_pca_2",
            ]
        );
        assert_eq!(out.values.dim(), (6, 10));
        assert!(out.column("intensity_pca_2").is_some());
        assert!(out.column("intensity_pca_0").is_none());
        assert_eq!(out.column("noise_snr").unwrap(), t.column("snr").unwrap());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn non_finite_group_is_skipped() {
        let t = table(4);
        let mut values = t.values().clone();
        let col = t.names().iter().position(|n| n == "tenengrad").unwrap();
        values[[2, col]] = f64::NAN;
        let t = ColumnTable::new(t.identity().to_vec(), t.names().to_vec(), values).unwrap();

        let out = reduce_features(&t, 2);
        assert!(out.column("sharpness_pca_1").is_none());
        assert!(out.column("intensity_pca_1").is_some());
        let skipped: Vec<_> = out.skipped.iter().map(|(g, _)| *g).collect();
        assert_eq!(skipped, vec![FeatureGroup::Sharpness, FeatureGroup::All]);
    }
}
