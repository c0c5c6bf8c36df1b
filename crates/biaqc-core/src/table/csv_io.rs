use std::io::{Read, Write};
use std::path::Path;

use ndarray::Array2;

use crate::error::{QcError, Result};
use crate::table::{ColumnTable, FeatureTable, SliceIdentity, HISTOGRAM_COLUMN, IDENTITY_COLUMNS};

impl FeatureTable {
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)?;
        tracing::info!(path = %path.display(), rows = self.len(), "wrote feature table");
        Ok(())
    }

    /// Identity columns, scalar features, then the `;`-joined histogram.
    /// Cells of a failed family are left empty.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(self.feature_columns());
        header.push(HISTOGRAM_COLUMN.to_string());
        wtr.write_record(&header)?;

        for row in self.rows() {
            let mut record: Vec<String> = row.identity.cells().to_vec();
            record.extend(
                row.feature_values(self.lbp_points())
                    .into_iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            record.push(
                row.intensity
                    .as_ref()
                    .map(|i| {
                        i.histogram
                            .iter()
                            .map(|c| c.to_string())
                            .collect::<Vec<_>>()
                            .join(";")
                    })
                    .unwrap_or_default(),
            );
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ColumnTable {
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.nrows(),
            columns = table.names().len(),
            "read feature table"
        );
        Ok(table)
    }

    /// Parse a feature CSV. Identity columns are required; `histogram` and
    /// unnamed index columns are skipped; every other column is numeric, with
    /// empty or unparsable cells read as NaN.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut identity_idx = [0usize; 6];
        for (slot, name) in identity_idx.iter_mut().zip(IDENTITY_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| QcError::MissingColumn(name.to_string()))?;
        }

        let numeric: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                !h.is_empty()
                    && !h.starts_with("Unnamed:")
                    && *h != HISTOGRAM_COLUMN
                    && !IDENTITY_COLUMNS.contains(h)
            })
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut identity = Vec::new();
        let mut flat = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let cell = |i: usize| record.get(i).unwrap_or_default();
            identity.push(SliceIdentity {
                file_path: cell(identity_idx[0]).to_string(),
                image_name: cell(identity_idx[1]).to_string(),
                extension: cell(identity_idx[2]).to_string(),
                t: parse_index(cell(identity_idx[3]), row, "T")?,
                c: parse_index(cell(identity_idx[4]), row, "C")?,
                z: parse_index(cell(identity_idx[5]), row, "Z")?,
            });
            flat.extend(
                numeric
                    .iter()
                    .map(|(i, _)| cell(*i).trim().parse::<f64>().unwrap_or(f64::NAN)),
            );
        }

        let values = Array2::from_shape_vec((identity.len(), numeric.len()), flat)
            .map_err(|e| QcError::Precondition(e.to_string()))?;
        Self::new(identity, numeric.into_iter().map(|(_, n)| n).collect(), values)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)?;
        tracing::info!(path = %path.display(), rows = self.nrows(), "wrote table");
        Ok(())
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(self.names().iter().cloned());
        wtr.write_record(&header)?;

        for (id, values) in self.identity().iter().zip(self.values().rows()) {
            let mut record: Vec<String> = id.cells().to_vec();
            record.extend(values.iter().map(|v| {
                if v.is_nan() {
                    String::new()
                } else {
                    v.to_string()
                }
            }));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Plane indices are integers, though some writers emit them as `3.0`.
fn parse_index(raw: &str, row: usize, column: &str) -> Result<usize> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<usize>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
        _ => Err(QcError::InvalidCell {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_identity_and_numeric_columns() {
        let csv = "\
,file_path,image_name,extension,T,C,Z,mean_intensity,histogram,snr
0,/d/a.nd2,a,nd2,0,1,2.0,10.5,1;2;3,
";
        let table = ColumnTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.names(), &["mean_intensity".to_string(), "snr".to_string()]);
        let id = &table.identity()[0];
        assert_eq!((id.t, id.c, id.z), (0, 1, 2));
        assert_eq!(id.extension, "nd2");
        assert_eq!(table.column("mean_intensity").unwrap()[0], 10.5);
        assert!(table.column("snr").unwrap()[0].is_nan());
    }

    #[test]
    fn missing_identity_column_is_an_error() {
        let csv = "file_path,image_name,T,C,Z\n/a,a,0,0,0\n";
        let err = ColumnTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, QcError::MissingColumn(c) if c == "extension"));
    }

    #[test]
    fn bad_plane_index_is_reported() {
        let csv = "file_path,image_name,extension,T,C,Z\n/a,a,ser,x,0,0\n";
        let err = ColumnTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, QcError::InvalidCell { row: 0, .. }));
    }
}
