use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::metadata::schema::PlaneMetadata;

/// Per-plane metadata for a whole batch, in file then plane order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataTable {
    rows: Vec<PlaneMetadata>,
}

impl MetadataTable {
    pub fn new(rows: Vec<PlaneMetadata>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PlaneMetadata] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Columns are matched by name; unknown columns are ignored and absent
    /// ones read as missing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let rows = rdr
            .deserialize::<PlaneMetadata>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)?;
        tracing::info!(path = %path.display(), rows = self.len(), "wrote metadata table");
        Ok(())
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Difference of `delta_t` from the previous row of the same
    /// `(image_name, the_c)` group. The first row of each group, rows
    /// without a channel index and rows next to a missing `delta_t` are
    /// `None`.
    pub fn delta_times(&self) -> Vec<Option<f64>> {
        let mut previous: HashMap<(&str, u64), Option<f64>> = HashMap::new();
        self.rows
            .iter()
            .map(|row| {
                let channel = row.the_c?;
                let key = (row.image_name.as_str(), channel.to_bits());
                let prior = previous.insert(key, row.delta_t);
                match (prior.flatten(), row.delta_t) {
                    (Some(before), Some(now)) => Some(now - before),
                    _ => None,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(image: &str, c: f64, delta_t: Option<f64>) -> PlaneMetadata {
        PlaneMetadata {
            image_name: image.into(),
            the_c: Some(c),
            delta_t,
            ..Default::default()
        }
    }

    #[test]
    fn deltas_are_grouped_by_image_and_channel() {
        let table = MetadataTable::new(vec![
            plane("a", 0.0, Some(0.0)),
            plane("a", 1.0, Some(5.0)),
            plane("a", 0.0, Some(100.0)),
            plane("b", 0.0, Some(7.0)),
            plane("a", 1.0, Some(125.0)),
            plane("a", 0.0, None),
            plane("a", 0.0, Some(300.0)),
        ]);
        assert_eq!(
            table.delta_times(),
            vec![None, None, Some(100.0), None, Some(120.0), None, None]
        );
    }

    #[test]
    fn csv_tolerates_missing_and_extra_columns() {
        let csv = "\
,file_path,image_name,extension,instrument_model,delta_t,extra
0,/d/a.nd2,a,nd2,Ti2,12.5,x
1,/d/a.nd2,a,nd2,,,y
";
        let table = MetadataTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].instrument_model.as_deref(), Some("Ti2"));
        assert_eq!(table.rows()[0].delta_t, Some(12.5));
        assert_eq!(table.rows()[1].instrument_model, None);
        assert_eq!(table.rows()[1].size_x, None);
    }
}
