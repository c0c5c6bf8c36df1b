use std::fmt;

use tracing::debug;

use crate::consts::TIME_REFERENCE_ROW;
use crate::error::{QcError, Result};
use crate::features::stats::{finite_or_zero, mean, round_to, sample_std};
use crate::metadata::schema::PlaneMetadata;
use crate::metadata::table::MetadataTable;
use crate::metadata::time_unit::{infer_time_scale, parse_time_unit};

/// Outcome marker of one report line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Consistent across the batch.
    Pass,
    /// Inconsistent or missing where it should be present.
    Fail,
    /// Informational, typically for optional dimensions.
    Info,
}

impl Status {
    pub fn marker(self) -> &'static str {
        match self {
            Self::Pass => "[v]",
            Self::Fail => "[x]",
            Self::Info => "[?]",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLine {
    pub status: Status,
    pub text: String,
}

impl ReportLine {
    fn new(status: Status, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.marker(), self.text)
    }
}

/// Ordered list of consistency findings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub lines: Vec<ReportLine>,
}

impl ConsistencyReport {
    pub fn failures(&self) -> impl Iterator<Item = &ReportLine> {
        self.lines.iter().filter(|l| l.status == Status::Fail)
    }

    pub fn is_consistent(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Consistency checks over a metadata table. Each check looks at the
/// distinct non-missing values of one field across all rows.
pub struct MetadataAnalysis<'a> {
    table: &'a MetadataTable,
}

impl<'a> MetadataAnalysis<'a> {
    pub fn new(table: &'a MetadataTable) -> Self {
        Self { table }
    }

    /// Every check, in report order.
    pub fn report(&self) -> ConsistencyReport {
        ConsistencyReport {
            lines: vec![
                self.check_extension(),
                self.check_instrument(),
                self.check_lens_na(),
                self.check_magnification(),
                self.check_bit_depth(),
                self.check_time_points(),
                self.check_z_depth(),
                self.check_channels(),
                self.check_width(),
                self.check_height(),
                self.check_physical_size_x(),
                self.check_physical_size_y(),
                self.check_frame_interval(),
            ],
        }
    }

    pub fn check_extension(&self) -> ReportLine {
        let found = self.distinct_text(|r| Some(r.extension.as_str()));
        match found.len() {
            0 => ReportLine::new(Status::Fail, "Could not find the image extension."),
            1 => ReportLine::new(Status::Pass, format!("All images are of {} type.", found[0])),
            _ => ReportLine::new(
                Status::Fail,
                format!(
                    "More than one image type found. Found extensions are {}.",
                    bracketed(&found)
                ),
            ),
        }
    }

    pub fn check_instrument(&self) -> ReportLine {
        let found = self.distinct_text(|r| r.instrument_model.as_deref());
        match found.len() {
            0 => ReportLine::new(Status::Fail, "Could not find the instrument name."),
            1 => ReportLine::new(
                Status::Pass,
                format!("All images are acquired using {}.", found[0]),
            ),
            _ => ReportLine::new(
                Status::Fail,
                format!(
                    "More than one instrument found. Found instruments are {}.",
                    bracketed(&found)
                ),
            ),
        }
    }

    pub fn check_lens_na(&self) -> ReportLine {
        let found = self.distinct_numbers(|r| r.objective_lens_na);
        match found.len() {
            0 => ReportLine::new(Status::Fail, "Could not find the lens objective."),
            1 => ReportLine::new(
                Status::Pass,
                format!("All images are acquired with {} objective.", found[0]),
            ),
            _ => ReportLine::new(
                Status::Fail,
                format!(
                    "More than single lens objective found. Found lens objectives are {}.",
                    bracketed(&found)
                ),
            ),
        }
    }

    pub fn check_magnification(&self) -> ReportLine {
        let found = self.distinct_numbers(|r| r.objective_nominal_magnification);
        match found.len() {
            0 => ReportLine::new(Status::Fail, "Could not find the lens magnification."),
            1 => ReportLine::new(
                Status::Pass,
                format!("All images are acquired with {}x.", found[0].round()),
            ),
            _ => ReportLine::new(
                Status::Fail,
                format!(
                    "More than single magnification found. Found magnifications are {}.",
                    bracketed(&found)
                ),
            ),
        }
    }

    pub fn check_bit_depth(&self) -> ReportLine {
        let found = self.distinct_numbers(|r| r.significant_bits);
        match found.len() {
            0 => ReportLine::new(Status::Fail, "Could not find bit depth."),
            1 => ReportLine::new(
                Status::Pass,
                format!("All images are acquired with {} bit depth.", found[0]),
            ),
            _ => ReportLine::new(
                Status::Fail,
                format!(
                    "More than single bit depth found. Found bit depths are {}.",
                    bracketed(&found)
                ),
            ),
        }
    }

    pub fn check_time_points(&self) -> ReportLine {
        let found = self.distinct_numbers(|r| r.size_t);
        let text = match found.as_slice() {
            [] => "Could not find t or not a time series.".to_string(),
            [n] if *n != 1.0 => format!("Time series data with {n} frames per image."),
            [_] => "Not a time series data.".to_string(),
            _ => "Time series data with different time.".to_string(),
        };
        ReportLine::new(Status::Info, text)
    }

    pub fn check_z_depth(&self) -> ReportLine {
        let found = self.distinct_numbers(|r| r.size_z);
        let text = match found.as_slice() {
            [] => "Could not find z-depth or not a z-stack.".to_string(),
            [n] if *n != 1.0 => format!("3D z-stack with single z-depth of {n}."),
            [_] => "Not a z-stack.".to_string(),
            _ => "3D z-stack with different z-depth.".to_string(),
        };
        ReportLine::new(Status::Info, text)
    }

    pub fn check_channels(&self) -> ReportLine {
        let found = self.distinct_numbers(|r| r.size_c);
        match found.as_slice() {
            [] => ReportLine::new(Status::Fail, "Could not find number of channels."),
            [n] if *n == 1.0 => ReportLine::new(Status::Info, "Single channel image."),
            [n] => ReportLine::new(
                Status::Info,
                format!("Multi-channel image with {n} channels per image."),
            ),
            _ => ReportLine::new(Status::Fail, "Different number of channels found."),
        }
    }

    pub fn check_width(&self) -> ReportLine {
        self.check_extent(|r| r.size_x, "width")
    }

    pub fn check_height(&self) -> ReportLine {
        self.check_extent(|r| r.size_y, "height")
    }

    pub fn check_physical_size_x(&self) -> ReportLine {
        self.check_physical_size(|r| r.physical_size_x, "x")
    }

    pub fn check_physical_size_y(&self) -> ReportLine {
        self.check_physical_size(|r| r.physical_size_y, "y")
    }

    pub fn check_frame_interval(&self) -> ReportLine {
        match self.frame_interval() {
            Ok(interval) => ReportLine::new(
                Status::Pass,
                format!(
                    "Time between frames: {} +/- {} {}s.",
                    interval.mean, interval.std, interval.unit
                ),
            ),
            Err(e) => {
                debug!(error = %e, "frame interval unavailable");
                ReportLine::new(Status::Fail, "Could not find time delta.")
            }
        }
    }

    /// Mean and spread of the interval between consecutive frames, in the
    /// largest unit that keeps the reference interval above one.
    pub fn frame_interval(&self) -> Result<FrameInterval> {
        let raw_unit = self
            .table
            .rows()
            .iter()
            .find_map(|r| r.delta_t_unit.as_deref())
            .ok_or_else(|| QcError::TimeUnit("no delta_t_unit recorded".into()))?;
        let base = parse_time_unit(raw_unit)?;

        let deltas = self.table.delta_times();
        let reference = deltas
            .get(TIME_REFERENCE_ROW)
            .copied()
            .flatten()
            .ok_or_else(|| {
                QcError::TimeUnit(format!("no frame interval at row {TIME_REFERENCE_ROW}"))
            })?;
        let scale = infer_time_scale(reference, base)?;

        let scaled: Vec<f64> = deltas
            .into_iter()
            .flatten()
            .filter(|d| d.is_finite())
            .map(|d| round_to(d / scale.divisor, 2))
            .collect();

        Ok(FrameInterval {
            mean: round_to(mean(&scaled), 4),
            std: round_to(finite_or_zero(sample_std(&scaled)), 4),
            unit: scale.unit,
        })
    }

    fn check_extent(&self, field: impl Fn(&PlaneMetadata) -> Option<f64>, name: &str) -> ReportLine {
        let found = self.distinct_numbers(field);
        match found.len() {
            0 => ReportLine::new(Status::Fail, format!("Could not find image {name}.")),
            1 => ReportLine::new(Status::Pass, format!("Images have {name} {}.", found[0])),
            _ => ReportLine::new(Status::Fail, format!("Different image {name}s found.")),
        }
    }

    fn check_physical_size(
        &self,
        field: impl Fn(&PlaneMetadata) -> Option<f64>,
        axis: &str,
    ) -> ReportLine {
        let found = self.distinct_numbers(field);
        match found.len() {
            0 => ReportLine::new(
                Status::Fail,
                format!("Could not find physical {axis} size."),
            ),
            1 => ReportLine::new(
                Status::Pass,
                format!(
                    "All images acquired have {} micrometers physical size {axis}.",
                    round_to(found[0], 4)
                ),
            ),
            _ => {
                let rounded: Vec<f64> = found.iter().map(|v| round_to(*v, 4)).collect();
                ReportLine::new(
                    Status::Fail,
                    format!(
                        "Different physical size {axis} found. Found physical size {axis} are {}.",
                        bracketed(&rounded)
                    ),
                )
            }
        }
    }

    /// Distinct non-empty strings in first-seen order.
    fn distinct_text<'r>(&'r self, field: impl Fn(&'r PlaneMetadata) -> Option<&'r str>) -> Vec<&'r str> {
        let mut out: Vec<&str> = Vec::new();
        for v in self.table.rows().iter().filter_map(field) {
            if !v.is_empty() && !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }

    /// Distinct finite numbers in first-seen order.
    fn distinct_numbers(&self, field: impl Fn(&PlaneMetadata) -> Option<f64>) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for v in self.table.rows().iter().filter_map(field) {
            if v.is_finite() && !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }
}

/// Summary of frame intervals, already rounded for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInterval {
    pub mean: f64,
    pub std: f64,
    pub unit: &'static str,
}

fn bracketed<T: fmt::Display>(values: &[T]) -> String {
    let inner: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(image: &str, t: usize, delta_t: f64) -> PlaneMetadata {
        PlaneMetadata {
            file_path: format!("/d/{image}.nd2"),
            image_name: image.into(),
            extension: "nd2".into(),
            size_c: Some(1.0),
            size_t: Some(5.0),
            the_t: Some(t as f64),
            the_c: Some(0.0),
            delta_t: Some(delta_t),
            delta_t_unit: Some("UnitsTime.MILLISECOND".into()),
            ..Default::default()
        }
    }

    #[test]
    fn single_value_fields_pass() {
        let table = MetadataTable::new(vec![row("a", 0, 0.0), row("b", 0, 0.0)]);
        let report = MetadataAnalysis::new(&table).report();
        assert_eq!(report.lines.len(), 13);
        assert_eq!(report.lines[0].to_string(), "[v] All images are of nd2 type.");
        assert_eq!(
            report.lines[1].to_string(),
            "[x] Could not find the instrument name."
        );
        assert_eq!(
            report.lines[5].to_string(),
            "[?] Time series data with 5 frames per image."
        );
        assert_eq!(report.lines[6].status, Status::Info);
        assert_eq!(report.lines[7].to_string(), "[?] Single channel image.");
    }

    #[test]
    fn channel_count_mismatch_fails() {
        let mut other = row("b", 0, 0.0);
        other.size_c = Some(3.0);
        let table = MetadataTable::new(vec![row("a", 0, 0.0), other]);
        let line = MetadataAnalysis::new(&table).check_channels();
        assert_eq!(line.to_string(), "[x] Different number of channels found.");
    }

    #[test]
    fn multi_channel_is_informational() {
        let mut only = row("a", 0, 0.0);
        only.size_c = Some(2.0);
        let table = MetadataTable::new(vec![only]);
        let line = MetadataAnalysis::new(&table).check_channels();
        assert_eq!(
            line.to_string(),
            "[?] Multi-channel image with 2 channels per image."
        );
    }

    #[test]
    fn frame_interval_in_seconds() {
        let table = MetadataTable::new(vec![
            row("a", 0, 0.0),
            row("a", 1, 8030.0),
            row("a", 2, 16080.0),
            row("a", 3, 24150.0),
        ]);
        let interval = MetadataAnalysis::new(&table).frame_interval().unwrap();
        assert_eq!(interval.unit, "second");
        assert_eq!(interval.mean, 8.05);
        assert_eq!(interval.std, 0.02);
    }

    #[test]
    fn missing_reference_row_reports_failure() {
        let table = MetadataTable::new(vec![row("a", 0, 0.0), row("a", 1, 10.0)]);
        let line = MetadataAnalysis::new(&table).check_frame_interval();
        assert_eq!(line.to_string(), "[x] Could not find time delta.");
    }

    #[test]
    fn physical_sizes_are_rounded() {
        let mut a = row("a", 0, 0.0);
        a.physical_size_x = Some(0.108_333);
        let mut b = row("b", 0, 0.0);
        b.physical_size_x = Some(0.2);
        let table = MetadataTable::new(vec![a, b]);
        let line = MetadataAnalysis::new(&table).check_physical_size_x();
        assert_eq!(
            line.to_string(),
            "[x] Different physical size x found. Found physical size x are [0.1083, 0.2]."
        );
    }
}
