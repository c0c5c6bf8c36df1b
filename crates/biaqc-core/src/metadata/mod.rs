//! Acquisition metadata: per-plane extraction, tabular storage and
//! cross-file consistency checks.

pub mod analysis;
pub mod schema;
pub mod table;
pub mod time_unit;

pub use analysis::{ConsistencyReport, FrameInterval, MetadataAnalysis, ReportLine, Status};
pub use schema::{extract_plane_metadata, series_metadata, PlaneMetadata};
pub use table::MetadataTable;
pub use time_unit::{infer_time_scale, parse_time_unit, TimeScale};
