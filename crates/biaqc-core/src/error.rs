use thiserror::Error;

#[derive(Error, Debug)]
pub enum QcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Plane (t={t}, c={c}, z={z}) out of range for extents {extents:?}")]
    PlaneOutOfRange {
        t: usize,
        c: usize,
        z: usize,
        extents: [usize; 3],
    },

    #[error("Cannot map dimensions: {0}")]
    DimensionMapping(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Missing metadata field: {0}")]
    MissingMetadataField(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Duplicate row for {0}")]
    DuplicateRow(String),

    #[error("Row {row}, column '{column}': cannot parse '{value}'")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Column '{column}' holds a non-finite value at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("Time unit inference failed: {0}")]
    TimeUnit(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Metadata tree error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QcError>;
