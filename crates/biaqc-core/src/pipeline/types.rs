use crate::table::FeatureTable;

/// Batch stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStage {
    Features,
    Metadata,
}

impl std::fmt::Display for BatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Features => write!(f, "Extracting features"),
            Self::Metadata => write!(f, "Reading metadata"),
        }
    }
}

/// Thread-safe progress reporting for batch runs.
///
/// Implementors can use this to drive progress bars or logging. All methods
/// have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A stage has started over `total_files` inputs.
    fn begin_stage(&self, _stage: BatchStage, _total_files: usize) {}

    /// One more file is finished, successfully or not.
    fn advance(&self, _files_done: usize) {}

    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// A file that was skipped, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFailure {
    pub file_path: String,
    pub reason: String,
}

/// Feature table for every file that succeeded, plus the ones that did not.
#[derive(Debug)]
pub struct BatchOutcome {
    pub table: FeatureTable,
    pub failures: Vec<FileFailure>,
}
