mod batch;
mod extract;
mod types;

pub use batch::{collect_metadata, process_batch, process_sources};
pub use extract::ExtractionContext;
pub use types::{BatchOutcome, BatchStage, FileFailure, NoOpReporter, ProgressReporter};
