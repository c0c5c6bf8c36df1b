use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::io::open_series;
use crate::metadata::{series_metadata, MetadataTable, PlaneMetadata};
use crate::series::SeriesSource;
use crate::table::{FeatureRow, FeatureTableBuilder};

use super::extract::ExtractionContext;
use super::types::{BatchOutcome, BatchStage, FileFailure, ProgressReporter};

/// Extract features from every file in parallel. Rows keep the order of
/// `paths`; a file that cannot be opened or traversed is recorded as a
/// failure and contributes no rows.
pub fn process_batch(
    paths: &[PathBuf],
    ctx: &ExtractionContext,
    reporter: &dyn ProgressReporter,
) -> BatchOutcome {
    run_files(paths, ctx, reporter, |p| p.display().to_string(), |p| {
        let source = open_series(p)?;
        ctx.process_series(source.as_ref())
    })
}

/// Same as [`process_batch`] for series that are already open.
pub fn process_sources<S: SeriesSource>(
    sources: &[S],
    ctx: &ExtractionContext,
    reporter: &dyn ProgressReporter,
) -> BatchOutcome {
    run_files(
        sources,
        ctx,
        reporter,
        |s| s.path().display_path(),
        |s| ctx.process_series(s),
    )
}

fn run_files<T: Sync>(
    items: &[T],
    ctx: &ExtractionContext,
    reporter: &dyn ProgressReporter,
    label: impl Fn(&T) -> String + Sync,
    process: impl Fn(&T) -> Result<Vec<FeatureRow>> + Sync,
) -> BatchOutcome {
    reporter.begin_stage(BatchStage::Features, items.len());
    let done = AtomicUsize::new(0);
    let results: Vec<(String, Result<Vec<FeatureRow>>)> = items
        .par_iter()
        .map(|item| {
            let result = process(item);
            reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            (label(item), result)
        })
        .collect();
    reporter.finish_stage();

    let mut builder = FeatureTableBuilder::new(ctx.lbp_points());
    let mut failures = Vec::new();
    for (file_path, result) in results {
        if let Err(e) = result.and_then(|rows| builder.extend(rows)) {
            warn!(file = %file_path, error = %e, "skipping file");
            failures.push(FileFailure {
                file_path,
                reason: e.to_string(),
            });
        }
    }

    let table = builder.finish();
    info!(
        files = items.len(),
        failed = failures.len(),
        rows = table.len(),
        "feature extraction complete"
    );
    BatchOutcome { table, failures }
}

/// Gather per-plane metadata for every file. Files without a usable
/// metadata tree are reported and skipped.
pub fn collect_metadata(
    paths: &[PathBuf],
    reporter: &dyn ProgressReporter,
) -> (MetadataTable, Vec<FileFailure>) {
    reporter.begin_stage(BatchStage::Metadata, paths.len());
    let done = AtomicUsize::new(0);
    let results: Vec<(&Path, Result<Vec<PlaneMetadata>>)> = paths
        .par_iter()
        .map(|p| {
            let result = open_series(p).and_then(|s| series_metadata(s.as_ref()));
            reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            (p.as_path(), result)
        })
        .collect();
    reporter.finish_stage();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for (path, result) in results {
        match result {
            Ok(planes) => rows.extend(planes),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping metadata");
                failures.push(FileFailure {
                    file_path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (MetadataTable::new(rows), failures)
}
