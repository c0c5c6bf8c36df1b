pub mod config;
pub mod features;
pub mod info;
pub mod metadata;
pub mod pca;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use biaqc_core::config::{BatchConfig, QcConfig};
use biaqc_core::pipeline::{BatchStage, FileFailure, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Load the QC config, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<QcConfig> {
    match path {
        Some(p) => QcConfig::load(p).with_context(|| format!("Invalid config {}", p.display())),
        None => Ok(QcConfig::default()),
    }
}

/// A single file is taken as-is; a folder contributes its direct children
/// with an accepted extension, sorted by name.
pub fn collect_inputs(input: &Path, batch: &BatchConfig) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("Input {} does not exist", input.display());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("Failed to read folder {}", input.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && batch.accepts(p))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!(
            "No files with extensions {:?} in {}",
            batch.extensions,
            input.display()
        );
    }
    Ok(files)
}

/// Size rayon's global pool. Must run before any parallel work.
pub fn configure_threads(threads: Option<usize>) -> Result<()> {
    if let Some(n) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("Failed to configure worker threads")?;
    }
    Ok(())
}

pub fn print_failures(failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    let warn = console::Style::new().yellow();
    eprintln!();
    eprintln!("  {}", warn.apply_to(format!("{} file(s) skipped:", failures.len())));
    for f in failures {
        eprintln!("    {}: {}", f.file_path, f.reason);
    }
}

/// Progress bar over files, driven from worker threads.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg:20} [{bar:40}] {pos}/{len} files")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl Default for BarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: BatchStage, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, files_done: usize) {
        self.bar.set_position(files_done as u64);
    }

    fn finish_stage(&self) {
        self.bar.finish_with_message("Done");
    }
}
