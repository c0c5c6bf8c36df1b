use std::path::PathBuf;

use anyhow::{Context, Result};
use biaqc_core::pipeline::collect_metadata;
use clap::Args;

use super::{collect_inputs, configure_threads, load_config, print_failures, BarReporter};
use crate::summary::print_run_header;

#[derive(Args)]
pub struct MetadataArgs {
    /// Input image file or folder
    pub input: PathBuf,

    /// QC config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "metadata.csv")]
    pub output: PathBuf,
}

pub fn run(args: &MetadataArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    configure_threads(config.batch.threads)?;

    let files = collect_inputs(&args.input, &config.batch)?;
    print_run_header("Metadata extraction", &args.input, files.len(), &args.output);

    let (table, failures) = collect_metadata(&files, &BarReporter::new());
    table
        .write_csv(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    print_failures(&failures);

    println!("\n{} planes saved to {}", table.len(), args.output.display());
    Ok(())
}
