use std::path::PathBuf;

use anyhow::{Context, Result};
use biaqc_core::pipeline::{process_batch, ExtractionContext};
use clap::Args;
use tracing::info;

use super::{collect_inputs, configure_threads, load_config, print_failures, BarReporter};
use crate::summary::print_run_header;

#[derive(Args)]
pub struct FeaturesArgs {
    /// Input image file or folder
    pub input: PathBuf,

    /// QC config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bit depth used to normalize intensities (overrides config)
    #[arg(long)]
    pub bit_depth: Option<u32>,

    /// LBP sample points (overrides config)
    #[arg(long)]
    pub lbp_points: Option<usize>,

    /// Worker threads (overrides config)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output CSV path
    #[arg(short, long, default_value = "features.csv")]
    pub output: PathBuf,
}

pub fn run(args: &FeaturesArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bits) = args.bit_depth {
        config.intensity.default_bit_depth = bits;
    }
    if let Some(points) = args.lbp_points {
        config.texture.lbp_points = points;
    }
    if args.threads.is_some() {
        config.batch.threads = args.threads;
    }
    configure_threads(config.batch.threads)?;

    let files = collect_inputs(&args.input, &config.batch)?;
    info!(
        files = files.len(),
        bit_depth = config.intensity.default_bit_depth,
        "extracting features"
    );
    print_run_header("Feature extraction", &args.input, files.len(), &args.output);

    let ctx = ExtractionContext::new(&config);
    let reporter = BarReporter::new();
    let outcome = process_batch(&files, &ctx, &reporter);

    outcome
        .table
        .write_csv(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    print_failures(&outcome.failures);

    println!(
        "\n{} rows saved to {}",
        outcome.table.len(),
        args.output.display()
    );
    Ok(())
}
