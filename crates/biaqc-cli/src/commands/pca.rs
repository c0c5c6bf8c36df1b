use std::path::PathBuf;

use anyhow::{Context, Result};
use biaqc_core::reduce::reduce_features;
use biaqc_core::table::ColumnTable;
use clap::Args;

use super::load_config;

#[derive(Args)]
pub struct PcaArgs {
    /// Feature table CSV written by `features`
    pub features: PathBuf,

    /// QC config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Principal components per feature group (overrides config)
    #[arg(short = 'n', long)]
    pub components: Option<usize>,

    /// Output CSV path
    #[arg(short, long, default_value = "pca.csv")]
    pub output: PathBuf,
}

pub fn run(args: &PcaArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let n_components = args.components.unwrap_or(config.reduction.n_components);

    let table = ColumnTable::read_csv(&args.features)
        .with_context(|| format!("Failed to read {}", args.features.display()))?;
    let projected = reduce_features(&table, n_components);

    for (group, reason) in &projected.skipped {
        eprintln!("  skipped {group}: {reason}");
    }
    projected
        .write_csv(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} rows x {} columns saved to {}",
        projected.nrows(),
        projected.names.len(),
        args.output.display()
    );
    Ok(())
}
