use std::path::PathBuf;

use anyhow::{Context, Result};
use biaqc_core::metadata::{MetadataAnalysis, MetadataTable};
use biaqc_core::pipeline::collect_metadata;
use clap::Args;

use super::{collect_inputs, load_config, print_failures, BarReporter};
use crate::summary::print_report;

#[derive(Args)]
pub struct ReportArgs {
    /// Metadata CSV, or an image file or folder to read metadata from
    pub input: PathBuf,

    /// QC config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Exit with an error when any check fails
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: &ReportArgs) -> Result<()> {
    let is_csv = args
        .input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let table = if is_csv {
        MetadataTable::read_csv(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?
    } else {
        let config = load_config(args.config.as_deref())?;
        let files = collect_inputs(&args.input, &config.batch)?;
        let (table, failures) = collect_metadata(&files, &BarReporter::new());
        print_failures(&failures);
        table
    };

    let report = MetadataAnalysis::new(&table).report();
    print_report(&report);

    if args.strict && !report.is_consistent() {
        anyhow::bail!("{} check(s) failed", report.failures().count());
    }
    Ok(())
}
