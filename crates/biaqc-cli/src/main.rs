mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "biaqc", about = "Quality control for microscopy image batches")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions and metadata of an image file
    Info(commands::info::InfoArgs),
    /// Extract per-slice quality features into a CSV table
    Features(commands::features::FeaturesArgs),
    /// Reduce a feature table to principal components per feature group
    Pca(commands::pca::PcaArgs),
    /// Extract per-plane acquisition metadata into a CSV table
    Metadata(commands::metadata::MetadataArgs),
    /// Check acquisition metadata for consistency across a batch
    Report(commands::report::ReportArgs),
    /// Print or save the default configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Features(args) => commands::features::run(args),
        Commands::Pca(args) => commands::pca::run(args),
        Commands::Metadata(args) => commands::metadata::run(args),
        Commands::Report(args) => commands::report::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
