//! Command-line surface: `clap`'s derive macros, kept to the handful of
//! flags a thin wrapper over the pipeline actually needs.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scoutbom", version, about = "Software composition and secret-analysis scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a directory, extract packages, detect signatures and secrets,
    /// enrich the inventory, and print a summary.
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Never hit the network for the OSV database; fail if no local cache
    /// exists instead of fetching one.
    #[arg(long)]
    pub offline: bool,

    /// Override the resolved OSV cache directory.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Run the license and expiration enrichers, which need outbound
    /// network access (deps.dev / vendor validator endpoints).
    #[arg(long)]
    pub online_enrichment: bool,

    /// Drop packages attributed to a base container-image layer instead of
    /// only annotating them.
    #[arg(long)]
    pub remove_base_image_packages: bool,

    /// Minimum CVSS score a vulnerability must meet to be reported.
    #[arg(long, default_value_t = 0.0)]
    pub severity_threshold: f64,

    /// Print the full inventory as JSON instead of a human-readable summary.
    #[arg(long)]
    pub json: bool,
}
