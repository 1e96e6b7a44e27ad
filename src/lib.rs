use clap::Parser;
use std::path::PathBuf;

pub mod alerts;
pub mod config;
pub mod error;
pub mod exchanges;
pub mod host;
pub mod importer;
pub mod markets;
pub mod metrics;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Validate and map the files without submitting any alerts
    #[arg(long)]
    pub dry_run: bool,

    /// Write Prometheus metrics to this file once all imports have finished
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Exported alert files (.txt or .json)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
