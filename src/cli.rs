use clap::Parser;
use std::path::PathBuf;

use crate::config::{Bandwidth, Settings};

/// Command-line arguments for s3-archiver.
///
/// Connection settings come from the environment or a settings file. The
/// flags here select that file, control logging and reporting, and can
/// override the run-shaping settings for a single invocation.
#[derive(Parser, Debug)]
#[clap(name = "s3-archiver", version, about = "Archive aged files to S3 and retire the originals")]
pub struct Args {
    /// Settings file to load (default: .env beside the executable, if present)
    #[clap(long)]
    pub env_file: Option<PathBuf>,

    /// Directory to archive, overriding SOURCE_DIR
    #[clap(short, long)]
    pub source_dir: Option<PathBuf>,

    /// Key prefix, overriding S3_PREFIX
    #[clap(short, long)]
    pub prefix: Option<String>,

    /// Minimum age in days before an uploaded original is deleted, overriding MIN_FILE_AGE_DAYS
    #[clap(long)]
    pub min_age_days: Option<u32>,

    /// Upload rate cap such as 2Mb/s or 500KB/s, overriding MAX_BANDWIDTH
    #[clap(long)]
    pub max_bandwidth: Option<Bandwidth>,

    /// Skip post-upload verification
    #[clap(long)]
    pub no_verify: bool,

    /// Run the preflight checks and exit without touching any file
    #[clap(long)]
    pub check: bool,

    /// Write a JSON run summary to this path
    #[clap(long)]
    pub summary: Option<PathBuf>,

    /// Also append log output to this file
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of settings loaded from the environment.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(dir) = &self.source_dir {
            settings.source_dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            settings.prefix = prefix.clone();
        }
        if let Some(days) = self.min_age_days {
            settings.min_file_age_days = days;
        }
        if let Some(bandwidth) = self.max_bandwidth {
            settings.max_bandwidth = bandwidth;
        }
        if self.no_verify {
            settings.verify_upload = false;
        }
    }
}
