use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use tokio::runtime::Runtime;

use s3_archiver::cli::Args;
use s3_archiver::cloud::s3::S3ObjectStore;
use s3_archiver::config::{load_settings_file, Settings};
use s3_archiver::pipeline::Pipeline;
use s3_archiver::preflight::run_preflight;
use s3_archiver::security::scrub_with_secret;
use s3_archiver::utils::compress::ZipCompressor;
use s3_archiver::utils::summary::{log_run_totals, write_run_summary};

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.verbose, args.log_file.as_deref())?;

    // The secret is not known until settings load, so only pattern scrubbing applies here
    let settings = load_settings(&args).map_err(|e| log_fatal(&e, ""))?;
    let secret = settings.credentials.secret_access_key.clone();

    let runtime = Runtime::new().context("Failed to create Tokio runtime")?;
    let outcome = runtime.block_on(run(&args, &settings));

    outcome.map_err(|e| log_fatal(&e, &secret))
}

/// Scrub a fatal error, log it so it reaches the log file too, and hand it back
fn log_fatal(e: &anyhow::Error, secret: &str) -> anyhow::Error {
    let message = scrub_with_secret(&format!("{:#}", e), secret);
    error!("{}", message);
    anyhow!(message)
}

/// Initialize logging to the terminal and, optionally, a log file
fn initialize_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context(format!("Failed to open log file {}", path.display()))?;
        loggers.push(WriteLogger::new(log_level, Config::default(), file));
    }

    CombinedLogger::init(loggers).context("Failed to initialize logger")?;
    Ok(())
}

/// Load the settings file, read settings from the environment and apply CLI overrides
fn load_settings(args: &Args) -> Result<Settings> {
    if let Some(path) = load_settings_file(args.env_file.as_deref())? {
        info!("Loaded settings from {}", path.display());
    }
    let mut settings = Settings::from_env()?;
    args.apply_overrides(&mut settings);
    settings.log_summary();
    Ok(settings)
}

async fn run(args: &Args, settings: &Settings) -> Result<()> {
    let store = Arc::new(S3ObjectStore::new(settings)?);

    run_preflight(settings, store.as_ref())
        .await
        .context("Preflight failed")?;
    if args.check {
        info!("Preflight checks passed");
        return Ok(());
    }

    let pipeline = Pipeline::new(settings, store, Arc::new(ZipCompressor));
    let result = pipeline.run().await?;

    log_run_totals(&result);
    if let Some(path) = &args.summary {
        write_run_summary(path, &result, &settings.bucket, &settings.prefix)?;
    }

    if result.is_success() {
        info!("Archival run {} completed successfully", result.run_timestamp);
        Ok(())
    } else {
        Err(anyhow!(
            "Archival run {} finished with {} failed files",
            result.run_timestamp,
            result.failure_count()
        ))
    }
}
