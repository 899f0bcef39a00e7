use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use rusoto_core::HttpClient;
use rusoto_credential::StaticProvider;
use rusoto_s3::S3Client;
use rusoto_sts::StsClient;

use crate::config::Settings;

fn static_provider(settings: &Settings) -> StaticProvider {
    StaticProvider::new_minimal(
        settings.credentials.access_key_id.clone(),
        settings.credentials.secret_access_key.clone(),
    )
}

/// Create an S3 client bound to the configured region and static credentials
pub fn create_s3_client(settings: &Settings) -> Result<Arc<S3Client>> {
    let http_client = HttpClient::new().context("Failed to create HTTP client for S3")?;
    debug!("Creating S3 client for region {}", settings.region.name());

    Ok(Arc::new(S3Client::new_with(
        http_client,
        static_provider(settings),
        settings.region.clone(),
    )))
}

/// Create an STS client used only to resolve the caller identity
pub fn create_sts_client(settings: &Settings) -> Result<Arc<StsClient>> {
    let http_client = HttpClient::new().context("Failed to create HTTP client for STS")?;

    Ok(Arc::new(StsClient::new_with(
        http_client,
        static_provider(settings),
        settings.region.clone(),
    )))
}
