//! Attachment fetching
//!
//! This module provides the asset fetcher used by the page transformer. One
//! call performs one GET and creates at most one file on disk.
//!
//! The module is organized into:
//! - `config`: HTTP client configuration and building
//! - `download`: writing downloaded bytes to disk

use std::path::Path;

use reqwest::Client;

use crate::app::filename::derive_filename;
use crate::errors::{FetchError, FetchResult};

pub mod config;
pub mod download;

pub use config::ClientConfig;

/// Downloads attachments next to the pages that reference them
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    client: Client,
    include_timestamp: bool,
}

impl AssetFetcher {
    /// Creates a fetcher from client configuration
    ///
    /// # Arguments
    ///
    /// * `config` - HTTP client settings
    /// * `include_timestamp` - Whether derived filenames embed the download time
    pub fn new(config: &ClientConfig, include_timestamp: bool) -> FetchResult<Self> {
        let client = config.build_http_client()?;
        Ok(Self::with_client(client, include_timestamp))
    }

    /// Creates a fetcher around an existing HTTP client
    pub fn with_client(client: Client, include_timestamp: bool) -> Self {
        Self {
            client,
            include_timestamp,
        }
    }

    /// Downloads `url` into `destination` and returns the local filename
    ///
    /// The filename is derived only once the server has answered with a
    /// success status, and nothing is written unless a filename was derived.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - the server answers with a non-success status
    /// - the request or the body transfer fails
    /// - no filename can be derived from the URL
    /// - the file cannot be written
    pub async fn fetch(&self, url: &str, destination: &Path) -> FetchResult<String> {
        tracing::info!("Downloading {}...", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("Request failed: {}", e);
            FetchError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Non-success response for {}: HTTP {}", url, status.as_u16());
            return Err(FetchError::NonSuccessStatus {
                status: status.as_u16(),
            });
        }

        let filename = derive_filename(url, self.include_timestamp).map_err(|e| {
            tracing::error!("Could not derive a filename: {}", e);
            FetchError::Filename(e)
        })?;

        let bytes = response.bytes().await?;
        download::write_atomically(&destination.join(&filename), &bytes).await?;

        tracing::info!("Saved {}", filename);
        Ok(filename)
    }
}
