//! Station feeds that don't touch the network.
//!
//! Useful for development and testing without reaching the CPCB endpoint.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::StationFeed;
use super::error::FeedError;
use super::types::CpcbFeed;

/// Feed source backed by a JSON file on disk.
///
/// The file is re-read on every load, so edits show up immediately.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Create a file-backed feed. The file is not read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StationFeed for FileFeed {
    async fn load(&self) -> Result<CpcbFeed, FeedError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FeedError::Io {
                message: format!("failed to read {:?}: {}", self.path, e),
            })?;

        let value: serde_json::Value = serde_json::from_str(&json).map_err(|e| FeedError::Json {
            message: format!("failed to parse {:?}: {}", self.path, e),
        })?;

        Ok(CpcbFeed::from_value(value))
    }
}

/// Feed source holding a JSON document in memory.
#[derive(Debug, Clone)]
pub struct StaticFeed {
    document: serde_json::Value,
}

impl StaticFeed {
    pub fn new(document: serde_json::Value) -> Self {
        Self { document }
    }
}

#[async_trait]
impl StationFeed for StaticFeed {
    async fn load(&self) -> Result<CpcbFeed, FeedError> {
        Ok(CpcbFeed::from_value(self.document.clone()))
    }
}
