//! Remote content API access.
//!
//! This module provides the `RemoteSource` trait used by the scanner and the
//! enricher, plus an HTTP implementation backed by `reqwest`. Both operations
//! are read-only; callers decide how to absorb failures.

mod http;
mod types;

pub use http::HttpRemoteSource;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::RealId;
use crate::config::EndpointConfig;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Source of catalog pages and per-item season listings.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch one page of an endpoint. An empty list means pagination is exhausted.
    async fn fetch_page(
        &self,
        endpoint: &EndpointConfig,
        page: u32,
    ) -> Result<Vec<RawItem>, RemoteError>;

    /// Fetch the season listing of a series. `Ok(None)` when the API has none.
    async fn fetch_seasons(&self, real_id: &RealId) -> Result<Option<Value>, RemoteError>;
}
