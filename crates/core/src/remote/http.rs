//! HTTP client for the remote content API.
//!
//! Every request carries the configured timeout. Nothing is retried: a
//! failed request is reported once and the caller moves on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::types::{extract_items, RawItem};
use super::{RemoteError, RemoteSource};
use crate::catalog::RealId;
use crate::config::{EndpointConfig, RemoteConfig};

/// `reqwest`-backed remote source.
pub struct HttpRemoteSource {
    client: Client,
    base_url: String,
}

impl HttpRemoteSource {
    /// Create a new client from configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn page_url(&self, endpoint: &EndpointConfig) -> String {
        format!("{}{}", self.base_url, endpoint.path)
    }

    fn seasons_url(&self, real_id: &RealId) -> String {
        format!(
            "{}/api/seasons/{}",
            self.base_url,
            urlencoding::encode(&real_id.to_string())
        )
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, RemoteError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout
            } else {
                RemoteError::ParseError(e.to_string())
            }
        })?;

        Ok(Some(body))
    }
}

fn map_request_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::HttpError(e)
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_page(
        &self,
        endpoint: &EndpointConfig,
        page: u32,
    ) -> Result<Vec<RawItem>, RemoteError> {
        let url = self.page_url(endpoint);
        debug!(url = %url, page, "Fetching page");

        match self.get_json(&url, &[("page", page.to_string())]).await? {
            Some(body) => Ok(extract_items(&body)),
            None => Err(RemoteError::ApiError {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("{} not found", endpoint.path),
            }),
        }
    }

    async fn fetch_seasons(&self, real_id: &RealId) -> Result<Option<Value>, RemoteError> {
        let url = self.seasons_url(real_id);
        debug!(url = %url, "Fetching seasons");

        Ok(self
            .get_json(&url, &[])
            .await?
            .filter(|body| !body.is_null()))
    }
}
