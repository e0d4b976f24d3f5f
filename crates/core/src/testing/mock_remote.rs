//! Mock remote source for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::RealId;
use crate::config::EndpointConfig;
use crate::remote::{RawItem, RemoteError, RemoteSource};

/// A recorded request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    Page { path: String, page: u32 },
    Seasons { real_id: String },
}

/// Mock implementation of the RemoteSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured pages per endpoint path (pages past the end are empty)
/// - Serve season listings per real id (unknown ids have none)
/// - Fail specific pages or season requests
/// - Track requests and peak concurrency for assertions
#[derive(Debug, Clone)]
pub struct MockRemoteSource {
    /// Pages by endpoint path.
    pages: Arc<RwLock<HashMap<String, Vec<Vec<RawItem>>>>>,
    /// Season listings by real id.
    seasons: Arc<RwLock<HashMap<String, Value>>>,
    /// Pages that fail, by (path, page).
    failing_pages: Arc<RwLock<HashSet<(String, u32)>>>,
    /// Real ids whose season request fails.
    failing_seasons: Arc<RwLock<HashSet<String>>>,
    /// Artificial latency of every season request.
    seasons_delay: Arc<RwLock<Option<Duration>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockRemoteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteSource {
    /// Create a new mock with no pages.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            seasons: Arc::new(RwLock::new(HashMap::new())),
            failing_pages: Arc::new(RwLock::new(HashSet::new())),
            failing_seasons: Arc::new(RwLock::new(HashSet::new())),
            seasons_delay: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the pages served for an endpoint path, page 0 first.
    pub async fn set_pages(&self, path: &str, pages: Vec<Vec<RawItem>>) {
        self.pages.write().await.insert(path.to_string(), pages);
    }

    /// Set the season listing returned for a real id.
    pub async fn set_seasons(&self, real_id: &str, seasons: Value) {
        self.seasons
            .write()
            .await
            .insert(real_id.to_string(), seasons);
    }

    /// Make a page request fail.
    pub async fn fail_page(&self, path: &str, page: u32) {
        self.failing_pages
            .write()
            .await
            .insert((path.to_string(), page));
    }

    /// Make a season request fail.
    pub async fn fail_seasons(&self, real_id: &str) {
        self.failing_seasons
            .write()
            .await
            .insert(real_id.to_string());
    }

    /// Delay every season request.
    pub async fn set_seasons_delay(&self, delay: Duration) {
        *self.seasons_delay.write().await = Some(delay);
    }

    // =========================================================================
    // Request Recording
    // =========================================================================

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    /// Page indexes requested for an endpoint path, in request order.
    pub async fn pages_requested(&self, path: &str) -> Vec<u32> {
        self.requests
            .read()
            .await
            .iter()
            .filter_map(|r| match r {
                RecordedRequest::Page { path: p, page } if p == path => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Number of season requests made.
    pub async fn season_request_count(&self) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| matches!(r, RecordedRequest::Seasons { .. }))
            .count()
    }

    /// Highest number of season requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, request: RecordedRequest) {
        self.requests.write().await.push(request);
    }
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    async fn fetch_page(
        &self,
        endpoint: &EndpointConfig,
        page: u32,
    ) -> Result<Vec<RawItem>, RemoteError> {
        self.record(RecordedRequest::Page {
            path: endpoint.path.clone(),
            page,
        })
        .await;

        if self
            .failing_pages
            .read()
            .await
            .contains(&(endpoint.path.clone(), page))
        {
            return Err(RemoteError::Timeout);
        }

        Ok(self
            .pages
            .read()
            .await
            .get(&endpoint.path)
            .and_then(|pages| pages.get(page as usize))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_seasons(&self, real_id: &RealId) -> Result<Option<Value>, RemoteError> {
        let key = real_id.to_string();
        self.record(RecordedRequest::Seasons {
            real_id: key.clone(),
        })
        .await;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.seasons_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.failing_seasons.read().await.contains(&key) {
            Err(RemoteError::ApiError {
                status: 500,
                message: "mock failure".to_string(),
            })
        } else {
            Ok(self.seasons.read().await.get(&key).cloned())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
