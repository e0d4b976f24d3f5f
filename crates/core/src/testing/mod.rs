//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory `RemoteSource` so the scanner, enricher
//! and sync engine can be exercised without a live API.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_sync_core::testing::{fixtures, MockRemoteSource};
//!
//! let remote = MockRemoteSource::new();
//! remote.set_pages("/api/movies/new", vec![vec![fixtures::raw_item(1, "Heat")]]).await;
//! remote.fail_page("/api/movies/new", 1).await;
//! ```

mod mock_remote;

pub use mock_remote::{MockRemoteSource, RecordedRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::catalog::{CatalogItem, ItemType, RealId};
    use crate::remote::RawItem;

    /// A raw page record with a numeric id.
    pub fn raw_item(id: u64, title: &str) -> RawItem {
        RawItem {
            id: json!(id),
            title: Some(title.to_string()),
            image: Some(format!("https://img.example/{}.jpg", id)),
            year: Some(json!(2000 + (id % 25))),
            imdb: Some(json!("7.5")),
            description: Some(format!("About {}.", title.to_lowercase())),
            sources: Some(vec![json!({"quality": "1080p", "url": format!("https://cdn.example/{}.mp4", id)})]),
        }
    }

    fn item(real_id: &str, title: &str, item_type: ItemType) -> CatalogItem {
        CatalogItem {
            id: format!("plus_{}", real_id),
            real_id: RealId::from(real_id),
            title: Some(title.to_string()),
            image: None,
            year: Some(json!("2020")),
            imdb: None,
            description: None,
            item_type,
            sources: vec![],
            seasons: None,
        }
    }

    /// A stored movie with id `plus_{real_id}`.
    pub fn movie(real_id: &str, title: &str) -> CatalogItem {
        item(real_id, title, ItemType::Movie)
    }

    /// A stored series without seasons.
    pub fn series(real_id: &str, title: &str) -> CatalogItem {
        item(real_id, title, ItemType::Series)
    }

    /// A stored series with a season listing.
    pub fn series_with_seasons(real_id: &str, title: &str, seasons: Value) -> CatalogItem {
        let mut series = series(real_id, title);
        series.seasons = Some(seasons);
        series
    }
}
