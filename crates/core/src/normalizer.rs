//! Mapping of raw API records into catalog items, and the new-vs-known decision.

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::{CatalogItem, RealId};
use crate::config::EndpointConfig;
use crate::remote::RawItem;

/// Set of canonical ids present in either snapshot tier, grown as new items
/// are discovered during a run.
#[derive(Debug, Clone, Default)]
pub struct KnownIds(HashSet<String>);

impl KnownIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns `true` if the id was not known before.
    pub fn insert(&mut self, id: String) -> bool {
        self.0.insert(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for KnownIds {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> Extend<&'a str> for KnownIds {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(str::to_string));
    }
}

/// Why a normalized item was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Id was not known before this item.
    New,
    /// Id was known; accepted only because the endpoint forces refresh.
    Refresh,
}

/// An accepted item together with the reason it was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub item: CatalogItem,
    pub disposition: Disposition,
}

/// Maps raw records into catalog items under one id namespace.
#[derive(Debug, Clone)]
pub struct Normalizer {
    namespace: String,
}

impl Normalizer {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Canonical id of a remote entity. Stable across runs.
    pub fn canonical_id(&self, real_id: &RealId) -> String {
        format!("{}_{}", self.namespace, real_id)
    }

    /// Normalize one raw record, or `None` to skip it.
    ///
    /// Unknown ids are accepted and recorded in `known`. Known ids are
    /// skipped unless the endpoint forces refresh, in which case the item is
    /// accepted again and `known` is left as is.
    pub fn normalize(
        &self,
        raw: RawItem,
        endpoint: &EndpointConfig,
        known: &mut KnownIds,
    ) -> Option<NormalizedItem> {
        let Some(real_id) = RealId::from_value(raw.id.clone()) else {
            debug!(endpoint = %endpoint.display_name, id = %raw.id, "Skipping item without usable id");
            return None;
        };

        let id = self.canonical_id(&real_id);

        let disposition = if known.contains(&id) {
            if !endpoint.force_refresh {
                return None;
            }
            Disposition::Refresh
        } else {
            known.insert(id.clone());
            Disposition::New
        };

        let item = CatalogItem {
            id,
            real_id,
            title: raw.title,
            image: raw.image,
            year: raw.year,
            imdb: raw.imdb,
            description: raw.description,
            item_type: endpoint.item_type,
            sources: raw.sources.unwrap_or_default(),
            seasons: None,
        };

        Some(NormalizedItem { item, disposition })
    }
}
