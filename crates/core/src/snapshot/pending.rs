//! The hot tier: id-indexed, insertion-ordered.

use std::collections::{HashMap, VecDeque};

use crate::catalog::CatalogItem;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// An item with this id was already pending; replaced in its slot.
    Replaced,
    /// New to the tier; placed at the front.
    Prepended,
}

/// Pending items, newest first, with O(1) lookup by id.
#[derive(Debug, Clone, Default)]
pub struct PendingTier {
    order: VecDeque<String>,
    items: HashMap<String, CatalogItem>,
}

impl PendingTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored list, keeping its order. A repeated id keeps its
    /// first position and the later copy's contents.
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        let mut tier = Self::new();
        for item in items {
            if !tier.items.contains_key(&item.id) {
                tier.order.push_back(item.id.clone());
            }
            tier.items.insert(item.id.clone(), item);
        }
        tier
    }

    /// Replace the pending copy of `item.id` in place, or prepend it.
    pub fn upsert(&mut self, item: CatalogItem) -> Upsert {
        if let Some(slot) = self.items.get_mut(&item.id) {
            *slot = item;
            return Upsert::Replaced;
        }
        self.order.push_front(item.id.clone());
        self.items.insert(item.id.clone(), item);
        Upsert::Prepended
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.get(id)
    }

    /// Ids in tier order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Items in tier order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Empty the tier, returning its items in order.
    pub fn drain(&mut self) -> Vec<CatalogItem> {
        let mut items = std::mem::take(&mut self.items);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|id| items.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn ids(tier: &PendingTier) -> Vec<&str> {
        tier.ids().collect()
    }

    #[test]
    fn test_upsert_prepends_new_ids() {
        let mut tier = PendingTier::new();
        assert_eq!(tier.upsert(fixtures::movie("1", "A")), Upsert::Prepended);
        assert_eq!(tier.upsert(fixtures::movie("2", "B")), Upsert::Prepended);
        assert_eq!(ids(&tier), vec!["plus_2", "plus_1"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut tier = PendingTier::from_items(vec![
            fixtures::movie("1", "A"),
            fixtures::movie("2", "B"),
            fixtures::movie("3", "C"),
        ]);

        assert_eq!(tier.upsert(fixtures::movie("2", "B v2")), Upsert::Replaced);

        assert_eq!(ids(&tier), vec!["plus_1", "plus_2", "plus_3"]);
        assert_eq!(tier.get("plus_2").unwrap().title.as_deref(), Some("B v2"));
        assert_eq!(tier.len(), 3);
    }

    #[test]
    fn test_from_items_collapses_repeated_ids() {
        let tier = PendingTier::from_items(vec![
            fixtures::movie("1", "A"),
            fixtures::movie("2", "B"),
            fixtures::movie("1", "A v2"),
        ]);
        assert_eq!(ids(&tier), vec!["plus_1", "plus_2"]);
        assert_eq!(tier.get("plus_1").unwrap().title.as_deref(), Some("A v2"));
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut tier = PendingTier::new();
        tier.upsert(fixtures::movie("1", "A"));
        tier.upsert(fixtures::movie("2", "B"));

        let drained = tier.drain();

        let drained_ids: Vec<_> = drained.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(drained_ids, vec!["plus_2", "plus_1"]);
        assert!(tier.is_empty());
        assert!(!tier.contains("plus_1"));
    }
}
