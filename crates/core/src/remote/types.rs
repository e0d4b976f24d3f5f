//! Types for remote API responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// One record of a catalog page, as sent by the API.
///
/// Only `id` decides whether a record is usable. Display fields of an
/// unexpected shape are dropped one by one instead of failing the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    /// Native id (string or number). Anything else is rejected at normalization.
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "display_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "display_text")]
    pub image: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub imdb: Option<Value>,
    #[serde(default, deserialize_with = "display_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sources: Option<Vec<Value>>,
}

/// Text field: strings as-is, numbers and booleans in their JSON form,
/// anything else absent.
fn display_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        _ => None,
    })
}

/// Any other field: absent when it does not have the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

type ItemsAccessor = fn(&Value) -> Option<&Vec<Value>>;

fn posters_field(body: &Value) -> Option<&Vec<Value>> {
    body.get("posters")?.as_array()
}

fn search_results_field(body: &Value) -> Option<&Vec<Value>> {
    body.get("search_results")?.as_array()
}

fn bare_list(body: &Value) -> Option<&Vec<Value>> {
    body.as_array()
}

/// Where a page's item list may live, tried in order.
const ITEM_ACCESSORS: [(&str, ItemsAccessor); 3] = [
    ("posters", posters_field),
    ("search_results", search_results_field),
    ("body", bare_list),
];

/// Pull the item list out of a page body.
///
/// The first accessor yielding a non-empty array wins. Entries that do not
/// look like items are dropped individually so one bad record cannot hide
/// the rest of the page.
pub fn extract_items(body: &Value) -> Vec<RawItem> {
    let Some((source, values)) = ITEM_ACCESSORS.iter().find_map(|(name, accessor)| {
        accessor(body)
            .filter(|values| !values.is_empty())
            .map(|values| (*name, values))
    }) else {
        return Vec::new();
    };

    values
        .iter()
        .filter_map(|value| match RawItem::deserialize(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(source, error = %e, "Skipping malformed item");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_posters() {
        let body = json!({"posters": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]});
        let items = extract_items(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, json!(1));
        assert_eq!(items[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn test_extract_from_search_results() {
        let body = json!({"search_results": [{"id": "x"}]});
        let items = extract_items(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, json!("x"));
    }

    #[test]
    fn test_extract_from_bare_list() {
        let body = json!([{"id": 5}, {"id": 6}, {"id": 7}]);
        assert_eq!(extract_items(&body).len(), 3);
    }

    #[test]
    fn test_empty_posters_falls_through_to_next_candidate() {
        let body = json!({"posters": [], "search_results": [{"id": 9}]});
        let items = extract_items(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, json!(9));
    }

    #[test]
    fn test_posters_win_over_search_results() {
        let body = json!({"posters": [{"id": 1}], "search_results": [{"id": 2}, {"id": 3}]});
        let items = extract_items(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, json!(1));
    }

    #[test]
    fn test_no_list_anywhere_is_empty() {
        assert!(extract_items(&json!({"message": "nothing"})).is_empty());
        assert!(extract_items(&json!(null)).is_empty());
        assert!(extract_items(&json!({"posters": "oops"})).is_empty());
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let body = json!({"posters": [{"id": 1}, "garbage", 42, {"id": 2}]});
        let items = extract_items(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, json!(1));
        assert_eq!(items[1].id, json!(2));
    }

    #[test]
    fn test_mistyped_display_fields_keep_the_item() {
        let body = json!({"posters": [
            {"id": 1, "title": 1984},
            {"id": 2, "sources": {"hd": "x"}},
            {"id": 3, "image": ["a.jpg"], "description": {"en": "text"}, "title": true}
        ]});
        let items = extract_items(&body);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title.as_deref(), Some("1984"));
        assert_eq!(items[1].id, json!(2));
        assert_eq!(items[1].sources, None);
        assert_eq!(items[2].image, None);
        assert_eq!(items[2].description, None);
        assert_eq!(items[2].title.as_deref(), Some("true"));
    }

    #[test]
    fn test_missing_fields_default() {
        let items = extract_items(&json!([{"id": 3, "sources": null}]));
        assert_eq!(items[0].sources, None);
        assert_eq!(items[0].year, None);
    }
}
