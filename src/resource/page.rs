//! Paged list envelope.

use serde::{Deserialize, Serialize};

/// One page of resources as reported by the server.
///
/// `start_index` is one-based. The next-page cursor is not part of the wire
/// format; it is derived client-side from the start index and the returned
/// result count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagedResults<T> {
    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
    #[serde(rename = "startIndex", default)]
    pub start_index: u64,
    #[serde(rename = "itemsPerPage", default)]
    pub items_per_page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_page_envelope() {
        let page: PagedResults<serde_json::Value> = serde_json::from_value(json!({
            "totalResults": 12,
            "startIndex": 3,
            "itemsPerPage": 2,
            "schemas": ["urn:scim:schemas:core:1.0"],
            "Resources": [{"id": "a"}, {"id": "b"}]
        }))
        .unwrap();
        assert_eq!(page.resources.len(), 2);
        assert_eq!(page.start_index, 3);
        assert_eq!(page.items_per_page, 2);
        assert_eq!(page.total_results, 12);
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let page: PagedResults<serde_json::Value> =
            serde_json::from_value(json!({"Resources": []})).unwrap();
        assert_eq!(page.start_index, 0);
        assert!(page.resources.is_empty());
    }
}
