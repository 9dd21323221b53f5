//! Resource metadata block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SCIM 1.1 `meta` block: server-managed timestamps, location, version and
/// the changed-attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.created.is_none()
            && self.last_modified.is_none()
            && self.location.is_none()
            && self.version.is_none()
            && self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_scim_timestamps() {
        let meta: Meta = serde_json::from_value(json!({
            "created": "2011-08-01T18:29:49.793Z",
            "lastModified": "2011-08-01T18:29:49.793Z",
            "location": "https://example.com/v1/Users/123",
            "version": "W/\"a330bc54f0671c9\""
        }))
        .unwrap();
        assert!(meta.created.is_some());
        assert!(!meta.is_empty());
    }

    #[test]
    fn test_empty_meta_serializes_to_empty_object() {
        let value = serde_json::to_value(Meta::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
