//! Shared fixtures for the wire-level integration tests.

#![allow(dead_code)]

use httpmock::MockServer;
use scim_v11_client::ScimConfig;
use serde_json::{Value, json};

pub const ENTERPRISE_URN: &str = "urn:scim:schemas:extension:enterprise:1.0";

/// Configuration pointing at the mock server's `/scim/v1` base.
pub fn config_for(server: &MockServer) -> ScimConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    ScimConfig::new(format!("{}/scim/v1", server.base_url()), "admin", "s3cret")
}

pub fn config_with_extension_schema(server: &MockServer) -> ScimConfig {
    let mut config = config_for(server);
    config.custom_attributes_json = Some(
        json!({
            "attributes": [{
                "name": "employeeNumber",
                "type": "string",
                "multiValued": false,
                "schema": ENTERPRISE_URN
            }]
        })
        .to_string(),
    );
    config
}

pub fn stored_user(id: &str, user_name: &str) -> Value {
    json!({
        "schemas": ["urn:scim:schemas:core:1.0"],
        "id": id,
        "userName": user_name,
        "name": {"familyName": "Jensen", "givenName": "Barbara"},
        "active": true,
        "emails": [
            {"value": format!("{user_name}@example.com"), "type": "work", "primary": true}
        ],
        "meta": {
            "created": "2011-08-01T18:29:49.793Z",
            "location": format!("/scim/v1/Users/{id}")
        }
    })
}

pub fn page(resources: &[Value], total: u64, start_index: u64) -> Value {
    json!({
        "totalResults": total,
        "startIndex": start_index,
        "itemsPerPage": resources.len(),
        "Resources": resources
    })
}
