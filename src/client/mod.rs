//! Synchronous SCIM 1.1 client.
//!
//! [`ScimClient`] owns the HTTP connection pool, the validated configuration
//! and the parsed extension schema, and exposes the resource-level calls:
//! single and paged retrieval, creation, update (PUT or PATCH), deletion and
//! account activation. The transport submodule holds the verb-level plumbing
//! and response classification.

mod transport;

pub use transport::{RESPONSE_ERRORS, RESPONSE_RESOURCES, USERS_PATH};

use crate::attrs::paths;
use crate::attrs::projection::clean_attributes_to_get;
use crate::config::ScimConfig;
use crate::error::{ScimError, ScimResult};
use crate::extension::ExtensionSchema;
use crate::merge::merge;
use crate::resource::{PagedResults, User};
use log::debug;
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// Path segments of the account activation endpoint, relative to the base
/// address.
const ACTIVATION_PATH: &[&str] = &["activation", "tokens"];

pub struct ScimClient {
    pub(crate) http: reqwest::blocking::Client,
    pub(crate) config: ScimConfig,
    extension_schema: Option<ExtensionSchema>,
}

impl ScimClient {
    /// Validate the configuration and build a client. The extension schema,
    /// if configured, is parsed here once and reused for every call.
    pub fn new(config: ScimConfig) -> ScimResult<Self> {
        let extension_schema = config.validate()?;
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            config,
            extension_schema,
        })
    }

    pub fn extension_schema(&self) -> Option<&ExtensionSchema> {
        self.extension_schema.as_ref()
    }

    /// Fetch a single User by identifier.
    pub fn get_user(&self, user_id: &str) -> ScimResult<User> {
        let node = self.do_get(&[USERS_PATH, user_id], &[])?;
        self.read_user(&node)
    }

    /// Fetch all Users matching an optional filter, without pagination.
    pub fn query_users(
        &self,
        filter: Option<&str>,
        attributes_to_get: &BTreeSet<String>,
    ) -> ScimResult<Vec<User>> {
        Ok(self
            .fetch_users(filter, None, None, attributes_to_get)?
            .resources)
    }

    /// Fetch one page of Users. `start_index` is 1-based per the protocol.
    pub fn paged_users(
        &self,
        filter: Option<&str>,
        start_index: u64,
        count: u64,
        attributes_to_get: &BTreeSet<String>,
    ) -> ScimResult<PagedResults<User>> {
        self.fetch_users(filter, Some(start_index), Some(count), attributes_to_get)
    }

    /// Create a User. The server-assigned identifier is written back into
    /// `user.id`; a creation response without one is a hard failure.
    pub fn create_user(&self, user: &mut User) -> ScimResult<()> {
        let payload = self.build_payload(user)?;
        let node = self.do_post(&[USERS_PATH], &payload)?;
        match node.get(paths::ID).and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {
                user.id = id.to_string();
                Ok(())
            }
            _ => Err(ScimError::protocol(format!(
                "While getting id value for created User - response: {node}"
            ))),
        }
    }

    /// Update a User with the configured verb and return the server's view
    /// of the resource.
    pub fn update_user(&self, user: &User) -> ScimResult<User> {
        if user.id.is_empty() {
            return Err(ScimError::protocol(
                "Missing required id attribute for update",
            ));
        }
        let payload = self.build_payload(user)?;
        let node = self.do_update(&user.id, &payload)?;
        self.read_user(&node)
    }

    pub fn delete_user(&self, user_id: &str) -> ScimResult<()> {
        self.do_delete(user_id)
    }

    /// Trigger account activation for a User.
    pub fn activate_user(&self, user_id: &str) -> ScimResult<()> {
        let node = self.do_post(ACTIVATION_PATH, &json!({ "user_id": user_id }))?;
        debug!("Activation response for {user_id}: {node}");
        Ok(())
    }

    /// Connectivity probe: fetch a minimal single-entry page. Any transport
    /// or protocol failure fails the probe.
    pub fn test_service(&self) -> ScimResult<()> {
        let mut attributes = BTreeSet::new();
        attributes.insert(paths::USER_NAME.to_string());
        self.paged_users(None, 1, 1, &attributes)?;
        Ok(())
    }

    fn fetch_users(
        &self,
        filter: Option<&str>,
        start_index: Option<u64>,
        count: Option<u64>,
        attributes_to_get: &BTreeSet<String>,
    ) -> ScimResult<PagedResults<User>> {
        let projection = clean_attributes_to_get(attributes_to_get, self.extension_schema.as_ref())
            .into_iter()
            .collect::<Vec<_>>()
            .join(",");
        let mut params: Vec<(&str, String)> = vec![("attributes", projection)];
        if let Some(filter) = filter {
            params.push(("filter", filter.to_string()));
        }
        if let Some(start_index) = start_index {
            params.push(("startIndex", start_index.to_string()));
        }
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }

        let node = self.do_get(&[USERS_PATH], &params)?;
        let mut page: PagedResults<User> = serde_json::from_value(node.clone())?;
        // extension values live outside the typed model and are pulled from
        // the raw element backing each resource
        if let Some(schema) = &self.extension_schema
            && let Some(elements) = node.get(RESPONSE_RESOURCES).and_then(Value::as_array)
        {
            for (user, element) in page.resources.iter_mut().zip(elements) {
                schema.read_into(user, element);
            }
        }
        Ok(page)
    }

    fn read_user(&self, node: &Value) -> ScimResult<User> {
        let mut user: User = serde_json::from_value(node.clone())?;
        if let Some(schema) = &self.extension_schema {
            schema.read_into(&mut user, node);
        }
        Ok(user)
    }

    /// Serialize a User and deep-merge the extension fragment into it.
    fn build_payload(&self, user: &User) -> ScimResult<Value> {
        let mut payload = serde_json::to_value(user)?;
        if let Some(schema) = &self.extension_schema
            && let Some(fragment) = schema.build_fragment(user)
        {
            merge(&mut payload, &fragment);
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ScimClient {
        ScimClient::new(ScimConfig::new("http://localhost/scim/v1", "admin", "s3cret")).unwrap()
    }

    fn client_with_schema() -> ScimClient {
        let mut config = ScimConfig::new("http://localhost/scim/v1", "admin", "s3cret");
        config.custom_attributes_json = Some(
            json!({
                "attributes": [{
                    "name": "employeeNumber",
                    "type": "string",
                    "schema": "urn:scim:schemas:extension:enterprise:1.0"
                }]
            })
            .to_string(),
        );
        ScimClient::new(config).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        assert!(ScimClient::new(ScimConfig::new("", "admin", "pw")).is_err());
        assert!(ScimClient::new(ScimConfig::new("not a url", "admin", "pw")).is_err());
    }

    #[test]
    fn test_payload_without_schema_is_plain_serialization() {
        let client = client();
        let user = User::new("bjensen");
        let payload = client.build_payload(&user).unwrap();
        assert_eq!(payload["userName"], "bjensen");
        assert!(payload.get("urn:scim:schemas:extension:enterprise:1.0").is_none());
    }

    #[test]
    fn test_payload_merges_extension_fragment() {
        let client = client_with_schema();
        let mut user = User::new("bjensen");
        user.extension_values.insert(
            "urn:scim:schemas:extension:enterprise:1.0.employeeNumber".to_string(),
            vec![json!("701984")],
        );
        let payload = client.build_payload(&user).unwrap();
        assert_eq!(
            payload["urn:scim:schemas:extension:enterprise:1.0"]["employeeNumber"],
            "701984"
        );
        assert_eq!(payload["userName"], "bjensen");
    }

    #[test]
    fn test_read_user_extracts_extensions() {
        let client = client_with_schema();
        let node = json!({
            "id": "42",
            "userName": "bjensen",
            "urn:scim:schemas:extension:enterprise:1.0": {"employeeNumber": "701984"}
        });
        let user = client.read_user(&node).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(
            user.returned_extensions
                ["urn:scim:schemas:extension:enterprise:1.0.employeeNumber"],
            vec![json!("701984")]
        );
    }
}
