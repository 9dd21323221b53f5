//! Attribute-level operations facade.
//!
//! [`UserOps`] is the surface meant for provisioning frameworks that speak
//! in flat attribute sets rather than typed resources: each call accepts or
//! returns [`AttributeSet`]s and identifiers, translating to and from the
//! typed [`User`] internally. Listing is cursor-based with a uniform
//! continuation rule independent of the filter in use.

use crate::attrs::{AttributeSet, paths, translator};
use crate::client::ScimClient;
use crate::config::ScimConfig;
use crate::error::{ScimError, ScimResult};
use crate::resource::User;
use log::warn;
use std::collections::BTreeSet;

/// Page request: no size means one unpaged fetch of everything.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub page_size: Option<u64>,
    /// Opaque continuation cursor from a previous [`ListResult`].
    pub cursor: Option<String>,
}

impl PageRequest {
    /// Fetch everything in one go.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn first(page_size: u64) -> Self {
        Self {
            page_size: Some(page_size),
            cursor: None,
        }
    }

    pub fn next(page_size: u64, cursor: impl Into<String>) -> Self {
        Self {
            page_size: Some(page_size),
            cursor: Some(cursor.into()),
        }
    }
}

/// One page of results plus the cursor for the next one, if any.
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub users: Vec<User>,
    /// `None` when the listing is exhausted.
    pub next_cursor: Option<String>,
}

pub struct UserOps {
    client: ScimClient,
}

impl UserOps {
    pub fn new(config: ScimConfig) -> ScimResult<Self> {
        Ok(Self {
            client: ScimClient::new(config)?,
        })
    }

    pub fn from_client(client: ScimClient) -> Self {
        Self { client }
    }

    /// The underlying resource-level client.
    pub fn client(&self) -> &ScimClient {
        &self.client
    }

    /// Create a User from flat attributes and return the server-assigned
    /// identifier. A username is mandatory; a missing password is allowed
    /// but logged.
    pub fn create(&self, attrs: &AttributeSet) -> ScimResult<String> {
        if attrs.is_empty() {
            return Err(ScimError::translation(
                paths::USER_NAME,
                "set of attributes is empty",
            ));
        }

        let mut user = User::default();
        translator::apply_attributes(&mut user, attrs);
        if user.user_name.is_empty() {
            return Err(ScimError::translation(
                paths::USER_NAME,
                "missing username for create",
            ));
        }
        if user.password.is_none() {
            warn!("Missing password attribute on create of '{}'", user.user_name);
        }

        self.client.create_user(&mut user)?;
        Ok(user.id)
    }

    /// Fetch one User by identifier.
    pub fn read(&self, user_id: &str) -> ScimResult<User> {
        self.client.get_user(user_id)
    }

    /// Look up a User by exact username. Returns `None` when no match
    /// exists.
    pub fn find_by_username(&self, user_name: &str) -> ScimResult<Option<User>> {
        let filter = format!("{} eq \"{}\"", paths::USER_NAME, user_name);
        let mut users = self.client.query_users(Some(&filter), &BTreeSet::new())?;
        Ok(if users.is_empty() {
            None
        } else {
            Some(users.remove(0))
        })
    }

    /// List Users matching an optional filter.
    ///
    /// With a page size, the continuation cursor is `startIndex + returned`
    /// whenever the page came back full, and `None` otherwise; the rule is
    /// the same whether or not a filter is present. Without a page size the
    /// whole listing is fetched at once and no cursor is produced.
    pub fn list(
        &self,
        filter: Option<&str>,
        page: &PageRequest,
        attributes_to_get: &BTreeSet<String>,
    ) -> ScimResult<ListResult> {
        let Some(page_size) = page.page_size else {
            let users = self.client.query_users(filter, attributes_to_get)?;
            return Ok(ListResult {
                users,
                next_cursor: None,
            });
        };

        let start_index = match &page.cursor {
            Some(cursor) => cursor.parse::<u64>().map_err(|_| {
                ScimError::protocol(format!("Invalid pagination cursor '{cursor}'"))
            })?,
            None => 1,
        };

        let result = self
            .client
            .paged_users(filter, start_index, page_size, attributes_to_get)?;
        let returned = result.resources.len() as u64;
        let base = if result.start_index > 0 {
            result.start_index
        } else {
            start_index
        };
        let next_cursor = if returned >= page_size && returned > 0 {
            Some((base + returned).to_string())
        } else {
            None
        };
        Ok(ListResult {
            users: result.resources,
            next_cursor,
        })
    }

    /// Update the User `user_id` from flat attributes and return the
    /// identifier of the updated resource.
    pub fn update(&self, user_id: &str, attrs: &AttributeSet) -> ScimResult<String> {
        if attrs.is_empty() {
            return Err(ScimError::translation(
                paths::ID,
                "set of attributes is empty",
            ));
        }

        let mut user = User::default();
        translator::apply_attributes(&mut user, attrs);
        // the caller-supplied identifier is authoritative
        user.id = user_id.to_string();

        let updated = self.client.update_user(&user)?;
        Ok(if updated.id.is_empty() {
            user_id.to_string()
        } else {
            updated.id
        })
    }

    pub fn delete(&self, user_id: &str) -> ScimResult<()> {
        self.client.delete_user(user_id)
    }

    pub fn activate(&self, user_id: &str) -> ScimResult<()> {
        self.client.activate_user(user_id)
    }

    /// Connectivity probe against the configured service.
    pub fn test_service(&self) -> bool {
        match self.client.test_service() {
            Ok(()) => true,
            Err(e) => {
                warn!("Service probe failed: {e}");
                false
            }
        }
    }

    /// Every attribute name addressable through this facade: the static
    /// User surface plus the declared extension attributes.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names = translator::attribute_names();
        if let Some(schema) = self.client.extension_schema() {
            names.extend(schema.attributes.iter().map(|a| a.key()));
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_empty_attribute_set() {
        let ops =
            UserOps::new(ScimConfig::new("http://localhost/scim/v1", "admin", "pw")).unwrap();
        assert!(ops.create(&AttributeSet::new()).is_err());
    }

    #[test]
    fn test_create_requires_username() {
        let ops =
            UserOps::new(ScimConfig::new("http://localhost/scim/v1", "admin", "pw")).unwrap();
        let mut attrs = AttributeSet::new();
        attrs.set("title", "Engineer");
        assert!(matches!(
            ops.create(&attrs),
            Err(ScimError::Translation { .. })
        ));
    }

    #[test]
    fn test_attribute_names_include_extensions() {
        let mut config = ScimConfig::new("http://localhost/scim/v1", "admin", "pw");
        config.custom_attributes_json = Some(
            serde_json::json!({
                "attributes": [{
                    "name": "employeeNumber",
                    "type": "string",
                    "schema": "urn:scim:schemas:extension:enterprise:1.0"
                }]
            })
            .to_string(),
        );
        let ops = UserOps::new(config).unwrap();
        let names = ops.attribute_names();
        assert!(names.contains(&"userName".to_string()));
        assert!(
            names.contains(
                &"urn:scim:schemas:extension:enterprise:1.0.employeeNumber".to_string()
            )
        );
    }
}
