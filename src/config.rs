//! Client configuration.
//!
//! All knobs needed to talk to a SCIM 1.1 service: base address, credential
//! material for one of the two supported authentication modes, media types,
//! the update dispatch method and the optional extension-attribute schema
//! document. Validation fails fast at initialization; nothing here is
//! re-checked per call.

use crate::error::{ScimError, ScimResult};
use crate::extension::ExtensionSchema;
use secrecy::SecretString;
use std::str::FromStr;
use url::Url;

/// Default media type for request and response bodies.
pub const MEDIA_TYPE_JSON: &str = "application/json";

/// Default media type for the OAuth2 token request body.
pub const MEDIA_TYPE_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP verb used for update operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMethod {
    /// Full-replace update.
    Put,
    /// Partial update; the payload is built with the deep-merge builder.
    #[default]
    Patch,
}

impl FromStr for UpdateMethod {
    type Err = ScimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            other => Err(ScimError::configuration(format!(
                "Update method '{other}' is not valid; must be 'PUT' or 'PATCH'"
            ))),
        }
    }
}

/// Resource-owner-password OAuth2 parameters.
///
/// When this block is present the client requests a fresh bearer token for
/// every call instead of attaching basic credentials. Tokens are never
/// cached across calls.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Full URL of the token endpoint.
    pub access_token_base_address: String,
    /// JSON field of the token response holding the bearer token.
    pub access_token_node_id: String,
    /// Media type of the token request body.
    pub access_token_content_type: String,
}

impl OAuth2Config {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token_base_address: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            access_token_base_address: access_token_base_address.into(),
            access_token_node_id: "access_token".to_string(),
            access_token_content_type: MEDIA_TYPE_FORM_URLENCODED.to_string(),
        }
    }
}

/// SCIM client configuration.
///
/// Owned by the caller and handed to [`crate::client::ScimClient::new`],
/// which validates it once and treats it as immutable afterwards.
#[derive(Debug, Clone)]
pub struct ScimConfig {
    /// Base address of the SCIM service, e.g. `https://host/scim/v1/`.
    pub base_address: String,
    pub username: String,
    pub password: SecretString,
    /// Media type sent in the `Accept` header.
    pub accept: String,
    /// Media type sent in the `Content-Type` header.
    pub content_type: String,
    pub update_method: UpdateMethod,
    /// Present selects the OAuth2 authentication mode.
    pub oauth2: Option<OAuth2Config>,
    /// Extension-attribute schema document (JSON), if any.
    pub custom_attributes_json: Option<String>,
}

impl ScimConfig {
    pub fn new(
        base_address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_address: base_address.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            accept: MEDIA_TYPE_JSON.to_string(),
            content_type: MEDIA_TYPE_JSON.to_string(),
            update_method: UpdateMethod::default(),
            oauth2: None,
            custom_attributes_json: None,
        }
    }

    /// Validate the configuration and parse the extension schema, if any.
    ///
    /// Returns the parsed schema so the caller can keep it for the lifetime
    /// of the client; it is never re-parsed afterwards.
    pub fn validate(&self) -> ScimResult<Option<ExtensionSchema>> {
        if self.base_address.trim().is_empty() {
            return Err(ScimError::configuration(
                "Base address cannot be null or empty",
            ));
        }
        Url::parse(&self.base_address)
            .map_err(|e| ScimError::configuration(format!("Base address must be a valid URL: {e}")))?;
        if self.username.trim().is_empty() {
            return Err(ScimError::configuration("Username cannot be null or empty"));
        }

        match self.custom_attributes_json.as_deref() {
            Some(json) if !json.trim().is_empty() => ExtensionSchema::parse(json).map(Some),
            _ => Ok(None),
        }
    }

    /// Base address with a guaranteed trailing slash, so joining resource
    /// paths cannot drop the last path segment.
    pub(crate) fn normalized_base(&self) -> String {
        if self.base_address.ends_with('/') {
            self.base_address.clone()
        } else {
            format!("{}/", self.base_address)
        }
    }
}
