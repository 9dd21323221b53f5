//! The User resource.

use crate::resource::complex::{
    AddressType, ComplexEntry, EmailType, ImType, PhoneType, PhotoType, ReferenceEntry,
};
use crate::resource::meta::Meta;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema URN every core User declares.
pub const SCIM_CORE_SCHEMA: &str = "urn:scim:schemas:core:1.0";

/// Singular `name` sub-object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honorific_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honorific_suffix: Option<String>,
}

impl Name {
    pub fn is_empty(&self) -> bool {
        self.formatted.is_none()
            && self.family_name.is_none()
            && self.given_name.is_none()
            && self.middle_name.is_none()
            && self.honorific_prefix.is_none()
            && self.honorific_suffix.is_none()
    }
}

/// SCIM 1.1 User.
///
/// The identifier is empty until the create operation completes; the
/// username is immutable once a create response has been received and the
/// identifier is the only correlation key thereafter.
///
/// The password is write-only: it is carried in a protected container,
/// exposed only while serializing an outgoing payload, and never populated
/// from responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_password",
        skip_deserializing
    )]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Name::is_empty")]
    pub name: Name,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ComplexEntry<EmailType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<ComplexEntry<PhoneType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ims: Vec<ComplexEntry<ImType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<ComplexEntry<PhotoType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<ComplexEntry<AddressType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ReferenceEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<ReferenceEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entitlements: Vec<ReferenceEntry>,
    #[serde(rename = "x509Certificates", skip_serializing_if = "Vec::is_empty")]
    pub x509_certificates: Vec<ReferenceEntry>,
    #[serde(skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    /// Write-side extension values, keyed `<schema URN>.<attribute name>`.
    /// Consumed by the extension engine when building outgoing payloads;
    /// never serialized directly.
    #[serde(skip)]
    pub extension_values: BTreeMap<String, Vec<Value>>,
    /// Read-side extension values extracted from responses, keyed
    /// `<schema URN>.<attribute name>`.
    #[serde(skip)]
    pub returned_extensions: BTreeMap<String, Vec<Value>>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            schemas: vec![SCIM_CORE_SCHEMA.to_string()],
            id: String::new(),
            external_id: None,
            user_name: String::new(),
            password: None,
            name: Name::default(),
            display_name: None,
            nick_name: None,
            profile_url: None,
            title: None,
            user_type: None,
            preferred_language: None,
            locale: None,
            timezone: None,
            active: None,
            emails: Vec::new(),
            phone_numbers: Vec::new(),
            ims: Vec::new(),
            photos: Vec::new(),
            addresses: Vec::new(),
            groups: Vec::new(),
            roles: Vec::new(),
            entitlements: Vec::new(),
            x509_certificates: Vec::new(),
            meta: Meta::default(),
            extension_values: BTreeMap::new(),
            returned_extensions: BTreeMap::new(),
        }
    }
}

impl User {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ..Self::default()
        }
    }

    /// Set the write-only password.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(SecretString::from(password.into()));
    }
}

fn expose_password<S: Serializer>(
    password: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match password {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}
