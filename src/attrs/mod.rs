//! Flat attribute model.
//!
//! Every field of a User is addressable by a dotted path: `<field>` for
//! simple fields, `name.<sub>` for the singular name object,
//! `<collection>.<canonicalType>.<sub>` for multi-valued complex entries
//! (e.g. `emails.home.value`) and `<schema URN>.<attribute>` for extension
//! attributes. The host framework additionally uses a few synthetic
//! operational names (`__PASSWORD__`, `__ENABLE__`, ...) which are mapped
//! here and never forwarded to the server.

pub mod projection;
pub mod translator;

use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known attribute names and dotted-path segments.
pub mod paths {
    pub const ID: &str = "id";
    pub const USER_NAME: &str = "userName";
    pub const ACTIVE: &str = "active";
    pub const PASSWORD: &str = "password";
    pub const SCHEMAS: &str = "schemas";
    pub const NAME: &str = "name";
    pub const META: &str = "meta";
    pub const EMAILS: &str = "emails";
    pub const PHONE_NUMBERS: &str = "phoneNumbers";
    pub const IMS: &str = "ims";
    pub const PHOTOS: &str = "photos";
    pub const ADDRESSES: &str = "addresses";
    pub const GROUPS: &str = "groups";
    pub const ROLES: &str = "roles";
    pub const ENTITLEMENTS: &str = "entitlements";
    pub const X509_CERTIFICATES: &str = "x509Certificates";

    /// Synthetic operational attribute carrying the write-only password.
    pub const OP_PASSWORD: &str = "__PASSWORD__";
    /// Synthetic operational attribute carrying the enable/disable state.
    pub const OP_ENABLE: &str = "__ENABLE__";
    /// Synthetic operational attribute aliasing the username.
    pub const OP_NAME: &str = "__NAME__";
    /// Synthetic operational attribute aliasing the identifier.
    pub const OP_UID: &str = "__UID__";
}

/// An ordered set of flat attributes, dotted path -> value list.
///
/// Insertion with an already-present name replaces the previous values,
/// which gives the canonical-type collision rule (last write wins per slot)
/// for free.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    attrs: BTreeMap<String, Vec<Value>>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Replace the value list of `name`.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.attrs.insert(name.into(), values);
    }

    /// Replace `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.insert(name, vec![value.into()]);
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.attrs.get(name).map(Vec::as_slice)
    }

    pub fn first(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name).and_then(|v| v.first())
    }

    /// First value of `name` rendered as a string, if present and non-null.
    pub fn first_string(&self, name: &str) -> Option<String> {
        match self.first(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// First value of `name` interpreted as a boolean. Accepts native
    /// booleans and their string renderings.
    pub fn first_bool(&self, name: &str) -> Option<bool> {
        match self.first(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Vec<Value>)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Value>)>>(iter: I) -> Self {
        Self {
            attrs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AttributeSet {
    type Item = (String, Vec<Value>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.into_iter()
    }
}
