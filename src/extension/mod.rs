//! Schema-driven extension attribute engine.
//!
//! Attributes not covered by the static User fields are declared in an
//! externally supplied schema document (JSON). The parsed descriptor tree is
//! built once per configuration, treated as read-only afterwards, and drives
//! both directions: building the JSON fragment merged into outgoing payloads
//! and extracting extension values from raw responses.

use crate::error::{ScimError, ScimResult};
use crate::resource::User;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker identifying extension namespaces. Attributes whose owning schema
/// URN carries this marker are nested one level under the URN key in the
/// payload; all others land at the payload root.
pub const SCIM_SCHEMA_EXTENSION: &str = "urn:scim:schemas:extension";

/// JSON type tag of a schema attribute descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    #[default]
    String,
    Boolean,
    Decimal,
    Integer,
    DateTime,
    Binary,
    Reference,
    Complex,
}

/// One attribute descriptor from the extension schema document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub multi_valued: bool,
    pub multi_valued_attribute_child_name: Option<String>,
    pub description: Option<String>,
    /// Owning schema URN.
    pub schema: String,
    pub read_only: bool,
    pub required: bool,
    pub case_exact: bool,
    pub canonical_values: Vec<String>,
    /// Sub-descriptors; must be enumerated for `complex` attributes.
    pub sub_attributes: Vec<ExtensionAttribute>,
}

impl ExtensionAttribute {
    /// Dotted key of this attribute in the extension maps and in the flat
    /// attribute namespace: `<schema URN>.<name>`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Parsed extension schema: an immutable descriptor tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtensionSchema {
    pub attributes: Vec<ExtensionAttribute>,
}

impl ExtensionSchema {
    /// Parse a schema document. Failure is a configuration error.
    pub fn parse(json: &str) -> ScimResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ScimError::configuration(format!(
                "Extension schema must be a valid resource schema representation: {e}"
            ))
        })
    }

    /// Names of the declared top-level attributes, as sent in the
    /// `attributes` query parameter.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    /// Whether `dotted` names a declared attribute (`<URN>.<name>`).
    pub fn is_declared(&self, dotted: &str) -> bool {
        self.attributes.iter().any(|a| a.key() == dotted)
    }

    /// Visit every leaf descriptor with its effective owning schema URN.
    ///
    /// Complex attributes contribute their sub-descriptors as independent
    /// leaves; complex nesting below one level is not supported, those
    /// values are dropped with a warning.
    fn for_each_leaf<'a>(&'a self, mut visit: impl FnMut(&'a ExtensionAttribute, &'a str)) {
        for attr in &self.attributes {
            if attr.attr_type == AttributeType::Complex {
                for sub in &attr.sub_attributes {
                    if sub.attr_type == AttributeType::Complex {
                        warn!(
                            "Nested complex attribute '{}' under '{}' is not supported, \
                             value dropped",
                            sub.name, attr.name
                        );
                        continue;
                    }
                    let schema = if sub.schema.is_empty() {
                        attr.schema.as_str()
                    } else {
                        sub.schema.as_str()
                    };
                    visit(sub, schema);
                }
            } else {
                visit(attr, attr.schema.as_str());
            }
        }
    }

    /// Build the JSON fragment carrying the user's extension values, to be
    /// deep-merged into the outgoing payload. Returns `None` when the user
    /// holds no value for any declared attribute.
    pub fn build_fragment(&self, user: &User) -> Option<Value> {
        let mut root = Map::new();

        self.for_each_leaf(|attr, schema| {
            let key = format!("{}.{}", schema, attr.name);
            let Some(values) = user.extension_values.get(&key) else {
                return;
            };
            let Some(first) = values.first() else {
                return;
            };
            // multi-valued leaves carry the full list, single-valued ones
            // only the first value
            let payload = if attr.multi_valued {
                Value::Array(values.clone())
            } else {
                first.clone()
            };

            if schema.contains(SCIM_SCHEMA_EXTENSION) {
                let nested = root
                    .entry(schema.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(nested_map) = nested {
                    nested_map.insert(attr.name.clone(), payload);
                }
            } else {
                root.insert(attr.name.clone(), payload);
            }
        });

        if root.is_empty() {
            None
        } else {
            Some(Value::Object(root))
        }
    }

    /// Extract declared extension values from a raw response into the
    /// user's read-side extension map, keyed `<URN>.<name>`. Absent
    /// attributes are simply not populated.
    pub fn read_into(&self, user: &mut User, node: &Value) {
        self.for_each_leaf(|attr, schema| {
            let Some(owner) = find_by_key(node, schema) else {
                return;
            };
            let Some(value) = owner.get(&attr.name) else {
                return;
            };
            let values = match value {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            };
            user.returned_extensions
                .insert(format!("{}.{}", schema, attr.name), values);
        });
    }
}

/// Depth-first search for the first JSON value reachable under `key`.
fn find_by_key<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_by_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_by_key(v, key)),
        _ => None,
    }
}
