//! Attribute projection for search requests.
//!
//! The server's `attributes` query parameter only understands top-level
//! field names, so a requested set of dotted attribute names has to be
//! reduced before it is sent. Operational attributes, metadata,
//! entitlements and anything password-like are never requested; the
//! correlation keys (`userName`, `id`, `name`) always are.

use crate::attrs::paths;
use crate::extension::ExtensionSchema;
use std::collections::BTreeSet;

/// Projection used when the caller requests nothing specific.
pub const DEFAULT_ATTRIBUTES_TO_GET: &[&str] = &[paths::ID, paths::USER_NAME, paths::NAME];

/// Collections whose dotted attributes reduce to the bare collection name.
const TOP_LEVEL_PREFIXES: &[&str] = &[
    paths::NAME,
    paths::ADDRESSES,
    paths::PHONE_NUMBERS,
    paths::IMS,
    paths::EMAILS,
    paths::ROLES,
    paths::GROUPS,
    paths::PHOTOS,
    paths::X509_CERTIFICATES,
];

/// Reduce a requested attribute set to the top-level names the server
/// understands.
///
/// Dropped entirely: names containing the operational marker `__`, the
/// `meta.` and `entitlements.` namespaces, and anything matching a
/// case-insensitive `password` substring. Unknown names pass through
/// verbatim unless they are covered by a declared extension attribute;
/// declared extension attribute names are always appended, as are the
/// correlation keys. An empty request falls back to the default projection.
pub fn clean_attributes_to_get(
    requested: &BTreeSet<String>,
    schema: Option<&ExtensionSchema>,
) -> BTreeSet<String> {
    if requested.is_empty() {
        return DEFAULT_ATTRIBUTES_TO_GET
            .iter()
            .map(|s| s.to_string())
            .collect();
    }

    let mut result = BTreeSet::new();
    for attribute in requested {
        if attribute.contains("__")
            || attribute.contains("meta.")
            || attribute.contains("entitlements.")
            || attribute.to_lowercase().contains("password")
        {
            continue;
        }

        match TOP_LEVEL_PREFIXES
            .iter()
            .find(|prefix| has_prefix(attribute, prefix))
        {
            Some(prefix) => {
                result.insert(prefix.to_string());
            }
            None => {
                let declared = schema.is_some_and(|s| s.is_declared(attribute));
                if !declared {
                    result.insert(attribute.clone());
                }
            }
        }
    }

    if let Some(schema) = schema {
        for name in schema.declared_names() {
            result.insert(name.to_string());
        }
    }
    for key in [paths::USER_NAME, paths::ID, paths::NAME] {
        result.insert(key.to_string());
    }

    result
}

fn has_prefix(attribute: &str, prefix: &str) -> bool {
    attribute
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('.'))
}
