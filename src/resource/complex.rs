//! Complex multi-valued attribute entries and their canonical types.
//!
//! Each multi-valued collection on the User carries entries discriminated by
//! a canonical `type` value drawn from a fixed enumeration per attribute
//! kind. The canonical type doubles as the addressing key in the flat
//! attribute namespace (`emails.home.value`), so the enumerations here are
//! the single source of truth for both the wire format and the dotted paths.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Common interface over the canonical type enumerations, used by the
/// attribute translator to address entries generically.
pub trait CanonicalType: Copy + Eq + 'static {
    fn parse_canonical(s: &str) -> Option<Self>;
    fn as_canonical(self) -> &'static str;
    fn all() -> &'static [Self];
}

macro_rules! canonical_type {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $canonical:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $canonical)] $variant,)+
        }

        impl $name {
            /// All canonical values, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical string as it appears on the wire and in
            /// dotted attribute paths.
            pub fn canonical(self) -> &'static str {
                match self {
                    $($name::$variant => $canonical),+
                }
            }

            /// Parse a canonical string back to the discriminator.
            pub fn from_canonical(s: &str) -> Option<Self> {
                match s {
                    $($canonical => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl CanonicalType for $name {
            fn parse_canonical(s: &str) -> Option<Self> {
                Self::from_canonical(s)
            }

            fn as_canonical(self) -> &'static str {
                self.canonical()
            }

            fn all() -> &'static [Self] {
                Self::ALL
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.canonical())
            }
        }
    };
}

canonical_type! {
    /// Canonical types for `emails` entries.
    EmailType {
        Work => "work",
        Home => "home",
        Other => "other",
    }
}

canonical_type! {
    /// Canonical types for `phoneNumbers` entries.
    PhoneType {
        Work => "work",
        Home => "home",
        Mobile => "mobile",
        Fax => "fax",
        Pager => "pager",
        Other => "other",
    }
}

canonical_type! {
    /// Canonical types for `ims` entries.
    ImType {
        Aim => "aim",
        Gtalk => "gtalk",
        Icq => "icq",
        Xmpp => "xmpp",
        Msn => "msn",
        Skype => "skype",
        Qq => "qq",
        Yahoo => "yahoo",
    }
}

canonical_type! {
    /// Canonical types for `photos` entries.
    PhotoType {
        Photo => "photo",
        Thumbnail => "thumbnail",
    }
}

canonical_type! {
    /// Canonical types for `addresses` entries.
    AddressType {
        Work => "work",
        Home => "home",
        Other => "other",
    }
}

/// Operation tag signalling removal of an entry on update requests.
pub const OPERATION_DELETE: &str = "delete";

/// One entry of a complex multi-valued attribute (email, phone number, ...).
///
/// `display` is read-only: it is populated from responses but never sent
/// back to the server. `operation` is only meaningful on update requests; a
/// `"delete"` entry asks the server to remove the stored entry whose value
/// and primary flag match exactly. The client does not verify that match
/// locally.
///
/// The `type` discriminator is lenient on the wire: a response entry with a
/// missing or out-of-set canonical type is still carried, it just has no
/// canonical slot and therefore no dotted-path address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: CanonicalType"))]
pub struct ComplexEntry<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing)]
    pub display: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_canonical",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_type: Option<T>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Read a canonical type without failing the surrounding resource: an
/// unrecognized value is logged and yields `None`.
fn lenient_canonical<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: CanonicalType,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = match &raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let parsed = T::parse_canonical(&text);
    if parsed.is_none() {
        warn!("Unknown canonical type '{text}' in response entry, kept without a canonical slot");
    }
    Ok(parsed)
}

impl<T> ComplexEntry<T> {
    pub fn new(entry_type: T) -> Self {
        Self {
            value: None,
            display: None,
            entry_type: Some(entry_type),
            primary: false,
            operation: None,
        }
    }

    pub fn with_value(entry_type: T, value: impl Into<String>) -> Self {
        let mut entry = Self::new(entry_type);
        entry.value = Some(value.into());
        entry
    }

    /// Tag this entry for removal on the next update request.
    pub fn mark_deleted(&mut self) {
        self.operation = Some(OPERATION_DELETE.to_string());
    }

    pub fn is_deleted(&self) -> bool {
        self.operation.as_deref() == Some(OPERATION_DELETE)
    }
}

/// One entry of a value-only reference collection (groups, roles,
/// entitlements, certificates).
///
/// These collections carry no canonical type discriminator; in the flat
/// attribute namespace they are addressed under the synthetic type
/// `default` (`groups.default.value`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing)]
    pub display: Option<String>,
}

impl ReferenceEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            display: None,
        }
    }
}

/// Synthetic canonical type under which reference entries are addressed.
pub const DEFAULT_TYPE: &str = "default";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_round_trip() {
        for t in EmailType::ALL {
            assert_eq!(EmailType::from_canonical(t.canonical()), Some(*t));
        }
        assert_eq!(EmailType::from_canonical("office"), None);
        assert_eq!(PhoneType::Mobile.canonical(), "mobile");
    }

    #[test]
    fn test_entry_serialization_is_sparse() {
        let entry = ComplexEntry::with_value(EmailType::Home, "u1@x.com");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"value": "u1@x.com", "type": "home", "primary": false})
        );
    }

    #[test]
    fn test_display_never_serialized() {
        let mut entry = ComplexEntry::with_value(EmailType::Work, "w@x.com");
        entry.display = Some("Work mail".to_string());
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("display").is_none());
    }

    #[test]
    fn test_display_populated_on_read() {
        let entry: ComplexEntry<EmailType> = serde_json::from_value(json!({
            "value": "w@x.com", "display": "Work mail", "type": "work", "primary": true
        }))
        .unwrap();
        assert_eq!(entry.display.as_deref(), Some("Work mail"));
        assert!(entry.primary);
    }

    #[test]
    fn test_unknown_type_reads_without_canonical_slot() {
        let entry: ComplexEntry<EmailType> = serde_json::from_value(json!({
            "value": "b@x.com", "type": "office"
        }))
        .unwrap();
        assert_eq!(entry.entry_type, None);
        assert_eq!(entry.value.as_deref(), Some("b@x.com"));
    }

    #[test]
    fn test_missing_type_reads_without_canonical_slot() {
        let entry: ComplexEntry<PhoneType> = serde_json::from_value(json!({
            "value": "555-1234", "primary": true
        }))
        .unwrap();
        assert_eq!(entry.entry_type, None);
        assert!(entry.primary);
    }

    #[test]
    fn test_delete_tagging() {
        let mut entry = ComplexEntry::with_value(EmailType::Home, "u1@x.com");
        entry.primary = true;
        entry.mark_deleted();
        assert!(entry.is_deleted());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["operation"], "delete");
        assert_eq!(value["primary"], true);
    }
}
