//! Bidirectional translation between a User and the flat attribute set.
//!
//! The forward direction ([`to_attributes`]) emits one attribute per dotted
//! path actually holding a value; the reverse ([`apply_attributes`])
//! reconstructs or updates the resource from flat attributes, creating
//! collection entries keyed by canonical type on first sight and filling
//! their other sub-fields from subsequent attributes of the same call.
//!
//! Translation is driven by explicit field descriptor tables rather than
//! runtime introspection. A value that cannot be converted aborts only the
//! attribute it belongs to: it is logged and skipped, and the rest of the
//! translation proceeds.

use crate::attrs::{AttributeSet, paths};
use crate::resource::complex::{
    self, AddressType, CanonicalType, ComplexEntry, EmailType, ImType, PhoneType, PhotoType,
    ReferenceEntry,
};
use crate::resource::{Meta, Name, User};
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::Value;

/// Simple top-level string fields, identified by variant and addressed by
/// their wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleField {
    ExternalId,
    DisplayName,
    NickName,
    ProfileUrl,
    Title,
    UserType,
    PreferredLanguage,
    Locale,
    Timezone,
}

impl SimpleField {
    const ALL: [SimpleField; 9] = [
        SimpleField::ExternalId,
        SimpleField::DisplayName,
        SimpleField::NickName,
        SimpleField::ProfileUrl,
        SimpleField::Title,
        SimpleField::UserType,
        SimpleField::PreferredLanguage,
        SimpleField::Locale,
        SimpleField::Timezone,
    ];

    fn path(self) -> &'static str {
        match self {
            SimpleField::ExternalId => "externalId",
            SimpleField::DisplayName => "displayName",
            SimpleField::NickName => "nickName",
            SimpleField::ProfileUrl => "profileUrl",
            SimpleField::Title => "title",
            SimpleField::UserType => "userType",
            SimpleField::PreferredLanguage => "preferredLanguage",
            SimpleField::Locale => "locale",
            SimpleField::Timezone => "timezone",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.path() == path)
    }

    fn slot(self, user: &mut User) -> &mut Option<String> {
        match self {
            SimpleField::ExternalId => &mut user.external_id,
            SimpleField::DisplayName => &mut user.display_name,
            SimpleField::NickName => &mut user.nick_name,
            SimpleField::ProfileUrl => &mut user.profile_url,
            SimpleField::Title => &mut user.title,
            SimpleField::UserType => &mut user.user_type,
            SimpleField::PreferredLanguage => &mut user.preferred_language,
            SimpleField::Locale => &mut user.locale,
            SimpleField::Timezone => &mut user.timezone,
        }
    }

    fn get(self, user: &User) -> Option<&str> {
        let value = match self {
            SimpleField::ExternalId => &user.external_id,
            SimpleField::DisplayName => &user.display_name,
            SimpleField::NickName => &user.nick_name,
            SimpleField::ProfileUrl => &user.profile_url,
            SimpleField::Title => &user.title,
            SimpleField::UserType => &user.user_type,
            SimpleField::PreferredLanguage => &user.preferred_language,
            SimpleField::Locale => &user.locale,
            SimpleField::Timezone => &user.timezone,
        };
        value.as_deref()
    }
}

/// Sub-fields of the singular `name` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameField {
    Formatted,
    FamilyName,
    GivenName,
    MiddleName,
    HonorificPrefix,
    HonorificSuffix,
}

impl NameField {
    const ALL: [NameField; 6] = [
        NameField::Formatted,
        NameField::FamilyName,
        NameField::GivenName,
        NameField::MiddleName,
        NameField::HonorificPrefix,
        NameField::HonorificSuffix,
    ];

    fn path(self) -> &'static str {
        match self {
            NameField::Formatted => "name.formatted",
            NameField::FamilyName => "name.familyName",
            NameField::GivenName => "name.givenName",
            NameField::MiddleName => "name.middleName",
            NameField::HonorificPrefix => "name.honorificPrefix",
            NameField::HonorificSuffix => "name.honorificSuffix",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.path() == path)
    }

    fn slot(self, name: &mut Name) -> &mut Option<String> {
        match self {
            NameField::Formatted => &mut name.formatted,
            NameField::FamilyName => &mut name.family_name,
            NameField::GivenName => &mut name.given_name,
            NameField::MiddleName => &mut name.middle_name,
            NameField::HonorificPrefix => &mut name.honorific_prefix,
            NameField::HonorificSuffix => &mut name.honorific_suffix,
        }
    }

    fn get(self, name: &Name) -> Option<&str> {
        let value = match self {
            NameField::Formatted => &name.formatted,
            NameField::FamilyName => &name.family_name,
            NameField::GivenName => &name.given_name,
            NameField::MiddleName => &name.middle_name,
            NameField::HonorificPrefix => &name.honorific_prefix,
            NameField::HonorificSuffix => &name.honorific_suffix,
        };
        value.as_deref()
    }
}

/// Enumerate every addressable dotted path of the static User surface:
/// simple fields, name sub-fields, metadata, each complex collection crossed
/// with its canonical types and sub-fields, and the reference collections.
pub fn attribute_names() -> Vec<String> {
    let mut names: Vec<String> = vec![
        paths::ID.to_string(),
        paths::USER_NAME.to_string(),
        paths::ACTIVE.to_string(),
        paths::SCHEMAS.to_string(),
    ];
    names.extend(SimpleField::ALL.iter().map(|f| f.path().to_string()));
    names.extend(NameField::ALL.iter().map(|f| f.path().to_string()));
    names.extend(
        ["created", "lastModified", "location", "version", "attributes"]
            .iter()
            .map(|sub| format!("meta.{sub}")),
    );

    push_complex_names::<EmailType>(&mut names, paths::EMAILS);
    push_complex_names::<PhoneType>(&mut names, paths::PHONE_NUMBERS);
    push_complex_names::<ImType>(&mut names, paths::IMS);
    push_complex_names::<PhotoType>(&mut names, paths::PHOTOS);
    push_complex_names::<AddressType>(&mut names, paths::ADDRESSES);

    for collection in [
        paths::GROUPS,
        paths::ROLES,
        paths::ENTITLEMENTS,
        paths::X509_CERTIFICATES,
    ] {
        names.push(format!("{collection}.{}.value", complex::DEFAULT_TYPE));
    }
    names
}

fn push_complex_names<T: CanonicalType>(names: &mut Vec<String>, collection: &str) {
    for canonical in T::all() {
        let base = format!("{collection}.{}", canonical.as_canonical());
        for sub in ["value", "display", "primary", "operation"] {
            names.push(format!("{base}.{sub}"));
        }
    }
}

/// Convert a User into the flat attribute set handed back to the caller.
///
/// Empty and absent values are omitted entirely. The password never appears
/// in the output. Extension values previously extracted from a response are
/// included under their `<schema URN>.<name>` keys.
pub fn to_attributes(user: &User) -> AttributeSet {
    let mut set = AttributeSet::new();

    if !user.id.is_empty() {
        set.set(paths::ID, user.id.clone());
    }
    if !user.user_name.is_empty() {
        set.set(paths::USER_NAME, user.user_name.clone());
    }
    if !user.schemas.is_empty() {
        set.insert(
            paths::SCHEMAS,
            user.schemas.iter().cloned().map(Value::from).collect(),
        );
    }
    if let Some(active) = user.active {
        set.set(paths::ACTIVE, active);
    }
    for field in SimpleField::ALL {
        if let Some(value) = field.get(user) {
            set.set(field.path(), value);
        }
    }
    for field in NameField::ALL {
        if let Some(value) = field.get(&user.name) {
            set.set(field.path(), value);
        }
    }

    emit_meta(&mut set, &user.meta);

    emit_complex(&mut set, paths::EMAILS, &user.emails);
    emit_complex(&mut set, paths::PHONE_NUMBERS, &user.phone_numbers);
    emit_complex(&mut set, paths::IMS, &user.ims);
    emit_complex(&mut set, paths::PHOTOS, &user.photos);
    emit_complex(&mut set, paths::ADDRESSES, &user.addresses);

    emit_references(&mut set, paths::GROUPS, &user.groups);
    emit_references(&mut set, paths::ROLES, &user.roles);
    emit_references(&mut set, paths::ENTITLEMENTS, &user.entitlements);
    emit_references(&mut set, paths::X509_CERTIFICATES, &user.x509_certificates);

    for (key, values) in &user.returned_extensions {
        set.insert(key.clone(), values.clone());
    }

    set
}

fn emit_meta(set: &mut AttributeSet, meta: &Meta) {
    if let Some(created) = meta.created {
        set.set("meta.created", created.to_rfc3339());
    }
    if let Some(modified) = meta.last_modified {
        set.set("meta.lastModified", modified.to_rfc3339());
    }
    if let Some(location) = &meta.location {
        set.set("meta.location", location.clone());
    }
    if let Some(version) = &meta.version {
        set.set("meta.version", version.clone());
    }
    if !meta.attributes.is_empty() {
        set.insert(
            "meta.attributes",
            meta.attributes.iter().cloned().map(Value::from).collect(),
        );
    }
}

fn emit_complex<T: CanonicalType>(
    set: &mut AttributeSet,
    collection: &str,
    entries: &[ComplexEntry<T>],
) {
    for entry in entries {
        // entries that arrived without a recognized canonical type have no
        // dotted-path address
        let Some(entry_type) = entry.entry_type else {
            continue;
        };
        let base = format!("{collection}.{}", entry_type.as_canonical());
        if let Some(value) = &entry.value {
            set.set(format!("{base}.value"), value.clone());
        }
        if let Some(display) = &entry.display {
            set.set(format!("{base}.display"), display.clone());
        }
        set.set(format!("{base}.primary"), entry.primary);
        if let Some(operation) = &entry.operation {
            set.set(format!("{base}.operation"), operation.clone());
        }
    }
}

fn emit_references(set: &mut AttributeSet, collection: &str, entries: &[ReferenceEntry]) {
    let values: Vec<Value> = entries
        .iter()
        .filter_map(|e| e.value.clone())
        .map(Value::from)
        .collect();
    if !values.is_empty() {
        set.insert(format!("{collection}.{}.value", complex::DEFAULT_TYPE), values);
    }
}

/// Apply a flat attribute set to a User, reconstructing or updating its
/// fields.
///
/// Collection entries are keyed by canonical type: the first attribute seen
/// for `emails.work.*` creates the `work` entry, later attributes fill in
/// its remaining sub-fields, and an incoming `operation` value tags the
/// entry for deletion. Attributes that cannot be interpreted are logged and
/// skipped without affecting the rest of the set.
pub fn apply_attributes(user: &mut User, attrs: &AttributeSet) {
    for (name, values) in attrs.iter() {
        apply_one(user, name, values, attrs);
    }
}

fn apply_one(user: &mut User, name: &str, values: &[Value], attrs: &AttributeSet) {
    match name {
        paths::ID | paths::OP_UID => {
            if let Some(id) = attrs.first_string(name) {
                user.id = id;
            }
        }
        paths::USER_NAME | paths::OP_NAME => {
            if let Some(user_name) = attrs.first_string(name) {
                user.user_name = user_name;
            }
        }
        paths::OP_PASSWORD | paths::PASSWORD => {
            if let Some(password) = attrs.first_string(name) {
                user.set_password(password);
            }
        }
        // a missing or empty value leaves the active flag untouched
        paths::ACTIVE | paths::OP_ENABLE => {
            if let Some(active) = attrs.first_bool(name) {
                user.active = Some(active);
            } else if !values.is_empty() {
                warn!("Attribute '{name}' is not a boolean, skipping");
            }
        }
        paths::SCHEMAS => {
            let schemas: Vec<String> = values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if !schemas.is_empty() {
                user.schemas = schemas;
            }
        }
        _ => apply_dotted(user, name, values, attrs),
    }
}

fn apply_dotted(user: &mut User, name: &str, values: &[Value], attrs: &AttributeSet) {
    if let Some(field) = SimpleField::from_path(name) {
        *field.slot(user) = attrs.first_string(name);
        return;
    }
    if let Some(field) = NameField::from_path(name) {
        *field.slot(&mut user.name) = attrs.first_string(name);
        return;
    }
    if let Some(sub) = name.strip_prefix("meta.") {
        apply_meta(&mut user.meta, name, sub, values, attrs);
        return;
    }

    let mut segments = name.splitn(3, '.');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(paths::EMAILS), Some(canonical), Some(sub)) => {
            apply_complex(&mut user.emails, name, canonical, sub, attrs);
        }
        (Some(paths::PHONE_NUMBERS), Some(canonical), Some(sub)) => {
            apply_complex(&mut user.phone_numbers, name, canonical, sub, attrs);
        }
        (Some(paths::IMS), Some(canonical), Some(sub)) => {
            apply_complex(&mut user.ims, name, canonical, sub, attrs);
        }
        (Some(paths::PHOTOS), Some(canonical), Some(sub)) => {
            apply_complex(&mut user.photos, name, canonical, sub, attrs);
        }
        (Some(paths::ADDRESSES), Some(canonical), Some(sub)) => {
            apply_complex(&mut user.addresses, name, canonical, sub, attrs);
        }
        (
            Some(
                collection @ (paths::GROUPS
                | paths::ROLES
                | paths::ENTITLEMENTS
                | paths::X509_CERTIFICATES),
            ),
            rest,
            sub,
        ) => {
            if rest == Some(complex::DEFAULT_TYPE) && sub == Some("value") {
                let entries = values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(ReferenceEntry::new)
                    .collect();
                match collection {
                    paths::GROUPS => user.groups = entries,
                    paths::ROLES => user.roles = entries,
                    paths::ENTITLEMENTS => user.entitlements = entries,
                    _ => user.x509_certificates = entries,
                }
            } else {
                warn!("Unsupported sub-path for attribute '{name}', skipping");
            }
        }
        _ if name.contains(':') && name.contains('.') => {
            // extension attribute, addressed by its owning schema URN
            user.extension_values
                .insert(name.to_string(), values.to_vec());
        }
        _ => warn!("Unknown attribute '{name}', skipping"),
    }
}

fn apply_meta(meta: &mut Meta, name: &str, sub: &str, values: &[Value], attrs: &AttributeSet) {
    match sub {
        "created" => meta.created = parse_timestamp(name, attrs),
        "lastModified" => meta.last_modified = parse_timestamp(name, attrs),
        "location" => meta.location = attrs.first_string(name),
        "version" => meta.version = attrs.first_string(name),
        "attributes" => {
            meta.attributes = values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
        _ => warn!("Unknown metadata attribute '{name}', skipping"),
    }
}

fn parse_timestamp(name: &str, attrs: &AttributeSet) -> Option<DateTime<Utc>> {
    let raw = attrs.first_string(name)?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!("Attribute '{name}' holds an invalid timestamp '{raw}': {e}");
            None
        }
    }
}

fn apply_complex<T: CanonicalType>(
    entries: &mut Vec<ComplexEntry<T>>,
    name: &str,
    canonical: &str,
    sub: &str,
    attrs: &AttributeSet,
) {
    let Some(entry_type) = T::parse_canonical(canonical) else {
        warn!("Unknown canonical type in attribute '{name}', skipping");
        return;
    };

    let entry = match entries.iter().position(|e| e.entry_type == Some(entry_type)) {
        Some(i) => &mut entries[i],
        None => {
            entries.push(ComplexEntry::new(entry_type));
            let last = entries.len() - 1;
            &mut entries[last]
        }
    };

    match sub {
        "value" => entry.value = attrs.first_string(name),
        "display" => entry.display = attrs.first_string(name),
        "primary" => entry.primary = attrs.first_bool(name).unwrap_or(false),
        "operation" => entry.operation = attrs.first_string(name),
        _ => warn!("Unknown sub-field in attribute '{name}', skipping"),
    }
}

impl User {
    /// Flatten this resource into the dotted-path attribute set.
    pub fn to_attributes(&self) -> AttributeSet {
        to_attributes(self)
    }

    /// Apply flat attributes to this resource.
    pub fn apply_attributes(&mut self, attrs: &AttributeSet) {
        apply_attributes(self, attrs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::complex::{EmailType, PhoneType};
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn sample_user() -> User {
        let mut user = User::new("bjensen");
        user.id = "123".to_string();
        user.display_name = Some("Barbara Jensen".to_string());
        user.name.family_name = Some("Jensen".to_string());
        user.name.given_name = Some("Barbara".to_string());
        user.active = Some(true);
        let mut email = ComplexEntry::with_value(EmailType::Work, "bjensen@example.com");
        email.primary = true;
        user.emails.push(email);
        user.phone_numbers
            .push(ComplexEntry::with_value(PhoneType::Mobile, "555-1234"));
        user.groups.push(ReferenceEntry::new("admins"));
        user.groups.push(ReferenceEntry::new("staff"));
        user
    }

    #[test]
    fn test_round_trip_reconstructs_all_fields() {
        let user = sample_user();
        let attrs = to_attributes(&user);

        let mut rebuilt = User::default();
        apply_attributes(&mut rebuilt, &attrs);

        assert_eq!(rebuilt.id, user.id);
        assert_eq!(rebuilt.user_name, user.user_name);
        assert_eq!(rebuilt.display_name, user.display_name);
        assert_eq!(rebuilt.name, user.name);
        assert_eq!(rebuilt.active, user.active);
        assert_eq!(rebuilt.emails, user.emails);
        assert_eq!(rebuilt.phone_numbers, user.phone_numbers);
        assert_eq!(rebuilt.groups, user.groups);
        assert_eq!(rebuilt.schemas, user.schemas);
    }

    #[test]
    fn test_password_never_emitted() {
        let mut user = sample_user();
        user.set_password("s3cret");
        let attrs = to_attributes(&user);
        assert!(attrs.names().all(|n| !n.to_lowercase().contains("password")));
    }

    #[test]
    fn test_same_canonical_type_last_write_wins() {
        let mut user = User::new("u1");
        user.emails
            .push(ComplexEntry::with_value(EmailType::Home, "first@x.com"));
        user.emails
            .push(ComplexEntry::with_value(EmailType::Home, "second@x.com"));

        let attrs = to_attributes(&user);
        assert_eq!(
            attrs.first_string("emails.home.value").as_deref(),
            Some("second@x.com")
        );
        // exactly one slot per (type x sub-field)
        assert_eq!(attrs.names().filter(|n| *n == "emails.home.value").count(), 1);
    }

    #[test]
    fn test_apply_creates_then_fills_entry() {
        let mut user = User::default();
        let mut attrs = AttributeSet::new();
        attrs.set("emails.work.value", "w@x.com");
        attrs.set("emails.work.primary", true);
        apply_attributes(&mut user, &attrs);

        assert_eq!(user.emails.len(), 1);
        let entry = &user.emails[0];
        assert_eq!(entry.entry_type, Some(EmailType::Work));
        assert_eq!(entry.value.as_deref(), Some("w@x.com"));
        assert!(entry.primary);
    }

    #[test]
    fn test_slotless_entries_are_not_emitted() {
        let mut user = User::new("u1");
        let mut entry = ComplexEntry::with_value(EmailType::Work, "x@x.com");
        entry.entry_type = None;
        user.emails.push(entry);

        let attrs = to_attributes(&user);
        assert!(attrs.names().all(|n| !n.starts_with("emails.")));
    }

    #[test]
    fn test_apply_operation_tags_entry_for_deletion() {
        let mut user = User::default();
        let mut attrs = AttributeSet::new();
        attrs.set("emails.home.value", "u1@x.com");
        attrs.set("emails.home.primary", true);
        attrs.set("emails.home.operation", "delete");
        apply_attributes(&mut user, &attrs);

        assert_eq!(user.emails.len(), 1);
        assert!(user.emails[0].is_deleted());
        assert_eq!(user.emails[0].value.as_deref(), Some("u1@x.com"));
    }

    #[test]
    fn test_apply_password_and_enable() {
        let mut user = User::default();
        let mut attrs = AttributeSet::new();
        attrs.set(paths::OP_PASSWORD, "s3cret");
        attrs.set(paths::OP_ENABLE, "false");
        apply_attributes(&mut user, &attrs);

        assert_eq!(
            user.password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("s3cret".to_string())
        );
        assert_eq!(user.active, Some(false));
    }

    #[test]
    fn test_empty_enable_leaves_active_untouched() {
        let mut user = User::default();
        user.active = Some(true);
        let mut attrs = AttributeSet::new();
        attrs.insert(paths::OP_ENABLE, vec![]);
        apply_attributes(&mut user, &attrs);
        assert_eq!(user.active, Some(true));
    }

    #[test]
    fn test_unknown_attribute_does_not_abort_translation() {
        let mut user = User::default();
        let mut attrs = AttributeSet::new();
        attrs.set("emails.office.value", "x@x.com"); // bad canonical type
        attrs.set("noSuchField", "ignored");
        attrs.set("title", "Engineer");
        apply_attributes(&mut user, &attrs);

        assert!(user.emails.is_empty());
        assert_eq!(user.title.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_extension_attributes_routed_to_extension_values() {
        let mut user = User::default();
        let mut attrs = AttributeSet::new();
        attrs.set("urn:scim:schemas:extension:enterprise:1.0.employeeNumber", "701984");
        apply_attributes(&mut user, &attrs);

        assert_eq!(
            user.extension_values
                .get("urn:scim:schemas:extension:enterprise:1.0.employeeNumber"),
            Some(&vec![json!("701984")])
        );
    }

    #[test]
    fn test_attribute_names_cover_the_static_surface() {
        let names = attribute_names();
        for expected in [
            "userName",
            "name.familyName",
            "meta.lastModified",
            "emails.home.value",
            "phoneNumbers.pager.operation",
            "groups.default.value",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(names.iter().all(|n| !n.contains("__")));
    }

    #[test]
    fn test_meta_round_trip() {
        let mut user = User::default();
        user.meta.created = Some("2011-08-01T18:29:49Z".parse().unwrap());
        user.meta.version = Some("W/\"1\"".to_string());
        let attrs = to_attributes(&user);

        let mut rebuilt = User::default();
        apply_attributes(&mut rebuilt, &attrs);
        assert_eq!(rebuilt.meta, user.meta);
    }
}
