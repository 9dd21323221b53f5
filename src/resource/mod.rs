//! SCIM 1.1 User resource model.
//!
//! Wire-shaped types for the User resource and its sub-objects: the singular
//! `name` object, the read-only `meta` block, complex multi-valued entries
//! with canonical type discriminators, value-only reference entries and the
//! paged list envelope.
//!
//! Serialization follows the protocol's sparseness rules: empty or absent
//! values are omitted entirely, never emitted as `null` or `[]`. The
//! password is write-only and is dropped when deserializing responses.

pub mod complex;
pub mod meta;
pub mod page;
pub mod user;

pub use complex::{
    AddressType, CanonicalType, ComplexEntry, EmailType, ImType, PhoneType, PhotoType,
    ReferenceEntry,
};
pub use meta::Meta;
pub use page::PagedResults;
pub use user::{Name, SCIM_CORE_SCHEMA, User};
