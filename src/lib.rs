//! Client adapter for SCIM 1.1 User provisioning.
//!
//! This crate connects provisioning frameworks that speak in flat attribute
//! sets to a SCIM 1.1 service speaking nested JSON. It provides:
//!
//! - a typed [`User`] resource model with complex multi-valued attributes,
//!   canonical-type addressing and schema-declared extension attributes
//! - a bidirectional translator between the resource model and a flat
//!   dotted-path attribute namespace ([`attrs`])
//! - a synchronous HTTP client ([`ScimClient`]) for single and paged
//!   retrieval, creation, PUT/PATCH update, deletion and account
//!   activation, with basic or per-call OAuth2 bearer authentication
//! - an attribute-level facade ([`UserOps`]) with cursor-based listing
//!
//! # Example
//!
//! ```no_run
//! use scim_v11_client::{AttributeSet, ScimConfig, UserOps};
//!
//! # fn main() -> Result<(), scim_v11_client::ScimError> {
//! let config = ScimConfig::new("https://example.com/scim/v1", "admin", "s3cret");
//! let ops = UserOps::new(config)?;
//!
//! let mut attrs = AttributeSet::new();
//! attrs.set("userName", "bjensen");
//! attrs.set("emails.work.value", "bjensen@example.com");
//! let id = ops.create(&attrs)?;
//!
//! let user = ops.read(&id)?;
//! assert_eq!(user.user_name, "bjensen");
//! # Ok(())
//! # }
//! ```

pub mod attrs;
pub mod client;
pub mod config;
pub mod error;
pub mod extension;
pub mod merge;
pub mod ops;
pub mod resource;

pub use attrs::{AttributeSet, paths};
pub use client::ScimClient;
pub use config::{OAuth2Config, ScimConfig, UpdateMethod};
pub use error::{ScimError, ScimResult};
pub use extension::{ExtensionAttribute, ExtensionSchema};
pub use ops::{ListResult, PageRequest, UserOps};
pub use resource::{
    ComplexEntry, Meta, Name, PagedResults, ReferenceEntry, SCIM_CORE_SCHEMA, User,
};
