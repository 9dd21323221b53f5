//! Error types for SCIM client operations.
//!
//! This module provides the error taxonomy for all client operations:
//! missing entities, protocol-level failures, configuration problems and
//! per-attribute translation failures. Translation errors are non-fatal by
//! contract and are normally logged and skipped rather than propagated.

/// Main error type for SCIM client operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// The server reported HTTP 404, or a delete/read targeted a
    /// nonexistent identifier.
    #[error("No such entity: {0}")]
    NoSuchEntity(String),

    /// Unparseable response, missing expected fields, embedded error
    /// payload, or any other violation of the wire contract.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Invalid base address, missing credentials, unparseable extension
    /// schema or invalid update method. Raised at initialization.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A single attribute value could not be read or converted during
    /// attribute mapping.
    #[error("Translation error for attribute '{attribute}': {message}")]
    Translation { attribute: String, message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScimError {
    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a translation error for a single attribute.
    pub fn translation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Translation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the targeted entity does not exist.
    pub fn is_no_such_entity(&self) -> bool {
        matches!(self, Self::NoSuchEntity(_))
    }
}

/// Result type alias for SCIM client operations.
pub type ScimResult<T> = Result<T, ScimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ScimError::NoSuchEntity("123".into());
        assert!(error.to_string().contains("123"));
        assert!(error.is_no_such_entity());

        let error = ScimError::translation("emails.home.value", "not a string");
        assert!(error.to_string().contains("emails.home.value"));
        assert!(!error.is_no_such_entity());
    }
}
