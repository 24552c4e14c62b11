//! Error types for schema construction
//!
//! Every variant here is a construction error: the schema delivered by the
//! server is malformed and cannot be turned into a [`SchemaNode`] tree.
//!
//! [`SchemaNode`]: crate::SchemaNode

/// Result alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema construction errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// `$ref` target missing from the ref table
    #[error("Schema refs must be defined: {0}")]
    UndefinedRef(String),

    /// Property added twice to the same object
    #[error("this name already exists: {0}")]
    DuplicateProperty(String),

    /// `type` is missing or not one of the five supported kinds
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Ref resolution nested deeper than the configured limit
    #[error("schema nesting exceeds depth limit of {limit}")]
    DepthExceeded {
        /// Configured limit
        limit: usize,
    },

    /// Document is not a well-formed schema
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] serde_json::Error),
}

impl SchemaError {
    /// Check if the error comes from the ref table rather than the document
    #[inline]
    #[must_use]
    pub fn is_ref_error(&self) -> bool {
        matches!(self, Self::UndefinedRef(_) | Self::DepthExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_fatal_wording() {
        let err = SchemaError::UndefinedRef("urn:x".into());
        assert!(err.to_string().contains("Schema refs must be defined"));

        let err = SchemaError::DuplicateProperty("name".into());
        assert!(err.to_string().contains("this name already exists"));
    }

    #[test]
    fn ref_errors_classified() {
        assert!(SchemaError::UndefinedRef("a".into()).is_ref_error());
        assert!(SchemaError::DepthExceeded { limit: 3 }.is_ref_error());
        assert!(!SchemaError::UnsupportedType("date".into()).is_ref_error());
    }
}
