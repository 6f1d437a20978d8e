//! Error types for SCIM reconciliation operations.
//!
//! Reconciler operations fail with [`ScimError`]. Malformed input resources are
//! reported as [`ValidationError`] before any repository write happens.
//! Failures of the identity repository are carried unchanged inside
//! [`ScimError::RepositoryUnavailable`], except uniqueness violations, which
//! become [`ScimError::Conflict`].

use crate::repository::RepositoryError;

/// Main error type for reconciliation operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// The incoming resource is malformed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The resource id does not resolve to a live native record.
    #[error("Resource not found: {resource_type} with ID {id}")]
    ResourceNotFound { resource_type: String, id: String },

    /// The group display name sanitizes to an empty short name.
    #[error("Invalid group name provided: '{display_name}'")]
    InvalidName { display_name: String },

    /// Collision-suffix probing ran past the configured bound. `attempts`
    /// counts every name probed, the unsuffixed base included.
    #[error("No free group name for '{base}' after {attempts} attempts")]
    NameExhausted { base: String, attempts: u32 },

    /// The write would duplicate a unique username or authority name.
    #[error("Conflict: {0}")]
    Conflict(RepositoryError),

    /// The identity repository or its search service failed.
    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(RepositoryError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid request format or parameters
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Unsupported resource type
    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    /// Filter expressions are evaluated by the caller, never parsed here.
    #[error("Unsupported filter expression: {0}")]
    UnsupportedFilter(String),
}

/// Validation errors for incoming SCIM resources.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Required attribute is missing
    #[error("Required attribute '{attribute}' is missing")]
    MissingRequiredAttribute { attribute: String },

    /// Missing id attribute
    #[error("Missing required 'id' attribute")]
    MissingId,

    /// Empty id value
    #[error("'id' attribute cannot be empty")]
    EmptyId,

    /// Invalid external id
    #[error("Invalid 'externalId' format")]
    InvalidExternalId,

    /// The external id already correlates to a record of another type
    #[error("'externalId' {external_id} already belongs to {owner_type} {owner_id}")]
    ExternalIdConflict {
        external_id: String,
        owner_type: String,
        owner_id: String,
    },

    /// A group member reference that does not resolve to a user or group
    #[error("Attribute '{attribute}' contains broken reference: {reference}")]
    BrokenReference {
        attribute: String,
        reference: String,
    },

    /// General validation error with custom message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl From<RepositoryError> for ScimError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::DuplicateAuthority { .. }
            | RepositoryError::DuplicateUserName { .. } => Self::Conflict(error),
            _ => Self::RepositoryUnavailable(error),
        }
    }
}

impl ScimError {
    /// Create a resource not found error
    pub fn resource_not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an invalid group name error
    pub fn invalid_name(display_name: impl Into<String>) -> Self {
        Self::InvalidName {
            display_name: display_name.into(),
        }
    }
}

impl ValidationError {
    /// Create a missing required attribute error
    pub fn missing_required(attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create a broken member reference error
    pub fn broken_reference(attribute: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::BrokenReference {
            attribute: attribute.into(),
            reference: reference.into(),
        }
    }

    /// Create an external id conflict error
    pub fn external_id_conflict(
        external_id: impl Into<String>,
        owner_type: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self::ExternalIdConflict {
            external_id: external_id.into(),
            owner_type: owner_type.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Create a custom validation error
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

// Result type aliases for convenience
pub type ScimResult<T> = Result<T, ScimError>;
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ScimError::resource_not_found("User", "123");
        assert!(error.to_string().contains("User"));
        assert!(error.to_string().contains("123"));
    }

    #[test]
    fn test_validation_error_creation() {
        let error = ValidationError::missing_required("userName");
        assert!(error.to_string().contains("userName"));
    }

    #[test]
    fn test_error_chain() {
        let validation_error = ValidationError::missing_required("userName");
        let scim_error = ScimError::from(validation_error);
        assert!(scim_error.to_string().contains("Validation error"));
    }

    #[test]
    fn test_repository_error_is_wrapped() {
        let repo_error = RepositoryError::unavailable("search index offline");
        let scim_error = ScimError::from(repo_error);
        assert!(matches!(scim_error, ScimError::RepositoryUnavailable(_)));
        assert!(scim_error.to_string().contains("search index offline"));
    }

    #[test]
    fn test_duplicates_become_conflicts() {
        let scim_error = ScimError::from(RepositoryError::DuplicateUserName {
            user_name: "alice".to_string(),
        });
        assert!(matches!(
            scim_error,
            ScimError::Conflict(RepositoryError::DuplicateUserName { .. })
        ));
        assert!(scim_error.to_string().contains("alice"));

        let scim_error = ScimError::from(RepositoryError::DuplicateAuthority {
            name: "GROUP_Ops".to_string(),
        });
        assert!(matches!(scim_error, ScimError::Conflict(_)));
    }
}
