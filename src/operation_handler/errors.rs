//! Error handling utilities for operation handlers
//!
//! This module contains the error response creation shared by all operation
//! handlers.

use crate::{
    ScimError,
    operation_handler::core::{OperationMetadata, ScimOperationResponse},
};

/// Stable machine-readable code for an error.
pub fn error_code(error: &ScimError) -> &'static str {
    match error {
        ScimError::Validation(_) => "VALIDATION_ERROR",
        ScimError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
        ScimError::InvalidName { .. } => "INVALID_NAME",
        ScimError::NameExhausted { .. } => "NAME_EXHAUSTED",
        ScimError::Conflict(_) => "CONFLICT",
        ScimError::RepositoryUnavailable(_) => "REPOSITORY_UNAVAILABLE",
        ScimError::Json(_) => "INVALID_JSON",
        ScimError::InvalidRequest { .. } => "INVALID_REQUEST",
        ScimError::UnsupportedResourceType(_) => "UNSUPPORTED_RESOURCE_TYPE",
        ScimError::UnsupportedFilter(_) => "UNSUPPORTED_FILTER",
    }
}

/// Create an error response from a ScimError.
pub fn create_error_response(error: ScimError, request_id: String) -> ScimOperationResponse {
    ScimOperationResponse {
        success: false,
        data: None,
        error: Some(error.to_string()),
        error_code: Some(error_code(&error).to_string()),
        metadata: OperationMetadata {
            request_id,
            ..OperationMetadata::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_error_response() {
        let response = create_error_response(
            ScimError::resource_not_found("User", "n-1"),
            "req-1".to_string(),
        );

        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("RESOURCE_NOT_FOUND"));
        assert_eq!(response.metadata.request_id, "req-1");
        assert!(response.error.unwrap().contains("n-1"));
    }

    #[test]
    fn test_validation_code() {
        let error = ScimError::from(ValidationError::missing_required("userName"));
        assert_eq!(error_code(&error), "VALIDATION_ERROR");
    }

    #[test]
    fn test_conflict_code() {
        let error = ScimError::from(crate::repository::RepositoryError::DuplicateUserName {
            user_name: "alice".to_string(),
        });
        assert_eq!(error_code(&error), "CONFLICT");
    }
}
