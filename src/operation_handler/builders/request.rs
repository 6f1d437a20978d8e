//! Request builder utilities for ScimOperationRequest
//!
//! This module provides convenient builder methods for constructing
//! ScimOperationRequest instances for different operation types.

use crate::operation_handler::core::{ScimOperationRequest, ScimOperationType, ScimQuery};
use serde_json::Value;

impl ScimOperationRequest {
    fn new(operation: ScimOperationType, resource_type: impl Into<String>) -> Self {
        Self {
            operation,
            resource_type: resource_type.into(),
            resource_id: None,
            data: None,
            query: None,
            request_id: None,
        }
    }

    /// Create a new create operation request.
    pub fn create(resource_type: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::new(ScimOperationType::Create, resource_type)
        }
    }

    /// Create a new get operation request.
    pub fn get(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Self::new(ScimOperationType::Get, resource_type)
        }
    }

    /// Create a new update operation request.
    pub fn update(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            data: Some(data),
            ..Self::new(ScimOperationType::Update, resource_type)
        }
    }

    /// Create a new delete operation request.
    pub fn delete(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Self::new(ScimOperationType::Delete, resource_type)
        }
    }

    /// Create a new list operation request.
    pub fn list(resource_type: impl Into<String>) -> Self {
        Self::new(ScimOperationType::List, resource_type)
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: ScimQuery) -> Self {
        self.query = Some(query);
        self
    }

    /// Set the request ID used for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_builder() {
        let request = ScimOperationRequest::update("Users", "n-1", json!({"title": "CTO"}))
            .with_request_id("req-9");

        assert_eq!(request.operation, ScimOperationType::Update);
        assert_eq!(request.resource_id.as_deref(), Some("n-1"));
        assert_eq!(request.request_id.as_deref(), Some("req-9"));
        assert!(request.data.is_some());
    }

    #[test]
    fn test_list_builder() {
        let request =
            ScimOperationRequest::list("Groups").with_query(ScimQuery::new().with_pagination(21, 10));

        assert_eq!(request.operation, ScimOperationType::List);
        assert_eq!(request.query.and_then(|q| q.start_index), Some(21));
    }
}
