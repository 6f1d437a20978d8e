//! Core operation handler infrastructure
//!
//! This module contains the foundational types and main dispatcher logic for
//! SCIM operations. It provides the central handler struct and operation
//! dispatch functionality that the other operation handler modules depend on.

use crate::config::ReconcilerConfig;
use crate::error::{ScimError, ScimResult};
use crate::reconciler::{CreationLocks, GroupReconciler, UserReconciler};
use crate::repository::{IdentityRepository, SearchService};
use crate::resource::RequestContext;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Framework-agnostic operation handler for SCIM operations
///
/// This handler provides a structured interface for performing SCIM operations
/// without being tied to any specific transport layer.
pub struct ScimOperationHandler<R> {
    pub(super) users: UserReconciler<R>,
    pub(super) groups: GroupReconciler<R>,
}

/// Structured request for SCIM operations
#[derive(Debug, Clone, PartialEq)]
pub struct ScimOperationRequest {
    /// The type of operation to perform
    pub operation: ScimOperationType,
    /// The resource type ("User", "Users", "Group" or "Groups")
    pub resource_type: String,
    /// Resource ID for operations that target a specific resource
    pub resource_id: Option<String>,
    /// Data payload for create/update operations
    pub data: Option<Value>,
    /// Query parameters for list operations
    pub query: Option<ScimQuery>,
    /// Request ID for tracing and correlation
    pub request_id: Option<String>,
}

/// Types of SCIM operations supported by the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScimOperationType {
    /// Create a new resource
    Create,
    /// Get a specific resource by ID
    Get,
    /// Update an existing resource
    Update,
    /// Delete a resource
    Delete,
    /// List resources with optional pagination
    List,
}

/// Query parameters for list operations
#[derive(Debug, Clone, PartialEq)]
pub struct ScimQuery {
    /// Maximum number of results to return
    pub count: Option<usize>,
    /// 1-based starting index for pagination
    pub start_index: Option<usize>,
    /// Filter expression; rejected, filters are supplied as predicates
    pub filter: Option<String>,
}

/// Structured response from SCIM operations
#[derive(Debug, Clone, PartialEq)]
pub struct ScimOperationResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// The primary data returned by the operation
    pub data: Option<Value>,
    /// Error message if the operation failed
    pub error: Option<String>,
    /// Error code for programmatic handling
    pub error_code: Option<String>,
    /// Additional metadata about the operation including version information
    pub metadata: OperationMetadata,
}

/// Metadata about a SCIM operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationMetadata {
    /// Resource type involved in the operation
    pub resource_type: Option<String>,
    /// Resource ID if applicable
    pub resource_id: Option<String>,
    /// Number of resources returned (for list operations)
    pub resource_count: Option<usize>,
    /// Total number of resources in the response (for list operations)
    pub total_results: Option<usize>,
    /// Request ID for tracing
    pub request_id: String,
    /// Resource schemas involved
    pub schemas: Option<Vec<String>>,
    /// Additional metadata including version information
    pub additional: HashMap<String, Value>,
}

/// Resource types routed by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Group,
}

impl ResourceKind {
    /// Accepts both the singular type name and the endpoint name.
    pub fn parse(resource_type: &str) -> ScimResult<Self> {
        match resource_type {
            "User" | "Users" => Ok(Self::User),
            "Group" | "Groups" => Ok(Self::Group),
            other => Err(ScimError::UnsupportedResourceType(other.to_string())),
        }
    }
}

impl<R: IdentityRepository + SearchService> ScimOperationHandler<R> {
    /// Create a handler whose reconcilers share one repository and one set of
    /// creation locks.
    pub fn new(repository: Arc<R>, config: ReconcilerConfig) -> Self {
        let locks = CreationLocks::new(config.serialize_creation);
        Self {
            users: UserReconciler::new(repository.clone(), config.clone())
                .with_locks(locks.clone()),
            groups: GroupReconciler::new(repository, config).with_locks(locks),
        }
    }

    /// Handle a structured SCIM operation request.
    ///
    /// This is the main entry point that dispatches to the reconciler for the
    /// requested resource type.
    pub async fn handle_operation(&self, request: ScimOperationRequest) -> ScimOperationResponse {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        info!(
            "SCIM operation handler processing {:?} for {} (request: '{}')",
            request.operation, request.resource_type, request_id
        );

        let context = RequestContext::new(request_id.clone());

        let result = match ResourceKind::parse(&request.resource_type) {
            Ok(ResourceKind::User) => {
                super::handlers::dispatch(&self.users, request, &context).await
            }
            Ok(ResourceKind::Group) => {
                super::handlers::dispatch(&self.groups, request, &context).await
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => {
                debug!(
                    "SCIM operation handler completed successfully (request: '{}')",
                    request_id
                );
            }
            Err(e) => {
                warn!(
                    "SCIM operation handler failed: {} (request: '{}')",
                    e, request_id
                );
            }
        }

        result.unwrap_or_else(|e| super::errors::create_error_response(e, request_id))
    }

    /// The user reconciler behind this handler.
    pub fn users(&self) -> &UserReconciler<R> {
        &self.users
    }

    /// The group reconciler behind this handler.
    pub fn groups(&self) -> &GroupReconciler<R> {
        &self.groups
    }
}
