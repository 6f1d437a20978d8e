//! Framework-agnostic SCIM operation handler.
//!
//! This module provides structured request/response handling for `Users` and
//! `Groups` operations on top of the reconcilers, with content-derived ETags
//! on single-resource responses and SCIM ListResponse envelopes for lists.
//!
//! # Key Types
//!
//! - [`ScimOperationHandler`] - Main handler for processing SCIM operations
//! - [`ScimOperationRequest`] - Structured request wrapper
//! - [`ScimOperationResponse`] - Response with metadata and ETag information
//!
//! # Examples
//!
//! ```rust
//! use scim_reconciler::operation_handler::{ScimOperationHandler, ScimOperationRequest};
//! use scim_reconciler::repository::InMemoryRepository;
//! use scim_reconciler::ReconcilerConfig;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let repository = Arc::new(InMemoryRepository::new());
//! let handler = ScimOperationHandler::new(repository, ReconcilerConfig::default());
//!
//! let request = ScimOperationRequest::create("Users", json!({"userName": "alice"}));
//! let response = handler.handle_operation(request).await;
//! assert!(response.success);
//! # }
//! ```

mod builders;
mod core;
mod errors;
mod handlers;

pub use core::{
    OperationMetadata, ResourceKind, ScimOperationHandler, ScimOperationRequest,
    ScimOperationResponse, ScimOperationType, ScimQuery,
};

pub use errors::{create_error_response, error_code};
