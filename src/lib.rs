//! SCIM User and Group reconciliation against a native identity repository.
//!
//! Provides an async-first engine that correlates incoming SCIM resources
//! with existing repository records by external id, maps attributes onto
//! native properties, keeps group membership in sync with minimal changes and
//! soft-deletes users.
//!
//! # Core Components
//!
//! - [`UserReconciler`] / [`GroupReconciler`] - CRUD for each resource type
//! - [`IdentityRepository`] / [`SearchService`] - the repository seams
//! - [`InMemoryRepository`] - reference implementation of both seams
//! - [`ScimOperationHandler`] - transport-agnostic JSON dispatcher
//!
//! # Quick Start
//!
//! ```rust
//! use scim_reconciler::{
//!     GroupReconciler, InMemoryRepository, ReconcilerConfig, RequestContext,
//!     ResourceReconciler, UserReconciler,
//! };
//! use scim_reconciler::resource::{Group, User};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(InMemoryRepository::new());
//! let users = UserReconciler::new(repository.clone(), ReconcilerConfig::default());
//! let groups = GroupReconciler::new(repository, ReconcilerConfig::default());
//! let context = RequestContext::with_generated_id();
//!
//! let alice = users.create(User::new("alice"), &context).await?;
//! let team = groups
//!     .create(Group::new("Engineering").with_member(alice.id.unwrap()), &context)
//!     .await?;
//! assert!(team.id.is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod operation_handler;
pub mod reconciler;
pub mod repository;
pub mod resource;

// Re-export commonly used types for convenience
pub use config::ReconcilerConfig;
pub use error::{ScimError, ScimResult, ValidationError, ValidationResult};
pub use operation_handler::{
    OperationMetadata, ScimOperationHandler, ScimOperationRequest, ScimOperationResponse,
    ScimOperationType, ScimQuery,
};
pub use reconciler::{
    CreationLocks, ExternalIdResolver, GroupInfo, GroupNamingService, GroupReconciler,
    MembershipDelta, ResourceFilter, ResourceReconciler, UserReconciler,
};
pub use repository::{
    IdentityRepository, InMemoryRepository, NativeId, RepositoryError, SearchService,
};
pub use resource::{Group, ListQuery, ListResponse, RequestContext, User};
