//! Resource reconciliation engine.
//!
//! Each reconciler translates SCIM operations for one resource type into
//! calls on the identity repository:
//!
//! - [`UserReconciler`] maps users onto person nodes and soft-deletes them.
//! - [`GroupReconciler`] maps groups onto authority containers, allocates
//!   unique short names and keeps direct membership in sync with minimal
//!   add/remove calls.
//!
//! Both correlate incoming resources with existing records through an
//! embedded [`ExternalIdResolver`], so creating a resource whose external id
//! already exists updates that record instead of duplicating it.
//!
//! # Example
//!
//! ```rust
//! use scim_reconciler::reconciler::{ResourceReconciler, UserReconciler};
//! use scim_reconciler::repository::InMemoryRepository;
//! use scim_reconciler::resource::{RequestContext, User};
//! use scim_reconciler::ReconcilerConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(InMemoryRepository::new());
//! let users = UserReconciler::new(repository, ReconcilerConfig::default());
//! let context = RequestContext::with_generated_id();
//!
//! let created = users
//!     .create(User::new("alice").with_external_id("ext-1"), &context)
//!     .await?;
//! let again = users
//!     .create(User::new("alice").with_external_id("ext-1"), &context)
//!     .await?;
//! assert_eq!(created.id, again.id);
//! # Ok(())
//! # }
//! ```

pub mod external_id;
pub mod group;
pub mod locks;
pub mod mapper;
pub mod naming;
pub mod user;

pub use external_id::ExternalIdResolver;
pub use group::{GroupReconciler, MembershipDelta};
pub use locks::{CreationGuard, CreationLocks};
pub use naming::{GroupInfo, GroupNamingService, sanitize_group_name};
pub use user::UserReconciler;

use crate::error::{ScimResult, ValidationError};
use crate::repository::NativeId;
use crate::resource::{ListQuery, RequestContext};
use std::future::Future;

/// Predicate applied to each listed resource after paging.
pub type ResourceFilter<R> = dyn Fn(&R) -> bool + Send + Sync;

/// CRUD operations for one SCIM resource type.
///
/// `get` reports a missing resource as `Ok(None)`; `update` and `delete`
/// report it as [`ScimError::ResourceNotFound`](crate::ScimError::ResourceNotFound).
pub trait ResourceReconciler: Send + Sync {
    /// The SCIM resource type handled by this reconciler.
    type Resource: Send + Sync;

    /// SCIM resource type name, e.g. `"User"`.
    fn resource_type(&self) -> &'static str;

    /// Create the resource, or update the record already carrying its
    /// external id. Returns the resource with its id assigned.
    fn create(
        &self,
        resource: Self::Resource,
        context: &RequestContext,
    ) -> impl Future<Output = ScimResult<Self::Resource>> + Send;

    fn get(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> impl Future<Output = ScimResult<Option<Self::Resource>>> + Send;

    /// Fetch one page and apply `filter` to it.
    ///
    /// Filtering happens after paging, so a page can hold fewer than
    /// `query.count` resources even when more matching resources exist.
    fn list(
        &self,
        query: &ListQuery,
        filter: Option<&ResourceFilter<Self::Resource>>,
        context: &RequestContext,
    ) -> impl Future<Output = ScimResult<Vec<Self::Resource>>> + Send;

    /// Merge the resource onto the record named by its id.
    fn update(
        &self,
        resource: Self::Resource,
        context: &RequestContext,
    ) -> impl Future<Output = ScimResult<Self::Resource>> + Send;

    fn delete(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> impl Future<Output = ScimResult<()>> + Send;
}

/// The native id named by an incoming resource's `id`.
pub(crate) fn required_id(id: Option<&str>) -> ScimResult<NativeId> {
    match id {
        None => Err(ValidationError::MissingId.into()),
        Some(id) if id.trim().is_empty() => Err(ValidationError::EmptyId.into()),
        Some(id) => Ok(NativeId::new(id)),
    }
}

/// Reject blank external ids; they would match nothing and correlate nothing.
pub(crate) fn check_external_id(external_id: Option<&str>) -> ScimResult<()> {
    match external_id {
        Some(external_id) if external_id.trim().is_empty() => {
            Err(ValidationError::InvalidExternalId.into())
        }
        _ => Ok(()),
    }
}

pub(crate) fn apply_filter<R>(resources: Vec<R>, filter: Option<&ResourceFilter<R>>) -> Vec<R> {
    match filter {
        Some(filter) => resources.into_iter().filter(|r| filter(r)).collect(),
        None => resources,
    }
}
