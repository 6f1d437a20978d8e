//! Operation handlers
//!
//! CRUD and list handlers are generic over the reconciler, so users and
//! groups share one implementation.

pub(super) mod crud;
pub(super) mod query;

use crate::error::ScimResult;
use crate::operation_handler::core::{ScimOperationRequest, ScimOperationResponse, ScimOperationType};
use crate::reconciler::ResourceReconciler;
use crate::resource::{RequestContext, ScimResource};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Route a request to the handler for its operation type.
pub(super) async fn dispatch<T>(
    reconciler: &T,
    request: ScimOperationRequest,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse>
where
    T: ResourceReconciler,
    T::Resource: ScimResource + Serialize + DeserializeOwned,
{
    match request.operation {
        ScimOperationType::Create => crud::handle_create(reconciler, request, context).await,
        ScimOperationType::Get => crud::handle_get(reconciler, request, context).await,
        ScimOperationType::Update => crud::handle_update(reconciler, request, context).await,
        ScimOperationType::Delete => crud::handle_delete(reconciler, request, context).await,
        ScimOperationType::List => query::handle_list(reconciler, request, context).await,
    }
}
