//! List operation handler
//!
//! Lists are paged by the reconciler and wrapped in a SCIM ListResponse
//! envelope. Filter expressions are not parsed here; callers that need
//! filtering pass a predicate to the reconciler directly.

use crate::{
    ScimError,
    error::ScimResult,
    operation_handler::core::{OperationMetadata, ScimOperationRequest, ScimOperationResponse},
    reconciler::ResourceReconciler,
    resource::{ListResponse, RequestContext},
};
use serde::Serialize;

/// Handle list operations.
pub async fn handle_list<T>(
    reconciler: &T,
    request: ScimOperationRequest,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse>
where
    T: ResourceReconciler,
    T::Resource: Serialize,
{
    let query = request.query.unwrap_or_default();
    if let Some(filter) = query.filter {
        return Err(ScimError::UnsupportedFilter(filter));
    }

    let list_query = query.to_list_query();
    let resources = reconciler.list(&list_query, None, context).await?;
    let envelope = ListResponse::new(resources, list_query.effective_start_index());
    let resource_count = envelope.resources.len();

    Ok(ScimOperationResponse {
        success: true,
        data: Some(serde_json::to_value(&envelope)?),
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(request.resource_type),
            resource_count: Some(resource_count),
            total_results: Some(envelope.total_results),
            request_id: context.request_id.clone(),
            schemas: Some(envelope.schemas.clone()),
            ..OperationMetadata::default()
        },
    })
}
