//! CRUD operation handlers
//!
//! This module contains handlers for Create, Read, Update, and Delete
//! operations. Single-resource responses carry the resource's weak ETag.

use crate::{
    ScimError,
    error::ScimResult,
    operation_handler::core::{OperationMetadata, ScimOperationRequest, ScimOperationResponse},
    reconciler::ResourceReconciler,
    resource::{ETag, RequestContext, ScimResource},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

fn single_resource_response<Res: ScimResource + Serialize>(
    resource_type: String,
    resource: &Res,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse> {
    let etag = ETag::for_resource(resource)?;
    let mut additional = HashMap::new();
    additional.insert(
        "version".to_string(),
        Value::String(etag.as_str().to_string()),
    );
    additional.insert("etag".to_string(), Value::String(etag.to_string()));

    Ok(ScimOperationResponse {
        success: true,
        data: Some(serde_json::to_value(resource)?),
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(resource_type),
            resource_id: resource.id().map(str::to_string),
            resource_count: Some(1),
            total_results: None,
            request_id: context.request_id.clone(),
            schemas: Some(resource.schemas().to_vec()),
            additional,
        },
    })
}

/// Re-read a written resource so the response shows what was stored.
async fn stored_or_written<T: ResourceReconciler>(
    reconciler: &T,
    written: T::Resource,
    context: &RequestContext,
) -> ScimResult<T::Resource>
where
    T::Resource: ScimResource,
{
    let Some(id) = written.id().map(str::to_string) else {
        return Ok(written);
    };
    Ok(reconciler.get(&id, context).await?.unwrap_or(written))
}

/// Handle create operations.
pub async fn handle_create<T>(
    reconciler: &T,
    request: ScimOperationRequest,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse>
where
    T: ResourceReconciler,
    T::Resource: ScimResource + Serialize + DeserializeOwned,
{
    let data = request
        .data
        .ok_or_else(|| ScimError::invalid_request("Missing data for create operation"))?;
    let resource: T::Resource = serde_json::from_value(data)?;

    let created = reconciler.create(resource, context).await?;
    let stored = stored_or_written(reconciler, created, context).await?;
    single_resource_response(request.resource_type, &stored, context)
}

/// Handle get operations.
pub async fn handle_get<T>(
    reconciler: &T,
    request: ScimOperationRequest,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse>
where
    T: ResourceReconciler,
    T::Resource: ScimResource + Serialize,
{
    let resource_id = request
        .resource_id
        .ok_or_else(|| ScimError::invalid_request("Missing resource_id for get operation"))?;

    match reconciler.get(&resource_id, context).await? {
        Some(resource) => single_resource_response(request.resource_type, &resource, context),
        None => Err(ScimError::resource_not_found(
            reconciler.resource_type(),
            resource_id,
        )),
    }
}

/// Handle update operations.
pub async fn handle_update<T>(
    reconciler: &T,
    request: ScimOperationRequest,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse>
where
    T: ResourceReconciler,
    T::Resource: ScimResource + Serialize + DeserializeOwned,
{
    let resource_id = request
        .resource_id
        .ok_or_else(|| ScimError::invalid_request("Missing resource_id for update operation"))?;
    let data = request
        .data
        .ok_or_else(|| ScimError::invalid_request("Missing data for update operation"))?;

    let mut resource: T::Resource = serde_json::from_value(data)?;
    resource.set_id(resource_id);

    let updated = reconciler.update(resource, context).await?;
    let stored = stored_or_written(reconciler, updated, context).await?;
    single_resource_response(request.resource_type, &stored, context)
}

/// Handle delete operations.
pub async fn handle_delete<T>(
    reconciler: &T,
    request: ScimOperationRequest,
    context: &RequestContext,
) -> ScimResult<ScimOperationResponse>
where
    T: ResourceReconciler,
{
    let resource_id = request
        .resource_id
        .ok_or_else(|| ScimError::invalid_request("Missing resource_id for delete operation"))?;

    reconciler.delete(&resource_id, context).await?;

    Ok(ScimOperationResponse {
        success: true,
        data: None,
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(request.resource_type),
            resource_id: Some(resource_id),
            request_id: context.request_id.clone(),
            ..OperationMetadata::default()
        },
    })
}
