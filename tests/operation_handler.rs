//! JSON operation handler on top of both reconcilers.

mod common;

use scim_reconciler::operation_handler::{ScimOperationHandler, ScimOperationRequest, ScimQuery};
use scim_reconciler::resource::LIST_RESPONSE_SCHEMA;
use scim_reconciler::{InMemoryRepository, ReconcilerConfig};
use serde_json::json;
use std::sync::Arc;

fn handler() -> (Arc<InMemoryRepository>, ScimOperationHandler<InMemoryRepository>) {
    common::init_logging();
    let repository = Arc::new(InMemoryRepository::new());
    let handler = ScimOperationHandler::new(repository.clone(), ReconcilerConfig::default());
    (repository, handler)
}

#[tokio::test]
async fn user_lifecycle() {
    let (_, handler) = handler();

    let created = handler
        .handle_operation(
            ScimOperationRequest::create(
                "Users",
                json!({
                    "userName": "alice",
                    "externalId": "ext-alice",
                    "name": {"givenName": "Alice", "familyName": "Smith"},
                    "emails": [{"value": "alice@example.com", "type": "work"}]
                }),
            )
            .with_request_id("req-create"),
        )
        .await;
    assert!(created.success, "{:?}", created.error);
    assert_eq!(created.metadata.request_id, "req-create");
    let id = created.metadata.resource_id.clone().unwrap();
    let data = created.data.unwrap();
    assert_eq!(data["id"], id.as_str());
    assert_eq!(data["active"], true);

    let etag = created.metadata.additional["etag"].as_str().unwrap().to_string();
    assert!(etag.starts_with("W/\""));

    let fetched = handler
        .handle_operation(ScimOperationRequest::get("User", &id))
        .await;
    assert!(fetched.success);
    assert_eq!(fetched.metadata.additional["etag"], etag.as_str());

    let updated = handler
        .handle_operation(ScimOperationRequest::update(
            "Users",
            &id,
            json!({"title": "Engineer"}),
        ))
        .await;
    assert!(updated.success);
    assert_eq!(updated.data.as_ref().unwrap()["title"], "Engineer");
    assert_eq!(updated.data.as_ref().unwrap()["userName"], "alice");
    assert_ne!(updated.metadata.additional["etag"], etag.as_str());

    let deleted = handler
        .handle_operation(ScimOperationRequest::delete("Users", &id))
        .await;
    assert!(deleted.success);

    let after = handler
        .handle_operation(ScimOperationRequest::get("Users", &id))
        .await;
    assert_eq!(after.data.unwrap()["active"], false);
}

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let (_, handler) = handler();

    let response = handler
        .handle_operation(ScimOperationRequest::get("Groups", "nope"))
        .await;

    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("RESOURCE_NOT_FOUND"));
}

#[tokio::test]
async fn group_membership_through_handler() {
    let (repository, handler) = handler();
    let alice = handler
        .handle_operation(ScimOperationRequest::create("Users", json!({"userName": "alice"})))
        .await
        .metadata
        .resource_id
        .unwrap();

    let group = handler
        .handle_operation(ScimOperationRequest::create(
            "Groups",
            json!({"displayName": "Engineering", "members": [{"value": alice}]}),
        ))
        .await;
    assert!(group.success, "{:?}", group.error);
    let data = group.data.unwrap();
    assert_eq!(data["members"][0]["value"], alice.as_str());
    assert_eq!(data["members"][0]["type"], "User");

    let id = group.metadata.resource_id.unwrap();
    let cleared = handler
        .handle_operation(ScimOperationRequest::update(
            "Groups",
            &id,
            json!({"displayName": "Engineering", "members": []}),
        ))
        .await;
    assert!(cleared.success);
    assert_eq!(repository.stats().await.membership_count, 0);
}

#[tokio::test]
async fn list_returns_envelope() {
    let (_, handler) = handler();
    for name in ["a", "b", "c"] {
        handler
            .handle_operation(ScimOperationRequest::create("Users", json!({"userName": name})))
            .await;
    }

    let response = handler
        .handle_operation(
            ScimOperationRequest::list("Users").with_query(ScimQuery::new().with_pagination(2, 5)),
        )
        .await;

    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data["schemas"][0], LIST_RESPONSE_SCHEMA);
    assert_eq!(data["startIndex"], 2);
    assert_eq!(data["totalResults"], 2);
    assert_eq!(data["Resources"][0]["userName"], "b");
    assert_eq!(response.metadata.resource_count, Some(2));
}

#[tokio::test]
async fn rejected_requests() {
    let (_, handler) = handler();

    let filter = handler
        .handle_operation(
            ScimOperationRequest::list("Users")
                .with_query(ScimQuery::new().with_filter("userName eq \"alice\"")),
        )
        .await;
    assert_eq!(filter.error_code.as_deref(), Some("UNSUPPORTED_FILTER"));

    let unknown = handler
        .handle_operation(ScimOperationRequest::list("Devices"))
        .await;
    assert_eq!(unknown.error_code.as_deref(), Some("UNSUPPORTED_RESOURCE_TYPE"));

    let invalid = handler
        .handle_operation(ScimOperationRequest::create("Users", json!({"title": "x"})))
        .await;
    assert_eq!(invalid.error_code.as_deref(), Some("VALIDATION_ERROR"));

    let malformed = handler
        .handle_operation(ScimOperationRequest::create("Users", json!({"userName": 42})))
        .await;
    assert_eq!(malformed.error_code.as_deref(), Some("INVALID_JSON"));

    let bad_name = handler
        .handle_operation(ScimOperationRequest::create("Groups", json!({"displayName": "!!!"})))
        .await;
    assert_eq!(bad_name.error_code.as_deref(), Some("INVALID_NAME"));
}

#[tokio::test]
async fn duplicate_user_name_maps_to_conflict() {
    let (_, handler) = handler();
    handler
        .handle_operation(ScimOperationRequest::create("Users", json!({"userName": "alice"})))
        .await;

    let response = handler
        .handle_operation(ScimOperationRequest::create("Users", json!({"userName": "alice"})))
        .await;

    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("CONFLICT"));
}

#[tokio::test]
async fn outage_maps_to_repository_unavailable() {
    let (repository, handler) = handler();
    repository.set_unavailable(true);

    let response = handler
        .handle_operation(ScimOperationRequest::list("Groups"))
        .await;

    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("REPOSITORY_UNAVAILABLE"));
}
