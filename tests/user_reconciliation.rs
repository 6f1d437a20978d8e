//! User reconciliation against the in-memory repository.

mod common;

use chrono::Utc;
use common::{TestEnvironment, full_user};
use scim_reconciler::repository::{
    Aspect, IdentityRepository, JournalEntry, NativeId, PagingRequest, Property,
};
use scim_reconciler::repository::RepositoryError;
use scim_reconciler::resource::{Group, User};
use scim_reconciler::{ListQuery, ResourceFilter, ResourceReconciler, ScimError, ValidationError};

#[tokio::test]
async fn create_with_known_external_id_updates_existing_record() {
    let env = TestEnvironment::new();

    let first = env
        .users
        .create(full_user("alice", "ext-alice"), &env.context)
        .await
        .unwrap();
    let second = env
        .users
        .create(
            User::new("alice").with_external_id("EXT-ALICE").with_title("Director"),
            &env.context,
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(env.repository.stats().await.person_count, 1);

    let id = first.id.unwrap();
    assert_eq!(
        env.text_property(&id, Property::JobTitle).await.as_deref(),
        Some("Director")
    );
    // Attributes absent from the second request stay as they were
    assert_eq!(
        env.text_property(&id, Property::FirstName).await.as_deref(),
        Some("Alice")
    );
    assert_eq!(env.repository.open_result_sets(), 0);
}

#[tokio::test]
async fn created_user_reads_back_with_all_attributes() {
    let env = TestEnvironment::new();
    let created = env
        .users
        .create(full_user("alice", "ext-1"), &env.context)
        .await
        .unwrap();

    let user = env
        .users
        .get(created.id.as_deref().unwrap(), &env.context)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.user_name.as_deref(), Some("alice"));
    assert_eq!(user.external_id.as_deref(), Some("ext-1"));
    assert_eq!(user.title.as_deref(), Some("Engineer"));
    assert_eq!(user.first_email(), Some("alice@example.com"));
    assert_eq!(user.phone_number_of_type("mobile"), Some("555-0100"));
    assert_eq!(user.phone_number_of_type("work"), Some("555-0200"));
    assert_eq!(user.active, Some(true));
}

#[tokio::test]
async fn partial_update_leaves_other_properties_unchanged() {
    let env = TestEnvironment::new();
    let created = env
        .users
        .create(full_user("alice", "ext-1"), &env.context)
        .await
        .unwrap();
    let id = created.id.unwrap();
    let before = env
        .repository
        .get_properties(&NativeId::new(&id))
        .await
        .unwrap();

    env.users
        .update(User::default().with_id(&id).with_title("CTO"), &env.context)
        .await
        .unwrap();

    let after = env
        .repository
        .get_properties(&NativeId::new(&id))
        .await
        .unwrap();
    for (property, value) in &before {
        match property {
            Property::JobTitle => assert_eq!(after[property], common::text("CTO")),
            Property::LastSyncDate => assert!(after.contains_key(property)),
            _ => assert_eq!(&after[property], value, "{:?} changed", property),
        }
    }
}

#[tokio::test]
async fn delete_disables_and_retires_email() {
    let env = TestEnvironment::new();
    let id = env
        .users
        .create(
            User::new("alice").with_email("alice@example.com", "work"),
            &env.context,
        )
        .await
        .unwrap()
        .id
        .unwrap();

    let before = Utc::now().timestamp_millis();
    env.users.delete(&id, &env.context).await.unwrap();
    let after = Utc::now().timestamp_millis();

    let native = NativeId::new(&id);
    assert!(env.repository.exists(&native).await.unwrap());
    assert!(env
        .repository
        .has_aspect(&native, Aspect::PersonDisabled)
        .await
        .unwrap());

    let email = env.text_property(&id, Property::Email).await.unwrap();
    let (stamp, rest) = email.split_once('_').unwrap();
    let stamp: i64 = stamp.parse().unwrap();
    assert!(stamp >= before && stamp <= after);
    assert_eq!(rest, "alice@example.com");

    let user = env.users.get(&id, &env.context).await.unwrap().unwrap();
    assert_eq!(user.active, Some(false));
}

#[tokio::test]
async fn delete_without_email_only_disables() {
    let env = TestEnvironment::new();
    let id = env.user("bob").await;

    env.users.delete(&id, &env.context).await.unwrap();

    assert!(env
        .repository
        .has_aspect(&NativeId::new(&id), Aspect::PersonDisabled)
        .await
        .unwrap());
    assert_eq!(env.text_property(&id, Property::Email).await, None);
}

#[tokio::test]
async fn list_converts_start_index_to_skip_count() {
    let env = TestEnvironment::new();
    env.user("alice").await;
    env.repository.clear_journal().await;

    env.users
        .list(
            &ListQuery::new().with_start_index(1).with_count(10),
            None,
            &env.context,
        )
        .await
        .unwrap();
    env.users
        .list(
            &ListQuery::new().with_start_index(21).with_count(10),
            None,
            &env.context,
        )
        .await
        .unwrap();

    let paged: Vec<PagingRequest> = env
        .repository
        .journal()
        .await
        .into_iter()
        .filter_map(|entry| match entry {
            JournalEntry::PeoplePaged(paging) => Some(paging),
            _ => None,
        })
        .collect();
    assert_eq!(
        paged,
        vec![PagingRequest::new(0, 10), PagingRequest::new(20, 10)]
    );
}

#[tokio::test]
async fn list_filters_after_paging() {
    let env = TestEnvironment::new();
    for name in ["alice", "amy", "bob", "carl", "dora"] {
        env.user(name).await;
    }

    let starts_with_a: &ResourceFilter<User> = &|user: &User| {
        user.user_name
            .as_deref()
            .is_some_and(|name| name.starts_with('a'))
    };

    // Page one holds alice, amy, bob; the filter drops bob and does not refill
    let page = env
        .users
        .list(
            &ListQuery::new().with_start_index(1).with_count(3),
            Some(starts_with_a),
            &env.context,
        )
        .await
        .unwrap();
    let names: Vec<_> = page.iter().filter_map(|u| u.user_name.clone()).collect();
    assert_eq!(names, vec!["alice", "amy"]);

    let page = env
        .users
        .list(
            &ListQuery::new().with_start_index(4).with_count(3),
            Some(starts_with_a),
            &env.context,
        )
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn unknown_ids() {
    let env = TestEnvironment::new();

    assert!(env
        .users
        .get("does-not-exist", &env.context)
        .await
        .unwrap()
        .is_none());

    let update = env
        .users
        .update(User::default().with_id("does-not-exist"), &env.context)
        .await;
    assert!(matches!(update, Err(ScimError::ResourceNotFound { .. })));

    let delete = env.users.delete("does-not-exist", &env.context).await;
    assert!(matches!(delete, Err(ScimError::ResourceNotFound { .. })));
}

#[tokio::test]
async fn taken_user_name_is_a_conflict_not_an_outage() {
    let env = TestEnvironment::new();
    env.users
        .create(User::new("alice").with_external_id("ext-1"), &env.context)
        .await
        .unwrap();

    let result = env
        .users
        .create(User::new("alice").with_external_id("ext-2"), &env.context)
        .await;

    assert!(matches!(
        result,
        Err(ScimError::Conflict(RepositoryError::DuplicateUserName { .. }))
    ));
    assert_eq!(env.repository.stats().await.person_count, 1);
}

#[tokio::test]
async fn external_id_owned_by_a_group_is_a_conflict() {
    let env = TestEnvironment::new();
    env.groups
        .create(Group::new("Team").with_external_id("X-1"), &env.context)
        .await
        .unwrap();

    let result = env
        .users
        .create(User::new("alice").with_external_id("X-1"), &env.context)
        .await;

    assert!(matches!(
        result,
        Err(ScimError::Validation(ValidationError::ExternalIdConflict { .. }))
    ));
    assert_eq!(env.repository.stats().await.person_count, 0);
}

#[tokio::test]
async fn repository_outage_surfaces_and_releases_nothing() {
    let env = TestEnvironment::new();
    let id = env.user("alice").await;
    env.repository.set_unavailable(true);

    let result = env
        .users
        .create(User::new("bob").with_external_id("ext-bob"), &env.context)
        .await;
    assert!(matches!(result, Err(ScimError::RepositoryUnavailable(_))));

    let result = env.users.get(&id, &env.context).await;
    assert!(matches!(result, Err(ScimError::RepositoryUnavailable(_))));
    assert_eq!(env.repository.open_result_sets(), 0);
}
