//! Concurrent creations sharing a correlation key.

mod common;

use scim_reconciler::resource::{Group, User};
use scim_reconciler::{
    GroupReconciler, IdentityRepository, InMemoryRepository, ReconcilerConfig, RequestContext,
    ResourceReconciler, UserReconciler,
};
use std::collections::BTreeSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_external_id_creates_one_user() {
    common::init_logging();
    let repository = Arc::new(InMemoryRepository::new());
    let users = Arc::new(UserReconciler::new(
        repository.clone(),
        ReconcilerConfig::default(),
    ));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let users = users.clone();
        tasks.push(tokio::spawn(async move {
            let context = RequestContext::new(format!("req-{}", i));
            users
                .create(
                    User::new("alice")
                        .with_external_id("ext-alice")
                        .with_title(format!("Title {}", i)),
                    &context,
                )
                .await
        }));
    }

    let mut ids = BTreeSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap().unwrap().id.unwrap());
    }

    assert_eq!(ids.len(), 1);
    assert_eq!(repository.stats().await.person_count, 1);
    assert_eq!(repository.open_result_sets(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_display_name_gets_distinct_short_names() {
    common::init_logging();
    let repository = Arc::new(InMemoryRepository::new());
    let groups = Arc::new(GroupReconciler::new(
        repository.clone(),
        ReconcilerConfig::default(),
    ));

    let mut tasks = Vec::new();
    for i in 0..5 {
        let groups = groups.clone();
        tasks.push(tokio::spawn(async move {
            let context = RequestContext::new(format!("req-{}", i));
            groups.create(Group::new("Engineering"), &context).await
        }));
    }

    let mut ids = BTreeSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap().unwrap().id.unwrap());
    }

    assert_eq!(ids.len(), 5);
    assert_eq!(repository.stats().await.group_count, 5);
    for name in [
        "GROUP_Engineering",
        "GROUP_Engineering_1",
        "GROUP_Engineering_2",
        "GROUP_Engineering_3",
        "GROUP_Engineering_4",
    ] {
        assert!(repository.authority_exists(name).await.unwrap(), "{}", name);
    }
}
