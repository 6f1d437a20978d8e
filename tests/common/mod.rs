//! Shared fixtures for the reconciliation integration tests.

#![allow(dead_code)]

use scim_reconciler::repository::{IdentityRepository, NativeId, Property, PropertyValue};
use scim_reconciler::resource::{Group, User};
use scim_reconciler::{
    GroupReconciler, InMemoryRepository, ReconcilerConfig, RequestContext, ResourceReconciler,
    UserReconciler,
};
use std::sync::Arc;

/// Repository plus both reconcilers wired to it.
pub struct TestEnvironment {
    pub repository: Arc<InMemoryRepository>,
    pub users: UserReconciler<InMemoryRepository>,
    pub groups: GroupReconciler<InMemoryRepository>,
    pub context: RequestContext,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_config(ReconcilerConfig::default())
    }

    pub fn with_config(config: ReconcilerConfig) -> Self {
        init_logging();
        let repository = Arc::new(InMemoryRepository::new());
        Self {
            users: UserReconciler::new(repository.clone(), config.clone()),
            groups: GroupReconciler::new(repository.clone(), config),
            repository,
            context: RequestContext::new("test-request"),
        }
    }

    /// Create a user and return its id.
    pub async fn user(&self, user_name: &str) -> String {
        self.users
            .create(User::new(user_name), &self.context)
            .await
            .expect("user creation failed")
            .id
            .expect("created user has no id")
    }

    /// Create a group and return its id.
    pub async fn group(&self, display_name: &str) -> String {
        self.groups
            .create(Group::new(display_name), &self.context)
            .await
            .expect("group creation failed")
            .id
            .expect("created group has no id")
    }

    /// Text value of a native property.
    pub async fn text_property(&self, id: &str, property: Property) -> Option<String> {
        self.repository
            .get_property(&NativeId::new(id), property)
            .await
            .expect("property read failed")
            .and_then(|value| value.as_text().map(str::to_string))
    }

    /// Short name stored on a group node, without the authority prefix.
    pub async fn group_short_name(&self, id: &str) -> String {
        let name = self
            .text_property(id, Property::AuthorityName)
            .await
            .expect("group has no authority name");
        name.trim_start_matches("GROUP_").to_string()
    }
}

/// A user carrying every mapped attribute.
pub fn full_user(user_name: &str, external_id: &str) -> User {
    User::new(user_name)
        .with_external_id(external_id)
        .with_name("Alice", "Smith")
        .with_title("Engineer")
        .with_email(format!("{}@example.com", user_name), "work")
        .with_phone_number("555-0100", "mobile")
        .with_phone_number("555-0200", "work")
}

pub fn text(value: &str) -> PropertyValue {
    PropertyValue::text(value)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
