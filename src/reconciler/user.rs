//! User reconciliation onto person nodes.

use super::locks::{CreationLocks, external_id_key, user_name_key};
use super::{
    ExternalIdResolver, ResourceFilter, ResourceReconciler, apply_filter, check_external_id,
    mapper, required_id,
};
use crate::config::ReconcilerConfig;
use crate::error::{ScimError, ScimResult, ValidationError};
use crate::repository::{
    Aspect, IdentityRepository, NativeId, NodeType, Property, PropertyValue, SearchService,
};
use crate::resource::{ListQuery, RequestContext, User};
use chrono::Utc;
use log::{debug, info, trace};
use std::sync::Arc;

/// Reconciles SCIM users with person nodes.
///
/// Deleting a user never removes the person: the account is disabled and its
/// email is rewritten so the address can be reused by a new account.
pub struct UserReconciler<R> {
    repository: Arc<R>,
    resolver: ExternalIdResolver<R>,
    locks: CreationLocks,
}

impl<R: IdentityRepository + SearchService> UserReconciler<R> {
    pub fn new(repository: Arc<R>, config: ReconcilerConfig) -> Self {
        Self {
            resolver: ExternalIdResolver::new(repository.clone(), config.store_ref()),
            locks: CreationLocks::new(config.serialize_creation),
            repository,
        }
    }

    /// Share creation locks with other reconciler instances in this process.
    pub fn with_locks(mut self, locks: CreationLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Whether `id` names a live person node.
    async fn find_person(&self, id: &NativeId) -> ScimResult<bool> {
        Ok(self.repository.node_type(id).await? == Some(NodeType::Person))
    }

    async fn require_person(&self, id: &NativeId) -> ScimResult<()> {
        if self.find_person(id).await? {
            Ok(())
        } else {
            Err(ScimError::resource_not_found("User", id.as_str()))
        }
    }

    async fn apply_active(&self, id: &NativeId, active: bool) -> ScimResult<()> {
        if active {
            self.repository.remove_aspect(id, Aspect::PersonDisabled).await?;
        } else {
            self.repository.add_aspect(id, Aspect::PersonDisabled).await?;
        }
        Ok(())
    }

    async fn load(&self, id: &NativeId) -> ScimResult<User> {
        let properties = self.repository.get_properties(id).await?;
        let disabled = self
            .repository
            .has_aspect(id, Aspect::PersonDisabled)
            .await?;
        Ok(mapper::user_from_properties(id, &properties, disabled))
    }
}

impl<R: IdentityRepository + SearchService> ResourceReconciler for UserReconciler<R> {
    type Resource = User;

    fn resource_type(&self) -> &'static str {
        "User"
    }

    async fn create(&self, mut user: User, context: &RequestContext) -> ScimResult<User> {
        let user_name = user
            .user_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ValidationError::missing_required("userName"))?
            .to_string();
        check_external_id(user.external_id.as_deref())?;

        let lock_key = match &user.external_id {
            Some(external_id) => external_id_key("User", external_id),
            None => user_name_key(&user_name),
        };
        let _guard = self.locks.acquire(lock_key).await;

        if let Some(external_id) = &user.external_id {
            if let Some(existing) = self.resolver.resolve(external_id).await? {
                if !self.find_person(&existing).await? {
                    return Err(ValidationError::external_id_conflict(
                        external_id,
                        "Group",
                        existing.as_str(),
                    )
                    .into());
                }
                info!(
                    "User '{}' matches existing person {} by external id, updating (request: '{}')",
                    user_name, existing, context.request_id
                );
                user.id = Some(existing.into_string());
                return self.update(user, context).await;
            }
        }

        let properties = mapper::user_to_properties(&user, Utc::now());
        trace!("Person properties for '{}': {:?}", user_name, properties);
        let id = self.repository.create_person(properties).await?;
        info!(
            "Created person {} for user '{}' (request: '{}')",
            id, user_name, context.request_id
        );

        if let Some(active) = user.active {
            self.apply_active(&id, active).await?;
        }

        user.id = Some(id.into_string());
        Ok(user)
    }

    async fn get(&self, id: &str, context: &RequestContext) -> ScimResult<Option<User>> {
        let id = NativeId::new(id);
        if !self.find_person(&id).await? {
            debug!("User {} not found (request: '{}')", id, context.request_id);
            return Ok(None);
        }
        self.load(&id).await.map(Some)
    }

    async fn list(
        &self,
        query: &ListQuery,
        filter: Option<&ResourceFilter<User>>,
        context: &RequestContext,
    ) -> ScimResult<Vec<User>> {
        let paging = query.paging();
        debug!(
            "Listing users skip {} max {} (request: '{}')",
            paging.skip_count, paging.max_items, context.request_id
        );

        let people = self.repository.get_people(paging).await?;
        let mut users = Vec::with_capacity(people.page.len());
        for person in &people.page {
            users.push(self.load(&person.node_id).await?);
        }

        Ok(apply_filter(users, filter))
    }

    async fn update(&self, user: User, context: &RequestContext) -> ScimResult<User> {
        let id = required_id(user.id.as_deref())?;
        check_external_id(user.external_id.as_deref())?;
        self.require_person(&id).await?;

        let properties = mapper::user_update_properties(&user, Utc::now());
        trace!("Merging properties onto person {}: {:?}", id, properties);
        self.repository.add_properties(&id, properties).await?;

        if let Some(active) = user.active {
            self.apply_active(&id, active).await?;
        }

        info!("Updated person {} (request: '{}')", id, context.request_id);
        Ok(user)
    }

    async fn delete(&self, id: &str, context: &RequestContext) -> ScimResult<()> {
        let id = NativeId::new(id);
        self.require_person(&id).await?;

        self.repository.add_aspect(&id, Aspect::PersonDisabled).await?;

        let email = self.repository.get_property(&id, Property::Email).await?;
        if let Some(email) = email.as_ref().and_then(PropertyValue::as_text) {
            if !email.is_empty() {
                let retired = format!("{}_{}", Utc::now().timestamp_millis(), email);
                self.repository
                    .set_property(&id, Property::Email, PropertyValue::text(retired))
                    .await?;
            }
        }

        info!(
            "Disabled person {} (request: '{}')",
            id, context.request_id
        );
        Ok(())
    }
}
