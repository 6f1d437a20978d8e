//! Group reconciliation onto authority containers.

use super::locks::{CreationLocks, external_id_key, group_name_key};
use super::{
    ExternalIdResolver, GroupNamingService, ResourceFilter, ResourceReconciler, apply_filter,
    check_external_id, mapper, required_id,
};
use crate::config::ReconcilerConfig;
use crate::error::{ScimError, ScimResult, ValidationError};
use crate::repository::{
    IdentityRepository, NativeId, NodeType, Property, PropertyValue, RepositoryError,
    SearchService,
};
use crate::resource::{Group, GroupMember, ListQuery, MemberType, RequestContext};
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Changes needed to turn one direct membership into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    /// Members present now but not desired
    pub removals: Vec<String>,
    /// Members desired but not present now
    pub additions: Vec<String>,
}

impl MembershipDelta {
    pub fn compute(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Self {
        Self {
            removals: current.difference(desired).cloned().collect(),
            additions: desired.difference(current).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Reconciles SCIM groups with group authorities.
///
/// Groups are hard-deleted. Membership updates only touch direct members and
/// only issue calls for members that actually change.
pub struct GroupReconciler<R> {
    repository: Arc<R>,
    resolver: ExternalIdResolver<R>,
    naming: GroupNamingService<R>,
    locks: CreationLocks,
    list_zone: String,
}

impl<R: IdentityRepository + SearchService> GroupReconciler<R> {
    pub fn new(repository: Arc<R>, config: ReconcilerConfig) -> Self {
        Self {
            resolver: ExternalIdResolver::new(repository.clone(), config.store_ref()),
            naming: GroupNamingService::new(repository.clone(), &config),
            locks: CreationLocks::new(config.serialize_creation),
            list_zone: config.group_list_zone,
            repository,
        }
    }

    /// Share creation locks with other reconciler instances in this process.
    pub fn with_locks(mut self, locks: CreationLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Authority name of the group node `id`, `None` if it is not a group.
    async fn find_group(&self, id: &NativeId) -> ScimResult<Option<String>> {
        if self.repository.node_type(id).await? != Some(NodeType::AuthorityContainer) {
            return Ok(None);
        }
        let name = self
            .repository
            .get_property(id, Property::AuthorityName)
            .await?;
        Ok(name.as_ref().and_then(PropertyValue::as_text).map(str::to_string))
    }

    async fn require_group(&self, id: &NativeId) -> ScimResult<String> {
        self.find_group(id)
            .await?
            .ok_or_else(|| ScimError::resource_not_found("Group", id.as_str()))
    }

    /// Authority name of a member reference.
    async fn member_authority(&self, reference: &str) -> ScimResult<String> {
        let id = NativeId::new(reference);
        let property = match self.repository.node_type(&id).await? {
            Some(NodeType::Person) => Property::UserName,
            Some(NodeType::AuthorityContainer) => Property::AuthorityName,
            None => return Err(ValidationError::broken_reference("members", reference).into()),
        };
        let name = self.repository.get_property(&id, property).await?;
        name.as_ref()
            .and_then(PropertyValue::as_text)
            .map(str::to_string)
            .ok_or_else(|| ValidationError::broken_reference("members", reference).into())
    }

    async fn member_reference(&self, authority_name: &str) -> ScimResult<Option<GroupMember>> {
        let Some(id) = self.repository.authority_node_id(authority_name).await? else {
            warn!("Member authority {} has no backing node", authority_name);
            return Ok(None);
        };
        let member_type = match self.repository.node_type(&id).await? {
            Some(NodeType::Person) => MemberType::User,
            Some(NodeType::AuthorityContainer) => MemberType::Group,
            None => return Ok(None),
        };
        Ok(Some(GroupMember::typed(id.into_string(), member_type)))
    }

    /// Authority names of the requested members, resolved before any write.
    ///
    /// `group_name` is the authority of the group being written, if it
    /// already exists; listing it as its own member is rejected.
    async fn resolve_members(
        &self,
        group: &Group,
        group_name: Option<&str>,
    ) -> ScimResult<BTreeSet<String>> {
        let mut desired = BTreeSet::new();
        for reference in group.member_ids() {
            let member = self.member_authority(reference).await?;
            if group_name == Some(member.as_str()) {
                return Err(ValidationError::custom(format!(
                    "Group {} cannot be a member of itself",
                    reference
                ))
                .into());
            }
            desired.insert(member);
        }
        Ok(desired)
    }

    /// Merge attributes onto an existing group node, then sync its members.
    async fn write(
        &self,
        id: &NativeId,
        group_name: &str,
        group: Group,
        desired: &BTreeSet<String>,
        context: &RequestContext,
    ) -> ScimResult<Group> {
        let properties = mapper::group_to_properties(&group, Utc::now());
        self.repository.add_properties(id, properties).await?;

        let delta = self.sync_members(group_name, desired, context).await?;
        info!(
            "Updated group {} ({} removed, {} added) (request: '{}')",
            group_name,
            delta.removals.len(),
            delta.additions.len(),
            context.request_id
        );
        Ok(group)
    }

    async fn sync_members(
        &self,
        group_name: &str,
        desired: &BTreeSet<String>,
        context: &RequestContext,
    ) -> ScimResult<MembershipDelta> {
        let current = self
            .repository
            .get_contained_authorities(group_name, true)
            .await?;
        let delta = MembershipDelta::compute(&current, desired);

        for member in &delta.removals {
            info!(
                "Removing {} from {} (request: '{}')",
                member, group_name, context.request_id
            );
            self.repository.remove_authority(group_name, member).await?;
        }
        for member in &delta.additions {
            info!(
                "Adding {} to {} (request: '{}')",
                member, group_name, context.request_id
            );
            self.repository.add_authority(group_name, member).await?;
        }

        Ok(delta)
    }
}

impl<R: IdentityRepository + SearchService> ResourceReconciler for GroupReconciler<R> {
    type Resource = Group;

    fn resource_type(&self) -> &'static str {
        "Group"
    }

    async fn create(&self, mut group: Group, context: &RequestContext) -> ScimResult<Group> {
        check_external_id(group.external_id.as_deref())?;
        let display_name = group
            .display_name
            .clone()
            .filter(|name| !name.trim().is_empty());
        if display_name.is_none() && group.external_id.is_none() {
            return Err(ValidationError::missing_required("displayName").into());
        }

        let _external_guard = match &group.external_id {
            Some(external_id) => self.locks.acquire(external_id_key("Group", external_id)).await,
            None => None,
        };

        if let Some(external_id) = &group.external_id {
            if let Some(existing) = self.resolver.resolve(external_id).await? {
                if self.find_group(&existing).await?.is_none() {
                    return Err(ValidationError::external_id_conflict(
                        external_id,
                        "User",
                        existing.as_str(),
                    )
                    .into());
                }
                info!(
                    "Group with external id '{}' matches existing node {}, updating (request: '{}')",
                    external_id, existing, context.request_id
                );
                group.id = Some(existing.into_string());
                return self.update(group, context).await;
            }
        }

        let display_name =
            display_name.ok_or_else(|| ValidationError::missing_required("displayName"))?;
        let base_name = self.naming.base_name(&display_name)?;
        let desired = self.resolve_members(&group, None).await?;
        let _name_guard = self.locks.acquire(group_name_key(&base_name)).await;

        let info = self.naming.allocate(&display_name).await?;
        let id = self
            .repository
            .authority_node_id(&info.full_name)
            .await?
            .ok_or_else(|| RepositoryError::authority_not_found(info.full_name.as_str()))?;
        info!(
            "Group '{}' created as {} with id {} (request: '{}')",
            display_name, info.full_name, id, context.request_id
        );

        group.id = Some(id.as_str().to_string());
        self.write(&id, &info.full_name, group, &desired, context).await
    }

    async fn get(&self, id: &str, context: &RequestContext) -> ScimResult<Option<Group>> {
        let id = NativeId::new(id);
        let Some(group_name) = self.find_group(&id).await? else {
            debug!("Group {} not found (request: '{}')", id, context.request_id);
            return Ok(None);
        };

        let properties = self.repository.get_properties(&id).await?;
        let contained = self
            .repository
            .get_contained_authorities(&group_name, true)
            .await?;

        let mut members = Vec::with_capacity(contained.len());
        for authority_name in &contained {
            if let Some(member) = self.member_reference(authority_name).await? {
                members.push(member);
            }
        }

        Ok(Some(mapper::group_from_properties(&id, &properties, members)))
    }

    async fn list(
        &self,
        query: &ListQuery,
        filter: Option<&ResourceFilter<Group>>,
        context: &RequestContext,
    ) -> ScimResult<Vec<Group>> {
        let paging = query.paging();
        debug!(
            "Listing groups in {} skip {} max {} (request: '{}')",
            self.list_zone, paging.skip_count, paging.max_items, context.request_id
        );

        let authorities = self
            .repository
            .get_authorities_info(&self.list_zone, paging)
            .await?;

        let mut groups = Vec::with_capacity(authorities.page.len());
        for authority in &authorities.page {
            let Some(id) = self
                .repository
                .authority_node_id(&authority.authority_name)
                .await?
            else {
                continue;
            };
            let properties = self.repository.get_properties(&id).await?;
            groups.push(mapper::group_from_properties(&id, &properties, Vec::new()));
        }

        Ok(apply_filter(groups, filter))
    }

    async fn update(&self, group: Group, context: &RequestContext) -> ScimResult<Group> {
        let id = required_id(group.id.as_deref())?;
        check_external_id(group.external_id.as_deref())?;
        let group_name = self.require_group(&id).await?;

        let desired = self.resolve_members(&group, Some(&group_name)).await?;
        self.write(&id, &group_name, group, &desired, context).await
    }

    async fn delete(&self, id: &str, context: &RequestContext) -> ScimResult<()> {
        let id = NativeId::new(id);
        let group_name = self.require_group(&id).await?;

        self.repository.delete_authority(&group_name).await?;
        info!(
            "Deleted group {} ({}) (request: '{}')",
            group_name, id, context.request_id
        );
        Ok(())
    }
}
