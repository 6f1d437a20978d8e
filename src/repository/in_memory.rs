//! In-memory identity repository.
//!
//! This module provides a thread-safe in-memory implementation of both
//! [`IdentityRepository`] and [`SearchService`] using nested maps behind a
//! tokio `RwLock`. It is designed for testing, development and embedding
//! scenarios where a real identity store is not available.
//!
//! # Features
//!
//! * People indexed by username, groups indexed by qualified authority name
//! * Zone membership for group listing
//! * Direct and transitive group containment
//! * Case-insensitive property search with tracked result-set cursors
//! * A journal of membership changes and paged reads for verification
//! * Failure injection through [`InMemoryRepository::set_unavailable`]
//!
//! # Example Usage
//!
//! ```rust
//! use scim_reconciler::repository::{IdentityRepository, InMemoryRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryRepository::new();
//! let zones = vec!["APP.DEFAULT".to_string()];
//! let name = repository.create_authority("Sales", "Sales", &zones).await?;
//! assert_eq!(name, "GROUP_Sales");
//! assert!(repository.authority_exists("GROUP_Sales").await?);
//! # Ok(())
//! # }
//! ```

use crate::repository::{
    Aspect, AuthorityInfo, IdentityRepository, NativeId, NodeType, PagingRequest, PagingResults,
    PersonInfo, Property, PropertyMap, PropertyValue, RepositoryError, ResultSet,
    SearchParameters, SearchQuery, SearchService, StoreRef, group_authority_name,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A recorded repository call, kept for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    PersonCreated { node_id: NativeId },
    AuthorityCreated { name: String },
    AuthorityDeleted { name: String },
    MemberAdded { group: String, member: String },
    MemberRemoved { group: String, member: String },
    PeoplePaged(PagingRequest),
    AuthoritiesPaged { zone: String, paging: PagingRequest },
}

impl JournalEntry {
    /// Whether this entry changed a group's membership.
    pub fn is_membership_change(&self) -> bool {
        matches!(self, Self::MemberAdded { .. } | Self::MemberRemoved { .. })
    }
}

#[derive(Debug, Clone)]
struct Node {
    node_type: NodeType,
    sequence: u64,
    properties: PropertyMap,
    aspects: BTreeSet<Aspect>,
}

#[derive(Debug, Clone)]
struct GroupAuthority {
    node_id: NativeId,
    zones: BTreeSet<String>,
    members: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    nodes: HashMap<NativeId, Node>,
    // username -> person node
    people: BTreeMap<String, NativeId>,
    // qualified group name -> authority
    groups: BTreeMap<String, GroupAuthority>,
    journal: Vec<JournalEntry>,
    next_sequence: u64,
}

impl RepositoryState {
    fn node(&self, id: &NativeId) -> Result<&Node, RepositoryError> {
        self.nodes
            .get(id)
            .ok_or_else(|| RepositoryError::node_not_found(id.as_str()))
    }

    fn node_mut(&mut self, id: &NativeId) -> Result<&mut Node, RepositoryError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| RepositoryError::node_not_found(id.as_str()))
    }

    fn insert_node(&mut self, node_type: NodeType, properties: PropertyMap) -> NativeId {
        let id = NativeId::new(Uuid::new_v4().to_string());
        self.next_sequence += 1;
        self.nodes.insert(
            id.clone(),
            Node {
                node_type,
                sequence: self.next_sequence,
                properties,
                aspects: BTreeSet::new(),
            },
        );
        id
    }

    fn put_property(
        &mut self,
        id: &NativeId,
        property: Property,
        value: PropertyValue,
    ) -> Result<(), RepositoryError> {
        let node = self.node(id)?;
        match (node.node_type, property) {
            (NodeType::Person, Property::UserName) => {
                let new_name = value
                    .as_text()
                    .ok_or_else(|| RepositoryError::invalid_data("userName must be text"))?
                    .to_string();
                let old_name = node
                    .properties
                    .get(&Property::UserName)
                    .and_then(PropertyValue::as_text)
                    .map(str::to_string);

                if old_name.as_deref() != Some(new_name.as_str()) {
                    if self.people.contains_key(&new_name) {
                        return Err(RepositoryError::DuplicateUserName {
                            user_name: new_name,
                        });
                    }
                    if let Some(old_name) = old_name {
                        self.people.remove(&old_name);
                    }
                    self.people.insert(new_name, id.clone());
                }
            }
            (NodeType::AuthorityContainer, Property::AuthorityName) => {
                return Err(RepositoryError::invalid_data(
                    "authority name cannot be changed",
                ));
            }
            _ => {}
        }

        self.node_mut(id)?.properties.insert(property, value);
        Ok(())
    }

    fn group(&self, name: &str) -> Result<&GroupAuthority, RepositoryError> {
        self.groups
            .get(name)
            .ok_or_else(|| RepositoryError::authority_not_found(name))
    }

    fn authority_exists(&self, name: &str) -> bool {
        self.groups.contains_key(name) || self.people.contains_key(name)
    }

    fn text_property(&self, id: &NativeId, property: Property) -> Option<String> {
        self.nodes
            .get(id)
            .and_then(|node| node.properties.get(&property))
            .and_then(PropertyValue::as_text)
            .map(str::to_string)
    }
}

/// Thread-safe in-memory identity repository.
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<RepositoryState>>,
    open_result_sets: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`RepositoryError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of search result sets that have not been released yet.
    pub fn open_result_sets(&self) -> usize {
        self.open_result_sets.load(Ordering::SeqCst)
    }

    /// All recorded calls in order.
    pub async fn journal(&self) -> Vec<JournalEntry> {
        self.state.read().await.journal.clone()
    }

    /// Recorded membership additions and removals in order.
    pub async fn membership_changes(&self) -> Vec<JournalEntry> {
        self.state
            .read()
            .await
            .journal
            .iter()
            .filter(|entry| entry.is_membership_change())
            .cloned()
            .collect()
    }

    pub async fn clear_journal(&self) {
        self.state.write().await.journal.clear();
    }

    /// Get repository statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryRepositoryStats {
        let state = self.state.read().await;
        InMemoryRepositoryStats {
            person_count: state.people.len(),
            group_count: state.groups.len(),
            membership_count: state.groups.values().map(|g| g.members.len()).sum(),
        }
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepositoryError::unavailable("in-memory repository is offline"))
        } else {
            Ok(())
        }
    }

    fn page<T: Clone>(items: &[T], paging: PagingRequest) -> PagingResults<T> {
        let page: Vec<T> = items
            .iter()
            .skip(paging.skip_count)
            .take(paging.max_items)
            .cloned()
            .collect();
        let has_more_items = items.len() > paging.skip_count.saturating_add(page.len());
        PagingResults {
            page,
            has_more_items,
        }
    }
}

impl IdentityRepository for InMemoryRepository {
    async fn exists(&self, id: &NativeId) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.state.read().await.nodes.contains_key(id))
    }

    async fn node_type(&self, id: &NativeId) -> Result<Option<NodeType>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .await
            .nodes
            .get(id)
            .map(|node| node.node_type))
    }

    async fn get_property(
        &self,
        id: &NativeId,
        property: Property,
    ) -> Result<Option<PropertyValue>, RepositoryError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.node(id)?.properties.get(&property).cloned())
    }

    async fn get_properties(&self, id: &NativeId) -> Result<PropertyMap, RepositoryError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.node(id)?.properties.clone())
    }

    async fn set_property(
        &self,
        id: &NativeId,
        property: Property,
        value: PropertyValue,
    ) -> Result<(), RepositoryError> {
        self.check_available()?;
        self.state.write().await.put_property(id, property, value)
    }

    async fn add_properties(
        &self,
        id: &NativeId,
        properties: PropertyMap,
    ) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.node(id)?;
        for (property, value) in properties {
            state.put_property(id, property, value)?;
        }
        Ok(())
    }

    async fn has_aspect(&self, id: &NativeId, aspect: Aspect) -> Result<bool, RepositoryError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.node(id)?.aspects.contains(&aspect))
    }

    async fn add_aspect(&self, id: &NativeId, aspect: Aspect) -> Result<(), RepositoryError> {
        self.check_available()?;
        self.state.write().await.node_mut(id)?.aspects.insert(aspect);
        Ok(())
    }

    async fn remove_aspect(&self, id: &NativeId, aspect: Aspect) -> Result<(), RepositoryError> {
        self.check_available()?;
        self.state.write().await.node_mut(id)?.aspects.remove(&aspect);
        Ok(())
    }

    async fn create_person(&self, properties: PropertyMap) -> Result<NativeId, RepositoryError> {
        self.check_available()?;
        let user_name = properties
            .get(&Property::UserName)
            .and_then(PropertyValue::as_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RepositoryError::invalid_data("person requires a userName"))?
            .to_string();

        let mut state = self.state.write().await;
        if state.authority_exists(&user_name) {
            return Err(RepositoryError::DuplicateUserName { user_name });
        }

        let id = state.insert_node(NodeType::Person, properties);
        state.people.insert(user_name, id.clone());
        state.journal.push(JournalEntry::PersonCreated {
            node_id: id.clone(),
        });
        Ok(id)
    }

    async fn get_people(
        &self,
        paging: PagingRequest,
    ) -> Result<PagingResults<PersonInfo>, RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.journal.push(JournalEntry::PeoplePaged(paging));

        let people: Vec<PersonInfo> = state
            .people
            .iter()
            .map(|(user_name, node_id)| PersonInfo {
                node_id: node_id.clone(),
                user_name: user_name.clone(),
                first_name: state.text_property(node_id, Property::FirstName),
                last_name: state.text_property(node_id, Property::LastName),
            })
            .collect();

        Ok(Self::page(&people, paging))
    }

    async fn create_authority(
        &self,
        short_name: &str,
        display_name: &str,
        zones: &[String],
    ) -> Result<String, RepositoryError> {
        self.check_available()?;
        if short_name.is_empty() {
            return Err(RepositoryError::invalid_data(
                "authority short name cannot be empty",
            ));
        }

        let name = group_authority_name(short_name);
        let mut state = self.state.write().await;
        if state.authority_exists(&name) {
            return Err(RepositoryError::DuplicateAuthority { name });
        }

        let mut properties = PropertyMap::new();
        properties.insert(Property::AuthorityName, PropertyValue::text(name.clone()));
        properties.insert(
            Property::AuthorityDisplayName,
            PropertyValue::text(display_name),
        );
        let node_id = state.insert_node(NodeType::AuthorityContainer, properties);
        state.groups.insert(
            name.clone(),
            GroupAuthority {
                node_id,
                zones: zones.iter().cloned().collect(),
                members: BTreeSet::new(),
            },
        );
        state
            .journal
            .push(JournalEntry::AuthorityCreated { name: name.clone() });
        Ok(name)
    }

    async fn authority_exists(&self, authority_name: &str) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.state.read().await.authority_exists(authority_name))
    }

    async fn authority_node_id(
        &self,
        authority_name: &str,
    ) -> Result<Option<NativeId>, RepositoryError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .groups
            .get(authority_name)
            .map(|group| group.node_id.clone())
            .or_else(|| state.people.get(authority_name).cloned()))
    }

    async fn get_authorities_info(
        &self,
        zone: &str,
        paging: PagingRequest,
    ) -> Result<PagingResults<AuthorityInfo>, RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.journal.push(JournalEntry::AuthoritiesPaged {
            zone: zone.to_string(),
            paging,
        });

        let groups: Vec<AuthorityInfo> = state
            .groups
            .iter()
            .filter(|(_, group)| group.zones.contains(zone))
            .map(|(name, group)| AuthorityInfo {
                authority_name: name.clone(),
                display_name: state.text_property(&group.node_id, Property::AuthorityDisplayName),
            })
            .collect();

        Ok(Self::page(&groups, paging))
    }

    async fn get_contained_authorities(
        &self,
        group_name: &str,
        immediate_only: bool,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        self.check_available()?;
        let state = self.state.read().await;
        let direct = state.group(group_name)?.members.clone();
        if immediate_only {
            return Ok(direct);
        }

        let mut contained = BTreeSet::new();
        let mut pending: Vec<String> = direct.into_iter().collect();
        while let Some(name) = pending.pop() {
            if name == group_name || !contained.insert(name.clone()) {
                continue;
            }
            if let Some(nested) = state.groups.get(&name) {
                pending.extend(nested.members.iter().cloned());
            }
        }
        Ok(contained)
    }

    async fn add_authority(&self, parent_name: &str, child_name: &str) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.group(parent_name)?;
        if !state.authority_exists(child_name) {
            return Err(RepositoryError::authority_not_found(child_name));
        }
        if parent_name == child_name {
            return Err(RepositoryError::invalid_data(format!(
                "authority '{}' cannot contain itself",
                parent_name
            )));
        }

        if let Some(group) = state.groups.get_mut(parent_name) {
            group.members.insert(child_name.to_string());
        }
        state.journal.push(JournalEntry::MemberAdded {
            group: parent_name.to_string(),
            member: child_name.to_string(),
        });
        Ok(())
    }

    async fn remove_authority(
        &self,
        parent_name: &str,
        child_name: &str,
    ) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.group(parent_name)?;

        if let Some(group) = state.groups.get_mut(parent_name) {
            group.members.remove(child_name);
        }
        state.journal.push(JournalEntry::MemberRemoved {
            group: parent_name.to_string(),
            member: child_name.to_string(),
        });
        Ok(())
    }

    async fn delete_authority(&self, authority_name: &str) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let removed = state
            .groups
            .remove(authority_name)
            .ok_or_else(|| RepositoryError::authority_not_found(authority_name))?;

        state.nodes.remove(&removed.node_id);
        for group in state.groups.values_mut() {
            group.members.remove(authority_name);
        }
        state.journal.push(JournalEntry::AuthorityDeleted {
            name: authority_name.to_string(),
        });
        Ok(())
    }
}

impl SearchService for InMemoryRepository {
    async fn query(&self, parameters: &SearchParameters) -> Result<ResultSet, RepositoryError> {
        self.check_available()?;

        let SearchQuery::PropertyEquals {
            property,
            value,
            case_insensitive,
        } = &parameters.query;

        let mut matches: Vec<(u64, NativeId)> = Vec::new();
        if parameters.store == StoreRef::workspace() {
            let state = self.state.read().await;
            let wanted = value.to_lowercase();
            for (id, node) in &state.nodes {
                let Some(candidate) = node.properties.get(property).and_then(PropertyValue::as_text)
                else {
                    continue;
                };
                let matched = if *case_insensitive {
                    candidate.to_lowercase() == wanted
                } else {
                    candidate == value.as_str()
                };
                if matched {
                    matches.push((node.sequence, id.clone()));
                }
            }
        }

        // Creation order keeps "first match" stable
        matches.sort_by_key(|(sequence, _)| *sequence);

        self.open_result_sets.fetch_add(1, Ordering::SeqCst);
        let open = self.open_result_sets.clone();
        Ok(ResultSet::with_release(
            matches.into_iter().map(|(_, id)| id).collect(),
            move || {
                open.fetch_sub(1, Ordering::SeqCst);
            },
        ))
    }
}

/// Statistics about the current state of the in-memory repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryRepositoryStats {
    /// Number of people
    pub person_count: usize,
    /// Number of group authorities
    pub group_count: usize,
    /// Total number of direct memberships across all groups
    pub membership_count: usize,
}
