//! Identity repository abstraction consumed by the reconcilers.
//!
//! The repository owns the native representation of people and authority
//! groups. The reconciliation engine never holds on to native records: it reads
//! and writes them one property, aspect or relationship at a time through the
//! [`IdentityRepository`] trait, and looks records up by external id through
//! the [`SearchService`] trait.
//!
//! # Native model
//!
//! - A node is identified by a [`NativeId`] and has a [`NodeType`] discriminant.
//! - Node data lives in a property bag keyed by [`Property`].
//! - Flags are modelled as [`Aspect`]s (a disabled person carries
//!   [`Aspect::PersonDisabled`]).
//! - People and groups are both *authorities*. A person's authority name is its
//!   username, a group's authority name is its short name prefixed with
//!   [`GROUP_PREFIX`].
//!
//! # Example Usage
//!
//! ```rust
//! use scim_reconciler::repository::{
//!     IdentityRepository, InMemoryRepository, Property, PropertyMap, PropertyValue,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryRepository::new();
//!
//! let mut properties = PropertyMap::new();
//! properties.insert(Property::UserName, PropertyValue::text("alice"));
//! let id = repository.create_person(properties).await?;
//!
//! assert!(repository.exists(&id).await?);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;
pub mod search;

pub use errors::RepositoryError;
pub use in_memory::{InMemoryRepository, InMemoryRepositoryStats, JournalEntry};
pub use search::{ResultSet, SearchParameters, SearchQuery, SearchService, StoreRef};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;

/// Prefix carried by every group authority name.
pub const GROUP_PREFIX: &str = "GROUP_";

/// Zone holding application-visible groups.
pub const ZONE_APP_DEFAULT: &str = "APP.DEFAULT";

/// Zone holding authorities managed by the repository's own authentication.
pub const ZONE_AUTH_ALF: &str = "AUTH.ALF";

/// Qualified authority name for a group short name.
pub fn group_authority_name(short_name: &str) -> String {
    format!("{}{}", GROUP_PREFIX, short_name)
}

/// Unique identifier of a native node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeId(String);

impl NativeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NativeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Type discriminant of a native node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A user account
    Person,
    /// A group authority
    AuthorityContainer,
}

/// Keys of the native property bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    UserName,
    FirstName,
    LastName,
    Email,
    Mobile,
    Telephone,
    JobTitle,
    AuthorityName,
    AuthorityDisplayName,
    ExternalId,
    LastSyncDate,
}

/// A native property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    DateTime(DateTime<Utc>),
}

impl PropertyValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The text content, or `None` for non-text values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::DateTime(_) => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(at) => Some(at),
            Self::Text(_) => None,
        }
    }
}

/// Native property bag.
pub type PropertyMap = BTreeMap<Property, PropertyValue>;

/// Marker aspects attached to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aspect {
    /// The person account is disabled.
    PersonDisabled,
}

/// 0-based page request understood by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingRequest {
    pub skip_count: usize,
    pub max_items: usize,
}

impl PagingRequest {
    pub fn new(skip_count: usize, max_items: usize) -> Self {
        Self {
            skip_count,
            max_items,
        }
    }

    /// Convert a SCIM 1-based start index into a repository page.
    ///
    /// Start indices below 1 are interpreted as 1.
    pub fn from_start_index(start_index: usize, count: usize) -> Self {
        Self::new(start_index.saturating_sub(1), count)
    }
}

/// One page of repository results.
#[derive(Debug, Clone, PartialEq)]
pub struct PagingResults<T> {
    pub page: Vec<T>,
    pub has_more_items: bool,
}

/// Summary of a person as returned by paged people listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonInfo {
    pub node_id: NativeId,
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Summary of a group authority as returned by paged authority listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorityInfo {
    pub authority_name: String,
    pub display_name: Option<String>,
}

/// Native identity store operations used by the reconcilers.
///
/// Every call is an atomic single-property or single-relationship operation.
/// Atomicity across calls is the responsibility of the surrounding request.
pub trait IdentityRepository: Send + Sync {
    /// Check whether a node exists.
    fn exists(
        &self,
        id: &NativeId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Type of a node, `None` when the node does not exist.
    fn node_type(
        &self,
        id: &NativeId,
    ) -> impl Future<Output = Result<Option<NodeType>, RepositoryError>> + Send;

    fn get_property(
        &self,
        id: &NativeId,
        property: Property,
    ) -> impl Future<Output = Result<Option<PropertyValue>, RepositoryError>> + Send;

    fn get_properties(
        &self,
        id: &NativeId,
    ) -> impl Future<Output = Result<PropertyMap, RepositoryError>> + Send;

    fn set_property(
        &self,
        id: &NativeId,
        property: Property,
        value: PropertyValue,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Merge properties onto a node; properties not in `properties` are kept.
    fn add_properties(
        &self,
        id: &NativeId,
        properties: PropertyMap,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn has_aspect(
        &self,
        id: &NativeId,
        aspect: Aspect,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn add_aspect(
        &self,
        id: &NativeId,
        aspect: Aspect,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn remove_aspect(
        &self,
        id: &NativeId,
        aspect: Aspect,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Create a person node. `properties` must carry [`Property::UserName`].
    fn create_person(
        &self,
        properties: PropertyMap,
    ) -> impl Future<Output = Result<NativeId, RepositoryError>> + Send;

    /// Page through people ordered by username.
    fn get_people(
        &self,
        paging: PagingRequest,
    ) -> impl Future<Output = Result<PagingResults<PersonInfo>, RepositoryError>> + Send;

    /// Create a group authority and return its qualified name.
    fn create_authority(
        &self,
        short_name: &str,
        display_name: &str,
        zones: &[String],
    ) -> impl Future<Output = Result<String, RepositoryError>> + Send;

    fn authority_exists(
        &self,
        authority_name: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Node backing a person or group authority.
    fn authority_node_id(
        &self,
        authority_name: &str,
    ) -> impl Future<Output = Result<Option<NativeId>, RepositoryError>> + Send;

    /// Page through group authorities in a zone ordered by authority name.
    fn get_authorities_info(
        &self,
        zone: &str,
        paging: PagingRequest,
    ) -> impl Future<Output = Result<PagingResults<AuthorityInfo>, RepositoryError>> + Send;

    /// Members of a group; only direct members when `immediate_only` is set.
    fn get_contained_authorities(
        &self,
        group_name: &str,
        immediate_only: bool,
    ) -> impl Future<Output = Result<BTreeSet<String>, RepositoryError>> + Send;

    fn add_authority(
        &self,
        parent_name: &str,
        child_name: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn remove_authority(
        &self,
        parent_name: &str,
        child_name: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a group authority outright.
    fn delete_authority(
        &self,
        authority_name: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
