//! Reconciler configuration.
//!
//! [`ReconcilerConfig`] carries the tunables shared by both reconcilers. It
//! can be built in code through the `with_*` methods or deserialized from
//! JSON; fields missing from the JSON document take their default values.
//!
//! # Example
//!
//! ```rust
//! use scim_reconciler::ReconcilerConfig;
//!
//! let config = ReconcilerConfig::from_json_str(r#"{"max_short_name_length": 20}"#).unwrap();
//! assert_eq!(config.max_short_name_length, 20);
//! assert_eq!(config.group_list_zone, "APP.DEFAULT");
//! ```

use crate::error::ScimResult;
use crate::repository::{StoreRef, ZONE_APP_DEFAULT, ZONE_AUTH_ALF};
use serde::{Deserialize, Serialize};

/// Configuration for the user and group reconcilers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Maximum length of a generated group short name before any suffix.
    pub max_short_name_length: usize,
    /// Highest collision suffix probed before giving up.
    pub max_name_suffix: u32,
    /// Zones every newly created group is placed in.
    pub default_zones: Vec<String>,
    /// Zone whose groups are returned by group listing.
    pub group_list_zone: String,
    /// Store searched for external ids.
    pub store: String,
    /// Serialize concurrent creations sharing a correlation key.
    pub serialize_creation: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_short_name_length: 30,
            max_name_suffix: 10_000,
            default_zones: vec![ZONE_APP_DEFAULT.to_string(), ZONE_AUTH_ALF.to_string()],
            group_list_zone: ZONE_APP_DEFAULT.to_string(),
            store: StoreRef::WORKSPACE_SPACES_STORE.to_string(),
            serialize_creation: true,
        }
    }
}

impl ReconcilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> ScimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_short_name_length(mut self, length: usize) -> Self {
        self.max_short_name_length = length;
        self
    }

    pub fn with_max_name_suffix(mut self, suffix: u32) -> Self {
        self.max_name_suffix = suffix;
        self
    }

    pub fn with_default_zones(mut self, zones: Vec<String>) -> Self {
        self.default_zones = zones;
        self
    }

    pub fn with_group_list_zone(mut self, zone: impl Into<String>) -> Self {
        self.group_list_zone = zone.into();
        self
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = store.into();
        self
    }

    pub fn with_serialize_creation(mut self, enabled: bool) -> Self {
        self.serialize_creation = enabled;
        self
    }

    /// The store searched for external ids.
    pub fn store_ref(&self) -> StoreRef {
        StoreRef::new(self.store.clone())
    }
}
