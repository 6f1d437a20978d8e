//! Collision-free group short names.
//!
//! A group's short name is derived from its display name: characters outside
//! `[A-Za-z0-9 _-]` are dropped, spaces and hyphens become underscores and the
//! result is cut to the configured length. When the resulting authority
//! already exists the service probes `<base>_1`, `<base>_2`, ... until it finds
//! a free name.

use crate::config::ReconcilerConfig;
use crate::error::{ScimError, ScimResult};
use crate::repository::{IdentityRepository, RepositoryError, group_authority_name};
use log::{debug, info};
use std::sync::Arc;

/// Names of a freshly created group authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Final short name, including any collision suffix
    pub short_name: String,
    /// Qualified authority name (`GROUP_<short_name>`)
    pub full_name: String,
    /// Display name exactly as supplied
    pub display_name: String,
}

/// Strip a display name down to the characters allowed in a short name.
pub fn sanitize_group_name(display_name: &str) -> String {
    display_name
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .replace([' ', '-'], "_")
}

/// Allocates and creates group authorities with unique short names.
pub struct GroupNamingService<R> {
    repository: Arc<R>,
    max_short_name_length: usize,
    max_name_suffix: u32,
    zones: Vec<String>,
}

impl<R: IdentityRepository> GroupNamingService<R> {
    pub fn new(repository: Arc<R>, config: &ReconcilerConfig) -> Self {
        Self {
            repository,
            max_short_name_length: config.max_short_name_length,
            max_name_suffix: config.max_name_suffix,
            zones: config.default_zones.clone(),
        }
    }

    /// The unsuffixed candidate short name for a display name.
    pub fn base_name(&self, display_name: &str) -> ScimResult<String> {
        let sanitized = sanitize_group_name(display_name);
        if sanitized.is_empty() {
            return Err(ScimError::invalid_name(display_name));
        }
        Ok(sanitized.chars().take(self.max_short_name_length).collect())
    }

    /// Pick a free short name and create the group authority under it.
    pub async fn allocate(&self, display_name: &str) -> ScimResult<GroupInfo> {
        let base = self.base_name(display_name)?;
        let mut suffix: u32 = 0;
        let mut candidate = base.clone();

        loop {
            if !self
                .repository
                .authority_exists(&group_authority_name(&candidate))
                .await?
            {
                match self
                    .repository
                    .create_authority(&candidate, display_name, &self.zones)
                    .await
                {
                    Ok(full_name) => {
                        info!(
                            "Created group authority {} for display name '{}'",
                            full_name, display_name
                        );
                        return Ok(GroupInfo {
                            short_name: candidate,
                            full_name,
                            display_name: display_name.to_string(),
                        });
                    }
                    // Taken between the probe and the create
                    Err(RepositoryError::DuplicateAuthority { name }) => {
                        debug!("Group authority {} was created concurrently", name);
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            suffix += 1;
            if suffix > self.max_name_suffix {
                // The base plus `_1..=_max` have all been probed
                return Err(ScimError::NameExhausted {
                    base,
                    attempts: suffix,
                });
            }
            candidate = format!("{}_{}", base, suffix);
            debug!("Probing group short name {}", candidate);
        }
    }
}
