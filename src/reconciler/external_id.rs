//! Correlation of incoming resources with native records by external id.

use crate::error::ScimResult;
use crate::repository::{NativeId, Property, SearchParameters, SearchQuery, SearchService, StoreRef};
use log::{debug, warn};
use std::sync::Arc;

/// Looks up the native record carrying a given external id.
///
/// Matching is case-insensitive. When several records share an external id
/// the first one returned by the search service is authoritative.
pub struct ExternalIdResolver<S> {
    search: Arc<S>,
    store: StoreRef,
}

impl<S: SearchService> ExternalIdResolver<S> {
    pub fn new(search: Arc<S>, store: StoreRef) -> Self {
        Self { search, store }
    }

    /// Resolve an external id to at most one native id.
    ///
    /// The result set is released before returning. On a failed query there
    /// is no result set to release.
    pub async fn resolve(&self, external_id: &str) -> ScimResult<Option<NativeId>> {
        let parameters = SearchParameters::new(
            self.store.clone(),
            SearchQuery::PropertyEquals {
                property: Property::ExternalId,
                value: external_id.to_string(),
                case_insensitive: true,
            },
        );

        let results = self.search.query(&parameters).await?;
        let found = results.node_ids().first().cloned();
        if results.len() > 1 {
            warn!(
                "External id '{}' matches {} records, using {}",
                external_id,
                results.len(),
                found.as_ref().map(NativeId::as_str).unwrap_or_default()
            );
        }
        results.close();

        debug!("Resolved external id '{}' to {:?}", external_id, found);
        Ok(found)
    }
}
