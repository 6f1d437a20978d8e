//! Search service used to look up nodes by property value.
//!
//! Queries return a [`ResultSet`], which may pin a repository-side cursor.
//! The cursor is released when the result set is closed or dropped, so a
//! result set can never outlive the call that requested it unless the caller
//! deliberately keeps it.

use super::{NativeId, Property, RepositoryError};
use std::fmt;
use std::future::Future;

/// Identifies a logical store inside the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreRef(String);

impl StoreRef {
    /// The live workspace store holding current people and groups.
    pub const WORKSPACE_SPACES_STORE: &'static str = "workspace://SpacesStore";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn workspace() -> Self {
        Self::new(Self::WORKSPACE_SPACES_STORE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StoreRef {
    fn default() -> Self {
        Self::workspace()
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query expressions supported by the search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Equality on a single property.
    PropertyEquals {
        property: Property,
        value: String,
        case_insensitive: bool,
    },
}

/// A query scoped to one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub store: StoreRef,
    pub query: SearchQuery,
}

impl SearchParameters {
    pub fn new(store: StoreRef, query: SearchQuery) -> Self {
        Self { store, query }
    }
}

/// Matches returned by a query together with the cursor that produced them.
pub struct ResultSet {
    node_ids: Vec<NativeId>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ResultSet {
    /// A result set that holds no repository-side resources.
    pub fn new(node_ids: Vec<NativeId>) -> Self {
        Self {
            node_ids,
            release: None,
        }
    }

    /// A result set whose `release` callback frees the backing cursor.
    pub fn with_release(node_ids: Vec<NativeId>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            node_ids,
            release: Some(Box::new(release)),
        }
    }

    /// Matching node ids in repository order.
    pub fn node_ids(&self) -> &[NativeId] {
        &self.node_ids
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Release the cursor now.
    pub fn close(mut self) {
        self.release_cursor();
    }

    fn release_cursor(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ResultSet {
    fn drop(&mut self) {
        self.release_cursor();
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("node_ids", &self.node_ids)
            .field("open", &self.release.is_some())
            .finish()
    }
}

/// Property search over the repository.
pub trait SearchService: Send + Sync {
    fn query(
        &self,
        parameters: &SearchParameters,
    ) -> impl Future<Output = Result<ResultSet, RepositoryError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_result_set_releases_on_close() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let results = ResultSet::with_release(vec![NativeId::from("a")], move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        results.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_result_set_releases_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        {
            let results = ResultSet::with_release(Vec::new(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            assert!(results.is_empty());
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_workspace_store() {
        assert_eq!(StoreRef::default().as_str(), "workspace://SpacesStore");
    }
}
