//! Request context and list query parameters.

use crate::repository::PagingRequest;
use uuid::Uuid;

/// Request context for reconciler operations.
///
/// Provides request tracking for logging and auditing purposes.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: String,
}

impl RequestContext {
    /// Create a new request context with a specific request ID.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Create a new request context with a generated request ID.
    pub fn with_generated_id() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::with_generated_id()
    }
}

/// Paging parameters for listing resources.
///
/// `start_index` is 1-based as in SCIM. Filtering is not part of the query:
/// list operations take a separate predicate applied to the fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum number of results to return
    pub count: Option<usize>,
    /// 1-based starting index
    pub start_index: Option<usize>,
}

impl ListQuery {
    /// Page size used when the query carries no count.
    pub const DEFAULT_COUNT: usize = 100;

    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the starting index.
    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = Some(start_index);
        self
    }

    /// Effective 1-based start index; anything below 1 counts as 1.
    pub fn effective_start_index(&self) -> usize {
        self.start_index.unwrap_or(1).max(1)
    }

    /// The 0-based repository page for this query.
    pub fn paging(&self) -> PagingRequest {
        PagingRequest::from_start_index(
            self.effective_start_index(),
            self.count.unwrap_or(Self::DEFAULT_COUNT),
        )
    }
}
