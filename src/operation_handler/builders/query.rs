//! Query builder utilities for ScimQuery

use crate::operation_handler::core::ScimQuery;
use crate::resource::ListQuery;

impl ScimQuery {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self {
            count: None,
            start_index: None,
            filter: None,
        }
    }

    /// Set pagination parameters.
    pub fn with_pagination(mut self, start_index: usize, count: usize) -> Self {
        self.start_index = Some(start_index);
        self.count = Some(count);
        self
    }

    /// Set filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The paging part of this query.
    pub fn to_list_query(&self) -> ListQuery {
        ListQuery {
            count: self.count,
            start_index: self.start_index,
        }
    }
}

impl Default for ScimQuery {
    fn default() -> Self {
        Self::new()
    }
}
