//! SCIM ListResponse envelope.

use super::LIST_RESPONSE_SCHEMA;
use serde::{Deserialize, Serialize};

/// One page of listed resources.
///
/// `total_results` counts the resources on this page after filtering; the
/// repository paging API does not report an overall total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub schemas: Vec<String>,
    pub total_results: usize,
    pub start_index: usize,
    pub items_per_page: usize,
    #[serde(rename = "Resources")]
    pub resources: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(resources: Vec<T>, start_index: usize) -> Self {
        Self {
            schemas: vec![LIST_RESPONSE_SCHEMA.to_string()],
            total_results: resources.len(),
            start_index,
            items_per_page: resources.len(),
            resources,
        }
    }
}
