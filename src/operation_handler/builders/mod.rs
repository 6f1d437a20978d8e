//! Builder utilities for operation requests and queries.

mod query;
mod request;
