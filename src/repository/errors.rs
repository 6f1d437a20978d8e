//! Repository-specific error types.
//!
//! These errors describe failures of the identity repository and its search
//! service. They carry no SCIM semantics. The reconcilers surface duplicate
//! names as [`ScimError::Conflict`](crate::error::ScimError::Conflict) and
//! everything else as
//! [`ScimError::RepositoryUnavailable`](crate::error::ScimError::RepositoryUnavailable).

use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// The native id that did not resolve
        id: String,
    },

    #[error("Authority not found: {name}")]
    AuthorityNotFound {
        /// The authority name that did not resolve
        name: String,
    },

    #[error("Authority already exists: {name}")]
    DuplicateAuthority {
        /// The conflicting authority name
        name: String,
    },

    #[error("Person with userName '{user_name}' already exists")]
    DuplicateUserName {
        /// The conflicting username
        user_name: String,
    },

    #[error("Invalid data: {message}")]
    InvalidData {
        /// Description of the invalid data
        message: String,
    },

    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of the query error
        message: String,
    },

    #[error("Repository unavailable: {message}")]
    Unavailable {
        /// Description of the outage
        message: String,
    },
}

impl RepositoryError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn authority_not_found(name: impl Into<String>) -> Self {
        Self::AuthorityNotFound { name: name.into() }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RepositoryError::node_not_found("abc");
        assert_eq!(error.to_string(), "Node not found: abc");

        let error = RepositoryError::DuplicateAuthority {
            name: "GROUP_Sales".to_string(),
        };
        assert!(error.to_string().contains("GROUP_Sales"));
    }
}
