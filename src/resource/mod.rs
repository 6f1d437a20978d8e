//! SCIM resource model consumed and produced by the reconcilers.
//!
//! Resources are plain structs whose optional fields mean "no change" when
//! absent. They serialize with the SCIM attribute names (`userName`,
//! `externalId`, `phoneNumbers`, ...), so the operation handler can move them
//! in and out of JSON payloads without any further mapping.
//!
//! # Key Components
//!
//! * [`User`] and [`Group`] - the two reconciled resource types
//! * [`RequestContext`] - request tracking for logging
//! * [`ListQuery`] - 1-based SCIM paging parameters
//! * [`ListResponse`] - the SCIM ListResponse envelope
//! * [`ETag`] - content-derived weak entity tags
//! * [`ScimResource`] - id and schema access shared by both resource types

pub mod context;
pub mod group;
pub mod list;
pub mod user;
pub mod version;

pub use context::{ListQuery, RequestContext};
pub use group::{Group, GroupMember, MemberType};
pub use list::ListResponse;
pub use user::{Email, Name, PhoneNumber, User};
pub use version::ETag;

/// Core schema URI of SCIM users.
pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";

/// Core schema URI of SCIM groups.
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

/// Message schema URI of list responses.
pub const LIST_RESPONSE_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";

/// Access to the attributes every reconciled resource carries.
pub trait ScimResource {
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);
    fn schemas(&self) -> &[String];
}

impl ScimResource for User {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn schemas(&self) -> &[String] {
        &self.schemas
    }
}

impl ScimResource for Group {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn schemas(&self) -> &[String] {
        &self.schemas
    }
}
