//! SCIM Group resource.

use super::GROUP_SCHEMA;
use serde::{Deserialize, Serialize};

fn group_schemas() -> Vec<String> {
    vec![GROUP_SCHEMA.to_string()]
}

/// A SCIM Group.
///
/// On update, `members` is the complete desired direct membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default = "group_schemas")]
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            schemas: group_schemas(),
            id: None,
            external_id: None,
            display_name: None,
            members: Vec::new(),
        }
    }
}

impl Group {
    /// Create a group with the given display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Add a member reference by resource id.
    pub fn with_member(mut self, value: impl Into<String>) -> Self {
        self.members.push(GroupMember::new(value));
        self
    }

    /// Resource ids of all members.
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|member| member.value.as_str())
    }
}

/// Kind of resource a member reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberType {
    User,
    Group,
}

/// A reference to a group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Resource id of the member
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<MemberType>,
}

impl GroupMember {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            member_type: None,
        }
    }

    pub fn typed(value: impl Into<String>, member_type: MemberType) -> Self {
        Self {
            value: value.into(),
            member_type: Some(member_type),
        }
    }
}
