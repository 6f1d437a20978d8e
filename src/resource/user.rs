//! SCIM User resource.

use super::USER_SCHEMA;
use serde::{Deserialize, Serialize};

/// Phone number type mapped to the native mobile property.
pub const PHONE_TYPE_MOBILE: &str = "mobile";

/// Phone number type mapped to the native telephone property.
pub const PHONE_TYPE_WORK: &str = "work";

/// Email type emitted when reading users back.
pub const EMAIL_TYPE_WORK: &str = "work";

fn user_schemas() -> Vec<String> {
    vec![USER_SCHEMA.to_string()]
}

/// A SCIM User.
///
/// Every field except `schemas` is optional; a `None` field is left untouched
/// on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default = "user_schemas")]
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<Email>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            schemas: user_schemas(),
            id: None,
            external_id: None,
            user_name: None,
            name: None,
            title: None,
            emails: Vec::new(),
            phone_numbers: Vec::new(),
            active: None,
        }
    }
}

impl User {
    /// Create a user with the given username.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
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

    pub fn with_name(mut self, given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        self.name = Some(Name {
            given_name: Some(given_name.into()),
            family_name: Some(family_name.into()),
        });
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_email(mut self, value: impl Into<String>, email_type: impl Into<String>) -> Self {
        self.emails.push(Email::new(value, email_type));
        self
    }

    pub fn with_phone_number(
        mut self,
        value: impl Into<String>,
        phone_type: impl Into<String>,
    ) -> Self {
        self.phone_numbers.push(PhoneNumber::new(value, phone_type));
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// The first email that carries a value, regardless of its type.
    pub fn first_email(&self) -> Option<&str> {
        self.emails.iter().find_map(|email| email.value.as_deref())
    }

    /// The first phone number of the given type that carries a value.
    pub fn phone_number_of_type(&self, phone_type: &str) -> Option<&str> {
        self.phone_numbers
            .iter()
            .filter(|phone| phone.phone_type.as_deref() == Some(phone_type))
            .find_map(|phone| phone.value.as_deref())
    }
}

/// The components of a user's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// An email address entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

impl Email {
    pub fn new(value: impl Into<String>, email_type: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            email_type: Some(email_type.into()),
            primary: None,
        }
    }
}

/// A phone number entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
}

impl PhoneNumber {
    pub fn new(value: impl Into<String>, phone_type: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            phone_type: Some(phone_type.into()),
        }
    }
}
