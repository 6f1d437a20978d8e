//! Translation between SCIM resources and native property maps.
//!
//! Every function here is pure: the caller supplies the sync timestamp and
//! whatever native state is needed for the reverse direction. Absent optional
//! fields never produce a property, so merging the result onto an existing
//! node leaves those properties untouched.

use crate::repository::{NativeId, Property, PropertyMap, PropertyValue};
use crate::resource::user::{EMAIL_TYPE_WORK, PHONE_TYPE_MOBILE, PHONE_TYPE_WORK};
use crate::resource::{Email, Group, GroupMember, Name, PhoneNumber, User};
use chrono::{DateTime, Utc};

fn put_text(properties: &mut PropertyMap, property: Property, value: Option<&str>) {
    if let Some(value) = value {
        properties.insert(property, PropertyValue::text(value));
    }
}

fn text(properties: &PropertyMap, property: Property) -> Option<String> {
    properties
        .get(&property)
        .and_then(PropertyValue::as_text)
        .map(str::to_string)
}

/// Native properties for a new person.
pub fn user_to_properties(user: &User, now: DateTime<Utc>) -> PropertyMap {
    let mut properties = PropertyMap::new();
    put_text(&mut properties, Property::UserName, user.user_name.as_deref());

    if let Some(name) = &user.name {
        put_text(&mut properties, Property::FirstName, name.given_name.as_deref());
        put_text(&mut properties, Property::LastName, name.family_name.as_deref());
    }

    put_text(&mut properties, Property::JobTitle, user.title.as_deref());
    put_text(
        &mut properties,
        Property::Mobile,
        user.phone_number_of_type(PHONE_TYPE_MOBILE),
    );
    put_text(
        &mut properties,
        Property::Telephone,
        user.phone_number_of_type(PHONE_TYPE_WORK),
    );
    put_text(&mut properties, Property::Email, user.first_email());
    put_text(&mut properties, Property::ExternalId, user.external_id.as_deref());
    properties.insert(Property::LastSyncDate, PropertyValue::DateTime(now));
    properties
}

/// Native properties to merge onto an existing person.
///
/// The username is never part of an update, so a sync cannot rename a user.
pub fn user_update_properties(user: &User, now: DateTime<Utc>) -> PropertyMap {
    let mut properties = user_to_properties(user, now);
    properties.remove(&Property::UserName);
    properties
}

/// Rebuild a SCIM user from a person's properties.
pub fn user_from_properties(id: &NativeId, properties: &PropertyMap, disabled: bool) -> User {
    let given_name = text(properties, Property::FirstName);
    let family_name = text(properties, Property::LastName);
    let name = (given_name.is_some() || family_name.is_some()).then(|| Name {
        given_name,
        family_name,
    });

    let emails = text(properties, Property::Email)
        .map(|email| vec![Email::new(email, EMAIL_TYPE_WORK)])
        .unwrap_or_default();

    let mut phone_numbers = Vec::new();
    if let Some(mobile) = text(properties, Property::Mobile) {
        phone_numbers.push(PhoneNumber::new(mobile, PHONE_TYPE_MOBILE));
    }
    if let Some(telephone) = text(properties, Property::Telephone) {
        phone_numbers.push(PhoneNumber::new(telephone, PHONE_TYPE_WORK));
    }

    User {
        id: Some(id.to_string()),
        external_id: text(properties, Property::ExternalId),
        user_name: text(properties, Property::UserName),
        name,
        title: text(properties, Property::JobTitle),
        emails,
        phone_numbers,
        active: Some(!disabled),
        ..User::default()
    }
}

/// Native properties to merge onto a group authority.
pub fn group_to_properties(group: &Group, now: DateTime<Utc>) -> PropertyMap {
    let mut properties = PropertyMap::new();
    put_text(
        &mut properties,
        Property::AuthorityDisplayName,
        group.display_name.as_deref(),
    );
    put_text(&mut properties, Property::ExternalId, group.external_id.as_deref());
    properties.insert(Property::LastSyncDate, PropertyValue::DateTime(now));
    properties
}

/// Rebuild a SCIM group from an authority's properties and resolved members.
pub fn group_from_properties(
    id: &NativeId,
    properties: &PropertyMap,
    members: Vec<GroupMember>,
) -> Group {
    Group {
        id: Some(id.to_string()),
        external_id: text(properties, Property::ExternalId),
        display_name: text(properties, Property::AuthorityDisplayName),
        members,
        ..Group::default()
    }
}
