//! # Models
//!
//! Typed views over the loosely typed objects returned in query responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::date::deserialize_sentinel_date;
use crate::response::ActionResult;
use crate::Error;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A remote object resolved by a previous request.
///
/// The identity can be fed back into a later request as an `Identity` object path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientObject {
    /// Server-side type name, e.g. `SP.FieldText`
    #[serde(rename = "_ObjectType_", default)]
    pub object_type: Option<String>,
    /// Opaque identity string
    #[serde(rename = "_ObjectIdentity_")]
    pub object_identity: String,
    /// Version stamp, only present on versioned objects such as lists
    #[serde(rename = "_ObjectVersion_", default)]
    pub object_version: Option<String>,
}

impl TryFrom<&ActionResult> for ClientObject {
    type Error = Error;

    fn try_from(result: &ActionResult) -> Result<Self, Self::Error> {
        result.deserialize()
    }
}

/// A user from outside the organization who was invited to tenant content.
///
/// # Examples
///
/// ```rust
/// use client_query::models::ExternalUser;
///
/// let user: ExternalUser = serde_json::from_str(r#"{
///     "DisplayName": "Dear Vesa",
///     "InvitedAs": "me@dearvesa.fi",
///     "UniqueId": "100300009BF10C95",
///     "AcceptedAs": "me@dearvesa.fi",
///     "WhenCreated": "/Date(2016,10,2,21,50,52,0)/",
///     "InvitedBy": null
/// }"#).unwrap();
///
/// assert_eq!(user.display_name, "Dear Vesa");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalUser {
    pub display_name: String,
    pub invited_as: Option<String>,
    pub unique_id: String,
    pub accepted_as: Option<String>,
    #[serde(deserialize_with = "deserialize_sentinel_date")]
    pub when_created: NaiveDateTime,
    pub invited_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalUserCollection {
    #[serde(rename = "_Child_Items_", default)]
    child_items: Vec<ExternalUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetExternalUsersResults {
    total_user_count: i64,
    user_collection_position: i64,
    external_user_collection: ExternalUserCollection,
}

/// One page of external users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUsersPage {
    /// Number of users matching the query across all pages
    pub total_user_count: i64,
    /// Position to request next; `-1` when this is the last page
    pub user_collection_position: i64,
    pub users: Vec<ExternalUser>,
}

impl ExternalUsersPage {
    /// Position value signalling that no further page exists.
    pub const NO_MORE_PAGES: i64 = -1;

    pub fn has_more(&self) -> bool {
        self.user_collection_position != Self::NO_MORE_PAGES
    }
}

impl TryFrom<&ActionResult> for ExternalUsersPage {
    type Error = Error;

    fn try_from(result: &ActionResult) -> Result<Self, Self::Error> {
        let raw: GetExternalUsersResults = result.deserialize()?;
        Ok(Self {
            total_user_count: raw.total_user_count,
            user_collection_position: raw.user_collection_position,
            users: raw.external_user_collection.child_items,
        })
    }
}

/// A webhook subscription registered on a list.
///
/// Returned by the list REST endpoint rather than by a batch, so field names are camel case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubscription {
    pub id: String,
    #[serde(default)]
    pub client_state: Option<String>,
    pub expiration_date_time: String,
    pub notification_url: String,
    /// Id of the list the subscription belongs to
    pub resource: String,
    #[serde(default)]
    pub resource_data: Option<String>,
}
