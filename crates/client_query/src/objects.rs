//! Request builders for resolving remote objects and updating them.
//!
//! Resolving and updating happen in separate round trips: the first request returns an opaque
//! identity, the second addresses the object through that identity.

use uuid::Uuid;

use crate::request::{Action, ClientQueryRequest, ObjectPath, ParameterValue, QuerySelection};

#[cfg(test)]
#[path = "objects_tests.rs"]
mod tests;

/// Logical name of the query action in a request built by [`resolve_object`].
pub const RESOLVED_OBJECT: &str = "resolved";

const TARGET_PATH_ID: u32 = 663;
const OBJECT_PATH_ACTION_ID: u32 = 664;
const QUERY_ACTION_ID: u32 = 665;
const COLLECTION_PATH_ID: u32 = 7;
const ROOT_PATH_ID: u32 = 5;
const CONTEXT_PATH_ID: u32 = 3;
const FIRST_SET_PROPERTY_ID: u32 = 667;
const UPDATE_ACTION_ID: u32 = 9000;

/// Where a collection lookup starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRoot {
    /// The web of the current request context
    CurrentWeb,
    /// An object resolved earlier, addressed by its identity
    Identity(String),
}

/// How to pick one object out of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectSelector {
    Id(Uuid),
    Title(String),
    /// Internal name or display title, used for fields
    InternalNameOrTitle(String),
}

impl ObjectSelector {
    fn method_name(&self) -> &'static str {
        match self {
            ObjectSelector::Id(_) => "GetById",
            ObjectSelector::Title(_) => "GetByTitle",
            ObjectSelector::InternalNameOrTitle(_) => "GetByInternalNameOrTitle",
        }
    }

    fn parameter(&self) -> ParameterValue {
        match self {
            ObjectSelector::Id(id) => ParameterValue::Guid(*id),
            ObjectSelector::Title(title) | ObjectSelector::InternalNameOrTitle(title) => {
                ParameterValue::string(title.as_str())
            }
        }
    }
}

/// Builds a request that resolves one object from `collection` (e.g. `Fields` or `Lists`)
/// under `root`.
///
/// The identity is read from the result named [`RESOLVED_OBJECT`].
pub fn resolve_object(
    root: &ObjectRoot,
    collection: &str,
    selector: &ObjectSelector,
) -> ClientQueryRequest {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::object_path(OBJECT_PATH_ACTION_ID, TARGET_PATH_ID))
        .add_named_action(
            RESOLVED_OBJECT,
            Action::query(QUERY_ACTION_ID, TARGET_PATH_ID, QuerySelection::new()),
        )
        .add_object_path(ObjectPath::method(
            TARGET_PATH_ID,
            COLLECTION_PATH_ID,
            selector.method_name(),
            vec![selector.parameter()],
        ))
        .add_object_path(ObjectPath::property(
            COLLECTION_PATH_ID,
            ROOT_PATH_ID,
            collection,
        ));

    match root {
        ObjectRoot::CurrentWeb => {
            request
                .add_object_path(ObjectPath::property(ROOT_PATH_ID, CONTEXT_PATH_ID, "Web"))
                .add_object_path(ObjectPath::current_context(CONTEXT_PATH_ID));
        }
        ObjectRoot::Identity(identity) => {
            request.add_object_path(ObjectPath::identity(ROOT_PATH_ID, identity.as_str()));
        }
    }

    request
}

/// Builds a request that sets `properties` on the object with `identity` and then pushes the
/// change with `UpdateAndPushChanges`.
///
/// Properties are written in the order given. The server returns no per-action results for
/// this request.
pub fn update_and_push_changes(
    identity: &str,
    properties: &[(String, String)],
    update_existing_lists: bool,
) -> ClientQueryRequest {
    let mut request = ClientQueryRequest::new();
    for (id, (name, value)) in (FIRST_SET_PROPERTY_ID..).zip(properties) {
        request.add_action(Action::set_property(
            id,
            TARGET_PATH_ID,
            name.as_str(),
            ParameterValue::string(value.as_str()),
        ));
    }
    request
        .add_action(Action::method_call(
            UPDATE_ACTION_ID,
            TARGET_PATH_ID,
            "UpdateAndPushChanges",
            vec![ParameterValue::Boolean(update_existing_lists)],
        ))
        .add_object_path(ObjectPath::identity(TARGET_PATH_ID, identity));
    request
}
