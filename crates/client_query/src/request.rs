//! Process query request encoding.
//!
//! A request is an ordered list of actions followed by the object paths those actions
//! reference. Object paths and actions are addressed by small integer ids chosen by the
//! caller. Rendering is a pure function of the request and the application name.

use std::borrow::Cow;
use std::collections::HashSet;

use uuid::Uuid;

use crate::Error;

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

/// Schema version announced in every request envelope.
pub const SCHEMA_VERSION: &str = "15.0.0.0";

/// Client library version announced in every request envelope.
pub const LIBRARY_VERSION: &str = "16.0.0.0";

/// XML namespace of the process query dialect.
pub const CLIENT_QUERY_NAMESPACE: &str = "http://schemas.microsoft.com/sharepoint/clientquery/2009";

/// Type id of the `Current` static property (the request context of the target site).
pub const CURRENT_CONTEXT_TYPE_ID: &str = "{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}";

/// Type id of the tenant management root object, constructed for tenant-wide queries.
pub const OFFICE365_TENANT_TYPE_ID: &str = "{e45fd516-a408-4ca4-b6dc-268e2f1f0f83}";

/// Escapes the five XML-reserved characters.
///
/// Borrows the input when nothing needs escaping.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\''))
    {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// A typed parameter of a method call or property assignment.
///
/// The remote interpreter binds parameters positionally, so the order in which they are
/// supplied is the order in which they are rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    String(String),
    Int32(i32),
    Guid(Uuid),
    Boolean(bool),
    Enum(i32),
}

impl ParameterValue {
    /// Creates a string parameter.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// The value of the `Type` attribute for this parameter.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Int32(_) => "Int32",
            Self::Guid(_) => "Guid",
            Self::Boolean(_) => "Boolean",
            Self::Enum(_) => "Enum",
        }
    }

    fn text(&self) -> Cow<'_, str> {
        match self {
            Self::String(value) => escape_xml(value),
            Self::Int32(value) | Self::Enum(value) => Cow::Owned(value.to_string()),
            Self::Guid(value) => Cow::Owned(value.hyphenated().to_string()),
            Self::Boolean(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
        }
    }

    fn to_xml(&self) -> String {
        format!(
            "<Parameter Type=\"{}\">{}</Parameter>",
            self.type_name(),
            self.text()
        )
    }
}

fn parameters_xml(parameters: &[ParameterValue]) -> String {
    let rendered: String = parameters.iter().map(ParameterValue::to_xml).collect();
    format!("<Parameters>{}</Parameters>", rendered)
}

/// A node in the remote object graph, addressed by an id unique within one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPath {
    /// A static property of a type, e.g. the current request context.
    StaticProperty { id: u32, type_id: String, name: String },
    /// A property of a parent object.
    Property { id: u32, parent_id: u32, name: String },
    /// The return value of a method invoked on a parent object.
    Method {
        id: u32,
        parent_id: u32,
        name: String,
        parameters: Vec<ParameterValue>,
    },
    /// A freshly constructed object of the given type.
    Constructor { id: u32, type_id: String },
    /// An object captured by a previous response through its identity string.
    Identity { id: u32, name: String },
}

impl ObjectPath {
    /// The `Current` static property, root of every site-scoped path.
    pub fn current_context(id: u32) -> Self {
        Self::StaticProperty {
            id,
            type_id: CURRENT_CONTEXT_TYPE_ID.to_string(),
            name: "Current".to_string(),
        }
    }

    pub fn property(id: u32, parent_id: u32, name: impl Into<String>) -> Self {
        Self::Property {
            id,
            parent_id,
            name: name.into(),
        }
    }

    pub fn method(
        id: u32,
        parent_id: u32,
        name: impl Into<String>,
        parameters: Vec<ParameterValue>,
    ) -> Self {
        Self::Method {
            id,
            parent_id,
            name: name.into(),
            parameters,
        }
    }

    pub fn constructor(id: u32, type_id: impl Into<String>) -> Self {
        Self::Constructor {
            id,
            type_id: type_id.into(),
        }
    }

    pub fn identity(id: u32, name: impl Into<String>) -> Self {
        Self::Identity {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::StaticProperty { id, .. }
            | Self::Property { id, .. }
            | Self::Method { id, .. }
            | Self::Constructor { id, .. }
            | Self::Identity { id, .. } => *id,
        }
    }

    pub fn parent_id(&self) -> Option<u32> {
        match self {
            Self::Property { parent_id, .. } | Self::Method { parent_id, .. } => Some(*parent_id),
            _ => None,
        }
    }

    fn to_xml(&self) -> String {
        match self {
            Self::StaticProperty { id, type_id, name } => format!(
                "<StaticProperty Id=\"{}\" TypeId=\"{}\" Name=\"{}\" />",
                id,
                escape_xml(type_id),
                escape_xml(name)
            ),
            Self::Property {
                id,
                parent_id,
                name,
            } => format!(
                "<Property Id=\"{}\" ParentId=\"{}\" Name=\"{}\" />",
                id,
                parent_id,
                escape_xml(name)
            ),
            Self::Method {
                id,
                parent_id,
                name,
                parameters,
            } if parameters.is_empty() => format!(
                "<Method Id=\"{}\" ParentId=\"{}\" Name=\"{}\" />",
                id,
                parent_id,
                escape_xml(name)
            ),
            Self::Method {
                id,
                parent_id,
                name,
                parameters,
            } => format!(
                "<Method Id=\"{}\" ParentId=\"{}\" Name=\"{}\">{}</Method>",
                id,
                parent_id,
                escape_xml(name),
                parameters_xml(parameters)
            ),
            Self::Constructor { id, type_id } => format!(
                "<Constructor Id=\"{}\" TypeId=\"{}\" />",
                id,
                escape_xml(type_id)
            ),
            Self::Identity { id, name } => {
                format!("<Identity Id=\"{}\" Name=\"{}\" />", id, escape_xml(name))
            }
        }
    }
}

/// One property in a query selection tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySelection {
    /// A scalar property returned by value.
    Scalar(String),
    /// An object-valued property with its own selection, and for collections a selection
    /// applied to every child item.
    Object {
        name: String,
        query: QuerySelection,
        child_items: Option<QuerySelection>,
    },
}

impl PropertySelection {
    fn to_xml(&self) -> String {
        match self {
            Self::Scalar(name) => format!(
                "<Property Name=\"{}\" ScalarProperty=\"true\" />",
                escape_xml(name)
            ),
            Self::Object {
                name,
                query,
                child_items,
            } => {
                let children = child_items
                    .as_ref()
                    .map(|child| child.to_xml("ChildItemQuery"))
                    .unwrap_or_default();
                format!(
                    "<Property Name=\"{}\">{}{}</Property>",
                    escape_xml(name),
                    query.to_xml("Query"),
                    children
                )
            }
        }
    }
}

/// The properties a `Query` action asks the server to return.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySelection {
    pub select_all_properties: bool,
    pub properties: Vec<PropertySelection>,
}

impl QuerySelection {
    /// An empty selection: the server returns only the object's identity markers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.properties.push(PropertySelection::Scalar(name.into()));
        self
    }

    pub fn object(
        mut self,
        name: impl Into<String>,
        query: QuerySelection,
        child_items: Option<QuerySelection>,
    ) -> Self {
        self.properties.push(PropertySelection::Object {
            name: name.into(),
            query,
            child_items,
        });
        self
    }

    fn to_xml(&self, element: &str) -> String {
        let properties = if self.properties.is_empty() {
            "<Properties />".to_string()
        } else {
            let rendered: String = self
                .properties
                .iter()
                .map(PropertySelection::to_xml)
                .collect();
            format!("<Properties>{}</Properties>", rendered)
        };

        format!(
            "<{element} SelectAllProperties=\"{}\">{}</{element}>",
            self.select_all_properties, properties
        )
    }
}

/// An operation performed against an object path.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Materializes a reference to the object path.
    ObjectPath { id: u32, object_path_id: u32 },
    /// Loads the selected properties of the object.
    Query {
        id: u32,
        object_path_id: u32,
        selection: QuerySelection,
    },
    /// Assigns a property of the object.
    SetProperty {
        id: u32,
        object_path_id: u32,
        name: String,
        value: ParameterValue,
    },
    /// Invokes a method on the object.
    MethodCall {
        id: u32,
        object_path_id: u32,
        name: String,
        parameters: Vec<ParameterValue>,
        returns_value: bool,
    },
}

impl Action {
    pub fn object_path(id: u32, object_path_id: u32) -> Self {
        Self::ObjectPath { id, object_path_id }
    }

    pub fn query(id: u32, object_path_id: u32, selection: QuerySelection) -> Self {
        Self::Query {
            id,
            object_path_id,
            selection,
        }
    }

    pub fn set_property(
        id: u32,
        object_path_id: u32,
        name: impl Into<String>,
        value: ParameterValue,
    ) -> Self {
        Self::SetProperty {
            id,
            object_path_id,
            name: name.into(),
            value,
        }
    }

    /// A method call whose return value is discarded by the server.
    pub fn method_call(
        id: u32,
        object_path_id: u32,
        name: impl Into<String>,
        parameters: Vec<ParameterValue>,
    ) -> Self {
        Self::MethodCall {
            id,
            object_path_id,
            name: name.into(),
            parameters,
            returns_value: false,
        }
    }

    /// A method call whose return value comes back in the response.
    pub fn method_call_with_result(
        id: u32,
        object_path_id: u32,
        name: impl Into<String>,
        parameters: Vec<ParameterValue>,
    ) -> Self {
        Self::MethodCall {
            id,
            object_path_id,
            name: name.into(),
            parameters,
            returns_value: true,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::ObjectPath { id, .. }
            | Self::Query { id, .. }
            | Self::SetProperty { id, .. }
            | Self::MethodCall { id, .. } => *id,
        }
    }

    pub fn object_path_id(&self) -> u32 {
        match self {
            Self::ObjectPath { object_path_id, .. }
            | Self::Query { object_path_id, .. }
            | Self::SetProperty { object_path_id, .. }
            | Self::MethodCall { object_path_id, .. } => *object_path_id,
        }
    }

    /// Whether the server answers this action with a marker and a value.
    pub fn yields_result(&self) -> bool {
        match self {
            Self::ObjectPath { .. } | Self::Query { .. } => true,
            Self::SetProperty { .. } => false,
            Self::MethodCall { returns_value, .. } => *returns_value,
        }
    }

    fn to_xml(&self) -> String {
        match self {
            Self::ObjectPath { id, object_path_id } => {
                format!("<ObjectPath Id=\"{}\" ObjectPathId=\"{}\" />", id, object_path_id)
            }
            Self::Query {
                id,
                object_path_id,
                selection,
            } => format!(
                "<Query Id=\"{}\" ObjectPathId=\"{}\">{}</Query>",
                id,
                object_path_id,
                selection.to_xml("Query")
            ),
            Self::SetProperty {
                id,
                object_path_id,
                name,
                value,
            } => format!(
                "<SetProperty Id=\"{}\" ObjectPathId=\"{}\" Name=\"{}\">{}</SetProperty>",
                id,
                object_path_id,
                escape_xml(name),
                value.to_xml()
            ),
            Self::MethodCall {
                id,
                object_path_id,
                name,
                parameters,
                ..
            } if parameters.is_empty() => format!(
                "<Method Name=\"{}\" Id=\"{}\" ObjectPathId=\"{}\" />",
                escape_xml(name),
                id,
                object_path_id
            ),
            Self::MethodCall {
                id,
                object_path_id,
                name,
                parameters,
                ..
            } => format!(
                "<Method Name=\"{}\" Id=\"{}\" ObjectPathId=\"{}\">{}</Method>",
                escape_xml(name),
                id,
                object_path_id,
                parameters_xml(parameters)
            ),
        }
    }
}

/// An action together with the logical name its result is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredAction {
    pub name: Option<String>,
    pub action: Action,
}

/// A single process query batch.
///
/// Built fresh for each logical operation and discarded after one round trip.
///
/// # Example
///
/// ```rust
/// use client_query::{Action, ClientQueryRequest, ObjectPath, ParameterValue, QuerySelection};
///
/// let mut request = ClientQueryRequest::new();
/// request
///     .add_action(Action::object_path(664, 663))
///     .add_named_action("field", Action::query(665, 663, QuerySelection::new()))
///     .add_object_path(ObjectPath::method(
///         663,
///         7,
///         "GetByInternalNameOrTitle",
///         vec![ParameterValue::string("MyColumn")],
///     ))
///     .add_object_path(ObjectPath::property(7, 5, "Fields"))
///     .add_object_path(ObjectPath::property(5, 3, "Web"))
///     .add_object_path(ObjectPath::current_context(3));
///
/// let xml = request.to_xml("my-app").unwrap();
/// assert!(xml.contains("<Parameter Type=\"String\">MyColumn</Parameter>"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientQueryRequest {
    actions: Vec<DeclaredAction>,
    object_paths: Vec<ObjectPath>,
}

impl ClientQueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action whose result, if any, is reported without a name.
    pub fn add_action(&mut self, action: Action) -> &mut Self {
        self.actions.push(DeclaredAction { name: None, action });
        self
    }

    /// Appends an action whose result is reported under `name`.
    pub fn add_named_action(&mut self, name: impl Into<String>, action: Action) -> &mut Self {
        self.actions.push(DeclaredAction {
            name: Some(name.into()),
            action,
        });
        self
    }

    pub fn add_object_path(&mut self, object_path: ObjectPath) -> &mut Self {
        self.object_paths.push(object_path);
        self
    }

    pub fn actions(&self) -> &[DeclaredAction] {
        &self.actions
    }

    pub fn object_paths(&self) -> &[ObjectPath] {
        &self.object_paths
    }

    /// The actions the server answers with a marker and a value, in declaration order.
    pub fn result_actions(&self) -> impl Iterator<Item = &DeclaredAction> {
        self.actions.iter().filter(|a| a.action.yields_result())
    }

    /// Checks that ids are unique and that every reference points at a declared object path.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidReference` describing the first problem found.
    pub fn validate(&self) -> Result<(), Error> {
        let mut ids = HashSet::new();
        let mut path_ids = HashSet::new();

        for path in &self.object_paths {
            if !ids.insert(path.id()) {
                return Err(Error::InvalidReference(format!(
                    "id {} is declared more than once",
                    path.id()
                )));
            }
            path_ids.insert(path.id());
        }

        for declared in &self.actions {
            let id = declared.action.id();
            if !ids.insert(id) {
                return Err(Error::InvalidReference(format!(
                    "id {} is declared more than once",
                    id
                )));
            }
        }

        for path in &self.object_paths {
            if let Some(parent_id) = path.parent_id() {
                if !path_ids.contains(&parent_id) {
                    return Err(Error::InvalidReference(format!(
                        "object path {} references undeclared parent {}",
                        path.id(),
                        parent_id
                    )));
                }
            }
        }

        for declared in &self.actions {
            let target = declared.action.object_path_id();
            if !path_ids.contains(&target) {
                return Err(Error::InvalidReference(format!(
                    "action {} references undeclared object path {}",
                    declared.action.id(),
                    target
                )));
            }
        }

        Ok(())
    }

    /// Renders the request envelope.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidReference` if the request fails validation.
    pub fn to_xml(&self, application_name: &str) -> Result<String, Error> {
        self.validate()?;

        let actions: String = self.actions.iter().map(|a| a.action.to_xml()).collect();
        let object_paths: String = self.object_paths.iter().map(ObjectPath::to_xml).collect();

        Ok(format!(
            "<Request AddExpandoFieldTypeSuffix=\"true\" SchemaVersion=\"{}\" LibraryVersion=\"{}\" ApplicationName=\"{}\" xmlns=\"{}\"><Actions>{}</Actions><ObjectPaths>{}</ObjectPaths></Request>",
            SCHEMA_VERSION,
            LIBRARY_VERSION,
            escape_xml(application_name),
            CLIENT_QUERY_NAMESPACE,
            actions,
            object_paths
        ))
    }
}
