use super::*;

const APP: &str = "spo-batch";

fn resolve_field_request(field_name: &str) -> ClientQueryRequest {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::object_path(664, 663))
        .add_named_action("field", Action::query(665, 663, QuerySelection::new()))
        .add_object_path(ObjectPath::method(
            663,
            7,
            "GetByInternalNameOrTitle",
            vec![ParameterValue::string(field_name)],
        ))
        .add_object_path(ObjectPath::property(7, 5, "Fields"))
        .add_object_path(ObjectPath::property(5, 3, "Web"))
        .add_object_path(ObjectPath::current_context(3));
    request
}

#[test]
fn test_resolve_field_request_matches_wire_format() {
    let xml = resolve_field_request("MyColumn").to_xml(APP).unwrap();

    assert_eq!(
        xml,
        "<Request AddExpandoFieldTypeSuffix=\"true\" SchemaVersion=\"15.0.0.0\" LibraryVersion=\"16.0.0.0\" ApplicationName=\"spo-batch\" xmlns=\"http://schemas.microsoft.com/sharepoint/clientquery/2009\"><Actions><ObjectPath Id=\"664\" ObjectPathId=\"663\" /><Query Id=\"665\" ObjectPathId=\"663\"><Query SelectAllProperties=\"false\"><Properties /></Query></Query></Actions><ObjectPaths><Method Id=\"663\" ParentId=\"7\" Name=\"GetByInternalNameOrTitle\"><Parameters><Parameter Type=\"String\">MyColumn</Parameter></Parameters></Method><Property Id=\"7\" ParentId=\"5\" Name=\"Fields\" /><Property Id=\"5\" ParentId=\"3\" Name=\"Web\" /><StaticProperty Id=\"3\" TypeId=\"{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}\" Name=\"Current\" /></ObjectPaths></Request>"
    );
}

#[test]
fn test_field_name_is_escaped() {
    let xml = resolve_field_request("MyColumn>").to_xml(APP).unwrap();

    assert!(xml.contains("<Parameter Type=\"String\">MyColumn&gt;</Parameter>"));
    assert!(xml.contains("Name=\"GetByInternalNameOrTitle\""));
    assert!(xml.contains("<Method Id=\"663\" ParentId=\"7\""));
    assert!(xml.contains("<Property Id=\"7\" ParentId=\"5\" Name=\"Fields\" />"));
}

#[test]
fn test_reserved_characters_never_appear_raw_in_values() {
    let nasty = "a&b<c>d\"e'f";
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::set_property(
            667,
            663,
            nasty,
            ParameterValue::string(nasty),
        ))
        .add_object_path(ObjectPath::identity(663, nasty));

    let xml = request.to_xml(nasty).unwrap();

    let escaped = "a&amp;b&lt;c&gt;d&quot;e&apos;f";
    assert!(xml.contains(&format!("ApplicationName=\"{}\"", escaped)));
    assert!(xml.contains(&format!("Name=\"{}\"", escaped)));
    assert!(xml.contains(&format!("<Parameter Type=\"String\">{}</Parameter>", escaped)));
    assert!(!xml.contains(nasty));
    assert!(!xml.contains("d\"e"));
    assert!(!xml.contains("e'f"));
}

#[test]
fn test_escape_xml_borrows_when_clean() {
    assert!(matches!(escape_xml("My List"), Cow::Borrowed("My List")));
    assert_eq!(escape_xml("<Vesa"), "&lt;Vesa");
    assert_eq!(escape_xml("&amp;"), "&amp;amp;");
}

#[test]
fn test_parameter_types_render_in_declared_order() {
    let guid = Uuid::parse_str("5D021339-4D62-4FE9-9D2A-C99BC56A157A").unwrap();
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::object_path(2, 1))
        .add_object_path(ObjectPath::method(
            1,
            0,
            "Mixed",
            vec![
                ParameterValue::Int32(-5),
                ParameterValue::Guid(guid),
                ParameterValue::Boolean(true),
                ParameterValue::Enum(1),
                ParameterValue::string(""),
            ],
        ))
        .add_object_path(ObjectPath::constructor(0, OFFICE365_TENANT_TYPE_ID));

    let xml = request.to_xml(APP).unwrap();

    assert!(xml.contains(
        "<Parameters><Parameter Type=\"Int32\">-5</Parameter><Parameter Type=\"Guid\">5d021339-4d62-4fe9-9d2a-c99bc56a157a</Parameter><Parameter Type=\"Boolean\">true</Parameter><Parameter Type=\"Enum\">1</Parameter><Parameter Type=\"String\"></Parameter></Parameters>"
    ));
    assert!(xml.contains("<Constructor Id=\"0\" TypeId=\"{e45fd516-a408-4ca4-b6dc-268e2f1f0f83}\" />"));
}

#[test]
fn test_update_actions_render() {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::set_property(
            667,
            663,
            "Description",
            ParameterValue::string("My column"),
        ))
        .add_action(Action::method_call(
            9000,
            663,
            "UpdateAndPushChanges",
            vec![ParameterValue::Boolean(false)],
        ))
        .add_object_path(ObjectPath::identity(663, "abc|field:1"));

    let xml = request.to_xml(APP).unwrap();

    assert!(xml.contains(
        "<Actions><SetProperty Id=\"667\" ObjectPathId=\"663\" Name=\"Description\"><Parameter Type=\"String\">My column</Parameter></SetProperty><Method Name=\"UpdateAndPushChanges\" Id=\"9000\" ObjectPathId=\"663\"><Parameters><Parameter Type=\"Boolean\">false</Parameter></Parameters></Method></Actions><ObjectPaths><Identity Id=\"663\" Name=\"abc|field:1\" /></ObjectPaths>"
    ));
}

#[test]
fn test_parameterless_method_renders_self_closing() {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::method_call(10, 3, "Update", vec![]))
        .add_object_path(ObjectPath::method(3, 2, "GetFolder", vec![]))
        .add_object_path(ObjectPath::current_context(2));

    let xml = request.to_xml(APP).unwrap();

    assert!(xml.contains("<Method Name=\"Update\" Id=\"10\" ObjectPathId=\"3\" />"));
    assert!(xml.contains("<Method Id=\"3\" ParentId=\"2\" Name=\"GetFolder\" />"));
}

#[test]
fn test_nested_selection_renders_child_item_query() {
    let selection = QuerySelection::new().scalar("TotalUserCount").object(
        "ExternalUserCollection",
        QuerySelection::new(),
        Some(QuerySelection::new().scalar("DisplayName")),
    );

    assert_eq!(
        selection.to_xml("Query"),
        "<Query SelectAllProperties=\"false\"><Properties><Property Name=\"TotalUserCount\" ScalarProperty=\"true\" /><Property Name=\"ExternalUserCollection\"><Query SelectAllProperties=\"false\"><Properties /></Query><ChildItemQuery SelectAllProperties=\"false\"><Properties><Property Name=\"DisplayName\" ScalarProperty=\"true\" /></Properties></ChildItemQuery></Property></Properties></Query>"
    );
}

#[test]
fn test_dangling_parent_is_rejected() {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::object_path(664, 663))
        .add_object_path(ObjectPath::property(663, 7, "Fields"));

    let result = request.to_xml(APP);

    assert!(matches!(result, Err(Error::InvalidReference(msg)) if msg.contains("parent 7")));
}

#[test]
fn test_action_with_undeclared_target_is_rejected() {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::query(665, 700, QuerySelection::new()))
        .add_object_path(ObjectPath::current_context(3));

    let result = request.validate();

    assert!(matches!(result, Err(Error::InvalidReference(msg)) if msg.contains("object path 700")));
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::object_path(3, 3))
        .add_object_path(ObjectPath::current_context(3));

    let result = request.validate();

    assert!(matches!(result, Err(Error::InvalidReference(msg)) if msg.contains("more than once")));
}

#[test]
fn test_result_actions_skip_set_property_and_void_calls() {
    let mut request = ClientQueryRequest::new();
    request
        .add_action(Action::object_path(1, 100))
        .add_action(Action::set_property(2, 100, "Title", ParameterValue::string("x")))
        .add_action(Action::method_call(3, 100, "Update", vec![]))
        .add_named_action(
            "count",
            Action::method_call_with_result(4, 100, "GetCount", vec![]),
        )
        .add_object_path(ObjectPath::identity(100, "id"));

    let ids: Vec<u32> = request.result_actions().map(|a| a.action.id()).collect();

    assert_eq!(ids, vec![1, 4]);
}
