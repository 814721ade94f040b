use super::*;

const APP: &str = "spo-batch";
const HEADER: &str = "<Request AddExpandoFieldTypeSuffix=\"true\" SchemaVersion=\"15.0.0.0\" LibraryVersion=\"16.0.0.0\" ApplicationName=\"spo-batch\" xmlns=\"http://schemas.microsoft.com/sharepoint/clientquery/2009\">";
const LIST_IDENTITY: &str = "270fa19e-f0f7-0000-37ae-1733ad1b6703|740c6a0b-85e2-48a0-a494-e0f1759d4aa7:site:ff7a8065-9120-4c0a-982a-163ab9014179:web:e781d3dc-238d-44f7-8724-5e3e9eabcd6e:list:03cef05c-ba50-4dcf-a876-304f0626085c";
const FIELD_IDENTITY: &str = "7c0aa19e-1058-0000-37ae-14170affbedb|740c6a0b-85e2-48a0-a494-e0f1759d4aa7:site:ff7a8065-9120-4c0a-982a-163ab9014179:web:e781d3dc-238d-44f7-8724-5e3e9eabcd6e:field:5d021339-4d62-4fe9-9d2a-c99bc56a157a";

fn field_id() -> Uuid {
    Uuid::parse_str("5d021339-4d62-4fe9-9d2a-c99bc56a157a").unwrap()
}

#[test]
fn test_resolve_site_field_by_id() {
    let xml = resolve_object(&ObjectRoot::CurrentWeb, "Fields", &ObjectSelector::Id(field_id()))
        .to_xml(APP)
        .unwrap();

    assert_eq!(
        xml,
        format!("{}<Actions><ObjectPath Id=\"664\" ObjectPathId=\"663\" /><Query Id=\"665\" ObjectPathId=\"663\"><Query SelectAllProperties=\"false\"><Properties /></Query></Query></Actions><ObjectPaths><Method Id=\"663\" ParentId=\"7\" Name=\"GetById\"><Parameters><Parameter Type=\"Guid\">5d021339-4d62-4fe9-9d2a-c99bc56a157a</Parameter></Parameters></Method><Property Id=\"7\" ParentId=\"5\" Name=\"Fields\" /><Property Id=\"5\" ParentId=\"3\" Name=\"Web\" /><StaticProperty Id=\"3\" TypeId=\"{{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}}\" Name=\"Current\" /></ObjectPaths></Request>", HEADER)
    );
}

#[test]
fn test_resolve_list_by_title() {
    let xml = resolve_object(
        &ObjectRoot::CurrentWeb,
        "Lists",
        &ObjectSelector::Title("My List".to_string()),
    )
    .to_xml(APP)
    .unwrap();

    assert!(xml.contains("<Method Id=\"663\" ParentId=\"7\" Name=\"GetByTitle\"><Parameters><Parameter Type=\"String\">My List</Parameter></Parameters></Method><Property Id=\"7\" ParentId=\"5\" Name=\"Lists\" />"));
}

#[test]
fn test_resolve_list_field_by_name_from_identity() {
    let xml = resolve_object(
        &ObjectRoot::Identity(LIST_IDENTITY.to_string()),
        "Fields",
        &ObjectSelector::InternalNameOrTitle("MyColumn".to_string()),
    )
    .to_xml(APP)
    .unwrap();

    assert_eq!(
        xml,
        format!("{}<Actions><ObjectPath Id=\"664\" ObjectPathId=\"663\" /><Query Id=\"665\" ObjectPathId=\"663\"><Query SelectAllProperties=\"false\"><Properties /></Query></Query></Actions><ObjectPaths><Method Id=\"663\" ParentId=\"7\" Name=\"GetByInternalNameOrTitle\"><Parameters><Parameter Type=\"String\">MyColumn</Parameter></Parameters></Method><Property Id=\"7\" ParentId=\"5\" Name=\"Fields\" /><Identity Id=\"5\" Name=\"{}\" /></ObjectPaths></Request>", HEADER, LIST_IDENTITY)
    );
}

#[test]
fn test_resolved_object_is_the_named_result() {
    let request = resolve_object(
        &ObjectRoot::CurrentWeb,
        "Fields",
        &ObjectSelector::Id(field_id()),
    );

    let names: Vec<Option<&str>> = request
        .result_actions()
        .map(|a| a.name.as_deref())
        .collect();

    assert_eq!(names, vec![None, Some(RESOLVED_OBJECT)]);
}

#[test]
fn test_update_sets_properties_in_order_then_pushes() {
    let properties = vec![
        ("Description".to_string(), "My cool column".to_string()),
        ("Title".to_string(), "My column".to_string()),
    ];

    let xml = update_and_push_changes(FIELD_IDENTITY, &properties, true)
        .to_xml(APP)
        .unwrap();

    assert_eq!(
        xml,
        format!("{}<Actions><SetProperty Id=\"667\" ObjectPathId=\"663\" Name=\"Description\"><Parameter Type=\"String\">My cool column</Parameter></SetProperty><SetProperty Id=\"668\" ObjectPathId=\"663\" Name=\"Title\"><Parameter Type=\"String\">My column</Parameter></SetProperty><Method Name=\"UpdateAndPushChanges\" Id=\"9000\" ObjectPathId=\"663\"><Parameters><Parameter Type=\"Boolean\">true</Parameter></Parameters></Method></Actions><ObjectPaths><Identity Id=\"663\" Name=\"{}\" /></ObjectPaths></Request>", HEADER, FIELD_IDENTITY)
    );
}

#[test]
fn test_update_escapes_property_values() {
    let properties = vec![("Description".to_string(), "<b>&co</b>".to_string())];

    let xml = update_and_push_changes(FIELD_IDENTITY, &properties, false)
        .to_xml(APP)
        .unwrap();

    assert!(xml.contains("<Parameter Type=\"String\">&lt;b&gt;&amp;co&lt;/b&gt;</Parameter>"));
    assert!(xml.contains("<Parameter Type=\"Boolean\">false</Parameter>"));
}

#[test]
fn test_update_expects_no_results() {
    let properties = vec![("Title".to_string(), "x".to_string())];

    let request = update_and_push_changes(FIELD_IDENTITY, &properties, false);

    assert_eq!(request.result_actions().count(), 0);
}
