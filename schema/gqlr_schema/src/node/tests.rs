use super::*;
use crate::TypeKind;
use pretty_assertions::assert_eq;

const PAGES: &str = r#"{
    "nodeTypes": {
        "Page": {
            "description": "A document page",
            "properties": { "title": "String!", "parent": "Page", "tags": "[Tag!]" }
        },
        "Tag": { "properties": { "label": "String" } }
    }
}"#;

fn registry(nodes: &NodeTypes) -> SchemaRegistry {
    build_registry(nodes, RegistryOptions::default()).unwrap()
}

#[test]
fn loads_definitions_from_json() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();

    assert_eq!(nodes.len(), 2);
    let page = nodes.get("Page").unwrap();
    assert_eq!(page.description(), Some("A document page"));
    let properties: Vec<_> = page
        .properties()
        .iter()
        .map(|(name, expr)| (name.as_str(), expr.to_string()))
        .collect();
    assert_eq!(
        properties,
        vec![
            ("parent", "Page".to_owned()),
            ("tags", "[Tag!]".to_owned()),
            ("title", "String!".to_owned()),
        ]
    );
    assert_eq!(
        page.context().property("tags").and_then(|v| v.as_str()),
        Some("[Tag!]")
    );
}

#[test]
fn rejects_bad_definitions() {
    assert!(matches!(
        NodeTypes::from_json(r#"{"nodeTypes": {"Query": {}}}"#),
        Err(SchemaError::ReservedName(name)) if name == "Query"
    ));
    assert!(matches!(
        NodeTypes::from_json(r#"{"nodeTypes": {"String": {}}}"#),
        Err(SchemaError::ReservedName(_))
    ));
    assert!(matches!(
        NodeTypes::from_json(r#"{"nodeTypes": {"Page": {"properties": {"x": "[Page"}}}}"#),
        Err(SchemaError::Notation { .. })
    ));
    assert!(matches!(
        NodeTypes::from_json(r#"{"nodeTypes": {"[Page]": {}}}"#),
        Err(SchemaError::Notation { .. })
    ));
    assert!(matches!(
        NodeTypes::from_json(r#"{"types": {}}"#),
        Err(SchemaError::Json(_))
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = NodeTypes::from_path(Path::new("/nonexistent/nodes.json")).unwrap_err();

    assert!(err.to_string().contains("/nonexistent/nodes.json"), "{err}");
}

#[test]
fn node_objects_are_scoped_by_context() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();
    let registry = registry(&nodes);

    let (id, page_cx) = nodes.node_reference("Page").unwrap();
    let (_, tag_cx) = nodes.node_reference("Tag").unwrap();
    let page = registry.instance(&id, Some(&page_cx)).unwrap();
    let tag = registry.instance(&id, Some(&tag_cx)).unwrap();

    assert_eq!(page.name(), Some("Page"));
    assert_eq!(tag.name(), Some("Tag"));
    assert!(!Arc::ptr_eq(&page, &tag));
}

#[test]
fn self_reference_resolves_to_the_same_object() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();
    let registry = registry(&nodes);
    let (id, cx) = nodes.node_reference("Page").unwrap();

    let page = registry.instance(&id, Some(&cx)).unwrap();
    let parent = page.field("parent").unwrap().ty.get().unwrap();

    assert!(Arc::ptr_eq(&page, &parent));
    assert_eq!(page.field("tags").unwrap().ty.get().unwrap().type_ref().unwrap(), "[Tag!]");
}

#[test]
fn scalars_are_shared_across_nodes() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();
    let registry = registry(&nodes);
    let (id, page_cx) = nodes.node_reference("Page").unwrap();
    let (_, tag_cx) = nodes.node_reference("Tag").unwrap();

    let page = registry.instance(&id, Some(&page_cx)).unwrap();
    let tag = registry.instance(&id, Some(&tag_cx)).unwrap();
    let title = page.field("title").unwrap().ty.get().unwrap().named_type().unwrap();
    let label = tag.field("label").unwrap().ty.get().unwrap();

    assert!(Arc::ptr_eq(&title, &label));
}

#[test]
fn node_without_context_fails() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();
    let err = registry(&nodes).instance(&Identifier::bare(NODE), None).unwrap_err();

    let RegistryError::ConstructionFailed { source, .. } = err else {
        panic!("expected a construction failure, got {err:?}");
    };
    assert!(matches!(
        source.downcast_ref::<SchemaError>(),
        Some(SchemaError::MissingContext { .. })
    ));
}

#[test]
fn unknown_property_type_fails() {
    let mut nodes = NodeTypes::new();
    nodes
        .insert(NodeType::new("Page").with_property("body", "Markdown").unwrap())
        .unwrap();
    let registry = registry(&nodes);
    let (id, cx) = nodes.node_reference("Page").unwrap();

    let err = registry.instance(&id, Some(&cx)).unwrap_err();

    let RegistryError::ConstructionFailed { source, .. } = err else {
        panic!("expected a construction failure, got {err:?}");
    };
    assert!(matches!(
        source.downcast_ref::<RegistryError>(),
        Some(RegistryError::InvalidTypeReference { .. })
    ));
    assert!(!registry.contains(page_key(&nodes)));
}

#[test]
fn unknown_root_node_type() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();

    assert!(matches!(
        nodes.node_reference("Post"),
        Err(SchemaError::UnknownNodeType(name)) if name == "Post"
    ));
}

#[test]
fn query_lists_every_node_type() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();
    let registry = registry(&nodes);

    let query = registry.instance(&Identifier::bare(QUERY), None).unwrap();
    let fields: Vec<_> = query
        .fields()
        .iter()
        .map(|f| (f.name.as_str(), f.ty.get().unwrap().type_ref().unwrap()))
        .collect();

    assert_eq!(
        fields,
        vec![
            ("page", "Page".to_owned()),
            ("allPage", "[Page!]!".to_owned()),
            ("tag", "Tag".to_owned()),
            ("allTag", "[Tag!]!".to_owned()),
        ]
    );
    assert!(matches!(query.kind(), TypeKind::Object { .. }));
}

#[test]
fn reference_picks_context_for_node_types() {
    let nodes = NodeTypes::from_json(PAGES).unwrap();

    let (id, cx) = nodes.reference(&TypeExpr::parse("[Page]").unwrap());
    assert_eq!(id.to_string(), "ListOf(of: Node)");
    assert_eq!(cx.map(|cx| cx.name().to_owned()), Some("Page".to_owned()));

    let (id, cx) = nodes.reference(&TypeExpr::parse("Int!").unwrap());
    assert_eq!(id.to_string(), "NonNull(of: Int)");
    assert!(cx.is_none());
}

#[test]
fn lower_first_handles_edge_cases() {
    assert_eq!(lower_first("Page"), "page");
    assert_eq!(lower_first("URL"), "uRL");
    assert_eq!(lower_first(""), "");
}

fn page_key(nodes: &NodeTypes) -> gqlr_registry::CacheKey {
    let (id, cx) = nodes.node_reference("Page").unwrap();
    gqlr_registry::CacheKey::derive(&id, Some(&*cx)).unwrap()
}
