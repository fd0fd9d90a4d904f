use super::*;
use crate::{build_registry, NodeTypes, SchemaType, QUERY};
use gqlr_registry::{RegistryOptions, TypeRegistry};
use pretty_assertions::assert_eq;

const BLOG: &str = r#"{
    "nodeTypes": {
        "Post": {
            "description": "A blog post",
            "properties": { "title": "String!", "author": "Person", "related": "[Post!]" }
        },
        "Person": { "properties": { "name": "String", "posts": "[Post]" } }
    }
}"#;

fn blog() -> (NodeTypes, SchemaRegistry) {
    let nodes = NodeTypes::from_json(BLOG).unwrap();
    let registry = build_registry(&nodes, RegistryOptions::default()).unwrap();
    (nodes, registry)
}

#[test]
fn collects_reachable_named_types() {
    let (_, registry) = blog();
    let schema = Schema::build(&registry, &Identifier::bare(QUERY), None).unwrap();

    assert_eq!(
        schema.types().keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Person", "Post", "Query", "String"]
    );
    assert_eq!(schema.query().name(), Some("Query"));
    assert!(schema.get("Int").is_none());
}

#[test]
fn prints_sdl_for_a_cyclic_graph() {
    let (_, registry) = blog();
    let schema = Schema::build(&registry, &Identifier::bare(QUERY), None).unwrap();

    assert_eq!(
        schema.to_sdl().unwrap(),
        "type Person {
  name: String
  posts: [Post]
}

\"\"\"A blog post\"\"\"
type Post {
  author: Person
  related: [Post!]
  title: String!
}

type Query {
  \"Look up a single Person\"
  person: Person
  \"Every Person\"
  allPerson: [Person!]!
  \"Look up a single Post\"
  post: Post
  \"Every Post\"
  allPost: [Post!]!
}
"
    );
}

#[test]
fn sdl_is_deterministic_across_registries() {
    let render = || {
        let (_, registry) = blog();
        Schema::build(&registry, &Identifier::bare(QUERY), None)
            .unwrap()
            .to_sdl()
            .unwrap()
    };

    assert_eq!(render(), render());
}

#[test]
fn node_root_gets_a_schema_block() {
    let (nodes, registry) = blog();
    let (id, cx) = nodes.node_reference("Person").unwrap();
    let schema = Schema::build(&registry, &id, Some(&cx)).unwrap();

    assert!(schema.get("Query").is_none());
    assert!(schema.to_sdl().unwrap().ends_with("schema {\n  query: Person\n}\n"));
}

#[test]
fn conflicting_names_are_rejected() {
    let mut builder = TypeRegistry::<SchemaType>::builder().without_sink();
    crate::register_builtins(&mut builder).unwrap();
    builder
        .register("Root", crate::OBJECT_TAG, |cx| {
            let first = cx.resolve(&Identifier::bare("Twin").with_option("n", 1), None)?;
            let second = cx.resolve(&Identifier::bare("Twin").with_option("n", 2), None)?;
            Ok(Arc::new(SchemaType::object(
                "Root",
                vec![crate::Field::new("a", first), crate::Field::new("b", second)],
            )))
        })
        .unwrap();
    builder
        .register("Twin", crate::SCALAR_TAG, |_| Ok(Arc::new(SchemaType::scalar("Twin"))))
        .unwrap();
    let registry = builder.build().unwrap();

    let err = Schema::build(&registry, &Identifier::bare("Root"), None).unwrap_err();

    assert!(matches!(err, SchemaError::ConflictingTypeName(name) if name == "Twin"));
}

#[test]
fn unknown_root_is_a_registry_error() {
    let (_, registry) = blog();

    assert!(matches!(
        Schema::build(&registry, &Identifier::bare("Nope"), None),
        Err(SchemaError::Registry(_))
    ));
}
