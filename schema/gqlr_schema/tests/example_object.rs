//! A self-referencing object graph built from node-type definitions.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use gqlr_registry::{Identifier, RegistryOptions};
use gqlr_schema::{build_registry, prewarm, NodeType, NodeTypes, Schema, TypeExpr, QUERY};
use pretty_assertions::assert_eq;

fn example_nodes() -> NodeTypes {
    let example = NodeType::new("ExampleObject")
        .with_description("An object exercising every property kind")
        .with_property("someString", "String")
        .and_then(|n| n.with_property("someArray", "[String]"))
        .and_then(|n| n.with_property("isFoo", "Boolean!"))
        .and_then(|n| n.with_property("hasBar", "Boolean!"))
        .and_then(|n| n.with_property("someDate", "DateTime"))
        .and_then(|n| n.with_property("someSubObject", "ExampleObject"))
        .and_then(|n| n.with_property("someSubObjectsArray", "[ExampleObject]"))
        .and_then(|n| n.with_property("someSubObjectsIterator", "[ExampleObject!]!"))
        .unwrap();
    let mut nodes = NodeTypes::new();
    nodes.insert(example).unwrap();
    nodes
}

#[test]
fn example_object_sdl() {
    let nodes = example_nodes();
    let registry = build_registry(&nodes, RegistryOptions::default()).unwrap();
    let schema = Schema::build(&registry, &Identifier::bare(QUERY), None).unwrap();

    assert_eq!(
        schema.to_sdl().unwrap(),
        "\"\"\"An ISO-8601 encoded UTC date string.\"\"\"
scalar DateTime

\"\"\"An object exercising every property kind\"\"\"
type ExampleObject {
  someString: String
  someArray: [String]
  isFoo: Boolean!
  hasBar: Boolean!
  someDate: DateTime
  someSubObject: ExampleObject
  someSubObjectsArray: [ExampleObject]
  someSubObjectsIterator: [ExampleObject!]!
}

type Query {
  \"Look up a single ExampleObject\"
  exampleObject: ExampleObject
  \"Every ExampleObject\"
  allExampleObject: [ExampleObject!]!
}
"
    );
}

#[test]
fn sub_objects_are_the_same_instance() {
    let nodes = example_nodes();
    let registry = build_registry(&nodes, RegistryOptions::default()).unwrap();
    let (id, cx) = nodes.node_reference("ExampleObject").unwrap();

    let example = registry.instance(&id, Some(&cx)).unwrap();
    for field in ["someSubObject", "someSubObjectsArray", "someSubObjectsIterator"] {
        let named = example.field(field).unwrap().ty.get().unwrap().named_type().unwrap();
        assert!(Arc::ptr_eq(&named, &example), "{field}");
    }
    // ExampleObject, Boolean, NonNull(Boolean), String, [String], DateTime,
    // [ExampleObject], NonNull(ExampleObject), [ExampleObject!], [ExampleObject!]!
    assert_eq!(registry.len(), 10);
}

#[test]
fn prewarm_builds_each_type_once() {
    let nodes = example_nodes();
    let registry = build_registry(&nodes, RegistryOptions::default()).unwrap();
    let requests: Vec<_> = ["ExampleObject", "[ExampleObject]", "ExampleObject!", "String", "Query"]
        .iter()
        .cycle()
        .take(64)
        .map(|notation| nodes.reference(&TypeExpr::parse(notation).unwrap()))
        .collect();

    let handles = prewarm(&registry, &requests).unwrap();

    assert_eq!(handles.len(), 64);
    for (handle, again) in handles.iter().zip(handles.iter().skip(5)) {
        assert_eq!(handle.key(), again.key());
        assert!(Arc::ptr_eq(&handle.wait().unwrap(), &again.wait().unwrap()));
    }
    let stats = registry.stats();
    assert_eq!(stats.failures, 0);
    assert_eq!(stats.misses, registry.len() as u64);
}
