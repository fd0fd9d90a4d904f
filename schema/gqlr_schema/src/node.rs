//! Node types: object types generated from JSON definitions.
//!
//! Every node type becomes a [`Context`]; the `Node` factory builds one
//! object per context, so `Node@Page` and `Node@Tag` are distinct cached
//! instances of the same factory. Properties referencing another node type
//! resolve to that node's object, which is how cyclic graphs (a `Page` with
//! a `parent: Page`) arise.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use gqlr_registry::{
    BoxError, BuildCx, Context, Identifier, RegistryError, RegistryOptions, TypeRegistry,
};
use serde::Deserialize;

use crate::builtins::register_builtins;
use crate::{
    schema_family, Field, SchemaError, SchemaRegistry, SchemaType, TypeExpr, TypeRef,
    BUILTIN_SCALARS, ENUM, LIST_OF, NON_NULL, OBJECT_TAG,
};

pub const NODE: &str = "Node";
pub const QUERY: &str = "Query";

const RESERVED: [&str; 6] = [NODE, QUERY, ENUM, LIST_OF, NON_NULL, "DateTime"];

/// One node-type definition.
#[derive(Clone, Debug)]
pub struct NodeType {
    context: Arc<Context>,
    description: Option<String>,
    properties: Vec<(String, TypeExpr)>,
}

impl NodeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            context: Arc::new(Context::new(name)),
            description: None,
            properties: Vec::new(),
        }
    }

    /// Add a property typed with SDL notation (`Page`, `[Tag!]`).
    pub fn with_property(mut self, name: impl Into<String>, notation: &str) -> Result<Self, SchemaError> {
        let name = name.into();
        let expr = TypeExpr::parse(notation)?;
        let context = (*self.context).clone().with_property(name.clone(), notation);
        self.context = Arc::new(context);
        self.properties.retain(|(existing, _)| *existing != name);
        self.properties.push((name, expr));
        Ok(self)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn properties(&self) -> &[(String, TypeExpr)] {
        &self.properties
    }

    /// Identifier of this node's object type.
    pub fn identifier(&self) -> Identifier {
        Identifier::bare(NODE)
    }
}

/// The set of node types a schema is generated from.
#[derive(Clone, Debug, Default)]
pub struct NodeTypes {
    types: BTreeMap<String, NodeType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Definitions {
    node_types: BTreeMap<String, Definition>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Definition {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

impl NodeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node type, replacing any previous one with the same name.
    pub fn insert(&mut self, node: NodeType) -> Result<(), SchemaError> {
        let name = node.name();
        if RESERVED.contains(&name) || BUILTIN_SCALARS.contains(&name) {
            return Err(SchemaError::ReservedName(name.to_owned()));
        }
        if !matches!(TypeExpr::parse(name)?, TypeExpr::Named(_)) {
            return Err(SchemaError::Notation {
                notation: name.to_owned(),
                reason: "node type names cannot be wrapped",
            });
        }
        self.types.insert(name.to_owned(), node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NodeType> {
        self.types.get(name)
    }

    /// Node types in name order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parse definitions of the form
    /// `{"nodeTypes": {"Page": {"properties": {"title": "String"}}}}`.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let definitions: Definitions = serde_json::from_str(json)?;
        let mut nodes = NodeTypes::new();
        for (name, definition) in definitions.node_types {
            let mut node = NodeType::new(name);
            if let Some(description) = definition.description {
                node = node.with_description(description);
            }
            for (property, notation) in &definition.properties {
                node = node.with_property(property.as_str(), notation)?;
            }
            nodes.insert(node)?;
        }
        Ok(nodes)
    }

    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Registry identifier and context for a type expression.
    ///
    /// Expressions naming a node type resolve against that node's context;
    /// everything else is context-free.
    pub fn reference(&self, expr: &TypeExpr) -> (Identifier, Option<Arc<Context>>) {
        match self.get(expr.named()) {
            Some(node) => (expr.wrap(node.identifier()), Some(Arc::clone(node.context()))),
            None => (expr.identifier(), None),
        }
    }

    /// Resolve a type expression from inside a factory.
    fn resolve(&self, cx: &BuildCx<'_, SchemaType>, expr: &TypeExpr) -> Result<TypeRef, RegistryError> {
        let (identifier, context) = self.reference(expr);
        cx.resolve(&identifier, context.as_ref())
    }

    /// The context-bound object of node type `name`.
    pub fn node_reference(&self, name: &str) -> Result<(Identifier, Arc<Context>), SchemaError> {
        let node = self
            .get(name)
            .ok_or_else(|| SchemaError::UnknownNodeType(name.to_owned()))?;
        Ok((node.identifier(), Arc::clone(node.context())))
    }
}

/// A registry holding the builtins plus the `Node` and `Query` factories
/// for `nodes`.
pub fn build_registry(nodes: &NodeTypes, options: RegistryOptions) -> Result<SchemaRegistry, SchemaError> {
    let mut builder = TypeRegistry::<SchemaType>::builder()
        .family(schema_family())
        .options(options);
    register_builtins(&mut builder)?;

    let shared = Arc::new(nodes.clone());
    let for_nodes = Arc::clone(&shared);
    builder.register(NODE, OBJECT_TAG, move |cx| build_node(cx, &for_nodes))?;
    builder.register(QUERY, OBJECT_TAG, move |cx| build_query(cx, &shared))?;

    Ok(builder.build()?)
}

fn build_node(cx: &BuildCx<'_, SchemaType>, nodes: &NodeTypes) -> Result<Arc<SchemaType>, BoxError> {
    let context = cx.context().ok_or_else(|| SchemaError::MissingContext {
        type_name: cx.name().to_owned(),
    })?;
    let node = nodes
        .get(context.name())
        .ok_or_else(|| SchemaError::UnknownNodeType(context.name().to_owned()))?;

    let fields = node
        .properties()
        .iter()
        .map(|(name, expr)| Ok(Field::new(name.as_str(), nodes.resolve(cx, expr)?)))
        .collect::<Result<Vec<_>, RegistryError>>()?;
    tracing::trace!(node = node.name(), fields = fields.len(), "built node object");

    Ok(Arc::new(
        SchemaType::object(node.name(), fields).with_description(node.description.clone()),
    ))
}

fn build_query(cx: &BuildCx<'_, SchemaType>, nodes: &NodeTypes) -> Result<Arc<SchemaType>, BoxError> {
    let mut fields = Vec::with_capacity(nodes.len() * 2);
    for node in nodes.iter() {
        let name = node.name();
        let single = TypeExpr::Named(name.to_owned());
        let all = TypeExpr::NonNull(Box::new(TypeExpr::List(Box::new(TypeExpr::NonNull(Box::new(
            single.clone(),
        ))))));
        fields.push(
            Field::new(lower_first(name), nodes.resolve(cx, &single)?)
                .with_description(format!("Look up a single {name}")),
        );
        fields.push(
            Field::new(format!("all{name}"), nodes.resolve(cx, &all)?)
                .with_description(format!("Every {name}")),
        );
    }
    Ok(Arc::new(SchemaType::object(QUERY, fields)))
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
