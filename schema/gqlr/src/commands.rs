//! Command handlers for the gqlr CLI.

use std::path::PathBuf;
use std::sync::Arc;

use gqlr_registry::{Identifier, RegistryError, RegistryOptions};
use gqlr_schema::{
    build_registry, prewarm, NodeTypes, Schema, SchemaError, SchemaRegistry, TypeRef, QUERY,
};

/// Options shared by `schema` and `stats`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub nodes: PathBuf,
    /// Node type to use as the query root instead of `Query`.
    pub root: Option<String>,
    pub dump_identities: bool,
}

impl Invocation {
    /// Parse the arguments following the command name.
    ///
    /// Accepts `--root <NodeType>`, `--root=<NodeType>` and
    /// `--dump-identities` in any position around the definitions path.
    pub fn parse(args: &[String]) -> Result<Invocation, String> {
        let mut invocation = Invocation::default();
        let mut nodes = None;
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if arg == "--root" {
                let Some(root) = args.get(i + 1) else {
                    return Err("--root needs a node type name".to_owned());
                };
                invocation.root = Some(root.clone());
                i += 2;
                continue;
            }
            if let Some(root) = arg.strip_prefix("--root=") {
                invocation.root = Some(root.to_owned());
            } else if arg == "--dump-identities" {
                invocation.dump_identities = true;
            } else if arg.starts_with('-') {
                return Err(format!("unknown option `{arg}`"));
            } else if nodes.is_none() {
                nodes = Some(PathBuf::from(arg));
            } else {
                return Err(format!("unexpected argument `{arg}`"));
            }
            i += 1;
        }
        invocation.nodes = nodes.ok_or_else(|| "missing node-type definitions file".to_owned())?;
        Ok(invocation)
    }

    fn options(&self, session: &str) -> RegistryOptions {
        RegistryOptions::default()
            .with_session(session)
            .with_identity_dumps(self.dump_identities)
    }
}

/// Build the schema for `nodes` and print it as SDL.
pub fn render_schema(nodes: &NodeTypes, invocation: &Invocation) -> Result<String, SchemaError> {
    let registry = build_registry(nodes, invocation.options("schema"))?;
    prewarm_nodes(&registry, nodes)?;
    let schema = build_schema(&registry, nodes, invocation.root.as_deref())?;
    schema.to_sdl()
}

/// Build the schema for `nodes` and summarize the registry.
pub fn render_stats(nodes: &NodeTypes, invocation: &Invocation) -> Result<String, SchemaError> {
    let registry = build_registry(nodes, invocation.options("stats"))?;
    prewarm_nodes(&registry, nodes)?;
    let schema = build_schema(&registry, nodes, invocation.root.as_deref())?;

    let stats = registry.stats();
    Ok(format!(
        "node types: {}\nnamed types: {}\ncached instances: {}\nfactories: {}\n{stats}\n",
        nodes.len(),
        schema.types().len(),
        registry.len(),
        registry.factory_names().join(", "),
    ))
}

/// Construct every node object in parallel before the schema walk.
fn prewarm_nodes(registry: &SchemaRegistry, nodes: &NodeTypes) -> Result<Vec<TypeRef>, RegistryError> {
    let requests: Vec<_> = nodes
        .iter()
        .map(|node| (node.identifier(), Some(Arc::clone(node.context()))))
        .collect();
    prewarm(registry, &requests)
}

fn build_schema(
    registry: &SchemaRegistry,
    nodes: &NodeTypes,
    root: Option<&str>,
) -> Result<Schema, SchemaError> {
    match root {
        Some(name) => {
            let (identifier, context) = nodes.node_reference(name)?;
            Schema::build(registry, &identifier, Some(&context))
        }
        None => Schema::build(registry, &Identifier::bare(QUERY), None),
    }
}
