//! Schema assembly and SDL printing.

use std::collections::BTreeMap;
use std::sync::Arc;

use gqlr_registry::{CacheKey, Context, Identifier};
use rustc_hash::FxHashSet;

use crate::{SchemaError, SchemaRegistry, SchemaType, TypeKind, TypeRef, BUILTIN_SCALARS};

/// Every named type reachable from a query root.
#[derive(Debug)]
pub struct Schema {
    query: Arc<SchemaType>,
    types: BTreeMap<String, Arc<SchemaType>>,
}

impl Schema {
    /// Resolve `root` and collect the types reachable from it.
    ///
    /// Fails if two distinct instances share a type name, which happens
    /// when the same name is produced under different contexts or options.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %root))]
    pub fn build(
        registry: &SchemaRegistry,
        root: &Identifier,
        context: Option<&Arc<Context>>,
    ) -> Result<Schema, SchemaError> {
        let entry = registry.resolve(root, context)?;
        let query = entry.get()?.named_type()?;

        let mut types = BTreeMap::new();
        let mut visited: FxHashSet<CacheKey> = FxHashSet::default();
        let mut stack: Vec<TypeRef> = vec![entry];
        while let Some(handle) = stack.pop() {
            if !visited.insert(handle.key()) {
                continue;
            }
            let ty = handle.get()?;
            match ty.kind() {
                TypeKind::List(of) | TypeKind::NonNull(of) => stack.push(of.clone()),
                TypeKind::Object { fields, .. } => {
                    stack.extend(fields.iter().rev().map(|field| field.ty.clone()));
                }
                TypeKind::Scalar { .. } | TypeKind::Enum { .. } => {}
            }
            if let Some(name) = ty.name() {
                match types.get(name) {
                    Some(existing) if !Arc::ptr_eq(existing, &ty) => {
                        return Err(SchemaError::ConflictingTypeName(name.to_owned()));
                    }
                    Some(_) => {}
                    None => {
                        types.insert(name.to_owned(), Arc::clone(&ty));
                    }
                }
            }
        }
        tracing::debug!(types = types.len(), "schema assembled");

        Ok(Schema { query, types })
    }

    pub fn query(&self) -> &Arc<SchemaType> {
        &self.query
    }

    /// Named types by name.
    pub fn types(&self) -> &BTreeMap<String, Arc<SchemaType>> {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SchemaType>> {
        self.types.get(name)
    }

    /// Print the schema as SDL, types in name order.
    ///
    /// Builtin scalars are left out. A `schema` block is added when the
    /// query root is not named `Query`.
    pub fn to_sdl(&self) -> Result<String, SchemaError> {
        let mut blocks = Vec::with_capacity(self.types.len() + 1);
        for (name, ty) in &self.types {
            if BUILTIN_SCALARS.contains(&name.as_str()) {
                continue;
            }
            if let Some(sdl) = ty.sdl()? {
                blocks.push(sdl);
            }
        }
        if let Some(name) = self.query.name().filter(|name| *name != crate::QUERY) {
            blocks.push(format!("schema {{\n  query: {name}\n}}\n"));
        }
        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
