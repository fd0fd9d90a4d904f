//! Schema types for gqlr.
//!
//! Provides the concrete type family resolved through
//! [`gqlr_registry::TypeRegistry`]: scalars, enums, objects and the list and
//! non-null wrappers, plus object types generated from node-type
//! definitions.
//!
//! # Architecture
//!
//! ```text
//! NodeTypes (JSON definitions)
//!     └── build_registry ──▶ TypeRegistry<SchemaType>
//!                                 ├── builtin factories (String, ListOf, NonNull, Enum, ...)
//!                                 ├── Node (one object per node-type context)
//!                                 └── Query (entry points for every node type)
//! Schema::build(root) walks every reachable type and prints SDL.
//! ```

mod builtins;
mod error;
mod node;
mod notation;
mod prewarm;
mod schema;
mod types;

pub use builtins::{register_builtins, BUILTIN_SCALARS, ENUM, LIST_OF, NON_NULL};
pub use error::SchemaError;
pub use node::{build_registry, NodeType, NodeTypes, NODE, QUERY};
pub use notation::TypeExpr;
pub use prewarm::prewarm;
pub use schema::Schema;
pub use types::{schema_family, Field, SchemaType, TypeKind, ENUM_TAG, LIST_TAG, NON_NULL_TAG, OBJECT_TAG, SCALAR_TAG};

/// Handle to a schema type in the registry.
pub type TypeRef = gqlr_registry::TypeHandle<SchemaType>;

/// Registry specialized to schema types.
pub type SchemaRegistry = gqlr_registry::TypeRegistry<SchemaType>;
