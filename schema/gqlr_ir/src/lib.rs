//! Identity model for the gqlr type registry.
//!
//! A schema type is requested by [`Identifier`]: a registered type name,
//! optionally refined by a [`Config`] of options. Requests may additionally
//! be scoped to a [`Context`] (a schema-node descriptor). The triple is
//! reduced to a [`CacheKey`] which the registry uses to memoize instances.
//!
//! # Canonical Form
//!
//! Keys are derived from a canonical string, never from map iteration order:
//!
//! ```text
//! "ListOf"{"nullable":false,"of":@"String"}#"Page"
//! ^name    ^options sorted by name            ^context name (or ~)
//! ```
//!
//! The canonical string is hashed with xxh3-128.

mod context;
mod identifier;
mod key;

pub use context::Context;
pub use identifier::{Config, ConfigValue, Identifier, IdentifierError};
pub use key::{canonical_identity, CacheKey};
