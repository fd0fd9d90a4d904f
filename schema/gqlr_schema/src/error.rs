//! Schema-level errors.

use std::path::PathBuf;

use gqlr_registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("type `{type_name}` requires option `{option}`")]
    MissingOption {
        type_name: String,
        option: &'static str,
    },

    #[error("option `{option}` of type `{type_name}` is invalid: {reason}")]
    InvalidOption {
        type_name: String,
        option: &'static str,
        reason: &'static str,
    },

    #[error("type `{type_name}` must be resolved against a node type")]
    MissingContext { type_name: String },

    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),

    #[error("node type name `{0}` is reserved")]
    ReservedName(String),

    #[error("invalid type notation `{notation}`: {reason}")]
    Notation {
        notation: String,
        reason: &'static str,
    },

    #[error("two different types are named `{0}`")]
    ConflictingTypeName(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("cannot read node types from `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed node-type definitions")]
    Json(#[from] serde_json::Error),
}
