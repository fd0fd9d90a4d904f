//! Registry errors.

use std::fmt;

use gqlr_ir::{CacheKey, IdentifierError};

use crate::FamilyTag;

/// Error type factories return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a registry operation.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The identifier has no canonical form. Nothing was recorded.
    #[error("invalid type identifier `{identifier}`: {reason}")]
    InvalidIdentifier {
        identifier: String,
        #[source]
        reason: IdentifierError,
    },

    /// The name is unknown or outside the admitted type family. Nothing was
    /// recorded.
    #[error("`{reference}` cannot be resolved: {problem}")]
    InvalidTypeReference {
        reference: String,
        problem: ReferenceProblem,
    },

    /// The factory failed. The pending marker was removed, so a later
    /// resolve retries from scratch.
    #[error("failed to construct `{reference}`")]
    ConstructionFailed {
        reference: String,
        #[source]
        source: BoxError,
    },

    /// A deferred handle was read before its construction completed, or
    /// after that construction failed and before a retry succeeded.
    #[error("forward reference to `{reference}` ({key}) read before its construction completed")]
    UnresolvedForwardReference { reference: String, key: CacheKey },

    /// Two factories were registered under one name.
    #[error("a factory named `{name}` is already registered")]
    DuplicateFactory { name: String },
}

/// Why a reference was rejected by the family validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceProblem {
    /// No factory is registered under the name.
    NotRegistered,
    /// A factory exists but its tag is not admitted.
    OutsideFamily(FamilyTag),
}

impl fmt::Display for ReferenceProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceProblem::NotRegistered => write!(f, "no type is registered under this name"),
            ReferenceProblem::OutsideFamily(tag) => {
                write!(f, "`{tag}` types are not members of the schema type family")
            }
        }
    }
}
