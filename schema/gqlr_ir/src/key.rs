//! Content-derived cache keys.

use std::fmt;

use crate::{Context, Identifier, IdentifierError};

/// Identity of a resolved type: xxh3-128 over the canonical identity string.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(u128);

impl CacheKey {
    /// Validate `identifier` and derive its key under an optional context.
    pub fn derive(
        identifier: &Identifier,
        context: Option<&Context>,
    ) -> Result<CacheKey, IdentifierError> {
        identifier.validate()?;
        Ok(Self::from_canonical(&canonical_identity(identifier, context)))
    }

    /// Hash an already canonical identity string.
    pub fn from_canonical(canonical: &str) -> CacheKey {
        CacheKey(xxhash_rust::xxh3::xxh3_128(canonical.as_bytes()))
    }

    #[inline]
    pub const fn raw(self) -> u128 {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({self})")
    }
}

/// The string a [`CacheKey`] is hashed from.
///
/// Names and strings are quoted, so no two distinct identities share a form.
pub fn canonical_identity(identifier: &Identifier, context: Option<&Context>) -> String {
    let mut out = identifier.canonical();
    out.push('#');
    match context {
        Some(ctx) => out.push_str(&format!("{:?}", ctx.name())),
        None => out.push('~'),
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
