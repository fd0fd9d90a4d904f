//! Parallel resolution of a batch of types ahead of a schema walk.

use std::sync::Arc;

use gqlr_registry::{Context, Identifier, RegistryError};
use rayon::prelude::*;

use crate::{SchemaRegistry, TypeRef};

/// Resolve a batch of types on the rayon pool.
///
/// Requests that share a cache key are constructed once; every other
/// caller waits for that construction. Handles come back in request order.
pub fn prewarm(
    registry: &SchemaRegistry,
    requests: &[(Identifier, Option<Arc<Context>>)],
) -> Result<Vec<TypeRef>, RegistryError> {
    let span = tracing::debug_span!("prewarm", session = %registry.options().session, requests = requests.len());
    let _guard = span.enter();

    requests
        .par_iter()
        .map(|(identifier, context)| registry.resolve(identifier, context.as_ref()))
        .collect()
}
