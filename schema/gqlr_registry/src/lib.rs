//! Type registry for schema graph construction.
//!
//! Building a schema means resolving the same type references over and over,
//! often from inside the construction of another type, and sometimes from
//! inside the construction of the very type being referenced. The
//! [`TypeRegistry`] makes this safe:
//!
//! - every identity ([`Identifier`] + optional [`Context`]) is built at most
//!   once and always resolves to the same `Arc`;
//! - a reference to a type that is still under construction yields a
//!   deferred [`TypeHandle`] instead of recursing;
//! - a failed or panicking construction is rolled back, so the next request
//!   retries, and forward handles given out meanwhile fill in once a retry
//!   succeeds.
//!
//! # Usage
//!
//! ```text
//! let mut builder = TypeRegistry::<MyType>::builder();
//! builder.register("Node", OBJECT, |cx| {
//!     let parent = cx.resolve(&Identifier::bare("Node"), None)?; // deferred
//!     Ok(Arc::new(MyType::node(parent)))
//! })?;
//! let registry = builder.build()?;
//! let node = registry.instance(&Identifier::bare("Node"), None)?;
//! ```
//!
//! # Thread Safety
//!
//! The registry is `Sync`. The table lock is held only for state
//! transitions; factories run unlocked. A caller that finds a key pending on
//! another thread blocks until that construction settles, unless blocking
//! would close a wait cycle, in which case it gets a deferred handle.

mod diagnostics;
mod error;
mod family;
mod handle;
mod options;
mod registry;

pub use diagnostics::{DiagnosticSink, Outcome, RegistryStats, ResolveRecord, TracingSink};
pub use error::{BoxError, ReferenceProblem, RegistryError};
pub use family::{AnyFamily, FamilyCheck, FamilyTag, FamilyTags, Reference};
pub use handle::TypeHandle;
pub use options::RegistryOptions;
pub use registry::{BuildCx, Factory, RegistryBuilder, TypeRegistry};

pub use gqlr_ir::{CacheKey, Config, ConfigValue, Context, Identifier, IdentifierError};
