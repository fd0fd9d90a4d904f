//! The memoizing type registry.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use gqlr_ir::{canonical_identity, CacheKey, Config, ConfigValue, Context, Identifier};
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tracing::Level;

use crate::diagnostics::Counters;
use crate::handle::Deferred;
use crate::{
    AnyFamily, BoxError, DiagnosticSink, FamilyCheck, FamilyTag, Outcome, Reference,
    ReferenceProblem, RegistryError, RegistryOptions, RegistryStats, ResolveRecord, TracingSink,
    TypeHandle,
};

/// Constructor delegate for one registered type name.
pub type Factory<T> = Box<dyn Fn(&BuildCx<'_, T>) -> Result<Arc<T>, BoxError> + Send + Sync>;

struct FactoryEntry<T: ?Sized> {
    tag: FamilyTag,
    build: Factory<T>,
}

enum Entry<T: ?Sized> {
    /// Construction in progress on `owner`.
    Pending {
        owner: ThreadId,
        slot: Arc<Deferred<T>>,
    },
    Ready(Arc<T>),
}

struct Table<T: ?Sized> {
    entries: FxHashMap<CacheKey, Entry<T>>,
    /// Key each blocked thread is waiting on.
    waiting: FxHashMap<ThreadId, CacheKey>,
    /// Slots of failed constructions that handles still point at. A retry of
    /// the key reuses the slot, so those handles resolve once it succeeds.
    retired: FxHashMap<CacheKey, Arc<Deferred<T>>>,
}

impl<T: ?Sized> Table<T> {
    /// Whether `me` blocking on a key owned by `owner` would close a cycle
    /// of threads waiting on each other's constructions.
    fn closes_wait_cycle(&self, owner: ThreadId, me: ThreadId) -> bool {
        let mut thread = owner;
        // Each hop follows a distinct waiting thread, so the walk is bounded.
        for _ in 0..=self.waiting.len() {
            if thread == me {
                return true;
            }
            let Some(key) = self.waiting.get(&thread) else {
                return false;
            };
            match self.entries.get(key) {
                Some(Entry::Pending { owner, .. }) => thread = *owner,
                Some(Entry::Ready(_)) | None => return false,
            }
        }
        false
    }
}

/// Collects factories and builds a [`TypeRegistry`].
pub struct RegistryBuilder<T: ?Sized> {
    factories: FxHashMap<String, FactoryEntry<T>>,
    family: Box<dyn FamilyCheck>,
    sink: Option<Box<dyn DiagnosticSink>>,
    options: RegistryOptions,
}

impl<T: ?Sized + Send + Sync + 'static> RegistryBuilder<T> {
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
            family: Box::new(AnyFamily),
            sink: Some(Box::new(TracingSink)),
            options: RegistryOptions::default(),
        }
    }

    /// Restrict which factory tags belong to the type family.
    #[must_use]
    pub fn family(mut self, check: impl FamilyCheck + 'static) -> Self {
        self.family = Box::new(check);
        self
    }

    /// Replace the default [`TracingSink`].
    #[must_use]
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub fn without_sink(mut self) -> Self {
        self.sink = None;
        self
    }

    #[must_use]
    pub fn options(mut self, options: RegistryOptions) -> Self {
        self.options = options;
        self
    }

    /// Register the factory for `name`.
    ///
    /// Fails if the name is taken or the family check rejects `tag`.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        tag: FamilyTag,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&BuildCx<'_, T>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateFactory { name });
        }
        check_family(&*self.family, &name, tag)?;
        self.factories.insert(
            name,
            FactoryEntry {
                tag,
                build: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Finish registration.
    ///
    /// Re-checks every factory, so the family may be set after registering.
    pub fn build(self) -> Result<TypeRegistry<T>, RegistryError> {
        for (name, entry) in &self.factories {
            check_family(&*self.family, name, entry.tag)?;
        }
        Ok(TypeRegistry {
            factories: self.factories,
            family: self.family,
            sink: self.sink,
            options: self.options,
            table: Mutex::new(Table {
                entries: FxHashMap::default(),
                waiting: FxHashMap::default(),
                retired: FxHashMap::default(),
            }),
            settled: Condvar::new(),
            counters: Counters::default(),
        })
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for RegistryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_family(
    family: &dyn FamilyCheck,
    name: &str,
    tag: FamilyTag,
) -> Result<(), RegistryError> {
    if family.admits(&Reference { name, tag }) {
        Ok(())
    } else {
        Err(RegistryError::InvalidTypeReference {
            reference: name.to_owned(),
            problem: ReferenceProblem::OutsideFamily(tag),
        })
    }
}

/// Memoizing, cycle-safe table of constructed schema types.
///
/// One registry serves one schema build. Dropping it drops every instance
/// it still owns; handles and `Arc`s given out stay valid.
///
/// # State per key
///
/// ```text
/// Absent ──resolve──▶ Pending ──factory ok──▶ Ready
///    ▲                   │
///    └───factory error───┘
/// ```
pub struct TypeRegistry<T: ?Sized> {
    factories: FxHashMap<String, FactoryEntry<T>>,
    family: Box<dyn FamilyCheck>,
    sink: Option<Box<dyn DiagnosticSink>>,
    options: RegistryOptions,
    table: Mutex<Table<T>>,
    /// Signalled whenever a pending entry settles.
    settled: Condvar,
    counters: Counters,
}

impl<T: ?Sized + Send + Sync + 'static> TypeRegistry<T> {
    pub fn builder() -> RegistryBuilder<T> {
        RegistryBuilder::new()
    }

    /// Resolve `identifier` (scoped to `context`) to its canonical instance.
    ///
    /// The returned handle is ready unless the type is being constructed by
    /// this very call chain (a self or mutual reference), in which case it
    /// is deferred and fills in when that construction finishes.
    pub fn resolve(
        &self,
        identifier: &Identifier,
        context: Option<&Arc<Context>>,
    ) -> Result<TypeHandle<T>, RegistryError> {
        let started = Instant::now();
        let key = CacheKey::derive(identifier, context.map(|ctx| &**ctx)).map_err(|reason| {
            RegistryError::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason,
            }
        })?;
        let reference: Arc<str> = describe(identifier, context).into();

        if self.options.dump_identities && tracing::enabled!(Level::TRACE) {
            tracing::trace!(
                key = %key,
                canonical = %canonical_identity(identifier, context.map(|ctx| &**ctx)),
                "type registry: identity",
            );
        }

        let me = thread::current().id();
        let mut waited = false;
        let mut table = self.table.lock();
        let factory = loop {
            match table.entries.get(&key) {
                Some(Entry::Ready(instance)) => {
                    let instance = Arc::clone(instance);
                    drop(table);
                    let outcome = if waited { Outcome::Waited } else { Outcome::Hit };
                    self.report(&reference, key, outcome, started);
                    return Ok(TypeHandle::ready(key, reference, instance));
                }
                Some(Entry::Pending { owner, slot }) => {
                    let owner = *owner;
                    if owner == me
                        || !self.options.block_on_foreign_pending
                        || table.closes_wait_cycle(owner, me)
                    {
                        let slot = Arc::clone(slot);
                        drop(table);
                        self.report(&reference, key, Outcome::Deferred, started);
                        return Ok(TypeHandle::deferred(key, reference, slot));
                    }
                    table.waiting.insert(me, key);
                    self.settled.wait(&mut table);
                    table.waiting.remove(&me);
                    waited = true;
                }
                // Validation runs only here: keys with an entry passed it.
                None => break self.validate(identifier)?,
            }
        };

        let slot = match table.retired.remove(&key) {
            Some(slot) => {
                slot.rearm();
                slot
            }
            None => Arc::new(Deferred::new()),
        };
        table.entries.insert(
            key,
            Entry::Pending {
                owner: me,
                slot: Arc::clone(&slot),
            },
        );
        drop(table);

        let pending = PendingGuard {
            registry: self,
            key,
            slot,
            armed: true,
        };
        let cx = BuildCx {
            registry: self,
            identifier,
            context,
            key,
        };
        let built = ensure_sufficient_stack(|| (factory.build)(&cx));

        match built {
            Ok(instance) => {
                let slot = pending.disarm();
                self.table.lock().entries.insert(key, Entry::Ready(Arc::clone(&instance)));
                let first = slot.fulfill(Arc::clone(&instance));
                debug_assert!(first, "deferred slot for {key} settled twice");
                self.settled.notify_all();
                self.report(&reference, key, Outcome::Miss, started);
                Ok(TypeHandle::ready(key, reference, instance))
            }
            Err(source) => {
                drop(pending);
                tracing::debug!(
                    session = %self.options.session,
                    reference = &*reference,
                    key = %key,
                    error = %source,
                    "type registry: construction failed",
                );
                Err(RegistryError::ConstructionFailed {
                    reference: reference.to_string(),
                    source,
                })
            }
        }
    }

    /// Resolve and read the instance.
    ///
    /// For callers outside any construction; inside a factory use
    /// [`BuildCx::resolve`] and keep the handle, since the instance may not
    /// exist yet.
    pub fn instance(
        &self,
        identifier: &Identifier,
        context: Option<&Arc<Context>>,
    ) -> Result<Arc<T>, RegistryError> {
        self.resolve(identifier, context)?.get()
    }

    /// The ready instance stored under `key`, if any.
    pub fn lookup(&self, key: CacheKey) -> Option<Arc<T>> {
        match self.table.lock().entries.get(&key) {
            Some(Entry::Ready(instance)) => Some(Arc::clone(instance)),
            Some(Entry::Pending { .. }) | None => None,
        }
    }

    /// Whether `key` has an entry, ready or pending.
    pub fn contains(&self, key: CacheKey) -> bool {
        self.table.lock().entries.contains_key(&key)
    }

    /// Number of entries, ready or pending.
    pub fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every ready instance, ordered by key.
    pub fn instances(&self) -> Vec<(CacheKey, Arc<T>)> {
        let table = self.table.lock();
        let mut ready: Vec<_> = table
            .entries
            .iter()
            .filter_map(|(key, entry)| match entry {
                Entry::Ready(instance) => Some((*key, Arc::clone(instance))),
                Entry::Pending { .. } => None,
            })
            .collect();
        drop(table);
        ready.sort_unstable_by_key(|(key, _)| *key);
        ready
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn factory_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn stats(&self) -> RegistryStats {
        self.counters.snapshot()
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Undo a construction that failed or panicked: drop the pending entry,
    /// settle its slot and wake every waiter so the key can be retried.
    fn roll_back(&self, key: CacheKey, slot: &Arc<Deferred<T>>) {
        let mut table = self.table.lock();
        table.entries.remove(&key);
        // With the entry gone only the guard holds the slot, unless handles
        // to it were given out during the construction.
        if Arc::strong_count(slot) > 1 {
            table.retired.insert(key, Arc::clone(slot));
        }
        // Abandon under the table lock so a retry cannot rearm the slot first.
        slot.abandon();
        drop(table);
        self.settled.notify_all();
        self.counters.count_failure();
    }

    fn validate(&self, identifier: &Identifier) -> Result<&FactoryEntry<T>, RegistryError> {
        let name = identifier.name();
        let Some(entry) = self.factories.get(name) else {
            return Err(RegistryError::InvalidTypeReference {
                reference: identifier.to_string(),
                problem: ReferenceProblem::NotRegistered,
            });
        };
        check_family(&*self.family, name, entry.tag)?;
        Ok(entry)
    }

    fn report(&self, reference: &str, key: CacheKey, outcome: Outcome, started: Instant) {
        self.counters.count(outcome);
        let Some(sink) = &self.sink else {
            return;
        };
        let record = ResolveRecord {
            session: &self.options.session,
            reference,
            key,
            outcome,
            duration: started.elapsed(),
        };
        match panic::catch_unwind(AssertUnwindSafe(|| sink.record(&record))) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::warn!(%error, "type registry: diagnostic sink failed"),
            Err(_) => tracing::warn!("type registry: diagnostic sink panicked"),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for TypeRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("session", &self.options.session)
            .field("factories", &self.factories.len())
            .field("entries", &self.table.lock().entries.len())
            .finish_non_exhaustive()
    }
}

/// What a factory sees while constructing one type.
pub struct BuildCx<'a, T: ?Sized> {
    registry: &'a TypeRegistry<T>,
    identifier: &'a Identifier,
    context: Option<&'a Arc<Context>>,
    key: CacheKey,
}

impl<'a, T: ?Sized + Send + Sync + 'static> BuildCx<'a, T> {
    pub fn registry(&self) -> &'a TypeRegistry<T> {
        self.registry
    }

    /// Resolve a related type. The handle may be deferred.
    pub fn resolve(
        &self,
        identifier: &Identifier,
        context: Option<&Arc<Context>>,
    ) -> Result<TypeHandle<T>, RegistryError> {
        self.registry.resolve(identifier, context)
    }

    /// Resolve a related type under this type's own context.
    pub fn resolve_in_context(&self, identifier: &Identifier) -> Result<TypeHandle<T>, RegistryError> {
        self.registry.resolve(identifier, self.context)
    }

    pub fn identifier(&self) -> &'a Identifier {
        self.identifier
    }

    pub fn name(&self) -> &'a str {
        self.identifier.name()
    }

    pub fn config(&self) -> &'a Config {
        self.identifier.config()
    }

    pub fn option(&self, name: &str) -> Option<&'a ConfigValue> {
        self.identifier.config().get(name)
    }

    pub fn context(&self) -> Option<&'a Arc<Context>> {
        self.context
    }

    pub fn key(&self) -> CacheKey {
        self.key
    }
}

/// Rolls back a pending construction unless disarmed, including when the
/// factory panics.
struct PendingGuard<'r, T: ?Sized + Send + Sync + 'static> {
    registry: &'r TypeRegistry<T>,
    key: CacheKey,
    slot: Arc<Deferred<T>>,
    armed: bool,
}

impl<T: ?Sized + Send + Sync + 'static> PendingGuard<'_, T> {
    fn disarm(mut self) -> Arc<Deferred<T>> {
        self.armed = false;
        Arc::clone(&self.slot)
    }
}

impl<T: ?Sized + Send + Sync + 'static> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if thread::panicking() {
            tracing::warn!(key = %self.key, "type registry: construction panicked");
        }
        self.registry.roll_back(self.key, &self.slot);
    }
}

fn describe(identifier: &Identifier, context: Option<&Arc<Context>>) -> String {
    match context {
        Some(ctx) => format!("{identifier}@{}", ctx.name()),
        None => identifier.to_string(),
    }
}

/// Stack headroom below which construction grows the stack.
const RED_ZONE: usize = 100 * 1024;

/// Size of each stack extension.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Type graphs can nest resolve calls deeply (long reference chains), so
/// each construction runs with guaranteed stack headroom.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
