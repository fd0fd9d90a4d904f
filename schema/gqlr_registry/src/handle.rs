//! Resolved and forward type references.

use std::fmt;
use std::sync::Arc;

use gqlr_ir::CacheKey;
use parking_lot::{Condvar, Mutex};

use crate::RegistryError;

enum SlotState<T: ?Sized> {
    Waiting,
    Ready(Arc<T>),
    Abandoned,
}

/// Write-once slot standing in for an instance under construction.
///
/// The registry fulfills it exactly once when construction succeeds, or
/// abandons it when construction fails. An abandoned slot is rearmed when
/// its key is retried; a fulfilled slot never changes again.
pub(crate) struct Deferred<T: ?Sized> {
    state: Mutex<SlotState<T>>,
    settled: Condvar,
}

impl<T: ?Sized> Deferred<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Waiting),
            settled: Condvar::new(),
        }
    }

    /// Returns `false` if the slot had already settled.
    pub(crate) fn fulfill(&self, instance: Arc<T>) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, SlotState::Waiting) {
            return false;
        }
        *state = SlotState::Ready(instance);
        drop(state);
        self.settled.notify_all();
        true
    }

    pub(crate) fn abandon(&self) {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Waiting) {
            *state = SlotState::Abandoned;
        }
        drop(state);
        self.settled.notify_all();
    }

    /// Back to waiting after an abandonment, for a retried construction.
    pub(crate) fn rearm(&self) {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Abandoned) {
            *state = SlotState::Waiting;
        }
    }

    fn peek(&self) -> Option<Arc<T>> {
        match &*self.state.lock() {
            SlotState::Ready(instance) => Some(Arc::clone(instance)),
            SlotState::Waiting | SlotState::Abandoned => None,
        }
    }

    fn wait(&self) -> Option<Arc<T>> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                SlotState::Ready(instance) => return Some(Arc::clone(instance)),
                SlotState::Abandoned => return None,
                SlotState::Waiting => self.settled.wait(&mut state),
            }
        }
    }
}

enum Target<T: ?Sized> {
    Ready(Arc<T>),
    Deferred(Arc<Deferred<T>>),
}

/// Reference to a resolved type.
///
/// Normally the instance is already there. A handle returned for a type
/// that was still under construction is *deferred*: it fills in once that
/// construction completes. Store deferred handles (in fields, wrapper types)
/// and read them after the outermost resolve has returned.
pub struct TypeHandle<T: ?Sized> {
    key: CacheKey,
    reference: Arc<str>,
    target: Target<T>,
}

impl<T: ?Sized> TypeHandle<T> {
    pub(crate) fn ready(key: CacheKey, reference: Arc<str>, instance: Arc<T>) -> Self {
        Self {
            key,
            reference,
            target: Target::Ready(instance),
        }
    }

    pub(crate) fn deferred(key: CacheKey, reference: Arc<str>, slot: Arc<Deferred<T>>) -> Self {
        Self {
            key,
            reference,
            target: Target::Deferred(slot),
        }
    }

    pub fn key(&self) -> CacheKey {
        self.key
    }

    /// Human-readable form of the identifier this handle was resolved from.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Whether the handle was deferred when it was created. It may have
    /// been fulfilled since.
    pub fn is_deferred(&self) -> bool {
        matches!(self.target, Target::Deferred(_))
    }

    pub fn is_ready(&self) -> bool {
        match &self.target {
            Target::Ready(_) => true,
            Target::Deferred(slot) => slot.peek().is_some(),
        }
    }

    /// The instance, without blocking.
    ///
    /// Fails with [`RegistryError::UnresolvedForwardReference`] if the
    /// construction this handle waits for has not completed, or failed.
    pub fn get(&self) -> Result<Arc<T>, RegistryError> {
        match &self.target {
            Target::Ready(instance) => Ok(Arc::clone(instance)),
            Target::Deferred(slot) => slot.peek().ok_or_else(|| self.unresolved()),
        }
    }

    /// The instance, blocking until its construction settles.
    ///
    /// Only meaningful when another thread is doing the construction; a
    /// thread waiting on its own pending type never wakes up.
    pub fn wait(&self) -> Result<Arc<T>, RegistryError> {
        match &self.target {
            Target::Ready(instance) => Ok(Arc::clone(instance)),
            Target::Deferred(slot) => slot.wait().ok_or_else(|| self.unresolved()),
        }
    }

    fn unresolved(&self) -> RegistryError {
        RegistryError::UnresolvedForwardReference {
            reference: self.reference.to_string(),
            key: self.key,
        }
    }
}

impl<T: ?Sized> Clone for TypeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            reference: Arc::clone(&self.reference),
            target: match &self.target {
                Target::Ready(instance) => Target::Ready(Arc::clone(instance)),
                Target::Deferred(slot) => Target::Deferred(Arc::clone(slot)),
            },
        }
    }
}

impl<T: ?Sized> fmt::Debug for TypeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandle")
            .field("reference", &self.reference)
            .field("key", &self.key)
            .field("deferred", &self.is_deferred())
            .field("ready", &self.is_ready())
            .finish()
    }
}
