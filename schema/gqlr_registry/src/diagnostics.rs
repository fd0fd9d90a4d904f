//! Resolve diagnostics: per-call records and aggregate counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use gqlr_ir::CacheKey;

use crate::BoxError;

/// How a resolve call was answered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The instance was already built.
    Hit,
    /// The instance was built by this call.
    Miss,
    /// The type was under construction; a forward handle was returned.
    Deferred,
    /// Another thread was building the type; this call waited for it.
    Waited,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Hit => "cache hit",
            Outcome::Miss => "cache miss",
            Outcome::Deferred => "deferred",
            Outcome::Waited => "waited",
        })
    }
}

/// One resolve call, as reported to a [`DiagnosticSink`].
#[derive(Copy, Clone, Debug)]
pub struct ResolveRecord<'a> {
    pub session: &'a str,
    pub reference: &'a str,
    pub key: CacheKey,
    pub outcome: Outcome,
    /// Wall time of the call, including construction on a miss.
    pub duration: Duration,
}

impl ResolveRecord<'_> {
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Receiver of resolve diagnostics.
///
/// Best effort: the registry swallows errors and panics raised here.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: &ResolveRecord<'_>) -> Result<(), BoxError>;
}

/// Emits each record as a `tracing` debug event.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, record: &ResolveRecord<'_>) -> Result<(), BoxError> {
        tracing::debug!(
            session = record.session,
            reference = record.reference,
            key = %record.key,
            outcome = %record.outcome,
            duration_ms = record.duration_ms(),
            "type registry: {}",
            record.outcome,
        );
        Ok(())
    }
}

/// Snapshot of a registry's counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub hits: u64,
    /// Successful constructions.
    pub misses: u64,
    pub deferred: u64,
    pub waited: u64,
    /// Constructions that failed and were rolled back.
    pub failures: u64,
}

impl RegistryStats {
    /// Total resolve calls that returned a handle.
    pub fn resolves(&self) -> u64 {
        self.hits + self.misses + self.deferred + self.waited
    }
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resolves: {} hits, {} misses, {} deferred, {} waited, {} failures",
            self.resolves(),
            self.hits,
            self.misses,
            self.deferred,
            self.waited,
            self.failures
        )
    }
}

#[derive(Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    deferred: AtomicU64,
    waited: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    pub(crate) fn count(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Hit => &self.hits,
            Outcome::Miss => &self.misses,
            Outcome::Deferred => &self.deferred,
            Outcome::Waited => &self.waited,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RegistryStats {
        RegistryStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            deferred: self.deferred.load(Ordering::Relaxed),
            waited: self.waited.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
