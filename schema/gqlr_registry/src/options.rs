//! Registry configuration.

/// Tunables for a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Clone, Debug)]
pub struct RegistryOptions {
    /// Label attached to every diagnostic record, e.g. the schema name.
    pub session: String,
    /// Emit the canonical identity string of every resolve at `TRACE` level.
    /// Off by default: the dump is as large as the type's options.
    pub dump_identities: bool,
    /// Block when another thread is constructing the requested type. When
    /// off, such calls return a deferred handle immediately.
    pub block_on_foreign_pending: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            session: "schema".to_owned(),
            dump_identities: false,
            block_on_foreign_pending: true,
        }
    }
}

impl RegistryOptions {
    #[must_use]
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = session.into();
        self
    }

    #[must_use]
    pub fn with_identity_dumps(mut self, enabled: bool) -> Self {
        self.dump_identities = enabled;
        self
    }

    #[must_use]
    pub fn with_foreign_pending_blocking(mut self, enabled: bool) -> Self {
        self.block_on_foreign_pending = enabled;
        self
    }
}
