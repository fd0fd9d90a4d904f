//! Schema-node descriptors that scope type identity.

use crate::{Config, ConfigValue};

/// A schema-node descriptor a type can be resolved against.
///
/// Only the name takes part in identity: two contexts with the same name are
/// the same scope, whatever their properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    name: String,
    properties: Config,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Config::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// The unique name identifying this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property(&self, name: &str) -> Option<&ConfigValue> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &Config {
        &self.properties
    }
}
