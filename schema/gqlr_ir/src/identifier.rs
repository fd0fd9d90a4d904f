//! Type identifiers and their option maps.

use std::fmt::{self, Write as _};

/// Why an identifier cannot be normalized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The type name is empty or whitespace.
    #[error("type name must not be empty")]
    EmptyName,
    /// An option name is empty or whitespace.
    #[error("option names must not be empty (type `{type_name}`)")]
    EmptyOption { type_name: String },
    /// A float option is NaN or infinite and has no stable serialization.
    #[error("option `{option}` of type `{type_name}` is not a finite number")]
    NonFiniteFloat { type_name: String, option: String },
}

/// A single option value.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Must be finite to take part in a cache key.
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    /// A nested type reference, e.g. the element type of a list.
    Type(Identifier),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Identifier> {
        match self {
            ConfigValue::Type(id) => Some(id),
            _ => None,
        }
    }

    fn validate(&self, type_name: &str, option: &str) -> Result<(), IdentifierError> {
        match self {
            ConfigValue::Float(f) if !f.is_finite() => Err(IdentifierError::NonFiniteFloat {
                type_name: type_name.to_owned(),
                option: option.to_owned(),
            }),
            ConfigValue::List(items) => items
                .iter()
                .try_for_each(|item| item.validate(type_name, option)),
            ConfigValue::Type(id) => id.validate(),
            _ => Ok(()),
        }
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            ConfigValue::Null => out.push_str("null"),
            ConfigValue::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            ConfigValue::Int(i) => {
                let _ = write!(out, "{i}");
            }
            // `{:?}` always keeps a fractional part, so 1.0 never collides with 1.
            ConfigValue::Float(f) => {
                let _ = write!(out, "{f:?}");
            }
            ConfigValue::Str(s) => {
                let _ = write!(out, "{s:?}");
            }
            ConfigValue::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
            ConfigValue::Type(id) => {
                out.push('@');
                id.write_canonical(out);
            }
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Float(x) => write!(f, "{x:?}"),
            ConfigValue::Str(s) => write!(f, "{s:?}"),
            ConfigValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ConfigValue::Type(id) => write!(f, "{id}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Int(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl From<Identifier> for ConfigValue {
    fn from(value: Identifier) -> Self {
        ConfigValue::Type(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::List(value)
    }
}

/// An unordered set of named options.
///
/// Insertion order is kept for display only. Equality and the canonical form
/// ignore it.
#[derive(Clone, Debug, Default)]
pub struct Config {
    options: Vec<(String, ConfigValue)>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ConfigValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.options.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.options.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.options.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Options sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &ConfigValue)> {
        let mut options: Vec<_> = self.iter().collect();
        options.sort_unstable_by(|a, b| a.0.cmp(b.0));
        options
    }

    pub(crate) fn validate(&self, type_name: &str) -> Result<(), IdentifierError> {
        for (name, value) in &self.options {
            if name.trim().is_empty() {
                return Err(IdentifierError::EmptyOption {
                    type_name: type_name.to_owned(),
                });
            }
            value.validate(type_name, name)?;
        }
        Ok(())
    }

    pub(crate) fn write_canonical(&self, out: &mut String) {
        out.push('{');
        for (i, (name, value)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{name:?}:");
            value.write_canonical(out);
        }
        out.push('}');
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Config::new();
        for (name, value) in iter {
            config.insert(name, value);
        }
        config
    }
}

/// Names a constructible schema type.
///
/// A bare identifier is just the registered type name. A composite one also
/// carries options handed to the type's factory. A composite with no options
/// is the same identity as the bare name.
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    name: String,
    config: Config,
}

impl Identifier {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Config::new(),
        }
    }

    pub fn composite(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Builder-style option setter.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.config.insert(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_bare(&self) -> bool {
        self.config.is_empty()
    }

    /// Check that this identifier, including nested type options, has a
    /// deterministic canonical form.
    pub fn validate(&self) -> Result<(), IdentifierError> {
        if self.name.trim().is_empty() {
            return Err(IdentifierError::EmptyName);
        }
        self.config.validate(&self.name)
    }

    /// The order-independent serialization of this identifier.
    ///
    /// Callers should [`validate`](Self::validate) first; non-finite floats
    /// still serialize but are not guaranteed to round-trip.
    pub fn canonical(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        self.write_canonical(&mut out);
        out
    }

    pub(crate) fn write_canonical(&self, out: &mut String) {
        let _ = write!(out, "{:?}", self.name);
        if !self.config.is_empty() {
            self.config.write_canonical(out);
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.config.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, (name, value)) in self.config.sorted().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, ")")
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::bare(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::bare(name)
    }
}
