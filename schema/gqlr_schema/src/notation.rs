//! SDL type notation (`Page`, `[Tag!]`, `String!`).

use std::fmt;

use gqlr_registry::Identifier;

use crate::{SchemaError, LIST_OF, NON_NULL};

/// A parsed type reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
    NonNull(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn parse(notation: &str) -> Result<TypeExpr, SchemaError> {
        let mut parser = Parser {
            notation,
            bytes: notation.as_bytes(),
            pos: 0,
        };
        let expr = parser.ty()?;
        parser.skip_whitespace();
        if parser.pos < parser.bytes.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// The named type under all wrappers.
    pub fn named(&self) -> &str {
        match self {
            TypeExpr::Named(name) => name,
            TypeExpr::List(inner) | TypeExpr::NonNull(inner) => inner.named(),
        }
    }

    /// Wrap `inner` (the identifier of the named type) in this expression's
    /// list and non-null layers.
    pub fn wrap(&self, inner: Identifier) -> Identifier {
        match self {
            TypeExpr::Named(_) => inner,
            TypeExpr::List(of) => Identifier::bare(LIST_OF).with_option("of", of.wrap(inner)),
            TypeExpr::NonNull(of) => Identifier::bare(NON_NULL).with_option("of", of.wrap(inner)),
        }
    }

    /// Registry identifier, taking the named type as a registered factory.
    pub fn identifier(&self) -> Identifier {
        self.wrap(Identifier::bare(self.named()))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::List(inner) => write!(f, "[{inner}]"),
            TypeExpr::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

struct Parser<'a> {
    notation: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn ty(&mut self) -> Result<TypeExpr, SchemaError> {
        self.skip_whitespace();
        let expr = if self.eat(b'[') {
            let inner = self.ty()?;
            self.skip_whitespace();
            if !self.eat(b']') {
                return Err(self.error("missing `]`"));
            }
            TypeExpr::List(Box::new(inner))
        } else {
            TypeExpr::Named(self.name()?)
        };
        self.skip_whitespace();
        if self.eat(b'!') {
            return Ok(TypeExpr::NonNull(Box::new(expr)));
        }
        Ok(expr)
    }

    fn name(&mut self) -> Result<String, SchemaError> {
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            let valid = if self.pos == start {
                b.is_ascii_alphabetic() || b == b'_'
            } else {
                b.is_ascii_alphanumeric() || b == b'_'
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a type name"));
        }
        Ok(self.notation[start..self.pos].to_owned())
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: &'static str) -> SchemaError {
        SchemaError::Notation {
            notation: self.notation.to_owned(),
            reason,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
