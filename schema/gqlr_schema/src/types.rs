//! The schema type family.

use std::fmt::Write as _;
use std::sync::Arc;

use gqlr_registry::{FamilyTag, FamilyTags, RegistryError};

use crate::TypeRef;

pub const SCALAR_TAG: FamilyTag = FamilyTag::new("scalar");
pub const ENUM_TAG: FamilyTag = FamilyTag::new("enum");
pub const OBJECT_TAG: FamilyTag = FamilyTag::new("object");
pub const LIST_TAG: FamilyTag = FamilyTag::new("list");
pub const NON_NULL_TAG: FamilyTag = FamilyTag::new("non_null");

/// Family check admitting exactly the schema type kinds.
pub fn schema_family() -> FamilyTags {
    FamilyTags::new([SCALAR_TAG, ENUM_TAG, OBJECT_TAG, LIST_TAG, NON_NULL_TAG])
}

/// A schema type definition.
#[derive(Debug)]
pub struct SchemaType {
    description: Option<String>,
    kind: TypeKind,
}

#[derive(Debug)]
pub enum TypeKind {
    Scalar { name: String },
    Enum { name: String, values: Vec<String> },
    Object { name: String, fields: Vec<Field> },
    /// `[T]`
    List(TypeRef),
    /// `T!`
    NonNull(TypeRef),
}

/// A field of an object type.
#[derive(Debug)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl SchemaType {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            description: None,
            kind: TypeKind::Scalar { name: name.into() },
        }
    }

    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            description: None,
            kind: TypeKind::Enum {
                name: name.into(),
                values,
            },
        }
    }

    pub fn object(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            description: None,
            kind: TypeKind::Object {
                name: name.into(),
                fields,
            },
        }
    }

    pub fn list(of: TypeRef) -> Self {
        Self {
            description: None,
            kind: TypeKind::List(of),
        }
    }

    pub fn non_null(of: TypeRef) -> Self {
        Self {
            description: None,
            kind: TypeKind::NonNull(of),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Name of a named type; `None` for wrappers.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Scalar { name }
            | TypeKind::Enum { name, .. }
            | TypeKind::Object { name, .. } => Some(name),
            TypeKind::List(_) | TypeKind::NonNull(_) => None,
        }
    }

    pub fn tag(&self) -> FamilyTag {
        match self.kind {
            TypeKind::Scalar { .. } => SCALAR_TAG,
            TypeKind::Enum { .. } => ENUM_TAG,
            TypeKind::Object { .. } => OBJECT_TAG,
            TypeKind::List(_) => LIST_TAG,
            TypeKind::NonNull(_) => NON_NULL_TAG,
        }
    }

    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeKind::Object { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Type reference in SDL notation, e.g. `[Page!]`.
    ///
    /// Reads through wrapper handles, so call it once construction is over.
    pub fn type_ref(&self) -> Result<String, RegistryError> {
        let mut out = String::new();
        self.write_type_ref(&mut out)?;
        Ok(out)
    }

    fn write_type_ref(&self, out: &mut String) -> Result<(), RegistryError> {
        match &self.kind {
            TypeKind::Scalar { name }
            | TypeKind::Enum { name, .. }
            | TypeKind::Object { name, .. } => out.push_str(name),
            TypeKind::List(of) => {
                out.push('[');
                of.get()?.write_type_ref(out)?;
                out.push(']');
            }
            TypeKind::NonNull(of) => {
                of.get()?.write_type_ref(out)?;
                out.push('!');
            }
        }
        Ok(())
    }

    /// The named type under any wrappers.
    pub fn named_type(self: &Arc<Self>) -> Result<Arc<Self>, RegistryError> {
        let mut current = Arc::clone(self);
        loop {
            let next = match &current.kind {
                TypeKind::List(of) | TypeKind::NonNull(of) => of.get()?,
                _ => break,
            };
            current = next;
        }
        Ok(current)
    }

    /// SDL definition of a named type; `None` for wrappers.
    pub fn sdl(&self) -> Result<Option<String>, RegistryError> {
        let mut out = String::new();
        if let Some(description) = &self.description {
            let _ = writeln!(out, "\"\"\"{description}\"\"\"");
        }
        match &self.kind {
            TypeKind::Scalar { name } => {
                let _ = writeln!(out, "scalar {name}");
            }
            TypeKind::Enum { name, values } => {
                let _ = writeln!(out, "enum {name} {{");
                for value in values {
                    let _ = writeln!(out, "  {value}");
                }
                out.push_str("}\n");
            }
            TypeKind::Object { name, fields } => {
                let _ = writeln!(out, "type {name} {{");
                for field in fields {
                    if let Some(description) = &field.description {
                        let _ = writeln!(out, "  \"{description}\"");
                    }
                    let _ = writeln!(out, "  {}: {}", field.name, field.ty.get()?.type_ref()?);
                }
                out.push_str("}\n");
            }
            TypeKind::List(_) | TypeKind::NonNull(_) => return Ok(None),
        }
        Ok(Some(out))
    }
}
