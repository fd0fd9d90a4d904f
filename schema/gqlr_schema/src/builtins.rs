//! Builtin type factories: scalars, enums and the list/non-null wrappers.

use std::sync::Arc;

use gqlr_registry::{BoxError, BuildCx, ConfigValue, Identifier, RegistryBuilder, RegistryError};

use crate::{SchemaError, SchemaType, ENUM_TAG, LIST_TAG, NON_NULL_TAG, SCALAR_TAG};

/// Scalars every schema has.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

pub const LIST_OF: &str = "ListOf";
pub const NON_NULL: &str = "NonNull";
pub const ENUM: &str = "Enum";

const DATE_TIME: &str = "DateTime";

/// Register the scalars, `DateTime`, `Enum`, `ListOf` and `NonNull`.
pub fn register_builtins(builder: &mut RegistryBuilder<SchemaType>) -> Result<(), RegistryError> {
    for name in BUILTIN_SCALARS {
        builder.register(name, SCALAR_TAG, move |_| Ok(Arc::new(SchemaType::scalar(name))))?;
    }
    builder.register(DATE_TIME, SCALAR_TAG, |_| {
        Ok(Arc::new(SchemaType::scalar(DATE_TIME).with_description(Some(
            "An ISO-8601 encoded UTC date string.".to_owned(),
        ))))
    })?;
    builder.register(ENUM, ENUM_TAG, build_enum)?;
    builder.register(LIST_OF, LIST_TAG, |cx| {
        let of = wrapped(cx)?;
        Ok(Arc::new(SchemaType::list(cx.resolve_in_context(of)?)))
    })?;
    builder.register(NON_NULL, NON_NULL_TAG, |cx| {
        let of = wrapped(cx)?;
        if of.name() == NON_NULL {
            return Err(invalid(cx, "of", "non-null of a non-null type").into());
        }
        Ok(Arc::new(SchemaType::non_null(cx.resolve_in_context(of)?)))
    })?;
    Ok(())
}

/// The `of` option of a wrapper type.
fn wrapped<'a>(cx: &BuildCx<'a, SchemaType>) -> Result<&'a Identifier, SchemaError> {
    match cx.option("of") {
        None => Err(SchemaError::MissingOption {
            type_name: cx.name().to_owned(),
            option: "of",
        }),
        Some(value) => value
            .as_type()
            .ok_or_else(|| invalid(cx, "of", "expected a type identifier")),
    }
}

fn build_enum(cx: &BuildCx<'_, SchemaType>) -> Result<Arc<SchemaType>, BoxError> {
    let name = cx
        .option("name")
        .ok_or_else(|| SchemaError::MissingOption {
            type_name: cx.name().to_owned(),
            option: "name",
        })?
        .as_str()
        .ok_or_else(|| invalid(cx, "name", "expected a string"))?;
    let values = cx
        .option("values")
        .ok_or_else(|| SchemaError::MissingOption {
            type_name: cx.name().to_owned(),
            option: "values",
        })?
        .as_list()
        .ok_or_else(|| invalid(cx, "values", "expected a list"))?
        .iter()
        .map(|value| value.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid(cx, "values", "expected a list of strings"))?;
    if values.is_empty() {
        return Err(invalid(cx, "values", "an enum needs at least one value").into());
    }
    let description = cx.option("description").and_then(ConfigValue::as_str);

    Ok(Arc::new(
        SchemaType::enumeration(name, values).with_description(description.map(str::to_owned)),
    ))
}

fn invalid(cx: &BuildCx<'_, SchemaType>, option: &'static str, reason: &'static str) -> SchemaError {
    SchemaError::InvalidOption {
        type_name: cx.name().to_owned(),
        option,
        reason,
    }
}
