use super::*;
use pretty_assertions::assert_eq;

fn named(name: &str) -> TypeExpr {
    TypeExpr::Named(name.to_owned())
}

#[test]
fn parses_named_type() {
    assert_eq!(TypeExpr::parse("Page").unwrap(), named("Page"));
    assert_eq!(TypeExpr::parse("  _Meta2 ").unwrap(), named("_Meta2"));
}

#[test]
fn parses_wrappers() {
    assert_eq!(
        TypeExpr::parse("[Tag!]!").unwrap(),
        TypeExpr::NonNull(Box::new(TypeExpr::List(Box::new(TypeExpr::NonNull(
            Box::new(named("Tag"))
        )))))
    );
    assert_eq!(
        TypeExpr::parse("[ [ Int ] ]").unwrap().to_string(),
        "[[Int]]"
    );
}

#[test]
fn display_round_trips_notation() {
    for notation in ["String", "String!", "[Page]", "[Page!]!", "[[Int!]]"] {
        assert_eq!(TypeExpr::parse(notation).unwrap().to_string(), notation);
    }
}

#[test]
fn named_sees_through_wrappers() {
    assert_eq!(TypeExpr::parse("[[Page!]]!").unwrap().named(), "Page");
}

#[test]
fn rejects_malformed_notation() {
    for (notation, reason) in [
        ("", "expected a type name"),
        ("[Page", "missing `]`"),
        ("Page!!", "unexpected trailing input"),
        ("Page Post", "unexpected trailing input"),
        ("1Page", "expected a type name"),
        ("[]", "expected a type name"),
    ] {
        match TypeExpr::parse(notation) {
            Err(SchemaError::Notation { reason: r, .. }) => assert_eq!(r, reason, "{notation}"),
            other => panic!("`{notation}` should fail, got {other:?}"),
        }
    }
}

#[test]
fn identifier_nests_wrapper_factories() {
    let id = TypeExpr::parse("[Tag!]").unwrap().identifier();

    assert_eq!(id.name(), LIST_OF);
    let inner = id.config().get("of").and_then(|v| v.as_type()).unwrap();
    assert_eq!(inner.name(), NON_NULL);
    let named = inner.config().get("of").and_then(|v| v.as_type()).unwrap();
    assert_eq!(named, &Identifier::bare("Tag"));
}

#[test]
fn wrap_replaces_the_named_type() {
    let id = TypeExpr::parse("Page!")
        .unwrap()
        .wrap(Identifier::bare("Node"));

    assert_eq!(id.to_string(), "NonNull(of: Node)");
}
