use super::*;
use crate::Config;
use pretty_assertions::assert_eq;

#[test]
fn same_identity_same_key() {
    let a = CacheKey::derive(&Identifier::bare("Query"), None);
    let b = CacheKey::derive(&Identifier::bare("Query"), None);
    assert_eq!(a, b);
}

#[test]
fn different_names_different_keys() {
    let a = CacheKey::derive(&Identifier::bare("Query"), None);
    let b = CacheKey::derive(&Identifier::bare("Mutation"), None);
    assert_ne!(a, b);
}

#[test]
fn context_participates_in_key() {
    let id = Identifier::bare("Node");
    let page = Context::new("Page");
    let post = Context::new("Post");

    let none = CacheKey::derive(&id, None);
    let with_page = CacheKey::derive(&id, Some(&page));
    let with_post = CacheKey::derive(&id, Some(&post));

    assert_ne!(none, with_page);
    assert_ne!(with_page, with_post);
}

#[test]
fn context_properties_do_not_participate() {
    let id = Identifier::bare("Node");
    let plain = Context::new("Page");
    let rich = Context::new("Page").with_property("title", "String");

    assert_eq!(
        CacheKey::derive(&id, Some(&plain)),
        CacheKey::derive(&id, Some(&rich))
    );
}

#[test]
fn context_name_cannot_alias_option_text() {
    // `~` marks an absent context; a context literally named `~` is quoted.
    let bare = Identifier::bare("X");
    let ctx = Context::new("~");
    assert_ne!(
        canonical_identity(&bare, Some(&ctx)),
        canonical_identity(&bare, None)
    );
}

#[test]
fn canonical_identity_format() {
    let id = Identifier::bare("Node").with_option("depth", 2);
    let ctx = Context::new("Page");

    assert_eq!(
        canonical_identity(&id, Some(&ctx)),
        r#""Node"{"depth":2}#"Page""#
    );
    assert_eq!(canonical_identity(&id, None), r#""Node"{"depth":2}#~"#);
}

#[test]
fn derive_rejects_invalid_identifier() {
    assert_eq!(
        CacheKey::derive(&Identifier::bare(""), None),
        Err(IdentifierError::EmptyName)
    );
}

#[test]
fn display_is_32_hex_digits() {
    let key = CacheKey::from_canonical("\"Query\"#~");
    let text = key.to_string();

    assert_eq!(text.len(), 32);
    assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(format!("{key:?}"), format!("CacheKey({text})"));
}

mod proptest_order_independence {
    use super::super::*;
    use crate::{Config, ConfigValue};
    use proptest::prelude::*;

    fn option_value() -> impl Strategy<Value = ConfigValue> {
        prop_oneof![
            Just(ConfigValue::Null),
            any::<bool>().prop_map(ConfigValue::Bool),
            any::<i64>().prop_map(ConfigValue::Int),
            "[a-z]{0,8}".prop_map(ConfigValue::Str),
            "[A-Z][a-z]{0,6}".prop_map(|n| ConfigValue::Type(Identifier::bare(n))),
        ]
    }

    proptest! {
        #[test]
        fn shuffled_options_share_a_key(
            options in proptest::collection::btree_map("[a-z]{1,6}", option_value(), 0..8),
            rotate in 0usize..8,
        ) {
            let forward: Vec<_> = options.into_iter().collect();
            let mut shuffled = forward.clone();
            if !shuffled.is_empty() {
                let by = rotate % shuffled.len();
                shuffled.rotate_left(by);
                shuffled.reverse();
            }

            let a = Identifier::composite("T", forward.into_iter().collect::<Config>());
            let b = Identifier::composite("T", shuffled.into_iter().collect::<Config>());

            prop_assert_eq!(CacheKey::derive(&a, None), CacheKey::derive(&b, None));
        }

        #[test]
        fn differing_values_give_differing_keys(a in any::<i64>(), b in any::<i64>()) {
            prop_assume!(a != b);
            let x = Identifier::bare("T").with_option("v", a);
            let y = Identifier::bare("T").with_option("v", b);
            prop_assert_ne!(CacheKey::derive(&x, None), CacheKey::derive(&y, None));
        }
    }
}

#[test]
fn empty_config_matches_bare_key() {
    let composite = Identifier::composite("Query", Config::new());
    assert_eq!(
        CacheKey::derive(&composite, None),
        CacheKey::derive(&Identifier::bare("Query"), None)
    );
}
