//! Type family membership.
//!
//! Every factory is registered with a [`FamilyTag`] naming the kind of type
//! it produces. A [`FamilyCheck`] decides which tags belong to the schema
//! type family. The check runs when the registry is built (rejecting
//! non-conforming registrations) and again, cheaply, before the first
//! construction of each key.

use std::fmt;

use rustc_hash::FxHashSet;

/// Kind of type a factory produces, e.g. `object` or `scalar`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyTag(&'static str);

impl FamilyTag {
    #[inline]
    pub const fn new(tag: &'static str) -> Self {
        FamilyTag(tag)
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A factory reference presented to the family check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reference<'a> {
    pub name: &'a str,
    pub tag: FamilyTag,
}

/// Family membership predicate supplied by the host type system.
pub trait FamilyCheck: Send + Sync {
    fn admits(&self, reference: &Reference<'_>) -> bool;
}

impl<F> FamilyCheck for F
where
    F: for<'a> Fn(&Reference<'a>) -> bool + Send + Sync,
{
    fn admits(&self, reference: &Reference<'_>) -> bool {
        self(reference)
    }
}

/// Admits every registered factory.
#[derive(Copy, Clone, Debug, Default)]
pub struct AnyFamily;

impl FamilyCheck for AnyFamily {
    fn admits(&self, _reference: &Reference<'_>) -> bool {
        true
    }
}

/// Admits exactly the listed tags.
#[derive(Clone, Debug, Default)]
pub struct FamilyTags {
    tags: FxHashSet<FamilyTag>,
}

impl FamilyTags {
    pub fn new(tags: impl IntoIterator<Item = FamilyTag>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }

    pub fn contains(&self, tag: FamilyTag) -> bool {
        self.tags.contains(&tag)
    }
}

impl FamilyCheck for FamilyTags {
    fn admits(&self, reference: &Reference<'_>) -> bool {
        self.contains(reference.tag)
    }
}
