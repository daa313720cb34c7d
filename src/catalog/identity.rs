use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Opaque identifier assigned to an entry when it enters the store.
///
/// Ids are generated at insertion time and never reused, so two loads of the
/// same documents produce different ids for the same function.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

/// Opaque identifier assigned to a group when it enters the store.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Uuid);

/// Normalized form of a group name used for every group comparison.
///
/// Computed once when a record is inserted and stored next to the display
/// name. Lowercasing is the only normalization: `access-datafunctions` and
/// `Access Datafunctions` are different keys.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GroupKey(String);

impl EntryId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl GroupId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl GroupKey {
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable label for a group slug.
///
/// Capitalizes the first character and turns `-`/`_` separators into spaces:
/// `access-datafunctions` becomes `Access datafunctions`.
pub fn group_label(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut label: String = first.to_uppercase().collect();
    label.extend(chars.map(|c| if matches!(c, '-' | '_') { ' ' } else { c }));
    label
}

thread_local! {
    // Root-locale collator; `None` only if the compiled collation data fails to load.
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Ordering used for every name-sorted listing.
///
/// Unicode collation with the root locale: accents sort next to their base
/// letter and lowercase precedes uppercase when names differ only by case.
/// Raw byte order breaks any remaining tie so the order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        })
        .then_with(|| a.cmp(b))
}
