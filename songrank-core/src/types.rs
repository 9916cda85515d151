use std::collections::HashMap;

use crate::error::EngineError;

/// Caller-provided item key (the catalog's track id).
pub type ItemKey = i64;

/// Caller-provided collection key (the catalog's album id).
pub type CollectionKey = i64;

/// A single thing being ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Stable unique key.
    pub key: ItemKey,
    /// Display name.
    pub name: String,
    /// Key of the owning collection.
    pub collection: CollectionKey,
}

impl Item {
    pub fn new(key: ItemKey, name: impl Into<String>, collection: CollectionKey) -> Self {
        Item {
            key,
            name: name.into(),
            collection,
        }
    }
}

/// A named group of items (an album).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collection {
    pub key: CollectionKey,
    pub name: String,
}

impl Collection {
    pub fn new(key: CollectionKey, name: impl Into<String>) -> Self {
        Collection {
            key,
            name: name.into(),
        }
    }
}

/// A user decision for the current comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Preference {
    /// The item being placed ranks better than the probe.
    PreferSubject,
    /// The probe ranks better than the item being placed.
    PreferProbe,
    /// Tie: the subject goes directly after the probe.
    Equal,
    /// The subject goes to the bottom of the list.
    NoOpinion,
}

/// The comparison currently awaiting a decision.
///
/// `[lower_bound, upper_bound)` is the range of rank positions still
/// consistent with the subject's placement. The probe always sits at
/// `mid()`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonRound {
    pub subject: Item,
    pub probe: Item,
    pub lower_bound: usize,
    pub upper_bound: usize,
}

impl ComparisonRound {
    /// Rank of the probe within the ranked list.
    pub fn mid(&self) -> usize {
        (self.lower_bound + self.upper_bound) / 2
    }
}

/// Aggregate position of one collection in the final ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionRanking {
    pub collection: Collection,
    /// Mean of `1 + rank` over the collection's placed items.
    pub mean_rank: f64,
    /// Number of the collection's items that were placed.
    pub placed: usize,
}

/// Maps collection keys to their position in the caller's collection list.
pub(crate) struct CollectionIndex {
    key_to_idx: HashMap<CollectionKey, usize>,
}

impl CollectionIndex {
    pub fn from_collections(collections: &[Collection]) -> Result<Self, EngineError> {
        let mut key_to_idx = HashMap::with_capacity(collections.len());
        for (idx, collection) in collections.iter().enumerate() {
            if key_to_idx.insert(collection.key, idx).is_some() {
                return Err(EngineError::DuplicateCollection(collection.key));
            }
        }
        Ok(CollectionIndex { key_to_idx })
    }

    /// Lenient variant: a repeated key keeps its first position.
    pub fn first_key_wins(collections: &[Collection]) -> Self {
        let mut key_to_idx = HashMap::with_capacity(collections.len());
        for (idx, collection) in collections.iter().enumerate() {
            key_to_idx.entry(collection.key).or_insert(idx);
        }
        CollectionIndex { key_to_idx }
    }

    pub fn to_idx(&self, key: CollectionKey) -> Option<usize> {
        self.key_to_idx.get(&key).copied()
    }
}
