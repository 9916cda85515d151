use thiserror::Error;

use crate::state::Phase;
use crate::types::{CollectionKey, ItemKey};

/// Precondition violations reported by the ranking engine.
///
/// None of these leave the engine modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot rank an empty item list")]
    EmptyInput,

    #[error("duplicate item key: {0}")]
    DuplicateItem(ItemKey),

    #[error("duplicate collection key: {0}")]
    DuplicateCollection(CollectionKey),

    #[error("expected phase {expected}, engine is {actual}")]
    InvalidPhase { expected: Phase, actual: Phase },

    #[error("nothing to undo")]
    NoHistory,
}
