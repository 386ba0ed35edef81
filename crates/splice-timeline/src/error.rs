//! Grouping errors.

use splice_core::{ItemId, SpliceError};
use thiserror::Error;

/// Errors reported by the group hierarchy.
///
/// Every variant except `Corrupted` is a caller contract violation: the
/// operation was refused and the hierarchy is exactly as it was before the
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error("item {0} is already registered")]
    DuplicateItem(ItemId),
    #[error("cannot put {item} under {group}: {group} is inside the subtree of {item}")]
    CycleRejected { item: ItemId, group: ItemId },
    #[error("cannot group an empty selection")]
    EmptySelection,
    #[error("group hierarchy corrupted: {0}")]
    Corrupted(String),
}

impl From<GroupError> for SpliceError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::Corrupted(msg) => SpliceError::Internal(msg),
            other => SpliceError::Grouping(other.to_string()),
        }
    }
}
