//! Timeline item identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a timeline item: a clip, a composition or a synthetic group.
///
/// Ids are minted by the timeline model and share a single namespace; the
/// grouping layer never allocates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i32);

impl ItemId {
    /// Raw integer value.
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<ItemId> for i32 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
