//! Group hierarchy persistence with versioning and migration.
//!
//! The hierarchy is stored as its registered items plus the `(child, parent)`
//! links between them. Loading replays item creation first and then every
//! link, so a link never refers to an item that does not exist yet.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use splice_core::{ItemId, Result, SpliceError};
use tracing::debug;

use crate::groups::GroupForest;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// One parent edge of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLink {
    pub child: ItemId,
    pub parent: ItemId,
}

/// Versioned group hierarchy file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupsFile {
    /// Schema version for migration.
    pub version: u32,
    /// Every registered item, sorted.
    pub items: Vec<ItemId>,
    /// Parent edges, parents linked before their children.
    pub links: Vec<GroupLink>,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl GroupsFile {
    /// Capture the current state of a hierarchy.
    pub fn from_forest(forest: &GroupForest) -> Self {
        Self {
            version: CURRENT_VERSION,
            items: forest.items(),
            links: forest
                .links()
                .into_iter()
                .map(|(child, parent)| GroupLink { child, parent })
                .collect(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Rebuild the hierarchy by replaying item creation and grouping.
    pub fn into_forest(self) -> Result<GroupForest> {
        let mut forest = GroupForest::new();
        for id in &self.items {
            forest.create_group_item(*id)?;
        }
        for link in &self.links {
            if forest.get_parent(link.child)?.is_some() {
                return Err(SpliceError::Serialization(format!(
                    "item {} is linked to more than one parent",
                    link.child
                )));
            }
            forest.set_group(link.child, link.parent)?;
        }
        forest.check_consistency()?;
        debug!(
            items = self.items.len(),
            links = self.links.len(),
            "group hierarchy loaded"
        );
        Ok(forest)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            SpliceError::Serialization(format!("Failed to serialize groups: {}", e))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| SpliceError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = schema_version(&raw)?;

        if version > CURRENT_VERSION {
            return Err(SpliceError::Serialization(format!(
                "Groups file version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;

        serde_json::from_value(migrated)
            .map_err(|e| SpliceError::Serialization(format!("Failed to parse groups: {}", e)))
    }
}

/// Read the schema version. Only a document without a `version` key is v0.
fn schema_version(raw: &serde_json::Value) -> Result<u32> {
    let Some(value) = raw.get("version") else {
        return Ok(0);
    };
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| SpliceError::Serialization(format!("Invalid schema version: {}", value)))
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 → v1: bare link list, items implied by the links
                let raw_links = data
                    .get("links")
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!([]));
                let links: Vec<GroupLink> = serde_json::from_value(raw_links).map_err(|e| {
                    SpliceError::Serialization(format!("Invalid v0 links: {}", e))
                })?;
                let items: BTreeSet<ItemId> = links
                    .iter()
                    .flat_map(|link| [link.child, link.parent])
                    .collect();
                data = serde_json::json!({
                    "version": 1,
                    "items": items,
                    "links": links,
                    "app_version": "0.0.0",
                });
                version = 1;
            }
            _ => {
                return Err(SpliceError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}
