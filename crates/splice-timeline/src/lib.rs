//! Splice Timeline - Group hierarchy of timeline items
//!
//! Tracks how clips, compositions and synthetic group nodes are nested so
//! that edits cascade over everything grouped together:
//! - The group forest and its operations
//! - A lock-guarded controller for the timeline
//! - Versioned persistence of the hierarchy

pub mod controller;
pub mod error;
pub mod groups;
pub mod serialization;

pub use controller::GroupController;
pub use error::GroupError;
pub use groups::{Ancestors, GroupForest};
pub use serialization::{GroupLink, GroupsFile, CURRENT_VERSION};
