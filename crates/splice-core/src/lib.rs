//! Splice Core - Foundation types for the timeline model
//!
//! This crate provides the fundamental types shared by every Splice crate:
//! - Item identifiers (ItemId)
//! - The workspace error type and Result alias

pub mod error;
pub mod id;

pub use error::{Result, SpliceError};
pub use id::ItemId;
