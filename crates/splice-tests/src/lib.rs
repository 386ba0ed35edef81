//! Integration test crate for Splice.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple splice crates to verify they work together.

#[cfg(test)]
mod grouping;

#[cfg(test)]
mod persistence;
