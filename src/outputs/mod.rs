//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: assembles the run [`Snapshot`](crate::models::Snapshot) and writes it to disk

pub mod json;
