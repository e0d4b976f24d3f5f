//! Canonical catalog records.
//!
//! `CatalogItem` is the shape persisted in both snapshot tiers. Field names
//! are kept stable so files written by earlier runs stay readable.

mod types;

pub use types::*;
