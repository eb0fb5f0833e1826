//! Core types for the Annals legends importer.
//!
//! No XML or database code lives here. This crate holds the generic record
//! tree produced by the extractor, the typed rows each entity kind maps to,
//! and the small pieces of reconciliation logic that do not need storage.

pub mod catalog;
pub mod chronology;
pub mod error;
pub mod model;
pub mod record;
pub mod sources;

pub use error::{Error, Result};
pub use record::{Node, Record};
