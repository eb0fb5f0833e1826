//! The Annals import pipeline.
//!
//! Turns a world's legends export (and, optionally, its richer supplementary
//! export) into a relational store:
//!
//! ```text
//! raw bytes ─▶ Sanitizer ─▶ RecordStream ─▶ model::from_record ─▶ WorldStore
//!                                                                    │
//!                      backfill, year index, catalog registration ◀──┘
//! ```
//!
//! [`Pipeline::run`] drives either a fresh [`Mode::Import`] or a
//! [`Mode::Merge`] of supplementary data into a world already loaded.

pub mod error;
pub mod pipeline;
pub mod settings;

pub use error::{Error, Result};
pub use pipeline::{Mode, Pipeline, Report, SUPPLEMENTARY_FEATURES};
pub use settings::Settings;
