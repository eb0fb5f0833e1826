//! SQLite backend for the Annals importer.
//!
//! Two kinds of store live here: one [`WorldStore`] per imported world,
//! holding its relational tables, and the [`Catalog`] that tracks every
//! world. Both wrap [`tokio_rusqlite`] so database work runs on a dedicated
//! thread without blocking the async runtime.

mod catalog;
mod encode;
mod phase;
mod reconcile;
mod schema;
mod stats;
mod world;
mod write;

pub mod error;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use phase::{Phase, PhaseCounts};
pub use stats::TableCount;
pub use world::WorldStore;

#[cfg(test)]
mod tests;
