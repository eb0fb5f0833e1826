//! Typed rows for every entity kind, and the per-kind importers that build
//! them from a [`Record`](crate::Record).
//!
//! Each `from_record` is a pure function: one mapped record in, one parent
//! row (plus any child rows) out. Fields of the wrong shape are treated as
//! absent rather than rejected, so one malformed element never aborts a
//! stream.

mod artifact;
mod entity;
mod event;
mod figure;
mod geography;
mod site;
mod world;
mod written;

pub use artifact::Artifact;
pub use entity::{Entity, Position, PositionAssignment};
pub use event::{EVENT_COLUMNS, HistoricalEvent, YearSource};
pub use figure::{EntityLink, HistoricalFigure, Relationship, SiteLink};
pub use geography::{Landmass, MountainPeak, Region, UndergroundRegion};
pub use site::{Site, Structure};
pub use world::WorldHeader;
pub use written::{Reference, WrittenContent};
