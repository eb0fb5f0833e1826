//! Import phases: which records a pass reads and how they are written.

use std::fmt;

use annals_core::{
  Record,
  chronology::YearIndex,
  model::{
    Artifact, Entity, HistoricalEvent, HistoricalFigure, Landmass, MountainPeak, Region,
    Relationship, Site, UndergroundRegion, WrittenContent, YearSource,
  },
};
use rusqlite::Connection;

use crate::write;

// ─── Phase ───────────────────────────────────────────────────────────────────

/// One streaming pass over a document, writing one logical table (plus its
/// child tables). Each phase commits once, when its pass completes.
#[derive(Debug, Clone)]
pub enum Phase {
  Regions,
  UndergroundRegions,
  Sites,
  Artifacts,
  Entities,
  HistoricalFigures,
  /// Events with their own years (primary document).
  Events,
  /// Supplementary events whose years come from an index built beforehand,
  /// applied over any stored row with the same id.
  IndexedEvents(YearIndex),
  Landmasses,
  MountainPeaks,
  Relationships,
  WrittenContent,
}

impl Phase {
  /// Human-readable name used in progress output.
  pub fn label(&self) -> &'static str {
    match self {
      Phase::Regions => "regions",
      Phase::UndergroundRegions => "underground regions",
      Phase::Sites => "sites",
      Phase::Artifacts => "artifacts",
      Phase::Entities => "entities",
      Phase::HistoricalFigures => "historical figures",
      Phase::Events | Phase::IndexedEvents(_) => "events",
      Phase::Landmasses => "landmasses",
      Phase::MountainPeaks => "mountain peaks",
      Phase::Relationships => "relationships",
      Phase::WrittenContent => "written content",
    }
  }

  /// Element name of the repeated record this phase consumes.
  pub fn tag(&self) -> &'static str {
    match self {
      Phase::Regions => "region",
      Phase::UndergroundRegions => "underground_region",
      Phase::Sites => "site",
      Phase::Artifacts => "artifact",
      Phase::Entities => "entity",
      Phase::HistoricalFigures => "historical_figure",
      Phase::Events | Phase::IndexedEvents(_) => "historical_event",
      Phase::Landmasses => "landmass",
      Phase::MountainPeaks => "mountain_peak",
      Phase::Relationships => "historical_event_relationship",
      Phase::WrittenContent => "written_content",
    }
  }

  /// Map one record and write it.
  pub(crate) fn apply(
    &self,
    conn: &Connection,
    record: &Record,
    counts: &mut PhaseCounts,
  ) -> rusqlite::Result<()> {
    match self {
      Phase::Regions => {
        let region = Region::from_record(record);
        counts.note_missing_id(region.id);
        write::upsert_region(conn, &region)
      }
      Phase::UndergroundRegions => {
        let region = UndergroundRegion::from_record(record);
        counts.note_missing_id(region.id);
        write::replace_underground_region(conn, &region)
      }
      Phase::Sites => {
        let site = Site::from_record(record);
        counts.note_missing_id(site.id);
        let n = write::upsert_site(conn, &site)?;
        counts.add_children("structures", n);
        Ok(())
      }
      Phase::Artifacts => {
        let artifact = Artifact::from_record(record);
        counts.note_missing_id(artifact.id);
        write::merge_artifact(conn, artifact)
      }
      Phase::Entities => {
        let entity = Entity::from_record(record);
        counts.note_missing_id(entity.id);
        counts.add_children("positions", entity.positions.len() as u64);
        counts.add_children("assignments", entity.assignments.len() as u64);
        write::upsert_entity(conn, &entity)
      }
      Phase::HistoricalFigures => {
        let hf = HistoricalFigure::from_record(record);
        counts.note_missing_id(hf.id);
        counts.add_children("entity links", hf.entity_links.len() as u64);
        counts.add_children("site links", hf.site_links.len() as u64);
        write::insert_figure(conn, &hf)
      }
      Phase::Events => {
        let event = HistoricalEvent::from_record(record, YearSource::Inline);
        counts.note_missing_id(event.id);
        write::replace_event(conn, &event)
      }
      Phase::IndexedEvents(index) => {
        let event = HistoricalEvent::from_record(record, YearSource::Indexed(index));
        counts.note_missing_id(event.id);
        if event.year.is_none() {
          counts.add_children("without year", 1);
        }
        write::upsert_event(conn, &event)
      }
      Phase::Landmasses => {
        let landmass = Landmass::from_record(record);
        counts.note_missing_id(landmass.id);
        write::replace_landmass(conn, &landmass)
      }
      Phase::MountainPeaks => {
        let peak = MountainPeak::from_record(record);
        counts.note_missing_id(peak.id);
        write::replace_mountain_peak(conn, &peak)
      }
      Phase::Relationships => write::replace_relationship(conn, &Relationship::from_record(record)),
      Phase::WrittenContent => {
        let wc = WrittenContent::from_record(record);
        counts.note_missing_id(wc.id);
        let n = write::replace_written_content(conn, &wc)?;
        counts.add_children("styles and references", n);
        Ok(())
      }
    }
  }
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// What one import phase wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseCounts {
  /// Label of the table or feature, e.g. `"sites"`.
  pub phase:      &'static str,
  /// Records read from the document and written.
  pub records:    u64,
  /// Records written without a usable id.
  pub missing_id: u64,
  /// Child rows by label, in first-seen order.
  pub children:   Vec<(&'static str, u64)>,
}

impl PhaseCounts {
  pub fn new(phase: &'static str) -> Self {
    Self { phase, ..Self::default() }
  }

  pub fn add_children(&mut self, label: &'static str, n: u64) {
    match self.children.iter_mut().find(|(l, _)| *l == label) {
      Some((_, total)) => *total += n,
      None => self.children.push((label, n)),
    }
  }

  pub fn children(&self, label: &str) -> u64 {
    self
      .children
      .iter()
      .find(|(l, _)| *l == label)
      .map_or(0, |(_, n)| *n)
  }

  /// Note a record with no parseable id.
  pub(crate) fn note_missing_id(&mut self, id: Option<i64>) {
    if id.is_none() {
      self.missing_id += 1;
      tracing::debug!(phase = self.phase, "record without a usable id");
    }
  }
}

impl fmt::Display for PhaseCounts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Imported {} {}", self.records, self.phase)?;
    for (label, n) in &self.children {
      write!(f, ", {n} {label}")?;
    }
    if self.missing_id > 0 {
      write!(f, " ({} without id)", self.missing_id)?;
    }
    Ok(())
  }
}
