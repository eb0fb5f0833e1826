//! Event chronology shared between the two source documents.
//!
//! The supplementary document carries richer event fields but no years, so
//! an id → year index is built first (from the primary document at import
//! time, or from already-stored rows during a merge) and consulted when the
//! supplementary events are written.

use std::collections::HashMap;

use crate::Record;

/// Sentinel used by the source documents for "no year" / "still alive".
pub const UNKNOWN_YEAR: i64 = -1;

/// Event id → year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearIndex {
  years: HashMap<i64, i64>,
}

impl YearIndex {
  pub fn new() -> Self { Self::default() }

  /// Learn the year of one `historical_event` record. Records lacking a
  /// parseable id or year are ignored.
  pub fn observe(&mut self, record: &Record) {
    if let (Some(id), Some(year)) = (record.int("id"), record.int("year")) {
      self.years.insert(id, year);
    }
  }

  pub fn insert(&mut self, event_id: i64, year: i64) {
    self.years.insert(event_id, year);
  }

  pub fn get(&self, event_id: i64) -> Option<i64> {
    self.years.get(&event_id).copied()
  }

  pub fn len(&self) -> usize { self.years.len() }

  pub fn is_empty(&self) -> bool { self.years.is_empty() }
}

impl FromIterator<(i64, i64)> for YearIndex {
  fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
    Self { years: iter.into_iter().collect() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Node;

  fn event(id: &str, year: Option<&str>) -> Record {
    let mut r = Record::new();
    r.insert("id", Node::Scalar(id.into()));
    if let Some(y) = year {
      r.insert("year", Node::Scalar(y.into()));
    }
    r
  }

  #[test]
  fn observe_skips_events_without_year() {
    let mut index = YearIndex::new();
    index.observe(&event("1", Some("102")));
    index.observe(&event("2", None));
    index.observe(&event("x", Some("5")));

    assert_eq!(index.len(), 1);
    assert_eq!(index.get(1), Some(102));
    assert_eq!(index.get(2), None);
  }

  #[test]
  fn collects_from_pairs() {
    let index: YearIndex = [(1, 10), (2, 20)].into_iter().collect();
    assert_eq!(index.get(2), Some(20));
  }
}
