use serde_json::{Map, Value};

use crate::{Record, chronology::YearIndex};

/// Field names promoted to dedicated `historical_events` columns, including
/// the aliases the supplementary document uses for some of them. None of
/// these ever appear in the side blob.
pub const EVENT_COLUMNS: &[&str] = &[
  "id",
  "year",
  "type",
  "site_id",
  "site",
  "hfid",
  "civ_id",
  "civ",
  "state",
  "reason",
  "slayer_hfid",
  "slayer_hf",
  "death_cause",
  "artifact_id",
  "entity_id",
  "structure_id",
];

/// Where an event's year comes from.
#[derive(Debug, Clone, Copy)]
pub enum YearSource<'a> {
  /// The record carries its own `<year>` (primary document).
  Inline,
  /// The record has no year of its own; look it up by event id.
  Indexed(&'a YearIndex),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalEvent {
  pub id:           Option<i64>,
  /// `None` when no source knows the year; the row is still written.
  pub year:         Option<i64>,
  pub kind:         Option<String>,
  pub site_id:      Option<i64>,
  pub hfid:         Option<i64>,
  pub civ_id:       Option<i64>,
  pub state:        Option<String>,
  pub reason:       Option<String>,
  pub slayer_hfid:  Option<i64>,
  pub death_cause:  Option<String>,
  pub artifact_id:  Option<i64>,
  pub entity_id:    Option<i64>,
  pub structure_id: Option<i64>,
  /// Every field not in [`EVENT_COLUMNS`].
  pub extra:        Map<String, Value>,
}

impl HistoricalEvent {
  pub fn from_record(r: &Record, years: YearSource<'_>) -> Self {
    let id = r.int("id");
    let year = match years {
      YearSource::Inline => r.int("year"),
      YearSource::Indexed(index) => id.and_then(|id| index.get(id)).or_else(|| r.int("year")),
    };

    Self {
      id,
      year,
      kind: r.string("type"),
      site_id: r.first_int(&["site_id", "site"]),
      hfid: r.int("hfid"),
      civ_id: r.first_int(&["civ_id", "civ"]),
      state: r.string("state"),
      reason: r.string("reason"),
      slayer_hfid: r.first_int(&["slayer_hfid", "slayer_hf"]),
      death_cause: r.string("death_cause"),
      artifact_id: r.int("artifact_id"),
      entity_id: r.int("entity_id"),
      structure_id: r.int("structure_id"),
      extra: r.extras(EVENT_COLUMNS),
    }
  }

  /// The side blob as stored: a JSON object, or `None` when empty.
  pub fn extra_json(&self) -> Option<String> {
    (!self.extra.is_empty()).then(|| Value::Object(self.extra.clone()).to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Node;

  fn scalar(s: &str) -> Node { Node::Scalar(s.into()) }

  fn plus_event() -> Record {
    let mut r = Record::new();
    r.insert("id", scalar("42"));
    r.insert("type", scalar("hf died"));
    r.insert("site", scalar("7"));
    r.insert("slayer_hf", scalar("12"));
    r.insert("death_cause", scalar("struck"));
    r.insert("victim_hf", scalar("13"));
    r
  }

  #[test]
  fn aliases_fill_columns_and_stay_out_of_extras() {
    let e = HistoricalEvent::from_record(&plus_event(), YearSource::Inline);
    assert_eq!(e.site_id, Some(7));
    assert_eq!(e.slayer_hfid, Some(12));
    assert_eq!(e.extra.len(), 1);
    assert!(e.extra.contains_key("victim_hf"));
    assert!(EVENT_COLUMNS.iter().all(|c| !e.extra.contains_key(*c)));
  }

  #[test]
  fn indexed_year_resolves_by_id() {
    let index: YearIndex = [(42, 250)].into_iter().collect();
    let e = HistoricalEvent::from_record(&plus_event(), YearSource::Indexed(&index));
    assert_eq!(e.year, Some(250));
  }

  #[test]
  fn unindexed_event_keeps_unknown_year() {
    let index = YearIndex::new();
    let e = HistoricalEvent::from_record(&plus_event(), YearSource::Indexed(&index));
    assert_eq!(e.id, Some(42));
    assert_eq!(e.year, None);
  }

  #[test]
  fn repeated_column_field_is_dropped_not_raised() {
    let mut r = plus_event();
    r.insert("hfid", scalar("1"));
    r.insert("hfid", scalar("2"));
    let e = HistoricalEvent::from_record(&r, YearSource::Inline);
    assert_eq!(e.hfid, None);
    assert!(!e.extra.contains_key("hfid"));
  }

  #[test]
  fn empty_extras_serialize_to_none() {
    let mut r = Record::new();
    r.insert("id", scalar("1"));
    r.insert("year", scalar("3"));
    let e = HistoricalEvent::from_record(&r, YearSource::Inline);
    assert_eq!(e.year, Some(3));
    assert_eq!(e.extra_json(), None);
  }
}
