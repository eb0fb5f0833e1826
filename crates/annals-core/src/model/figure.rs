use crate::{Record, chronology::UNKNOWN_YEAR};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalFigure {
  pub id:           Option<i64>,
  pub name:         Option<String>,
  pub race:         Option<String>,
  pub caste:        Option<String>,
  pub sex:          Option<i64>,
  pub birth_year:   Option<i64>,
  /// [`UNKNOWN_YEAR`] while the figure is alive.
  pub death_year:   Option<i64>,
  pub entity_links: Vec<EntityLink>,
  pub site_links:   Vec<SiteLink>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityLink {
  pub entity_id:     Option<i64>,
  pub link_type:     Option<String>,
  pub link_strength: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteLink {
  pub site_id:   Option<i64>,
  pub link_type: Option<String>,
}

impl HistoricalFigure {
  pub fn from_record(r: &Record) -> Self {
    let entity_links = r
      .records("entity_link")
      .map(|l| EntityLink {
        entity_id:     l.int("entity_id"),
        link_type:     l.string("link_type"),
        link_strength: l.int("link_strength"),
      })
      .collect();

    let site_links = r
      .records("site_link")
      .map(|l| SiteLink {
        site_id:   l.int("site_id"),
        link_type: l.string("link_type"),
      })
      .collect();

    Self {
      id: r.int("id"),
      name: r.string("name"),
      race: r.string("race"),
      caste: r.string("caste"),
      sex: r.int("sex"),
      birth_year: r.int("birth_year"),
      death_year: r.int("death_year"),
      entity_links,
      site_links,
    }
  }

  pub fn is_alive(&self) -> bool { self.death_year == Some(UNKNOWN_YEAR) }
}

/// A directed edge between two figures; supplementary source only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
  pub source_hf:    Option<i64>,
  pub target_hf:    Option<i64>,
  pub relationship: Option<String>,
  pub year:         Option<i64>,
}

impl Relationship {
  pub fn from_record(r: &Record) -> Self {
    Self {
      source_hf:    r.int("source_hf"),
      target_hf:    r.int("target_hf"),
      relationship: r.string("relationship"),
      year:         r.int("year"),
    }
  }
}
