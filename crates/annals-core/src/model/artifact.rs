use crate::Record;

/// An artifact row. Creator and site are often unknown at first and are
/// derived later from `artifact_created` events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifact {
  pub id:           Option<i64>,
  pub name:         Option<String>,
  pub item_type:    Option<String>,
  pub item_subtype: Option<String>,
  pub mat:          Option<String>,
  pub creator_hfid: Option<i64>,
  pub site_id:      Option<i64>,
  pub holder_hfid:  Option<i64>,
}

impl Artifact {
  pub fn from_record(r: &Record) -> Self {
    Self {
      id:           r.int("id"),
      name:         r.first_string(&["name", "name_string"]),
      item_type:    r.string("item_type"),
      item_subtype: r.string("item_subtype"),
      mat:          r.string("mat"),
      creator_hfid: r.int("creator_hfid"),
      site_id:      r.int("site_id"),
      holder_hfid:  r.int("holder_hfid"),
    }
  }

  /// Field-by-field union preferring `self`: a present value in `self` wins,
  /// a missing one falls back to `stored`.
  pub fn coalesce(self, stored: &Artifact) -> Artifact {
    Artifact {
      id:           self.id.or(stored.id),
      name:         self.name.or_else(|| stored.name.clone()),
      item_type:    self.item_type.or_else(|| stored.item_type.clone()),
      item_subtype: self.item_subtype.or_else(|| stored.item_subtype.clone()),
      mat:          self.mat.or_else(|| stored.mat.clone()),
      creator_hfid: self.creator_hfid.or(stored.creator_hfid),
      site_id:      self.site_id.or(stored.site_id),
      holder_hfid:  self.holder_hfid.or(stored.holder_hfid),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stored() -> Artifact {
    Artifact {
      id: Some(1),
      name: Some("oilynails".into()),
      mat: Some("iron".into()),
      ..Default::default()
    }
  }

  #[test]
  fn missing_incoming_value_keeps_stored() {
    let incoming = Artifact { id: Some(1), mat: None, ..Default::default() };
    assert_eq!(incoming.coalesce(&stored()).mat.as_deref(), Some("iron"));
  }

  #[test]
  fn present_incoming_value_wins() {
    let incoming = Artifact { id: Some(1), mat: Some("steel".into()), ..Default::default() };
    let merged = incoming.coalesce(&stored());
    assert_eq!(merged.mat.as_deref(), Some("steel"));
    assert_eq!(merged.name.as_deref(), Some("oilynails"));
  }
}
