use crate::Record;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
  pub id:       Option<i64>,
  pub name:     Option<String>,
  pub kind:     Option<String>,
  /// `x,y|x,y|…` tile list; only the supplementary source has it.
  pub coords:   Option<String>,
  pub evilness: Option<String>,
}

impl Region {
  pub fn from_record(r: &Record) -> Self {
    Self {
      id:       r.int("id"),
      name:     r.string("name"),
      kind:     r.string("type"),
      coords:   r.string("coords"),
      evilness: r.string("evilness"),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndergroundRegion {
  pub id:     Option<i64>,
  pub kind:   Option<String>,
  pub depth:  Option<i64>,
  pub coords: Option<String>,
}

impl UndergroundRegion {
  pub fn from_record(r: &Record) -> Self {
    Self {
      id:     r.int("id"),
      kind:   r.string("type"),
      depth:  r.int("depth"),
      coords: r.string("coords"),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Landmass {
  pub id:      Option<i64>,
  pub name:    Option<String>,
  pub coord_1: Option<String>,
  pub coord_2: Option<String>,
}

impl Landmass {
  pub fn from_record(r: &Record) -> Self {
    Self {
      id:      r.int("id"),
      name:    r.string("name"),
      coord_1: r.string("coord_1"),
      coord_2: r.string("coord_2"),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountainPeak {
  pub id:         Option<i64>,
  pub name:       Option<String>,
  pub coords:     Option<String>,
  pub height:     Option<i64>,
  pub is_volcano: bool,
}

impl MountainPeak {
  pub fn from_record(r: &Record) -> Self {
    Self {
      id:         r.int("id"),
      name:       r.string("name"),
      coords:     r.string("coords"),
      height:     r.int("height"),
      // An empty `<is_volcano/>` marker; its presence is the flag.
      is_volcano: r.contains("is_volcano"),
    }
  }
}
