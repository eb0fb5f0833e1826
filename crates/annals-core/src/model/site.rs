use crate::Record;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
  pub id:           Option<i64>,
  pub name:         Option<String>,
  pub kind:         Option<String>,
  pub coords:       Option<String>,
  pub rectangle:    Option<String>,
  /// Controlling civilization; supplementary source only.
  pub civ_id:       Option<i64>,
  pub cur_owner_id: Option<i64>,
  /// Nested `<structures><structure>` children; supplementary source only.
  pub structures:   Vec<Structure>,
}

/// A building within a site. `local_id` is only unique within its site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
  pub local_id: Option<i64>,
  pub name:     Option<String>,
  pub name2:    Option<String>,
  pub kind:     Option<String>,
}

impl Site {
  pub fn from_record(r: &Record) -> Self {
    let structures = r
      .records("structures")
      .flat_map(|s| s.records("structure"))
      .map(Structure::from_record)
      .collect();

    Self {
      id: r.int("id"),
      name: r.string("name"),
      kind: r.string("type"),
      coords: r.string("coords"),
      rectangle: r.string("rectangle"),
      civ_id: r.int("civ_id"),
      cur_owner_id: r.int("cur_owner_id"),
      structures,
    }
  }
}

impl Structure {
  pub fn from_record(r: &Record) -> Self {
    Self {
      local_id: r.int("id"),
      name:     r.string("name"),
      name2:    r.string("name2"),
      kind:     r.string("type"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Node;

  fn structure(id: &str, name: &str) -> Node {
    let mut s = Record::new();
    s.insert("id", Node::Scalar(id.into()));
    s.insert("type", Node::Scalar("temple".into()));
    s.insert("name", Node::Scalar(name.into()));
    Node::Map(s)
  }

  #[test]
  fn nested_structures_are_collected() {
    let mut list = Record::new();
    list.insert("structure", structure("0", "the bronze hall"));
    list.insert("structure", structure("1", "the iron cloister"));

    let mut r = Record::new();
    r.insert("id", Node::Scalar("12".into()));
    r.insert("civ_id", Node::Scalar("4".into()));
    r.insert("structures", Node::Map(list));

    let site = Site::from_record(&r);
    assert_eq!(site.civ_id, Some(4));
    assert_eq!(site.structures.len(), 2);
    assert_eq!(site.structures[1].local_id, Some(1));
    assert_eq!(site.structures[1].name.as_deref(), Some("the iron cloister"));
  }

  #[test]
  fn site_without_structures() {
    let mut r = Record::new();
    r.insert("id", Node::Scalar("1".into()));
    r.insert("coords", Node::Scalar("3,4".into()));
    let site = Site::from_record(&r);
    assert!(site.structures.is_empty());
    assert_eq!(site.coords.as_deref(), Some("3,4"));
  }
}
