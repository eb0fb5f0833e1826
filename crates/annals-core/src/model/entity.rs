use crate::Record;

/// A civilization, religion, guild or other organisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
  pub id:          Option<i64>,
  pub name:        Option<String>,
  pub race:        Option<String>,
  pub kind:        Option<String>,
  pub positions:   Vec<Position>,
  pub assignments: Vec<PositionAssignment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
  pub position_id: Option<i64>,
  pub name:        Option<String>,
}

/// Which figure holds (or held) a position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionAssignment {
  pub assignment_id: Option<i64>,
  pub position_id:   Option<i64>,
  pub histfig_id:    Option<i64>,
}

impl Entity {
  pub fn from_record(r: &Record) -> Self {
    let positions = r
      .records("entity_position")
      .map(|p| Position {
        position_id: p.int("id"),
        name:        p.first_string(&["name", "name_male", "name_female"]),
      })
      .collect();

    let assignments = r
      .records("entity_position_assignment")
      .map(|a| PositionAssignment {
        assignment_id: a.int("id"),
        position_id:   a.int("position_id"),
        histfig_id:    a.int("histfig"),
      })
      .collect();

    Self {
      id: r.int("id"),
      name: r.string("name"),
      race: r.string("race"),
      kind: r.string("type"),
      positions,
      assignments,
    }
  }
}
