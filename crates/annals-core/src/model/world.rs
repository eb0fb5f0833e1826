/// Name and alternate name read from the top of a source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldHeader {
  pub name:    Option<String>,
  pub altname: Option<String>,
}

impl WorldHeader {
  /// Prefer fields from `self`, falling back to `other`.
  pub fn or(self, other: WorldHeader) -> WorldHeader {
    WorldHeader {
      name:    self.name.or(other.name),
      altname: self.altname.or(other.altname),
    }
  }
}
