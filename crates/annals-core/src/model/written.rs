use crate::Record;

/// A book, poem, letter or other written work; supplementary source only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrittenContent {
  pub id:          Option<i64>,
  pub title:       Option<String>,
  pub kind:        Option<String>,
  pub author_hfid: Option<i64>,
  pub page_start:  Option<i64>,
  pub page_end:    Option<i64>,
  pub styles:      Vec<String>,
  pub references:  Vec<Reference>,
}

/// A typed pointer from a written work to another entity (figure, site, …).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
  pub ref_type: Option<String>,
  pub ref_id:   Option<i64>,
}

impl WrittenContent {
  pub fn from_record(r: &Record) -> Self {
    Self {
      id:          r.int("id"),
      title:       r.string("title"),
      kind:        r.string("type"),
      author_hfid: r.first_int(&["author", "author_hfid"]),
      page_start:  r.int("page_start"),
      page_end:    r.int("page_end"),
      styles:      r.texts("style").map(str::to_owned).collect(),
      references:  r
        .records("reference")
        .map(|x| Reference { ref_type: x.string("type"), ref_id: x.int("id") })
        .collect(),
    }
  }
}
