//! Row-count statistics for a world store.

use std::fmt;

/// Outcome of counting one table. A failed query is reported, not folded
/// into zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCount {
  Rows(i64),
  Unavailable(String),
}

impl TableCount {
  pub fn rows(&self) -> Option<i64> {
    match self {
      TableCount::Rows(n) => Some(*n),
      TableCount::Unavailable(_) => None,
    }
  }
}

impl fmt::Display for TableCount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TableCount::Rows(n) => write!(f, "{n}"),
      TableCount::Unavailable(reason) => write!(f, "unavailable ({reason})"),
    }
  }
}

pub(crate) fn count_rows(conn: &rusqlite::Connection, table: &str) -> TableCount {
  match conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)) {
    Ok(n) => TableCount::Rows(n),
    Err(e) => {
      tracing::warn!("cannot count {table}: {e}");
      TableCount::Unavailable(e.to_string())
    }
  }
}
