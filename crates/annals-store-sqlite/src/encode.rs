//! Conversions between catalog rows and [`WorldCatalogEntry`].
//!
//! Timestamps are stored as RFC 3339 strings, paths as UTF-8 text and flags
//! as 0/1 integers.

use std::path::{Path, PathBuf};

use annals_core::catalog::WorldCatalogEntry;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_path(path: &Path) -> String { path.to_string_lossy().into_owned() }

/// Column list matching [`RawCatalogEntry::from_row`].
pub const ENTRY_COLUMNS: &str =
  "id, name, altname, db_path, is_current, has_supplementary, has_map, created_at";

/// A catalog row as read from SQLite, before timestamp parsing.
pub struct RawCatalogEntry {
  pub id:                String,
  pub name:              String,
  pub altname:           Option<String>,
  pub db_path:           String,
  pub is_current:        bool,
  pub has_supplementary: bool,
  pub has_map:           bool,
  pub created_at:        String,
}

impl RawCatalogEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      name:              row.get(1)?,
      altname:           row.get(2)?,
      db_path:           row.get(3)?,
      is_current:        row.get(4)?,
      has_supplementary: row.get(5)?,
      has_map:           row.get(6)?,
      created_at:        row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<WorldCatalogEntry> {
    Ok(WorldCatalogEntry {
      id:                self.id,
      name:              self.name,
      altname:           self.altname,
      db_path:           PathBuf::from(self.db_path),
      is_current:        self.is_current,
      has_supplementary: self.has_supplementary,
      has_map:           self.has_map,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}
