//! World catalog entries and world identifier generation.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Display name used when neither source document names the world.
pub const DEFAULT_WORLD_NAME: &str = "Unknown World";

/// Width, in hex characters, of a generated world id.
pub const WORLD_ID_LEN: usize = 12;

/// One loaded world as tracked by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldCatalogEntry {
  pub id:                String,
  pub name:              String,
  pub altname:           Option<String>,
  /// Location of the world's own relational store.
  pub db_path:           PathBuf,
  pub is_current:        bool,
  pub has_supplementary: bool,
  pub has_map:           bool,
  pub created_at:        DateTime<Utc>,
}

/// Fields supplied when registering a freshly imported world.
#[derive(Debug, Clone)]
pub struct NewWorld {
  pub id:                String,
  pub name:              Option<String>,
  pub altname:           Option<String>,
  pub db_path:           PathBuf,
  pub has_supplementary: bool,
}

/// Hash the world's name together with a time salt into a short token.
///
/// Collisions are not detected here; the catalog's primary key rejects a
/// duplicate at registration time.
pub fn generate_world_id(name: Option<&str>, salt: DateTime<Utc>) -> String {
  let raw = format!(
    "{}_{}",
    name.unwrap_or("unknown"),
    salt.timestamp_nanos_opt().unwrap_or_else(|| salt.timestamp_micros())
  );
  let digest = Sha256::digest(raw.as_bytes());
  let mut id = hex::encode(digest);
  id.truncate(WORLD_ID_LEN);
  id
}

/// `name` if it is set, else [`DEFAULT_WORLD_NAME`].
pub fn display_name(name: Option<&str>) -> &str {
  name.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_WORLD_NAME)
}

/// Whether a stored world name is still a placeholder that a later source
/// may replace.
pub fn is_placeholder_name(name: Option<&str>) -> bool {
  match name {
    None => true,
    Some(n) => n.trim().is_empty() || n == DEFAULT_WORLD_NAME,
  }
}
