//! Runtime settings, layered from an optional `annals.toml`, `ANNALS_*`
//! environment variables and built-in defaults.

use std::path::{Path, PathBuf};

use annals_core::sources::SourceEncoding;
use annals_xml::DEFAULT_CHUNK_SIZE;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Root of everything the importer writes.
  pub data_dir:        PathBuf,
  /// Sanitizer block size in bytes.
  pub chunk_size:      usize,
  /// Log progress every this many records within a phase.
  pub report_every:    u64,
  pub source_encoding: SourceEncoding,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir:        PathBuf::from("data"),
      chunk_size:      DEFAULT_CHUNK_SIZE,
      report_every:    10_000,
      source_encoding: SourceEncoding::Cp437,
    }
  }
}

impl Settings {
  /// Load settings. An explicitly named file must exist; the default
  /// `annals.toml` is optional.
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let file = match file {
      Some(path) => config::File::from(path).required(true),
      None => config::File::with_name("annals").required(false),
    };
    let settings = config::Config::builder()
      .add_source(file)
      .add_source(config::Environment::with_prefix("ANNALS"))
      .build()?
      .try_deserialize()?;
    Ok(settings)
  }

  /// The catalog store.
  pub fn catalog_path(&self) -> PathBuf { self.data_dir.join("master.db") }

  pub fn worlds_dir(&self) -> PathBuf { self.data_dir.join("worlds") }

  /// Where the store of world `id` lives.
  pub fn world_path(&self, id: &str) -> PathBuf { self.worlds_dir().join(format!("{id}.db")) }
}
