//! The input documents of one pipeline run.

use std::{path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::Error;

/// Assumed encoding of the raw export bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
  /// IBM code page 437, what the game writes.
  #[default]
  Cp437,
  /// ISO 8859-1.
  Latin1,
  /// Already UTF-8; invalid sequences become U+FFFD.
  Utf8,
}

impl FromStr for SourceEncoding {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "cp437" | "ibm437" => Ok(Self::Cp437),
      "latin1" | "iso-8859-1" => Ok(Self::Latin1),
      "utf8" | "utf-8" => Ok(Self::Utf8),
      other => Err(Error::UnknownEncoding(other.to_owned())),
    }
  }
}

/// The documents an import reads. The primary document is authoritative for
/// identity and chronology; the supplementary one is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Sources {
  pub primary:       PathBuf,
  pub supplementary: Option<PathBuf>,
}

impl Sources {
  pub fn new(primary: impl Into<PathBuf>, supplementary: Option<PathBuf>) -> Self {
    Self { primary: primary.into(), supplementary }
  }

  pub fn has_supplementary(&self) -> bool { self.supplementary.is_some() }
}
