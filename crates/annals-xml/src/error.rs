//! Error types for `annals-xml`.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The source document could not be opened or read. Fatal for the run.
  #[error("cannot read {}: {}", .path.display(), .source)]
  Unreadable {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("i/o error: {0}")]
  Io(#[from] io::Error),

  #[error("xml error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("document ended inside <{tag}>")]
  UnexpectedEof { tag: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
