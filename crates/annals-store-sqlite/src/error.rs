//! Error type for `annals-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("document error: {0}")]
  Xml(#[from] annals_xml::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("world not found: {0}")]
  WorldNotFound(String),

  /// Merge requested for a world that already carries supplementary data.
  #[error("world {0} already has supplementary data")]
  AlreadyMerged(String),

  /// Two registrations produced the same generated id.
  #[error("world id {0} is already registered")]
  DuplicateWorldId(String),
}

impl From<tokio_rusqlite::Error> for Error {
  /// Document errors raised inside a database call travel back boxed; unwrap
  /// them so callers see the underlying kind.
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<annals_xml::Error>() {
        Ok(xml) => Error::Xml(*xml),
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Error::Database(other),
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Error::Database(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
