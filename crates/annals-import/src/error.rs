//! Error type for `annals-import`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Store(#[from] annals_store_sqlite::Error),

  #[error(transparent)]
  Xml(#[from] annals_xml::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("primary document not found: {}", .0.display())]
  MissingPrimary(PathBuf),

  #[error("supplementary document not found: {}", .0.display())]
  MissingSupplementary(PathBuf),

  #[error("world store not found: {}", .0.display())]
  MissingStore(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
