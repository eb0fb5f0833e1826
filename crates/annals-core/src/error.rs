//! Error types for `annals-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown source encoding: {0:?}")]
  UnknownEncoding(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
