//! Error type for `tierlist-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tierlist_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("malformed member id: {0:?}")]
  MemberId(String),

  #[error("subject not found: {0}")]
  SubjectNotFound(String),

  #[error("review not found: {0}")]
  ReviewNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
