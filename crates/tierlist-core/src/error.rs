//! Error types for `tierlist-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("tier {0} is outside 0..=4")]
  TierOutOfRange(i64),

  #[error("empty subject shortcut")]
  EmptyShortcut,

  #[error("unknown semester tag: {0:?}")]
  UnknownSemester(String),

  #[error("unknown degree tag: {0:?}")]
  UnknownDegree(String),

  #[error("unknown reaction symbol: {0:?}")]
  UnknownReaction(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
