//! Error types for the catalog scraper.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{url} unavailable: {reason}")]
  Unavailable { url: String, reason: String },

  #[error("malformed page markup: {0}")]
  Markup(#[from] quick_xml::Error),

  #[error("page has no specialization heading")]
  MissingSpecialization,

  #[error("row {shortcut:?}: {problem}")]
  MalformedRow { shortcut: String, problem: String },

  #[error("core error: {0}")]
  Core(#[from] tierlist_core::Error),

  #[error("store error: {0}")]
  Store(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
