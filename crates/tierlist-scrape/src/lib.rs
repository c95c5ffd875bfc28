//! Catalog scraper for the subject tier-list.
//!
//! Fetches programme pages, reads their subject tables, and feeds every row
//! through [`tierlist_core::merge`]. Pages come from a [`ProgramSource`]; the
//! production source is [`HttpSource`].

pub mod error;
mod parse;
mod refresh;
mod source;

pub use error::{Error, Result};
pub use parse::{ProgramPage, ProgramRow, ProgramTable, parse_program};
pub use refresh::{CatalogSource, RefreshReport, default_sources, refresh, subjects_on, year_tag};
pub use source::{HttpSource, ProgramSource};
