//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Member ids are decimal strings since
//! they may not fit a signed 64-bit column. Tag sets are comma-separated.

use chrono::{DateTime, Utc};
use tierlist_core::{
  review::{MemberId, Review, ReviewId, Tier},
  subject::{Shortcut, Subject, SubjectDetails, TagSet},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── MemberId ────────────────────────────────────────────────────────────────

pub fn encode_member(id: MemberId) -> String { id.0.to_string() }

pub fn decode_member(s: &str) -> Result<MemberId> {
  s.parse().map(MemberId).map_err(|_| Error::MemberId(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub shortcut:   String,
  pub created_at: String,
}

impl RawSubject {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      shortcut:   Shortcut::new(&self.shortcut)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const DETAILS_COLUMNS: &str =
  "shortcut, name, credits, semester, end_type, card, type, year, degree";

/// Raw values read directly from a `subject_details` row.
pub struct RawDetails {
  pub shortcut: String,
  pub name:     String,
  pub credits:  u32,
  pub semester: String,
  pub end:      String,
  pub card:     String,
  pub kind:     String,
  pub year:     String,
  pub degree:   String,
}

impl RawDetails {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      shortcut: row.get(0)?,
      name:     row.get(1)?,
      credits:  row.get(2)?,
      semester: row.get(3)?,
      end:      row.get(4)?,
      card:     row.get(5)?,
      kind:     row.get(6)?,
      year:     row.get(7)?,
      degree:   row.get(8)?,
    })
  }

  pub fn into_details(self) -> Result<SubjectDetails> {
    Ok(SubjectDetails {
      shortcut: Shortcut::new(&self.shortcut)?,
      name:     self.name,
      credits:  self.credits,
      semester: self.semester.parse()?,
      end:      self.end,
      link:     self.card,
      kind:     tags(&self.kind),
      year:     tags(&self.year),
      degree:   self.degree.parse()?,
    })
  }
}

fn tags(s: &str) -> TagSet<String> {
  s.split(',')
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .map(str::to_owned)
    .collect()
}

pub const REVIEW_COLUMNS: &str =
  "review_id, member_id, shortcut, tier, anonymous, text_review, created_at";

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub review_id:  i64,
  pub member_id:  String,
  pub shortcut:   String,
  pub tier:       i64,
  pub anonymous:  bool,
  pub text:       Option<String>,
  pub created_at: String,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:  row.get(0)?,
      member_id:  row.get(1)?,
      shortcut:   row.get(2)?,
      tier:       row.get(3)?,
      anonymous:  row.get(4)?,
      text:       row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      id:         ReviewId(self.review_id),
      author:     decode_member(&self.member_id)?,
      shortcut:   Shortcut::new(&self.shortcut)?,
      tier:       Tier::new(self.tier)?,
      anonymous:  self.anonymous,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn member_ids_survive_full_u64_range() {
    let id = MemberId(u64::MAX);
    assert_eq!(decode_member(&encode_member(id)).unwrap(), id);
    assert!(decode_member("-1").is_err());
  }

  #[test]
  fn tag_columns_split_on_commas() {
    let set = tags("2BIT, 3BIT,,");
    assert_eq!(set.len(), 2);
    assert_eq!(set.to_string(), "2BIT, 3BIT");
    assert!(tags("").is_empty());
  }
}
