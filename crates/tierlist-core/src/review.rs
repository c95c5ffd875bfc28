//! Reviews, votes, and the identifiers that tie them to members.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, subject::Shortcut};

/// Chat platform member id (a snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Store-assigned, monotonically increasing review id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub i64);

impl fmt::Display for ReviewId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A rating in `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Tier(u8);

impl Tier {
  pub const MAX: u8 = 4;

  pub fn new(value: i64) -> Result<Self> {
    u8::try_from(value)
      .ok()
      .filter(|v| *v <= Self::MAX)
      .map(Self)
      .ok_or(Error::TierOutOfRange(value))
  }

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<i64> for Tier {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> { Self::new(value) }
}

impl From<Tier> for i64 {
  fn from(value: Tier) -> Self { i64::from(value.0) }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A member's review of one subject. At most one exists per
/// `(author, shortcut)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  pub id:         ReviewId,
  pub author:     MemberId,
  pub shortcut:   Shortcut,
  pub tier:       Tier,
  pub anonymous:  bool,
  pub text:       Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CatalogStore::add_review`] and
/// [`crate::store::CatalogStore::update_review`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewReview {
  pub author:    MemberId,
  pub shortcut:  Shortcut,
  pub tier:      Tier,
  pub anonymous: bool,
  pub text:      Option<String>,
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
  Up,
  Down,
}

impl Polarity {
  pub fn is_up(self) -> bool { matches!(self, Self::Up) }
}

impl From<bool> for Polarity {
  fn from(up: bool) -> Self { if up { Self::Up } else { Self::Down } }
}

/// One member's vote on one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub review_id: ReviewId,
  pub voter:     MemberId,
  pub value:     Polarity,
}

/// All reviews of a subject in browse order, with the subject's mean tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectReviews {
  pub reviews: Vec<Review>,
  /// `None` when there are no reviews.
  pub average: Option<f64>,
}

impl SubjectReviews {
  pub fn len(&self) -> usize { self.reviews.len() }

  pub fn is_empty(&self) -> bool { self.reviews.is_empty() }

  /// The review shown on 1-based `page`, if it exists.
  pub fn at_page(&self, page: u32) -> Option<&Review> {
    let index = usize::try_from(page).ok()?.checked_sub(1)?;
    self.reviews.get(index)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tier_bounds() {
    assert_eq!(Tier::new(0).unwrap().get(), 0);
    assert_eq!(Tier::new(4).unwrap().get(), 4);
    assert_eq!(Tier::new(5), Err(Error::TierOutOfRange(5)));
    assert_eq!(Tier::new(-1), Err(Error::TierOutOfRange(-1)));
  }

  #[test]
  fn at_page_is_one_based() {
    let reviews = SubjectReviews::default();
    assert!(reviews.at_page(0).is_none());
    assert!(reviews.at_page(1).is_none());
  }
}
