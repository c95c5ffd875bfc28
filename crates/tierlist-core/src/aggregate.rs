//! Aggregation over reviews: subject means, tierboard ranking, browse order.
//!
//! Backends fetch raw rows and hand them to these functions so that every
//! store ranks and orders identically.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
  review::{Review, Tier},
  subject::{Degree, Semester, Shortcut, SubjectDetails},
};

/// Filter for [`crate::store::CatalogStore::tierboard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierboardQuery {
  /// Subject type, e.g. `P` or `V`.
  pub kind:     String,
  pub semester: Semester,
  /// Used only when `year` is absent.
  pub degree:   Option<Degree>,
  pub year:     Option<String>,
}

impl TierboardQuery {
  pub fn matches(&self, details: &SubjectDetails) -> bool {
    if !details.kind.contains(&self.kind) || !details.semester.contains(&self.semester) {
      return false;
    }
    match (&self.year, self.degree) {
      (Some(year), _) => details.year.contains(year),
      (None, Some(degree)) => details.degree.contains(&degree),
      (None, None) => true,
    }
  }
}

/// One tierboard line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSubject {
  pub shortcut: Shortcut,
  pub average:  f64,
  pub reviews:  usize,
}

/// Arithmetic mean of `tiers`; `None` for an empty input.
pub fn mean_tier<I>(tiers: I) -> Option<f64>
where
  I: IntoIterator<Item = Tier>,
{
  let (sum, count) = tiers
    .into_iter()
    .fold((0u64, 0u64), |(sum, count), t| (sum + u64::from(t.get()), count + 1));
  (count > 0).then(|| sum as f64 / count as f64)
}

/// Rank subjects by mean tier, highest first; ties broken by shortcut.
/// Subjects without reviews are left out.
pub fn rank<I>(entries: I) -> Vec<RankedSubject>
where
  I: IntoIterator<Item = (Shortcut, Vec<Tier>)>,
{
  let mut board: Vec<RankedSubject> = entries
    .into_iter()
    .filter_map(|(shortcut, tiers)| {
      let reviews = tiers.len();
      mean_tier(tiers).map(|average| RankedSubject { shortcut, average, reviews })
    })
    .collect();
  board.sort_by(|a, b| {
    b.average
      .total_cmp(&a.average)
      .then_with(|| a.shortcut.cmp(&b.shortcut))
  });
  board
}

/// Browse order for a subject's reviews: tier descending, then id ascending.
///
/// Votes never take part, so a page index keeps pointing at the same review
/// while tallies change.
pub fn browse_order(a: &Review, b: &Review) -> Ordering {
  b.tier.cmp(&a.tier).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subject::TagSet;

  fn tiers(values: &[i64]) -> Vec<Tier> {
    values.iter().map(|v| Tier::new(*v).unwrap()).collect()
  }

  fn shortcut(s: &str) -> Shortcut { Shortcut::new(s).unwrap() }

  #[test]
  fn mean_of_four_and_two_is_three() {
    assert_eq!(mean_tier(tiers(&[4, 2])), Some(3.0));
    assert_eq!(mean_tier(Vec::new()), None);
  }

  #[test]
  fn rank_sorts_descending_with_shortcut_tiebreak() {
    let board = rank(vec![
      (shortcut("zzz"), tiers(&[3])),
      (shortcut("abc"), tiers(&[4, 2])),
      (shortcut("ipk"), tiers(&[4])),
      (shortcut("empty"), vec![]),
    ]);
    let order: Vec<_> = board.iter().map(|r| r.shortcut.as_str()).collect();
    assert_eq!(order, ["ipk", "abc", "zzz"]);
    assert_eq!(board[1].reviews, 2);
  }

  #[test]
  fn query_prefers_year_over_degree() {
    let details = SubjectDetails {
      shortcut: shortcut("ijc"),
      name:     "The C Programming Language".into(),
      credits:  5,
      semester: TagSet::single(Semester::L),
      end:      "ZáZk".into(),
      link:     "https://example.org/ijc".into(),
      kind:     TagSet::single("P".to_owned()),
      year:     TagSet::single("1BIT".to_owned()),
      degree:   TagSet::single(Degree::Bachelor),
    };
    let mut query = TierboardQuery {
      kind:     "P".into(),
      semester: Semester::L,
      degree:   Some(Degree::Master),
      year:     Some("1BIT".into()),
    };
    assert!(query.matches(&details));

    query.year = None;
    assert!(!query.matches(&details));

    query.degree = Some(Degree::Bachelor);
    query.semester = Semester::Z;
    assert!(!query.matches(&details));
  }
}
