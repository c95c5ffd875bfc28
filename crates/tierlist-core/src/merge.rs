//! Merging freshly scraped subject facts into the stored record.
//!
//! A merge never removes a tag. Each call changes at most one dimension, in
//! the order type+year, semester, degree: every scraped page supplies one
//! programme/year view of a subject, so convergence takes one call per page
//! that lists it.

use serde::{Deserialize, Serialize};

use crate::{
  store::CatalogStore,
  subject::{Degree, Semester, Shortcut, SubjectDetails, TagSet},
};

/// One subject row as seen on one scraped programme page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedSubject {
  pub shortcut: Shortcut,
  pub name:     String,
  pub credits:  u32,
  pub semester: Semester,
  pub end:      String,
  pub link:     String,
  pub kind:     String,
  pub year:     String,
  pub degree:   Degree,
}

impl ScrapedSubject {
  fn into_details(self) -> SubjectDetails {
    SubjectDetails {
      shortcut: self.shortcut,
      name:     self.name,
      credits:  self.credits,
      semester: TagSet::single(self.semester),
      end:      self.end,
      link:     self.link,
      kind:     TagSet::single(self.kind),
      year:     TagSet::single(self.year),
      degree:   TagSet::single(self.degree),
    }
  }
}

/// The single store change a merge call performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergePlan {
  /// No details stored yet.
  Insert(SubjectDetails),
  TypeYear {
    kind: TagSet<String>,
    year: TagSet<String>,
  },
  Semester(TagSet<Semester>),
  Degree(TagSet<Degree>),
  Unchanged,
}

/// Decide how `incoming` changes `existing`.
pub fn plan(existing: Option<&SubjectDetails>, incoming: &ScrapedSubject) -> MergePlan {
  let Some(current) = existing else {
    return MergePlan::Insert(incoming.clone().into_details());
  };

  if !current.year.contains(&incoming.year) {
    MergePlan::TypeYear {
      kind: current.kind.with(incoming.kind.clone()),
      year: current.year.with(incoming.year.clone()),
    }
  } else if !current.semester.contains(&incoming.semester) {
    MergePlan::Semester(current.semester.with(incoming.semester))
  } else if !current.degree.contains(&incoming.degree) {
    MergePlan::Degree(current.degree.with(incoming.degree))
  } else {
    MergePlan::Unchanged
  }
}

/// Merge `incoming` into the store, registering the shortcut first if it is
/// unknown. Returns the plan that was applied.
pub async fn merge<S>(store: &S, incoming: &ScrapedSubject) -> Result<MergePlan, S::Error>
where
  S: CatalogStore,
{
  let shortcut = &incoming.shortcut;
  if store.get_subject(shortcut).await?.is_none() {
    store.add_subject(shortcut).await?;
  }

  let existing = store.get_subject_details(shortcut).await?;
  let plan = plan(existing.as_ref(), incoming);

  match &plan {
    MergePlan::Insert(details) => store.set_subject_details(details).await?,
    MergePlan::TypeYear { kind, year } => {
      store.update_subject_type(shortcut, kind, year).await?
    }
    MergePlan::Semester(semester) => {
      store.update_subject_semester(shortcut, semester).await?
    }
    MergePlan::Degree(degree) => store.update_subject_degree(shortcut, degree).await?,
    MergePlan::Unchanged => {}
  }

  if plan != MergePlan::Unchanged {
    tracing::debug!(%shortcut, ?plan, "merged scraped subject");
  }
  Ok(plan)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scraped(year: &str, kind: &str, semester: Semester, degree: Degree) -> ScrapedSubject {
    ScrapedSubject {
      shortcut: Shortcut::new("ret").unwrap(),
      name:     "Electronics".into(),
      credits:  6,
      semester,
      end:      "ZáZk".into(),
      link:     "https://example.org/ret".into(),
      kind:     kind.into(),
      year:     year.into(),
      degree,
    }
  }

  fn apply(details: &mut SubjectDetails, plan: MergePlan) {
    match plan {
      MergePlan::Insert(d) => *details = d,
      MergePlan::TypeYear { kind, year } => {
        details.kind = kind;
        details.year = year;
      }
      MergePlan::Semester(s) => details.semester = s,
      MergePlan::Degree(d) => details.degree = d,
      MergePlan::Unchanged => {}
    }
  }

  #[test]
  fn unknown_subject_is_inserted_with_singleton_tags() {
    let incoming = scraped("1BIT", "P", Semester::Z, Degree::Bachelor);
    let MergePlan::Insert(details) = plan(None, &incoming) else {
      panic!("expected insert");
    };
    assert_eq!(details.year.to_string(), "1BIT");
    assert_eq!(details.semester.to_string(), "Z");
    assert_eq!(details.degree.to_string(), "BIT");
  }

  #[test]
  fn merge_is_idempotent() {
    let incoming = scraped("1BIT", "P", Semester::Z, Degree::Bachelor);
    let MergePlan::Insert(mut details) = plan(None, &incoming) else {
      panic!("expected insert");
    };
    let before = details.clone();
    let again = plan(Some(&details), &incoming);
    assert_eq!(again, MergePlan::Unchanged);
    apply(&mut details, again);
    assert_eq!(details, before);
  }

  #[test]
  fn new_year_couples_type() {
    let MergePlan::Insert(details) =
      plan(None, &scraped("1BIT", "P", Semester::Z, Degree::Bachelor))
    else {
      panic!("expected insert");
    };
    let next = plan(Some(&details), &scraped("VMIT", "V", Semester::L, Degree::Master));
    assert_eq!(next, MergePlan::TypeYear {
      kind: "P, V".parse().unwrap(),
      year: "1BIT, VMIT".parse().unwrap(),
    });
  }

  #[test]
  fn one_dimension_per_call_until_converged() {
    let mut details = match plan(None, &scraped("1BIT", "P", Semester::Z, Degree::Bachelor)) {
      MergePlan::Insert(d) => d,
      other => panic!("unexpected {other:?}"),
    };
    let incoming = scraped("1BIT", "P", Semester::L, Degree::Master);

    let first = plan(Some(&details), &incoming);
    assert!(matches!(first, MergePlan::Semester(_)));
    apply(&mut details, first);

    let second = plan(Some(&details), &incoming);
    assert!(matches!(second, MergePlan::Degree(_)));
    apply(&mut details, second);

    assert_eq!(plan(Some(&details), &incoming), MergePlan::Unchanged);
    assert_eq!(details.semester.to_string(), "Z, L");
    assert_eq!(details.degree.to_string(), "BIT, MIT");
  }
}
