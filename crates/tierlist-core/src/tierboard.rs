//! Resolving `tierboard [type] [semester] [year]` arguments into a query.
//!
//! Missing arguments default to electives (`V`) in the winter semester; the
//! degree, and for compulsory subjects the year, come from the actor's
//! programme role (`1BIT`, `2BIT`, `4BIT+`, `1MIT`, ...).

use crate::{
  aggregate::TierboardQuery,
  access::Role,
  subject::{Degree, Semester},
};

pub const DEFAULT_KIND: &str = "V";
pub const DEFAULT_SEMESTER: Semester = Semester::Z;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
  Help,
  Query(TierboardQuery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
  BadSemester(String),
  /// Neither a degree role nor an explicit year.
  MissingYear,
}

/// Year tag implied by a bachelor programme role.
fn bachelor_year(role: &str) -> String {
  match role {
    "4BIT+" => "3BIT".to_owned(),
    "0BIT" => "1BIT".to_owned(),
    other => other.to_owned(),
  }
}

pub fn resolve(
  kind: Option<&str>,
  semester: Option<&str>,
  year: Option<&str>,
  roles: &[Role],
) -> Result<Resolved, ResolveError> {
  let kind = kind.map_or_else(|| DEFAULT_KIND.to_owned(), str::to_uppercase);
  if kind == "HELP" {
    return Ok(Resolved::Help);
  }
  let semester = match semester {
    Some(raw) => raw
      .parse::<Semester>()
      .map_err(|_| ResolveError::BadSemester(raw.to_owned()))?,
    None => DEFAULT_SEMESTER,
  };
  let mut year = year.map(str::to_owned).filter(|y| !y.is_empty());

  let mut degree = None;
  for role in roles {
    if role.name.contains("BIT") {
      degree = Some(Degree::Bachelor);
      if year.is_none() && kind == "P" {
        year = Some(bachelor_year(&role.name));
      }
      break;
    }
    if role.name.contains("MIT") {
      degree = Some(Degree::Master);
      break;
    }
  }

  if degree.is_none() && year.is_none() {
    return Err(ResolveError::MissingYear);
  }
  Ok(Resolved::Query(TierboardQuery { kind, semester, degree, year }))
}

/// Label for the programme column: the year when given, else the degree.
pub fn programme_label(query: &TierboardQuery) -> String {
  match (&query.year, query.degree) {
    (Some(year), _) => year.clone(),
    (None, Some(degree)) => degree.to_string(),
    (None, None) => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn role(name: &str) -> Role { Role { id: 1, name: name.into() } }

  fn query(r: Result<Resolved, ResolveError>) -> TierboardQuery {
    match r {
      Ok(Resolved::Query(q)) => q,
      other => panic!("expected query, got {other:?}"),
    }
  }

  #[test]
  fn defaults_to_winter_electives() {
    let q = query(resolve(None, None, None, &[role("2BIT")]));
    assert_eq!(q.kind, "V");
    assert_eq!(q.semester, Semester::Z);
    assert_eq!(q.degree, Some(Degree::Bachelor));
    assert_eq!(q.year, None);
  }

  #[test]
  fn compulsory_infers_year_from_role() {
    let q = query(resolve(Some("p"), Some("l"), None, &[role("4BIT+")]));
    assert_eq!(q.year.as_deref(), Some("3BIT"));
    assert_eq!(programme_label(&q), "3BIT");

    let q = query(resolve(Some("P"), None, None, &[role("0BIT")]));
    assert_eq!(q.year.as_deref(), Some("1BIT"));
  }

  #[test]
  fn master_role_gives_degree_only() {
    let q = query(resolve(Some("P"), None, None, &[role("1MIT")]));
    assert_eq!(q.degree, Some(Degree::Master));
    assert_eq!(q.year, None);
    assert_eq!(programme_label(&q), "MIT");
  }

  #[test]
  fn help_and_errors() {
    assert_eq!(resolve(Some("help"), None, None, &[]), Ok(Resolved::Help));
    assert_eq!(resolve(None, None, None, &[role("Verify")]), Err(ResolveError::MissingYear));
    assert_eq!(
      resolve(None, Some("W"), None, &[]),
      Err(ResolveError::BadSemester("W".into()))
    );
    assert!(matches!(resolve(None, None, Some("2BIT"), &[]), Ok(Resolved::Query(_))));
  }
}
