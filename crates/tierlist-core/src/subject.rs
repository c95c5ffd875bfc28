//! Subjects, the reviewable catalog items, and their scraped metadata.
//!
//! A subject is identified by its shortcut alone. Everything the catalog
//! scraper learns about it lives in [`SubjectDetails`], whose tag fields only
//! ever grow.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Shortcut ────────────────────────────────────────────────────────────────

/// Unique, lower-cased subject key (e.g. `ijc`, `ipk`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Shortcut(String);

impl Shortcut {
  pub fn new(raw: &str) -> Result<Self> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
      return Err(Error::EmptyShortcut);
    }
    Ok(Self(normalized))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Upper-cased form used in artifact titles.
  pub fn display_upper(&self) -> String { self.0.to_uppercase() }
}

impl fmt::Display for Shortcut {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for Shortcut {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(&value) }
}

impl From<Shortcut> for String {
  fn from(value: Shortcut) -> Self { value.0 }
}

// ─── Semester / Degree ───────────────────────────────────────────────────────

/// Teaching semester: winter (`Z`) or summer (`L`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semester {
  Z,
  L,
}

impl fmt::Display for Semester {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Z => "Z",
      Self::L => "L",
    })
  }
}

impl FromStr for Semester {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim() {
      "Z" | "z" => Ok(Self::Z),
      "L" | "l" => Ok(Self::L),
      other => Err(Error::UnknownSemester(other.to_owned())),
    }
  }
}

/// Study degree a subject is offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Degree {
  #[serde(rename = "BIT")]
  Bachelor,
  #[serde(rename = "MIT")]
  Master,
}

impl fmt::Display for Degree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Bachelor => "BIT",
      Self::Master => "MIT",
    })
  }
}

impl FromStr for Degree {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_uppercase().as_str() {
      "BIT" => Ok(Self::Bachelor),
      "MIT" => Ok(Self::Master),
      _ => Err(Error::UnknownDegree(s.trim().to_owned())),
    }
  }
}

// ─── TagSet ──────────────────────────────────────────────────────────────────

/// Insertion-ordered set of every value ever observed for one attribute.
///
/// Stored as a `", "`-joined string. Values are only ever added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet<T>(Vec<T>);

impl<T> Default for TagSet<T> {
  fn default() -> Self { Self(Vec::new()) }
}

impl<T: PartialEq> TagSet<T> {
  pub fn single(value: T) -> Self { Self(vec![value]) }

  pub fn contains(&self, value: &T) -> bool { self.0.contains(value) }

  /// Add `value`; returns `false` if it was already present.
  pub fn insert(&mut self, value: T) -> bool {
    if self.contains(&value) {
      return false;
    }
    self.0.push(value);
    true
  }

  /// Copy of `self` with `value` added.
  pub fn with(&self, value: T) -> Self
  where
    T: Clone,
  {
    let mut next = self.clone();
    next.insert(value);
    next
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> { self.0.iter() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }
}

impl<T: fmt::Display> fmt::Display for TagSet<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, value) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{value}")?;
    }
    Ok(())
  }
}

impl<T> FromStr for TagSet<T>
where
  T: FromStr + PartialEq,
{
  type Err = T::Err;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let mut set = Self::default();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
      set.insert(part.parse()?);
    }
    Ok(set)
  }
}

impl<T: PartialEq> FromIterator<T> for TagSet<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut set = Self::default();
    for value in iter {
      set.insert(value);
    }
    set
  }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// Registry entry: a shortcut that may be reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub shortcut:   Shortcut,
  pub created_at: DateTime<Utc>,
}

/// Catalog metadata for a subject, merged from scraped programme pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDetails {
  pub shortcut: Shortcut,
  pub name:     String,
  pub credits:  u32,
  pub semester: TagSet<Semester>,
  /// Completion form, e.g. `ZáZk` or `Zk`.
  pub end:      String,
  /// Link to the official subject card.
  pub link:     String,
  /// Subject type per programme: `P` compulsory, `PV` elective, `V` optional.
  pub kind:     TagSet<String>,
  /// Year tags such as `1BIT`, `2NBIO`, `VMIT`.
  pub year:     TagSet<String>,
  pub degree:   TagSet<Degree>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shortcut_is_lowercased_and_trimmed() {
    let s = Shortcut::new("  IJC ").unwrap();
    assert_eq!(s.as_str(), "ijc");
    assert_eq!(s.display_upper(), "IJC");
    assert_eq!(Shortcut::new("   "), Err(Error::EmptyShortcut));
  }

  #[test]
  fn tag_set_parses_comma_joined_and_dedupes() {
    let set: TagSet<String> = "1BIT, 2BIT,1BIT,".parse().unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.to_string(), "1BIT, 2BIT");
  }

  #[test]
  fn tag_set_insert_is_additive() {
    let mut set = TagSet::single(Semester::Z);
    assert!(!set.insert(Semester::Z));
    assert!(set.insert(Semester::L));
    assert_eq!(set.to_string(), "Z, L");
  }

  #[test]
  fn degree_and_semester_parse() {
    let degrees: TagSet<Degree> = "MIT, BIT".parse().unwrap();
    assert!(degrees.contains(&Degree::Bachelor));
    assert!(degrees.contains(&Degree::Master));
    assert!("X".parse::<Semester>().is_err());
    assert!("PhD".parse::<Degree>().is_err());
  }
}
