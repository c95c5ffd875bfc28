//! Static cards: subject info and the tierboard.
//!
//! Unlike review listings these carry no browse state and are never decoded.

use chrono::Utc;

use crate::{
  aggregate::{RankedSubject, TierboardQuery},
  embed::{Embed, EmbedField},
  render::COLOR_NEUTRAL,
  subject::SubjectDetails,
  tierboard::programme_label,
};

pub const TIERBOARD_TITLE: &str = "Tierboard";

pub fn subject_info(details: &SubjectDetails, requested_by: &str) -> Embed {
  let mut embed = Embed::new(details.shortcut.as_str(), details.name.clone());
  embed
    .push(EmbedField::inline("Semester", details.semester.to_string()))
    .push(EmbedField::inline("Type", details.kind.to_string()));
  if !details.year.is_empty() {
    embed.push(EmbedField::inline("Year", details.year.to_string()));
  }
  embed
    .push(EmbedField::inline("Credits", details.credits.to_string()))
    .push(EmbedField::inline("Completion", details.end.clone()))
    .push(EmbedField::block("Subject card", details.link.clone()));
  embed.color = COLOR_NEUTRAL;
  embed.footer = Some(requested_by.to_owned());
  embed.timestamp = Some(Utc::now());
  embed
}

/// One `{rank} - **{shortcut}**: {average}` line per subject, averages
/// rounded to one decimal.
pub fn tierboard_lines(board: &[RankedSubject]) -> String {
  board
    .iter()
    .enumerate()
    .map(|(i, entry)| {
      format!("{} - **{}**: {:.1}\n", i + 1, entry.shortcut.as_str(), entry.average)
    })
    .collect()
}

pub fn tierboard(board: &[RankedSubject], query: &TierboardQuery, requested_by: &str) -> Embed {
  let mut embed = Embed::new(TIERBOARD_TITLE, tierboard_lines(board));
  embed
    .push(EmbedField::inline("Semester", query.semester.to_string()))
    .push(EmbedField::inline("Type", query.kind.clone()))
    .push(EmbedField::inline("Program", programme_label(query)));
  embed.color = COLOR_NEUTRAL;
  embed.footer = Some(format!("{requested_by} | tierboard help"));
  embed.timestamp = Some(Utc::now());
  embed
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    render::{self, DecodeError},
    subject::{Degree, Semester, Shortcut, TagSet},
  };

  fn details() -> SubjectDetails {
    SubjectDetails {
      shortcut: Shortcut::new("ias").unwrap(),
      name:     "Assembly Languages".into(),
      credits:  5,
      semester: TagSet::single(Semester::L),
      end:      "ZaZk".into(),
      link:     "https://example.org/ias".into(),
      kind:     TagSet::single("P".to_owned()),
      year:     TagSet::default(),
      degree:   TagSet::single(Degree::Bachelor),
    }
  }

  #[test]
  fn info_card_skips_empty_year() {
    let embed = subject_info(&details(), "student");
    assert_eq!(embed.title.as_deref(), Some("ias"));
    assert!(embed.field("Year").is_none());
    assert_eq!(embed.field("Credits").unwrap().value, "5");
    assert!(!embed.field("Subject card").unwrap().inline);
  }

  #[test]
  fn tierboard_lists_ranked_lines() {
    let board = vec![
      RankedSubject { shortcut: Shortcut::new("ias").unwrap(), average: 3.5, reviews: 4 },
      RankedSubject { shortcut: Shortcut::new("ija").unwrap(), average: 1.0, reviews: 1 },
    ];
    assert_eq!(tierboard_lines(&board), "1 - **ias**: 3.5\n2 - **ija**: 1.0\n");

    let query = TierboardQuery {
      kind:     "P".into(),
      semester: Semester::L,
      degree:   Some(Degree::Bachelor),
      year:     Some("2BIT".into()),
    };
    let embed = tierboard(&board, &query, "student");
    assert_eq!(embed.field("Program").unwrap().value, "2BIT");
    assert_eq!(render::decode(&embed), Err(DecodeError::Foreign));
  }
}
