//! Interaction Dispatcher: reaction symbol × decoded state → transition.
//!
//! Planning is pure. Executing a plan (store lookups, vote mutations,
//! re-rendering) happens in the command layer.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  render::{BrowseState, Page, Step},
  review::Polarity,
};

/// Every reaction symbol a review artifact understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Reaction {
  First,
  Prev,
  Next,
  Upvote,
  Downvote,
  StopVote,
  TextPrev,
  TextNext,
}

impl Reaction {
  pub const PAGING: [Self; 3] = [Self::First, Self::Prev, Self::Next];
  pub const VOTING: [Self; 3] = [Self::Upvote, Self::StopVote, Self::Downvote];
  pub const TEXT: [Self; 2] = [Self::TextPrev, Self::TextNext];

  pub fn symbol(self) -> &'static str {
    match self {
      Self::First => "⏪",
      Self::Prev => "◀",
      Self::Next => "▶",
      Self::Upvote => "👍",
      Self::Downvote => "👎",
      Self::StopVote => "🛑",
      Self::TextPrev => "🔼",
      Self::TextNext => "🔽",
    }
  }
}

impl fmt::Display for Reaction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.symbol()) }
}

impl FromStr for Reaction {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    // Some clients append a variation selector to the arrow glyphs.
    match s.trim_end_matches('\u{FE0F}') {
      "⏪" => Ok(Self::First),
      "◀" => Ok(Self::Prev),
      "▶" => Ok(Self::Next),
      "👍" => Ok(Self::Upvote),
      "👎" => Ok(Self::Downvote),
      "🛑" => Ok(Self::StopVote),
      "🔼" => Ok(Self::TextPrev),
      "🔽" => Ok(Self::TextNext),
      other => Err(Error::UnknownReaction(other.to_owned())),
    }
  }
}

impl TryFrom<String> for Reaction {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Error> { value.parse() }
}

impl From<Reaction> for String {
  fn from(value: Reaction) -> Self { value.symbol().to_owned() }
}

/// What a vote reaction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
  Cast(Polarity),
  Withdraw,
}

/// The transition a reaction requests, before any store validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
  /// Show this page, provided the subject still has that many reviews.
  ShowPage(u32),
  Vote(VoteAction),
  /// Rewrite only the text slots.
  ShowTextPage(Page),
  Ignore,
}

/// Map a reaction onto the transition it requests from `state`.
pub fn plan(reaction: Reaction, state: &BrowseState) -> Intent {
  let paging = |step: Step| state.page.step(step).map_or(Intent::Ignore, |p| Intent::ShowPage(p.current));
  let text = |step: Step| {
    state
      .text_page
      .and_then(|p| p.step(step))
      .map_or(Intent::Ignore, Intent::ShowTextPage)
  };
  let has_review = state.review_id.is_some();

  match reaction {
    Reaction::First => paging(Step::First),
    Reaction::Prev => paging(Step::Prev),
    Reaction::Next => paging(Step::Next),
    Reaction::Upvote if has_review => Intent::Vote(VoteAction::Cast(Polarity::Up)),
    Reaction::Downvote if has_review => Intent::Vote(VoteAction::Cast(Polarity::Down)),
    Reaction::StopVote if has_review => Intent::Vote(VoteAction::Withdraw),
    Reaction::TextPrev => text(Step::Prev),
    Reaction::TextNext => text(Step::Next),
    Reaction::Upvote | Reaction::Downvote | Reaction::StopVote => Intent::Ignore,
  }
}

/// Reactions an artifact in `state` should carry.
pub fn controls(state: &BrowseState) -> Vec<Reaction> {
  let mut symbols = Vec::new();
  if state.review_id.is_none() {
    return symbols;
  }
  if state.page.total > 1 {
    symbols.extend(Reaction::PAGING);
  }
  symbols.extend(Reaction::VOTING);
  if state.text_page.is_some() {
    symbols.extend(Reaction::TEXT);
  }
  symbols
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{review::ReviewId, subject::Shortcut};

  fn state(page: Page, text_page: Option<Page>) -> BrowseState {
    BrowseState {
      subject: Shortcut::new("abc").unwrap(),
      heading: String::new(),
      page,
      review_id: Some(ReviewId(1)),
      text_page,
    }
  }

  #[test]
  fn symbols_round_trip() {
    for r in Reaction::PAGING.into_iter().chain(Reaction::VOTING).chain(Reaction::TEXT) {
      assert_eq!(r.symbol().parse::<Reaction>().unwrap(), r);
    }
    assert_eq!("▶\u{FE0F}".parse::<Reaction>().unwrap(), Reaction::Next);
    assert!("🎉".parse::<Reaction>().is_err());
  }

  #[test]
  fn paging_clamps_at_both_ends() {
    let s = state(Page { current: 1, total: 3 }, None);
    assert_eq!(plan(Reaction::Prev, &s), Intent::Ignore);
    assert_eq!(plan(Reaction::Next, &s), Intent::ShowPage(2));
    assert_eq!(plan(Reaction::First, &s), Intent::ShowPage(1));

    let s = state(Page { current: 3, total: 3 }, None);
    assert_eq!(plan(Reaction::Next, &s), Intent::Ignore);
    assert_eq!(plan(Reaction::Prev, &s), Intent::ShowPage(2));
  }

  #[test]
  fn text_paging_needs_text_page_slot() {
    let s = state(Page::first(1), None);
    assert_eq!(plan(Reaction::TextNext, &s), Intent::Ignore);

    let s = state(Page::first(1), Some(Page { current: 1, total: 2 }));
    assert_eq!(plan(Reaction::TextPrev, &s), Intent::Ignore);
    assert_eq!(
      plan(Reaction::TextNext, &s),
      Intent::ShowTextPage(Page { current: 2, total: 2 })
    );
  }

  #[test]
  fn votes_need_a_review() {
    let mut s = state(Page::first(1), None);
    assert_eq!(plan(Reaction::Downvote, &s), Intent::Vote(VoteAction::Cast(Polarity::Down)));
    s.review_id = None;
    assert_eq!(plan(Reaction::Upvote, &s), Intent::Ignore);
    assert!(controls(&s).is_empty());
  }

  #[test]
  fn controls_follow_state() {
    let single = state(Page::first(1), None);
    assert_eq!(controls(&single), Reaction::VOTING.to_vec());

    let paged = state(Page { current: 2, total: 4 }, Some(Page::first(2)));
    let symbols = controls(&paged);
    assert_eq!(symbols.len(), 8);
    assert_eq!(symbols[0], Reaction::First);
  }
}
