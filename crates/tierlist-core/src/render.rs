//! Render State codec: browse position ⇄ review artifact.
//!
//! No browse session exists server-side. Everything needed to continue
//! browsing (subject, page, referenced review, text sub-page) is written into
//! the artifact by [`encode`] and read back by [`decode`] on every reaction.
//!
//! Artifact schema:
//!
//! | Slot | Content |
//! |------|---------|
//! | title | `{SUBJECT} reviews` |
//! | description | subject name and average tier |
//! | fields | `Author`, `Tier`, `Date`, [`Text page`], [`Text`], `Likes`, `Dislikes`, `Help` |
//! | footer | `Review: {page}/{max} \| ID: {review id}` |

use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  config::Messages,
  embed::{Embed, EmbedField},
  review::{Review, ReviewId},
  subject::Shortcut,
};

pub const TITLE_SUFFIX: &str = " reviews";
/// Fixed prefix in front of the page number in the footer.
pub const FOOTER_PREFIX: &str = "Review: ";
/// Characters of review text shown per text sub-page.
pub const TEXT_CHUNK: usize = 1024;

pub const FIELD_AUTHOR: &str = "Author";
pub const FIELD_TIER: &str = "Tier";
pub const FIELD_DATE: &str = "Date";
pub const FIELD_TEXT_PAGE: &str = "Text page";
pub const FIELD_TEXT: &str = "Text";
pub const FIELD_LIKES: &str = "Likes";
pub const FIELD_DISLIKES: &str = "Dislikes";
pub const FIELD_HELP: &str = "Help";

pub const COLOR_NEUTRAL: u32 = 0x6D6A69;
pub const COLOR_POSITIVE: u32 = 0x34CB0B;
pub const COLOR_NEGATIVE: u32 = 0xCB410B;

// ─── Page ────────────────────────────────────────────────────────────────────

/// A 1-based position out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub current: u32,
  pub total:   u32,
}

/// Paging movement requested by a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  First,
  Prev,
  Next,
}

impl Page {
  pub fn first(total: u32) -> Self { Self { current: 1, total: total.max(1) } }

  /// The page after applying `step`, or `None` when it would leave
  /// `1..=total`.
  pub fn step(self, step: Step) -> Option<Self> {
    let current = match step {
      Step::First => 1,
      Step::Prev => self.current.checked_sub(1)?,
      Step::Next => self.current.checked_add(1)?,
    };
    (1..=self.total)
      .contains(&current)
      .then_some(Self { current, total: self.total })
  }
}

impl fmt::Display for Page {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.current, self.total)
  }
}

impl FromStr for Page {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, DecodeError> {
    let (current, total) = s
      .split_once('/')
      .ok_or_else(|| DecodeError::Corrupt(format!("no '/' in page {s:?}")))?;
    checked_page(parse_number(current)?, parse_number(total)?)
  }
}

fn parse_number(raw: &str) -> Result<u32, DecodeError> {
  raw
    .trim()
    .parse()
    .map_err(|_| DecodeError::Corrupt(format!("{raw:?} is not a page number")))
}

fn checked_page(current: u32, total: u32) -> Result<Page, DecodeError> {
  if current == 0 || current > total {
    return Err(DecodeError::Corrupt(format!("page {current}/{total} out of range")));
  }
  Ok(Page { current, total })
}

// ─── State ───────────────────────────────────────────────────────────────────

/// The browse position carried by a review artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseState {
  pub subject:   Shortcut,
  /// Description text; carried over unchanged between renders.
  pub heading:   String,
  pub page:      Page,
  /// `None` when the subject has no reviews (footer `ID: 0`).
  pub review_id: Option<ReviewId>,
  /// Present only when the review text spans several chunks.
  pub text_page: Option<Page>,
}

impl BrowseState {
  /// State for showing `card` at `page`, on its first text sub-page.
  pub fn at(subject: Shortcut, heading: String, page: Page, card: Option<&ReviewCard>) -> Self {
    let review = card.map(|c| &c.review);
    Self {
      subject,
      heading,
      page,
      review_id: review.map(|r| r.id),
      text_page: review
        .and_then(|r| r.text.as_deref())
        .map(chunk_count)
        .filter(|n| *n > 1)
        .map(Page::first),
    }
  }
}

/// A review with its current vote tallies, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCard {
  pub review:   Review,
  pub likes:    u64,
  pub dislikes: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
  /// Not a review artifact at all; reactions on it are none of our business.
  #[error("artifact is not a review listing")]
  Foreign,

  /// A review artifact whose state cannot be parsed.
  #[error("corrupted browse state: {0}")]
  Corrupt(String),
}

// ─── Text chunks ─────────────────────────────────────────────────────────────

/// Number of [`TEXT_CHUNK`]-character chunks in `text` (at least 1).
pub fn chunk_count(text: &str) -> u32 {
  let chars = text.chars().count();
  u32::try_from(chars.div_ceil(TEXT_CHUNK).max(1)).unwrap_or(u32::MAX)
}

/// The 1-based `index`-th chunk of `text`; boundaries are purely positional.
pub fn text_chunk(text: &str, index: u32) -> &str {
  let skip = (index.max(1) as usize - 1) * TEXT_CHUNK;
  let mut bounds = text.char_indices().map(|(i, _)| i).skip(skip);
  let Some(start) = bounds.next() else {
    return "";
  };
  let end = text[start..]
    .char_indices()
    .nth(TEXT_CHUNK)
    .map_or(text.len(), |(i, _)| start + i);
  &text[start..end]
}

// ─── Encode ──────────────────────────────────────────────────────────────────

/// Description line for a subject listing.
pub fn heading(name: &str, average: Option<f64>, messages: &Messages) -> String {
  match average {
    Some(avg) => format!("{name}\n**Average tier:** {}", avg.round_ties_even()),
    None => format!("{name}\n{}", messages.reviews_none),
  }
}

/// Color reflecting the like/dislike balance.
pub fn balance_color(likes: u64, dislikes: u64) -> u32 {
  match likes.cmp(&dislikes) {
    std::cmp::Ordering::Greater => COLOR_POSITIVE,
    std::cmp::Ordering::Less => COLOR_NEGATIVE,
    std::cmp::Ordering::Equal => COLOR_NEUTRAL,
  }
}

fn footer(page: Page, review_id: Option<ReviewId>) -> String {
  let id = review_id.map_or(0, |id| id.0);
  format!("{FOOTER_PREFIX}{page} | ID: {id}")
}

/// Render `state` with `card` as the displayed review.
pub fn encode(state: &BrowseState, card: Option<&ReviewCard>, messages: &Messages) -> Embed {
  let mut embed = Embed::new(
    format!("{}{TITLE_SUFFIX}", state.subject.display_upper()),
    state.heading.clone(),
  );
  embed.color = COLOR_NEUTRAL;

  if let Some(card) = card {
    let review = &card.review;
    let author = if review.anonymous {
      messages.anonymous.clone()
    } else {
      format!("<@{}>", review.author)
    };
    embed
      .push(EmbedField::inline(FIELD_AUTHOR, author))
      .push(EmbedField::inline(FIELD_TIER, review.tier.to_string()))
      .push(EmbedField::inline(
        FIELD_DATE,
        review.created_at.format("%Y-%m-%d %H:%M").to_string(),
      ));

    if let Some(text) = review.text.as_deref() {
      let chunks = chunk_count(text);
      let mut shown = 1;
      if chunks > 1 {
        let current = state.text_page.map_or(1, |p| p.current).clamp(1, chunks);
        shown = current;
        embed.push(EmbedField::block(
          FIELD_TEXT_PAGE,
          Page { current, total: chunks }.to_string(),
        ));
      }
      embed.push(EmbedField::block(FIELD_TEXT, text_chunk(text, shown)));
    }

    embed
      .push(EmbedField::inline(FIELD_LIKES, format!("👍{}", card.likes)))
      .push(EmbedField::inline(FIELD_DISLIKES, format!("👎{}", card.dislikes)))
      .push(EmbedField::block(FIELD_HELP, messages.reviews_reaction_help.clone()));
    embed.color = balance_color(card.likes, card.dislikes);
  }

  embed.footer = Some(footer(state.page, card.map(|c| c.review.id)));
  embed.timestamp = Some(Utc::now());
  embed
}

/// Rewrite only the `Text page` and `Text` slots of `embed` to show
/// sub-page `page` of `text`.
pub fn with_text_page(embed: &Embed, text: &str, page: Page) -> Embed {
  let mut next = embed.clone();
  if let Some(field) = next.field_mut(FIELD_TEXT_PAGE) {
    field.value = page.to_string();
  }
  if let Some(field) = next.field_mut(FIELD_TEXT) {
    field.value = text_chunk(text, page.current).to_owned();
  }
  next
}

// ─── Decode ──────────────────────────────────────────────────────────────────

/// Read the browse position back out of a previously encoded artifact.
pub fn decode(embed: &Embed) -> Result<BrowseState, DecodeError> {
  let title = embed.title.as_deref().ok_or(DecodeError::Foreign)?;
  let upper = title.strip_suffix(TITLE_SUFFIX).ok_or(DecodeError::Foreign)?;
  let subject = Shortcut::new(upper)
    .map_err(|_| DecodeError::Corrupt(format!("no subject in title {title:?}")))?;

  let footer = embed
    .footer
    .as_deref()
    .ok_or_else(|| DecodeError::Corrupt("missing footer".into()))?;
  let mut parts = footer.split('|');
  let page = decode_position(parts.next().unwrap_or_default())?;
  let review_id = decode_review_id(
    parts
      .next()
      .ok_or_else(|| DecodeError::Corrupt(format!("no review id in {footer:?}")))?,
  )?;

  let text_page = embed
    .field(FIELD_TEXT_PAGE)
    .map(|field| field.value.parse::<Page>())
    .transpose()?;

  Ok(BrowseState {
    subject,
    heading: embed.description.clone().unwrap_or_default(),
    page,
    review_id,
    text_page,
  })
}

/// `"Review: {page}/{max} "` → page.
fn decode_position(position: &str) -> Result<Page, DecodeError> {
  let slash = position
    .find('/')
    .ok_or_else(|| DecodeError::Corrupt(format!("no '/' in {position:?}")))?;
  let current = position
    .get(FOOTER_PREFIX.len()..slash)
    .ok_or_else(|| DecodeError::Corrupt(format!("truncated position {position:?}")))?;
  checked_page(parse_number(current)?, parse_number(&position[slash + 1..])?)
}

/// `" ID: {id}"` → review id; `0` means no review.
fn decode_review_id(part: &str) -> Result<Option<ReviewId>, DecodeError> {
  let raw = part
    .trim()
    .strip_prefix("ID:")
    .ok_or_else(|| DecodeError::Corrupt(format!("malformed id part {part:?}")))?;
  let id: i64 = raw
    .trim()
    .parse()
    .map_err(|_| DecodeError::Corrupt(format!("{raw:?} is not a review id")))?;
  Ok((id != 0).then_some(ReviewId(id)))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::review::{MemberId, Tier};

  fn card(text: Option<String>, likes: u64, dislikes: u64) -> ReviewCard {
    ReviewCard {
      review: Review {
        id:         ReviewId(7),
        author:     MemberId(42),
        shortcut:   Shortcut::new("abc").unwrap(),
        tier:       Tier::new(4).unwrap(),
        anonymous:  false,
        text,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap(),
      },
      likes,
      dislikes,
    }
  }

  fn state_for(card: Option<&ReviewCard>, page: Page) -> BrowseState {
    BrowseState::at(
      Shortcut::new("abc").unwrap(),
      "Alphabet\n**Average tier:** 3".into(),
      page,
      card,
    )
  }

  fn without_timestamp(mut embed: Embed) -> Embed {
    embed.timestamp = None;
    embed
  }

  #[test]
  fn paging_is_clamped() {
    let first = Page { current: 1, total: 3 };
    assert_eq!(first.step(Step::Prev), None);
    assert_eq!(first.step(Step::Next), Some(Page { current: 2, total: 3 }));
    let last = Page { current: 3, total: 3 };
    assert_eq!(last.step(Step::Next), None);
    assert_eq!(last.step(Step::First), Some(first));
  }

  #[test]
  fn encode_writes_footer_and_fields() {
    let card = card(Some("short".into()), 2, 0);
    let state = state_for(Some(&card), Page { current: 2, total: 5 });
    let embed = encode(&state, Some(&card), &Messages::default());

    assert_eq!(embed.title.as_deref(), Some("ABC reviews"));
    assert_eq!(embed.footer.as_deref(), Some("Review: 2/5 | ID: 7"));
    assert_eq!(embed.color, COLOR_POSITIVE);
    let names: Vec<_> = embed.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Author", "Tier", "Date", "Text", "Likes", "Dislikes", "Help"]);
    assert_eq!(embed.field(FIELD_AUTHOR).unwrap().value, "<@42>");
  }

  #[test]
  fn empty_listing_has_id_zero() {
    let state = state_for(None, Page::first(0));
    let embed = encode(&state, None, &Messages::default());
    assert_eq!(embed.footer.as_deref(), Some("Review: 1/1 | ID: 0"));
    assert!(embed.fields.is_empty());
    assert_eq!(decode(&embed).unwrap().review_id, None);
  }

  #[test]
  fn long_text_is_split_positionally() {
    let text = "a".repeat(TEXT_CHUNK) + &"b".repeat(10);
    assert_eq!(chunk_count(&text), 2);
    assert_eq!(text_chunk(&text, 1), "a".repeat(TEXT_CHUNK));
    assert_eq!(text_chunk(&text, 2), "b".repeat(10));
    assert_eq!(text_chunk(&text, 3), "");

    let card = card(Some(text.clone()), 0, 0);
    let state = state_for(Some(&card), Page::first(1));
    assert_eq!(state.text_page, Some(Page { current: 1, total: 2 }));

    let embed = encode(&state, Some(&card), &Messages::default());
    assert_eq!(embed.field(FIELD_TEXT_PAGE).unwrap().value, "1/2");

    let turned = with_text_page(&embed, &text, Page { current: 2, total: 2 });
    assert_eq!(turned.field(FIELD_TEXT_PAGE).unwrap().value, "2/2");
    assert_eq!(turned.field(FIELD_TEXT).unwrap().value, "b".repeat(10));
    assert_eq!(turned.field(FIELD_LIKES), embed.field(FIELD_LIKES));
    assert_eq!(turned.footer, embed.footer);
  }

  #[test]
  fn chunking_counts_characters_not_bytes() {
    let text = "ř".repeat(TEXT_CHUNK + 1);
    assert_eq!(chunk_count(&text), 2);
    assert_eq!(text_chunk(&text, 2), "ř");
  }

  #[test]
  fn decode_then_encode_round_trips() {
    let text = "x".repeat(TEXT_CHUNK * 2 + 5);
    let card = card(Some(text), 1, 3);
    let state = state_for(Some(&card), Page { current: 3, total: 4 });
    let rendered = encode(&state, Some(&card), &Messages::default());

    let decoded = decode(&rendered).unwrap();
    assert_eq!(decoded, state);

    let again = encode(&decoded, Some(&card), &Messages::default());
    assert_eq!(without_timestamp(again), without_timestamp(rendered));
  }

  #[test]
  fn non_numeric_footer_is_corruption() {
    let mut embed = Embed::new("ABC reviews", "x");
    embed.footer = Some("Review: 2/abc".into());
    assert!(matches!(decode(&embed), Err(DecodeError::Corrupt(_))));

    embed.footer = Some("Review: x/3 | ID: 1".into());
    assert!(matches!(decode(&embed), Err(DecodeError::Corrupt(_))));

    embed.footer = Some("Review: 2/3 | ID: seven".into());
    assert!(matches!(decode(&embed), Err(DecodeError::Corrupt(_))));
  }

  #[test]
  fn average_tier_rounds_half_to_even() {
    let messages = Messages::default();
    assert_eq!(heading("Alphabet", Some(2.5), &messages), "Alphabet\n**Average tier:** 2");
    assert_eq!(heading("Alphabet", Some(3.5), &messages), "Alphabet\n**Average tier:** 4");
    assert_eq!(heading("Alphabet", Some(2.6), &messages), "Alphabet\n**Average tier:** 3");
  }

  #[test]
  fn foreign_artifacts_are_recognised() {
    assert_eq!(decode(&Embed::new("Tierboard", "")), Err(DecodeError::Foreign));
    assert_eq!(decode(&Embed::default()), Err(DecodeError::Foreign));
  }
}
