//! Handlers for review commands.
//!
//! | Path | Body |
//! |------|------|
//! | `/reviews/browse` | `{"actor":…, "subject":"ija"}` |
//! | `/reviews` | `{"actor":…, "subject":"ija", "tier":"3", "text":"…"}` |
//! | `/reviews/remove` | `{"actor":…, "subject":"ija"}` |
//! | `/reviews/remove-by-id` | `{"actor":…, "id":"42"}` |

use axum::{Json, extract::State};
use serde::Deserialize;
use tierlist_core::{
  access::Actor,
  dispatch,
  render::{self, BrowseState, Page, ReviewCard},
  review::{NewReview, Polarity, Review, ReviewId, Tier},
  store::CatalogStore,
  subject::Shortcut,
};
use tierlist_scrape::ProgramSource;
use tracing::info;

use crate::{AppState, auth::Authenticated, error::ApiError, reply::Reply};

// ─── Shared ───────────────────────────────────────────────────────────────────

/// A shortcut argument, if one was given.
pub(crate) fn shortcut_arg(raw: Option<&str>) -> Option<Shortcut> {
  raw.and_then(|s| Shortcut::new(s).ok())
}

/// Attach the current vote tallies to `review`.
pub(crate) async fn load_card<S>(store: &S, review: Review) -> Result<ReviewCard, ApiError>
where
  S: CatalogStore,
{
  let likes = store
    .vote_count(review.id, Polarity::Up)
    .await
    .map_err(ApiError::store)?;
  let dislikes = store
    .vote_count(review.id, Polarity::Down)
    .await
    .map_err(ApiError::store)?;
  Ok(ReviewCard { review, likes, dislikes })
}

/// Fails with the "unknown subject" message unless `shortcut` is registered.
async fn require_subject<S, P>(state: &AppState<S, P>, shortcut: &Shortcut) -> Result<(), ApiError>
where
  S: CatalogStore,
{
  match state.store.get_subject(shortcut).await.map_err(ApiError::store)? {
    Some(_) => Ok(()),
    None => Err(ApiError::NotFound(state.bot.messages.review_wrong_subject.clone())),
  }
}

// ─── Browse ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BrowseBody {
  pub actor:   Actor,
  pub subject: Option<String>,
}

/// `POST /reviews/browse`: first page of a subject's reviews.
pub async fn browse<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<BrowseBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  let messages = &state.bot.messages;
  let subject = shortcut_arg(body.subject.as_deref())
    .ok_or_else(|| ApiError::UserInput(messages.review_format.clone()))?;
  require_subject(&state, &subject).await?;

  let name = state
    .store
    .get_subject_details(&subject)
    .await
    .map_err(ApiError::store)?
    .map_or_else(|| subject.display_upper(), |d| d.name);
  let listed = state
    .store
    .get_reviews_by_subject(&subject)
    .await
    .map_err(ApiError::store)?;

  let total = u32::try_from(listed.len()).unwrap_or(u32::MAX);
  let average = listed.average;
  let card = match listed.reviews.into_iter().next() {
    Some(first) => Some(load_card(&*state.store, first).await?),
    None => None,
  };
  let heading = render::heading(&name, average, messages);
  let view = BrowseState::at(subject, heading, Page::first(total), card.as_ref());

  info!(actor = %body.actor.id, subject = %view.subject.as_str(), reviews = total, "browse");
  let embed = render::encode(&view, card.as_ref(), messages);
  Ok(Json(Reply::card(embed, dispatch::controls(&view))))
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub actor:   Actor,
  pub subject: Option<String>,
  /// Raw tier argument; must parse to `0..=4`.
  pub tier:    Option<String>,
  pub text:    Option<String>,
}

/// `POST /reviews`: create the actor's review of a subject, or overwrite it.
pub async fn add<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<AddBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  state.admit_member(&body.actor)?;
  let messages = &state.bot.messages;

  let (Some(subject), Some(raw_tier)) = (shortcut_arg(body.subject.as_deref()), body.tier) else {
    return Err(ApiError::UserInput(messages.review_add_format.clone()));
  };
  let tier = raw_tier
    .trim()
    .parse::<i64>()
    .ok()
    .and_then(|t| Tier::new(t).ok())
    .ok_or_else(|| ApiError::UserInput(messages.review_tier.clone()))?;
  require_subject(&state, &subject).await?;

  let author = body.actor.id;
  let input = NewReview {
    author,
    shortcut: subject.clone(),
    tier,
    anonymous: body.actor.direct_message,
    text: body
      .text
      .map(|t| t.trim().to_owned())
      .filter(|t| !t.is_empty()),
  };

  let existing = state
    .store
    .get_review_by_author_subject(author, &subject)
    .await
    .map_err(ApiError::store)?;
  let review = match existing {
    Some(previous) => state.store.update_review(previous.id, input).await,
    None => state.store.add_review(input).await,
  }
  .map_err(ApiError::store)?;

  info!(
    actor = %author,
    subject = %subject.as_str(),
    review = %review.id,
    tier = %review.tier,
    anonymous = review.anonymous,
    "review saved"
  );
  Ok(Json(Reply::text(messages.review_added.clone())))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RemoveBody {
  pub actor:   Actor,
  pub subject: Option<String>,
}

/// `POST /reviews/remove`: delete the actor's own review of a subject.
pub async fn remove<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<RemoveBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  state.admit_member(&body.actor)?;
  let messages = &state.bot.messages;

  let Some(subject) = shortcut_arg(body.subject.as_deref()) else {
    let hint = if body.actor.is_admin(&state.bot) {
      &messages.review_remove_format_admin
    } else {
      &messages.review_remove_format
    };
    return Err(ApiError::UserInput(hint.clone()));
  };

  let review = state
    .store
    .get_review_by_author_subject(body.actor.id, &subject)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(messages.review_remove_error.clone()))?;
  state.store.remove_review(review.id).await.map_err(ApiError::store)?;

  info!(actor = %body.actor.id, subject = %subject.as_str(), review = %review.id, "review removed");
  Ok(Json(Reply::text(messages.review_remove_success.clone())))
}

#[derive(Debug, Deserialize)]
pub struct RemoveByIdBody {
  pub actor: Actor,
  /// Raw id argument.
  pub id:    Option<String>,
}

/// `POST /reviews/remove-by-id`: admin removal of any review.
pub async fn remove_by_id<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<RemoveByIdBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  state.admit_member(&body.actor)?;
  state.admit_admin(&body.actor)?;
  let messages = &state.bot.messages;

  let id = body
    .id
    .as_deref()
    .and_then(|raw| raw.trim().parse::<i64>().ok())
    .map(ReviewId)
    .ok_or_else(|| ApiError::UserInput(messages.review_remove_id_format.clone()))?;

  if !state.store.remove_review(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(messages.review_not_found.clone()));
  }

  info!(actor = %body.actor.id, review = %id, "review removed by id");
  Ok(Json(Reply::text(messages.review_remove_success.clone())))
}
