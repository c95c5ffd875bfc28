//! Executing reactions placed on review listings.
//!
//! Nothing about the listing is kept server-side: the transport posts the
//! artifact as currently displayed, it is decoded back into a
//! [`BrowseState`], and the planned transition runs against the live store.

use axum::{Json, extract::State};
use serde::Deserialize;
use tierlist_core::{
  access::Actor,
  dispatch::{self, Intent, Reaction, VoteAction},
  embed::Embed,
  render::{self, BrowseState, DecodeError, Page},
  review::Vote,
  store::CatalogStore,
};
use tierlist_scrape::ProgramSource;
use tracing::{debug, info, warn};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  reply::{ArtifactUpdate, ReactionReply},
  reviews::load_card,
};

#[derive(Debug, Deserialize)]
pub struct ReactionBody {
  pub actor:    Actor,
  /// The emoji as the transport reported it.
  pub reaction: String,
  /// The artifact the reaction was placed on.
  pub artifact: Embed,
}

/// `POST /reactions`
pub async fn handle<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<ReactionBody>,
) -> Result<Json<ReactionReply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  let view = match render::decode(&body.artifact) {
    Ok(view) => view,
    Err(DecodeError::Foreign) => {
      return Ok(Json(ReactionReply { update: ArtifactUpdate::Ignore, retract: false }));
    }
    Err(DecodeError::Corrupt(reason)) => {
      warn!(actor = %body.actor.id, %reason, "unreadable review listing replaced");
      return Ok(Json(ReactionReply {
        update:  ArtifactUpdate::Replace { content: state.bot.messages.reviews_page_e.clone() },
        retract: false,
      }));
    }
  };
  // Reactions in direct messages cannot be removed by the bot.
  let retract = !body.actor.direct_message;

  let Ok(reaction) = body.reaction.parse::<Reaction>() else {
    debug!(symbol = %body.reaction, "unknown reaction on review listing");
    return Ok(Json(ReactionReply { update: ArtifactUpdate::Ignore, retract }));
  };

  let update = match dispatch::plan(reaction, &view) {
    Intent::Ignore => {
      debug!(%reaction, page = %view.page, "reaction has no effect");
      ArtifactUpdate::Ignore
    }
    Intent::ShowPage(current) => show_page(&state, view, current).await?,
    Intent::Vote(action) => vote(&state, &body.actor, view, action).await?,
    Intent::ShowTextPage(page) => show_text_page(&state, &body.artifact, view, page).await?,
  };
  Ok(Json(ReactionReply { update, retract }))
}

/// Re-render the listing at review `current`, re-validated against the
/// subject's live review count.
async fn show_page<S, P>(
  state: &AppState<S, P>,
  view: BrowseState,
  current: u32,
) -> Result<ArtifactUpdate, ApiError>
where
  S: CatalogStore,
{
  let listed = state
    .store
    .get_reviews_by_subject(&view.subject)
    .await
    .map_err(ApiError::store)?;
  let Some(review) = listed.at_page(current).cloned() else {
    debug!(subject = %view.subject.as_str(), current, "page no longer exists");
    return Ok(ArtifactUpdate::Ignore);
  };
  let total = u32::try_from(listed.len()).unwrap_or(u32::MAX);

  let card = load_card(&*state.store, review).await?;
  let next = BrowseState::at(view.subject, view.heading, Page { current, total }, Some(&card));
  Ok(ArtifactUpdate::Edit {
    embed:    render::encode(&next, Some(&card), &state.bot.messages),
    controls: dispatch::controls(&next),
  })
}

/// Apply a vote on the displayed review and re-render it with fresh tallies.
async fn vote<S, P>(
  state: &AppState<S, P>,
  actor: &Actor,
  view: BrowseState,
  action: VoteAction,
) -> Result<ArtifactUpdate, ApiError>
where
  S: CatalogStore,
{
  let Some(review_id) = view.review_id else {
    return Ok(ArtifactUpdate::Ignore);
  };
  let store = &*state.store;
  let Some(review) = store.get_review(review_id).await.map_err(ApiError::store)? else {
    debug!(review = %review_id, "vote on a removed review");
    return Ok(ArtifactUpdate::Ignore);
  };
  if review.author == actor.id {
    debug!(review = %review_id, "own review, vote ignored");
    return Ok(ArtifactUpdate::Ignore);
  }

  match action {
    VoteAction::Cast(value) => {
      let previous = store
        .get_vote_by_author(review_id, actor.id)
        .await
        .map_err(ApiError::store)?;
      if previous.is_some_and(|v| v.value == value) {
        debug!(review = %review_id, "repeated vote");
        return Ok(ArtifactUpdate::Ignore);
      }
      store
        .add_vote(Vote { review_id, voter: actor.id, value })
        .await
        .map_err(ApiError::store)?;
      info!(actor = %actor.id, review = %review_id, up = value.is_up(), "vote cast");
    }
    VoteAction::Withdraw => {
      let removed = store
        .remove_vote(review_id, actor.id)
        .await
        .map_err(ApiError::store)?;
      info!(actor = %actor.id, review = %review_id, removed, "vote withdrawn");
    }
  }

  let card = load_card(store, review).await?;
  Ok(ArtifactUpdate::Edit {
    embed:    render::encode(&view, Some(&card), &state.bot.messages),
    controls: dispatch::controls(&view),
  })
}

/// Swap the text slots of `artifact` to sub-page `page` of the review text.
///
/// When the review text no longer splits into `page.total` chunks the whole
/// review is re-rendered on its first text sub-page instead.
async fn show_text_page<S, P>(
  state: &AppState<S, P>,
  artifact: &Embed,
  view: BrowseState,
  page: Page,
) -> Result<ArtifactUpdate, ApiError>
where
  S: CatalogStore,
{
  let Some(review_id) = view.review_id else {
    return Ok(ArtifactUpdate::Ignore);
  };
  let store = &*state.store;
  let Some(review) = store.get_review(review_id).await.map_err(ApiError::store)? else {
    debug!(review = %review_id, "text page of a removed review");
    return Ok(ArtifactUpdate::Ignore);
  };

  if let Some(text) = review.text.as_deref()
    && render::chunk_count(text) == page.total
  {
    let embed = render::with_text_page(artifact, text, page);
    let next = BrowseState { text_page: Some(page), ..view };
    return Ok(ArtifactUpdate::Edit { embed, controls: dispatch::controls(&next) });
  }

  debug!(review = %review_id, stale = %page, "review text changed since render");
  let card = load_card(store, review).await?;
  let next = BrowseState::at(view.subject, view.heading, view.page, Some(&card));
  Ok(ArtifactUpdate::Edit {
    embed:    render::encode(&next, Some(&card), &state.bot.messages),
    controls: dispatch::controls(&next),
  })
}
