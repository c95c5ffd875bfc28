//! `POST /tierboard`: subjects ranked by mean tier.

use axum::{Json, extract::State};
use serde::Deserialize;
use tierlist_core::{
  access::Actor,
  cards,
  store::CatalogStore,
  tierboard::{self, ResolveError, Resolved},
};
use tierlist_scrape::ProgramSource;
use tracing::info;

use crate::{AppState, auth::Authenticated, error::ApiError, reply::Reply};

/// Positional arguments as typed: `[type] [semester] [year]`.
#[derive(Debug, Deserialize)]
pub struct TierboardBody {
  pub actor:    Actor,
  pub kind:     Option<String>,
  pub semester: Option<String>,
  pub year:     Option<String>,
}

pub async fn handle<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<TierboardBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  let messages = &state.bot.messages;

  let resolved = tierboard::resolve(
    body.kind.as_deref(),
    body.semester.as_deref(),
    body.year.as_deref(),
    &body.actor.roles,
  );
  let query = match resolved {
    Ok(Resolved::Query(query)) => query,
    Ok(Resolved::Help) => return Ok(Json(Reply::text(messages.tierboard_help.clone()))),
    Err(ResolveError::MissingYear) => {
      return Err(ApiError::UserInput(messages.tierboard_missing_year.clone()));
    }
    Err(ResolveError::BadSemester(_)) => {
      return Err(ApiError::UserInput(messages.tierboard_help.clone()));
    }
  };

  let board = state.store.tierboard(&query).await.map_err(ApiError::store)?;
  info!(
    actor = %body.actor.id,
    kind = %query.kind,
    semester = %query.semester,
    subjects = board.len(),
    "tierboard"
  );
  let embed = cards::tierboard(&board, &query, &body.actor.name);
  Ok(Json(Reply::card(embed, Vec::new())))
}
