//! Handlers for subject commands: the info card, registry edits, and the
//! catalog refresh.

use axum::{Json, extract::State};
use serde::Deserialize;
use tierlist_core::{
  access::Actor,
  cards,
  config::fill,
  store::CatalogStore,
  subject::Shortcut,
};
use tierlist_scrape::ProgramSource;
use tracing::{info, warn};

use crate::{AppState, auth::Authenticated, error::ApiError, reply::Reply, reviews::shortcut_arg};

/// Command name substituted into the shortcut hint.
const INFO_COMMAND: &str = "subject";

// ─── Info ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InfoBody {
  pub actor:   Actor,
  pub subject: Option<String>,
}

/// `POST /subjects/info`
pub async fn info<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<InfoBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  let messages = &state.bot.messages;
  let subject = shortcut_arg(body.subject.as_deref()).ok_or_else(|| {
    ApiError::UserInput(fill(&messages.shortcut_format, &[("command", INFO_COMMAND)]))
  })?;

  let details = state
    .store
    .get_subject_details(&subject)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(messages.review_wrong_subject.clone()))?;

  info!(actor = %body.actor.id, subject = %subject.as_str(), "subject info");
  Ok(Json(Reply::card(cards::subject_info(&details, &body.actor.name), Vec::new())))
}

// ─── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegistryBody {
  pub actor:    Actor,
  #[serde(default)]
  pub subjects: Vec<String>,
}

fn shortcuts(raw: &[String], format_hint: &str) -> Result<Vec<Shortcut>, ApiError> {
  let parsed: Vec<Shortcut> = raw.iter().filter_map(|s| Shortcut::new(s).ok()).collect();
  if parsed.is_empty() {
    return Err(ApiError::UserInput(format_hint.to_owned()));
  }
  Ok(parsed)
}

fn joined(list: &[Shortcut]) -> String {
  list.iter().map(Shortcut::as_str).collect::<Vec<_>>().join(", ")
}

/// `POST /subjects/add`: register bare shortcuts. Existing ones are skipped.
pub async fn add<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<RegistryBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  state.admit_admin(&body.actor)?;
  let messages = &state.bot.messages;

  let mut added = Vec::new();
  for shortcut in shortcuts(&body.subjects, &messages.subject_format)? {
    if state.store.add_subject(&shortcut).await.map_err(ApiError::store)? {
      added.push(shortcut);
    }
  }

  let list = joined(&added);
  info!(actor = %body.actor.id, subjects = %list, "subjects added");
  Ok(Json(Reply::text(fill(&messages.subjects_added, &[("subjects", &list)]))))
}

/// `POST /subjects/remove`: drop shortcuts with everything attached to them.
pub async fn remove<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<RegistryBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  state.admit_admin(&body.actor)?;
  let messages = &state.bot.messages;

  let mut removed = Vec::new();
  for shortcut in shortcuts(&body.subjects, &messages.subject_format)? {
    if state.store.remove_subject(&shortcut).await.map_err(ApiError::store)? {
      removed.push(shortcut);
    }
  }

  let list = joined(&removed);
  info!(actor = %body.actor.id, subjects = %list, "subjects removed");
  Ok(Json(Reply::text(fill(&messages.subjects_removed, &[("subjects", &list)]))))
}

// ─── Refresh ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub actor: Actor,
}

/// `POST /subjects/refresh`: scrape every configured programme page and
/// merge the result. Responds once the whole walk has finished.
pub async fn refresh<S, P>(
  State(state): State<AppState<S, P>>,
  _auth: Authenticated,
  Json(body): Json<RefreshBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  state.throttle(&body.actor)?;
  state.admit_admin(&body.actor)?;
  let messages = &state.bot.messages;

  info!(actor = %body.actor.id, pages = state.catalog.len(), "catalog refresh started");
  match tierlist_scrape::refresh(&*state.store, &*state.source, &state.catalog).await {
    Ok(report) => {
      info!(
        pages = report.pages,
        subjects = report.subjects,
        changed = report.changed,
        "catalog refresh finished"
      );
      Ok(Json(Reply::text(messages.subject_update_success.clone())))
    }
    Err(e) => {
      warn!(error = %e, "catalog refresh aborted");
      Err(ApiError::Upstream(messages.subject_update_error.clone()))
    }
  }
}
