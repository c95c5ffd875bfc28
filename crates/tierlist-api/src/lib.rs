//! JSON command API for the tier-list bot.
//!
//! The chat transport forwards commands and reactions here, already resolved
//! into an [`tierlist_core::access::Actor`], and applies the returned
//! [`reply::Reply`] or [`reply::ReactionReply`]. Every route requires HTTP
//! Basic auth.
//!
//! | Path | Command |
//! |------|---------|
//! | `/reviews/browse` | list a subject's reviews |
//! | `/reviews` | add or replace the actor's review |
//! | `/reviews/remove` | remove the actor's review of a subject |
//! | `/reviews/remove-by-id` | admin removal by review id |
//! | `/reactions` | a reaction placed on a review listing |
//! | `/subjects/info` | subject card |
//! | `/subjects/add`, `/subjects/remove` | admin registry edits |
//! | `/subjects/refresh` | admin catalog scrape |
//! | `/tierboard` | ranked subjects |

pub mod auth;
pub mod error;
pub mod limit;
pub mod reactions;
pub mod reply;
pub mod reviews;
pub mod subjects;
pub mod tierboard;


use std::sync::Arc;

use axum::{Router, routing::post};
use tierlist_core::{
  access::{Actor, Denial},
  config::{BotConfig, fill},
  store::CatalogStore,
};
use tierlist_scrape::{CatalogSource, ProgramSource};

pub use auth::{AuthConfig, Authenticated};
pub use error::ApiError;
pub use limit::CommandLimiter;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState<S, P> {
  pub store:   Arc<S>,
  pub source:  Arc<P>,
  pub bot:     Arc<BotConfig>,
  /// Pages walked by `/subjects/refresh`.
  pub catalog: Arc<Vec<CatalogSource>>,
  pub limiter: Arc<CommandLimiter>,
  pub auth:    Arc<AuthConfig>,
}

impl<S, P> AppState<S, P> {
  pub fn new(
    store: S,
    source: P,
    bot: BotConfig,
    catalog: Vec<CatalogSource>,
    auth: AuthConfig,
  ) -> Self {
    let limiter = CommandLimiter::new(bot.cooldown);
    Self {
      store:   Arc::new(store),
      source:  Arc::new(source),
      bot:     Arc::new(bot),
      catalog: Arc::new(catalog),
      limiter: Arc::new(limiter),
      auth:    Arc::new(auth),
    }
  }

  /// Charge one command against the actor's quota.
  pub(crate) fn throttle(&self, actor: &Actor) -> Result<(), ApiError> {
    if self.limiter.check(actor.id) {
      Ok(())
    } else {
      tracing::debug!(actor = %actor.id, "command rate limited");
      Err(ApiError::RateLimited(self.bot.messages.rate_limited.clone()))
    }
  }

  /// Refuse actors who may not manage reviews.
  pub(crate) fn admit_member(&self, actor: &Actor) -> Result<(), ApiError> {
    let messages = &self.bot.messages;
    let template = match actor.check_member(&self.bot) {
      Ok(()) => return Ok(()),
      Err(Denial::NotOnServer) => &messages.review_not_on_server,
      Err(Denial::Forbidden) => &messages.review_add_denied,
    };
    Err(ApiError::Permission(fill(template, &[("user", &actor.id.to_string())])))
  }

  pub(crate) fn admit_admin(&self, actor: &Actor) -> Result<(), ApiError> {
    if actor.is_admin(&self.bot) {
      return Ok(());
    }
    Err(ApiError::Permission(fill(
      &self.bot.messages.insufficient_rights,
      &[("user", &actor.id.to_string())],
    )))
  }
}

/// Build the command router over `state`.
pub fn router<S, P>(state: AppState<S, P>) -> Router<()>
where
  S: CatalogStore + Clone + 'static,
  P: ProgramSource + Clone + 'static,
{
  Router::new()
    // Reviews
    .route("/reviews", post(reviews::add::<S, P>))
    .route("/reviews/browse", post(reviews::browse::<S, P>))
    .route("/reviews/remove", post(reviews::remove::<S, P>))
    .route("/reviews/remove-by-id", post(reviews::remove_by_id::<S, P>))
    .route("/reactions", post(reactions::handle::<S, P>))
    // Subjects
    .route("/subjects/info", post(subjects::info::<S, P>))
    .route("/subjects/add", post(subjects::add::<S, P>))
    .route("/subjects/remove", post(subjects::remove::<S, P>))
    .route("/subjects/refresh", post(subjects::refresh::<S, P>))
    // Tierboard
    .route("/tierboard", post(tierboard::handle::<S, P>))
    .with_state(state)
}
