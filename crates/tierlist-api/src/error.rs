//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every user-facing variant carries the message the transport should show.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or malformed command arguments.
  #[error("{0}")]
  UserInput(String),

  /// Membership, role, or admin check failed.
  #[error("{0}")]
  Permission(String),

  #[error("{0}")]
  NotFound(String),

  /// The catalog source failed during a refresh.
  #[error("{0}")]
  Upstream(String),

  #[error("{0}")]
  RateLimited(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::UserInput(_) => StatusCode::BAD_REQUEST,
      ApiError::Permission(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
      ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"tierlist\""),
      );
    }
    res
  }
}
