//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Shown to an account that is inside its deactivation window. Carries no
/// dates, so nothing about the window leaks to the client.
pub const ACCOUNT_BLOCKED_MESSAGE: &str =
  "Your account is temporarily deactivated. Please contact support.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  /// Unknown username and wrong password are deliberately the same error.
  #[error("invalid username or password")]
  InvalidCredentials,

  #[error("missing or invalid bearer token")]
  Unauthorized,

  #[error("{}", ACCOUNT_BLOCKED_MESSAGE)]
  AccountBlocked,

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Box a backend error. Handlers use it as `.map_err(ApiError::store)`.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Forbidden(_) | ApiError::AccountBlocked => StatusCode::FORBIDDEN,
      ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match self {
      ApiError::NotFound(m)
      | ApiError::BadRequest(m)
      | ApiError::Conflict(m)
      | ApiError::Forbidden(m) => m,
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        "internal server error".to_owned()
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal failure");
        "internal server error".to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
