//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use skillshare_core::store::{AccountStore as _, PlatformStore};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The authenticated account behind the current request.
///
/// The token must verify and name an account that still exists and is not
/// soft-deleted. The deactivation window is not consulted; it gates login
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
  pub account_id: Uuid,
}

/// The raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: PlatformStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let account_id = state.tokens.verify(token)?;

    let live = state
      .store
      .get_account(account_id)
      .await
      .map_err(ApiError::store)?
      .is_some_and(|a| !a.deleted);
    if !live {
      tracing::debug!(%account_id, "token for a missing or deleted account");
      return Err(ApiError::Unauthorized);
    }
    Ok(Caller { account_id })
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn bearer_token_requires_scheme() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
    assert_eq!(bearer_token(&headers), Some("abc.def"));
  }
}
