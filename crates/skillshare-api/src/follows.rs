//! Handlers for the follow graph under `/users/{id}`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/users/{id}/followers` | Paginated account summaries |
//! | `GET`    | `/users/{id}/following` | Paginated account summaries |
//! | `GET`    | `/users/{id}/follow-counts` | `{"followers", "following"}` |
//! | `POST`   | `/users/{id}/follow` | Caller follows `id`; 409 if already, 400 on self |
//! | `DELETE` | `/users/{id}/follow` | 404 if not following |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use skillshare_core::{
  account::AccountSummary,
  page::Page,
  social::FollowCounts,
  store::{PlatformStore, SocialStore as _},
};
use uuid::Uuid;

use crate::{AppState, accounts::live_account, auth::Caller, error::ApiError, params::PageParams};

/// `GET /users/{id}/followers`
pub async fn followers<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<AccountSummary>>, ApiError>
where
  S: PlatformStore,
{
  live_account(&*state.store, id).await?;
  let page = state
    .store
    .list_followers(id, params.page())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page.map(|a| AccountSummary::from(&a))))
}

/// `GET /users/{id}/following`
pub async fn following<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<AccountSummary>>, ApiError>
where
  S: PlatformStore,
{
  live_account(&*state.store, id).await?;
  let page = state
    .store
    .list_following(id, params.page())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page.map(|a| AccountSummary::from(&a))))
}

/// `GET /users/{id}/follow-counts`
pub async fn counts<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<FollowCounts>, ApiError>
where
  S: PlatformStore,
{
  live_account(&*state.store, id).await?;
  let counts = state.store.follow_counts(id).await.map_err(ApiError::store)?;
  Ok(Json(counts))
}

/// `POST /users/{id}/follow`
pub async fn follow<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  if caller.account_id == id {
    return Err(ApiError::BadRequest("you cannot follow yourself".into()));
  }
  let store = &*state.store;
  live_account(store, id).await?;

  let follow = store
    .follow(caller.account_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict(format!("already following user {id}")))?;
  Ok((StatusCode::CREATED, Json(follow)))
}

/// `DELETE /users/{id}/follow`
pub async fn unfollow<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let removed = state
    .store
    .unfollow(caller.account_id, id)
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(format!("not following user {id}")));
  }
  Ok(StatusCode::NO_CONTENT)
}
