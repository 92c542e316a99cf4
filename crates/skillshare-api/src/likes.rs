//! Handlers for `/posts/{id}/like`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/posts/{id}/like` | Toggle; notifies the author when a like is added |
//! | `GET`  | `/posts/{id}/like` | The caller's like state and the total |

use axum::{
  Json,
  extract::{Path, State},
};
use skillshare_core::{
  notification::NotificationKind,
  store::{EngagementStore as _, PlatformStore},
};
use uuid::Uuid;

use crate::{
  AppState, auth::Caller, error::ApiError, notifications::notify, posts::existing_post,
  views::LikeStatus,
};

/// `POST /posts/{id}/like`
pub async fn toggle<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<LikeStatus>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let post = existing_post(store, id).await?;

  let existing = store
    .find_like(id, caller.account_id)
    .await
    .map_err(ApiError::store)?;
  let liked = if existing.is_some() {
    store
      .remove_like(id, caller.account_id)
      .await
      .map_err(ApiError::store)?;
    false
  } else {
    // A concurrent toggle may have liked it first; only the writer notifies.
    let added = store
      .add_like(id, caller.account_id)
      .await
      .map_err(ApiError::store)?;
    if added.is_some() {
      notify(store, NotificationKind::Like, caller.account_id, &post).await?;
    }
    true
  };

  let like_count = store.count_likes(id).await.map_err(ApiError::store)?;
  Ok(Json(LikeStatus { liked, like_count }))
}

/// `GET /posts/{id}/like`
pub async fn status<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<LikeStatus>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  existing_post(store, id).await?;

  let liked = store
    .find_like(id, caller.account_id)
    .await
    .map_err(ApiError::store)?
    .is_some();
  let like_count = store.count_likes(id).await.map_err(ApiError::store)?;
  Ok(Json(LikeStatus { liked, like_count }))
}
