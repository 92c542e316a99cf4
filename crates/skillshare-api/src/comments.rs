//! Handlers for comments.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/posts/{id}/comments` | Newest first, paginated |
//! | `POST`   | `/posts/{id}/comments` | Body: `{"content":"…"}`; notifies the author |
//! | `PUT`    | `/comments/{id}` | Comment author only |
//! | `DELETE` | `/comments/{id}` | Comment author only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use skillshare_core::{
  notification::NotificationKind,
  page::Page,
  post::Comment,
  store::{EngagementStore, PlatformStore},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Caller,
  error::ApiError,
  notifications::notify,
  params::PageParams,
  posts::existing_post,
  views::{CommentView, comment_view, comment_views},
};

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

impl CommentBody {
  fn content(self) -> Result<String, ApiError> {
    let content = self.content.trim();
    if content.is_empty() {
      return Err(ApiError::BadRequest("comment must not be empty".into()));
    }
    Ok(content.to_owned())
  }
}

/// The comment `id`, provided the caller wrote it.
async fn authored<S: EngagementStore>(
  store: &S,
  caller: Caller,
  id: Uuid,
) -> Result<Comment, ApiError> {
  let comment = store
    .get_comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  if comment.account_id != caller.account_id {
    return Err(ApiError::Forbidden("only the author may change this comment".into()));
  }
  Ok(comment)
}

/// `GET /posts/{id}/comments[?limit=&offset=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(post_id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<CommentView>>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  existing_post(store, post_id).await?;
  let Page { items, total, limit, offset } = store
    .list_comments(post_id, params.page())
    .await
    .map_err(ApiError::store)?;
  let items = comment_views(store, items).await?;
  Ok(Json(Page { items, total, limit, offset }))
}

/// `POST /posts/{id}/comments`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(post_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let content = body.content()?;
  let post = existing_post(store, post_id).await?;

  let comment = store
    .add_comment(post_id, caller.account_id, content)
    .await
    .map_err(ApiError::store)?;
  notify(store, NotificationKind::Comment, caller.account_id, &post).await?;

  Ok((StatusCode::CREATED, Json(comment_view(store, comment).await?)))
}

/// `PUT /comments/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<Json<CommentView>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let content = body.content()?;
  authored(store, caller, id).await?;

  let comment = store
    .update_comment(id, content)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(comment_view(store, comment).await?))
}

/// `DELETE /comments/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  authored(store, caller, id).await?;
  store.delete_comment(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
