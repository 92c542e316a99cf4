//! Handlers for `/posts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/posts` | Newest first, paginated |
//! | `POST`   | `/posts` | Body: `{"caption", "media"?, "tagged"?}`; tagged accounts must exist |
//! | `GET`    | `/posts/{id}` | 404 if not found |
//! | `PUT`    | `/posts/{id}` | Author only |
//! | `DELETE` | `/posts/{id}` | Author only; removes likes, comments, reposts, notifications |
//! | `POST`   | `/posts/{id}/repost` | Idempotent; notifies the author the first time |
//! | `DELETE` | `/posts/{id}/repost` | |
//! | `GET`    | `/users/{id}/posts` | One author, newest first |

use std::collections::HashSet;

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
  post::{MediaItem, NewPost, Post, PostUpdate},
  store::{AccountStore, PlatformStore, PostStore},
};
use uuid::Uuid;

use crate::{
  AppState,
  accounts::live_account,
  auth::Caller,
  error::ApiError,
  notifications::notify,
  params::PageParams,
  views::{PostView, post_view, post_views},
};

pub(crate) async fn existing_post<S: PostStore>(store: &S, id: Uuid) -> Result<Post, ApiError> {
  store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))
}

fn ensure_author(post: &Post, caller: Caller) -> Result<(), ApiError> {
  if post.author_id == caller.account_id {
    Ok(())
  } else {
    Err(ApiError::Forbidden("only the author may change this post".into()))
  }
}

#[derive(Debug, Deserialize)]
pub struct PostBody {
  #[serde(default)]
  pub caption: String,
  #[serde(default)]
  pub media:   Vec<MediaItem>,
  #[serde(default)]
  pub tagged:  Vec<Uuid>,
}

impl PostBody {
  /// Trim, reject empty posts, and make sure every tagged account is live.
  /// Duplicate tags collapse to one.
  async fn validate<S: AccountStore>(self, store: &S) -> Result<PostUpdate, ApiError> {
    let caption = self.caption.trim().to_owned();
    if caption.is_empty() && self.media.is_empty() {
      return Err(ApiError::BadRequest("a post needs a caption or media".into()));
    }
    if self.media.iter().any(|m| m.url.trim().is_empty()) {
      return Err(ApiError::BadRequest("media items need a url".into()));
    }

    let mut seen = HashSet::new();
    let tagged: Vec<Uuid> = self.tagged.into_iter().filter(|id| seen.insert(*id)).collect();
    if !tagged.is_empty() {
      let found = store.get_accounts(&tagged).await.map_err(ApiError::store)?;
      let live: HashSet<Uuid> = found
        .iter()
        .filter(|a| !a.deleted)
        .map(|a| a.account_id)
        .collect();
      if let Some(missing) = tagged.iter().find(|id| !live.contains(id)) {
        return Err(ApiError::BadRequest(format!("tagged user {missing} not found")));
      }
    }

    Ok(PostUpdate { caption, media: self.media, tagged })
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /posts[?limit=&offset=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<PostView>>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let page = store
    .list_posts(params.page())
    .await
    .map_err(ApiError::store)?;
  let Page { items, total, limit, offset } = page;
  let items = post_views(store, items, caller.account_id).await?;
  Ok(Json(Page { items, total, limit, offset }))
}

/// `GET /users/{id}/posts[?limit=&offset=]`
pub async fn by_author<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(author_id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<PostView>>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  live_account(store, author_id).await?;
  let page = store
    .list_posts_by_author(author_id, params.page())
    .await
    .map_err(ApiError::store)?;
  let Page { items, total, limit, offset } = page;
  let items = post_views(store, items, caller.account_id).await?;
  Ok(Json(Page { items, total, limit, offset }))
}

// ─── Create / read / update / delete ──────────────────────────────────────────

/// `POST /posts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<PostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let PostUpdate { caption, media, tagged } = body.validate(store).await?;

  let post = store
    .create_post(NewPost { author_id: caller.account_id, caption, media, tagged })
    .await
    .map_err(ApiError::store)?;
  let view = post_view(store, post, caller.account_id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /posts/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<PostView>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let post = existing_post(store, id).await?;
  Ok(Json(post_view(store, post, caller.account_id).await?))
}

/// `PUT /posts/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<PostBody>,
) -> Result<Json<PostView>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  ensure_author(&existing_post(store, id).await?, caller)?;
  let update = body.validate(store).await?;

  let post = store
    .update_post(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))?;
  Ok(Json(post_view(store, post, caller.account_id).await?))
}

/// `DELETE /posts/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  ensure_author(&existing_post(store, id).await?, caller)?;
  store.delete_post(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reposts ──────────────────────────────────────────────────────────────────

/// `POST /posts/{id}/repost`
pub async fn repost<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<PostView>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let post = existing_post(store, id).await?;

  let added = store
    .add_repost(id, caller.account_id)
    .await
    .map_err(ApiError::store)?;
  if added {
    notify(store, NotificationKind::Share, caller.account_id, &post).await?;
  }
  Ok(Json(post_view(store, post, caller.account_id).await?))
}

/// `DELETE /posts/{id}/repost`
pub async fn unrepost<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  existing_post(store, id).await?;
  store
    .remove_repost(id, caller.account_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
