//! Handlers for `/progress` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/progress` | `?account_id=<id>`, defaults to the caller |
//! | `POST`   | `/progress` | Body: `{"title", "description", "plan_id"?, "media_url"?}` |
//! | `DELETE` | `/progress/{id}` | Owner only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use skillshare_core::{
  learning::{NewProgressUpdate, ProgressUpdate},
  page::Page,
  store::{LearningStore as _, PlatformStore},
};
use uuid::Uuid;

use crate::{
  AppState, accounts::live_account, auth::Caller, error::ApiError, params::ProgressParams,
};

/// `GET /progress[?account_id=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<ProgressParams>,
) -> Result<Json<Page<ProgressUpdate>>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let account_id = params.account_id.unwrap_or(caller.account_id);
  if account_id != caller.account_id {
    live_account(store, account_id).await?;
  }
  let page = store
    .list_progress_updates(account_id, params.page())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub plan_id:     Option<Uuid>,
  pub media_url:   Option<String>,
}

/// `POST /progress`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let title = body.title.trim().to_owned();
  if title.is_empty() {
    return Err(ApiError::BadRequest("progress title must not be empty".into()));
  }
  if let Some(plan_id) = body.plan_id {
    store
      .get_plan(plan_id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::BadRequest(format!("plan {plan_id} not found")))?;
  }

  let update = store
    .add_progress_update(NewProgressUpdate {
      account_id:  caller.account_id,
      plan_id:     body.plan_id,
      title,
      description: body.description,
      media_url:   body.media_url,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(update)))
}

/// `DELETE /progress/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let update = store
    .get_progress_update(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("progress update {id} not found")))?;
  if update.account_id != caller.account_id {
    return Err(ApiError::Forbidden("only the owner may delete this update".into()));
  }
  store
    .delete_progress_update(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
