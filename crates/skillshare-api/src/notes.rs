//! Handlers for `/notes` endpoints. Like goals, notes are private and another
//! owner's note is reported as missing.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/notes` | The caller's notes, newest `timestamp` first |
//! | `POST`   | `/notes` | Body: `{"title", "description"?, "timestamp"?}` |
//! | `GET`    | `/notes/{id}` | |
//! | `PUT`    | `/notes/{id}` | Fields left out keep their value |
//! | `DELETE` | `/notes/{id}` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use skillshare_core::{
  note::{NewNote, Note, NoteUpdate},
  store::{NoteStore, PlatformStore},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

async fn own_note<S: NoteStore>(store: &S, caller: Caller, id: Uuid) -> Result<Note, ApiError> {
  store
    .get_note(id)
    .await
    .map_err(ApiError::store)?
    .filter(|n| n.owner_id == caller.account_id)
    .ok_or_else(|| ApiError::NotFound(format!("note {id} not found")))
}

fn title(text: &str) -> Result<String, ApiError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(ApiError::BadRequest("note title must not be empty".into()));
  }
  Ok(text.to_owned())
}

/// `GET /notes`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Note>>, ApiError>
where
  S: PlatformStore,
{
  let notes = state
    .store
    .list_notes(caller.account_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(notes))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub timestamp:   Option<DateTime<Utc>>,
}

/// `POST /notes`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let note = state
    .store
    .create_note(NewNote {
      owner_id:    caller.account_id,
      title:       title(&body.title)?,
      description: body.description,
      timestamp:   body.timestamp.unwrap_or_else(Utc::now),
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(note)))
}

/// `GET /notes/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError>
where
  S: PlatformStore,
{
  Ok(Json(own_note(&*state.store, caller, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub timestamp:   Option<DateTime<Utc>>,
}

/// `PUT /notes/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Note>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let current = own_note(store, caller, id).await?;

  let update = NoteUpdate {
    title:       match body.title.as_deref() {
      Some(text) => title(text)?,
      None => current.title,
    },
    description: body.description.unwrap_or(current.description),
    timestamp:   body.timestamp.unwrap_or(current.timestamp),
  };

  let note = store
    .update_note(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("note {id} not found")))?;
  Ok(Json(note))
}

/// `DELETE /notes/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  own_note(store, caller, id).await?;
  store.delete_note(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
