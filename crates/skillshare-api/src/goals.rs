//! Handlers for `/goals` endpoints. Goals are private: another owner's goal
//! is reported as missing rather than forbidden.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/goals` | The caller's goals, oldest first |
//! | `POST`   | `/goals` | Body: `{"description", "status"?, "target_date"?}` |
//! | `GET`    | `/goals/{id}` | |
//! | `PUT`    | `/goals/{id}` | Fields left out keep their value |
//! | `DELETE` | `/goals/{id}` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use skillshare_core::{
  goal::{Goal, GoalStatus, GoalUpdate, NewGoal},
  store::{GoalStore, PlatformStore},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

async fn own_goal<S: GoalStore>(store: &S, caller: Caller, id: Uuid) -> Result<Goal, ApiError> {
  store
    .get_goal(id)
    .await
    .map_err(ApiError::store)?
    .filter(|g| g.owner_id == caller.account_id)
    .ok_or_else(|| ApiError::NotFound(format!("goal {id} not found")))
}

fn description(text: &str) -> Result<String, ApiError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(ApiError::BadRequest("goal description must not be empty".into()));
  }
  Ok(text.to_owned())
}

/// `GET /goals`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Goal>>, ApiError>
where
  S: PlatformStore,
{
  let goals = state
    .store
    .list_goals(caller.account_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(goals))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub description: String,
  #[serde(default)]
  pub status:      GoalStatus,
  pub target_date: Option<NaiveDate>,
}

/// `POST /goals`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let goal = state
    .store
    .create_goal(NewGoal {
      owner_id:    caller.account_id,
      description: description(&body.description)?,
      status:      body.status,
      target_date: body.target_date,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(goal)))
}

/// `GET /goals/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Goal>, ApiError>
where
  S: PlatformStore,
{
  Ok(Json(own_goal(&*state.store, caller, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub description: Option<String>,
  pub status:      Option<GoalStatus>,
  pub target_date: Option<NaiveDate>,
}

/// `PUT /goals/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Goal>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let current = own_goal(store, caller, id).await?;

  let update = GoalUpdate {
    description: match body.description.as_deref() {
      Some(text) => description(text)?,
      None => current.description,
    },
    status:      body.status.unwrap_or(current.status),
    target_date: body.target_date.or(current.target_date),
  };

  let goal = store
    .update_goal(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("goal {id} not found")))?;
  Ok(Json(goal))
}

/// `DELETE /goals/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  own_goal(store, caller, id).await?;
  store.delete_goal(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
