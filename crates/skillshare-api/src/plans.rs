//! Handlers for `/plans` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/plans` | `?templates=true`, `?owner=<id>`, paginated |
//! | `POST`   | `/plans` | Body: `{"title", "subtopics", "is_template"?, "duration_days"?}` |
//! | `GET`    | `/plans/{id}` | Any authenticated caller |
//! | `DELETE` | `/plans/{id}` | Owner only |
//! | `PUT`    | `/plans/{id}/subtopics/{index}` | Owner only; body: `{"completed": bool}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use skillshare_core::{
  learning::{LearningPlan, NewLearningPlan, Subtopic},
  page::Page,
  store::{LearningStore, PlatformStore},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError, params::PlanParams, views::PlanView};

pub(crate) async fn existing_plan<S: LearningStore>(
  store: &S,
  id: Uuid,
) -> Result<LearningPlan, ApiError> {
  store
    .get_plan(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("plan {id} not found")))
}

fn ensure_owner(plan: &LearningPlan, caller: Caller) -> Result<(), ApiError> {
  if plan.owner_id == caller.account_id {
    Ok(())
  } else {
    Err(ApiError::Forbidden("only the owner may change this plan".into()))
  }
}

/// `GET /plans[?templates=true][&owner=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Query(params): Query<PlanParams>,
) -> Result<Json<Page<PlanView>>, ApiError>
where
  S: PlatformStore,
{
  let page = state
    .store
    .list_plans(params.query(), params.page())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page.map(PlanView::from)))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:         String,
  #[serde(default)]
  pub is_template:   bool,
  pub duration_days: Option<u32>,
  #[serde(default)]
  pub subtopics:     Vec<Subtopic>,
}

/// `POST /plans`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let title = body.title.trim().to_owned();
  if title.is_empty() {
    return Err(ApiError::BadRequest("plan title must not be empty".into()));
  }
  if body.subtopics.iter().any(|t| t.name.trim().is_empty()) {
    return Err(ApiError::BadRequest("every subtopic needs a name".into()));
  }

  let input = NewLearningPlan {
    owner_id:      caller.account_id,
    title,
    is_template:   body.is_template,
    duration_days: body.duration_days,
    subtopics:     body.subtopics,
  };
  input
    .resolved_duration()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let plan = state
    .store
    .create_plan(input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(PlanView::from(plan))))
}

/// `GET /plans/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<PlanView>, ApiError>
where
  S: PlatformStore,
{
  let plan = existing_plan(&*state.store, id).await?;
  Ok(Json(PlanView::from(plan)))
}

/// `DELETE /plans/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  ensure_owner(&existing_plan(store, id).await?, caller)?;
  store.delete_plan(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SubtopicBody {
  pub completed: bool,
}

/// `PUT /plans/{id}/subtopics/{index}`
pub async fn set_subtopic<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path((id, index)): Path<(Uuid, usize)>,
  Json(body): Json<SubtopicBody>,
) -> Result<Json<PlanView>, ApiError>
where
  S: PlatformStore,
{
  let store = &*state.store;
  let plan = existing_plan(store, id).await?;
  ensure_owner(&plan, caller)?;
  if index >= plan.subtopics.len() {
    return Err(ApiError::BadRequest(format!(
      "subtopic index {index} out of range (plan has {})",
      plan.subtopics.len()
    )));
  }

  let plan = store
    .set_subtopic_completed(id, index, body.completed)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("plan {id} not found")))?;
  Ok(Json(PlanView::from(plan)))
}
