//! Handlers for `/users` endpoints and `/auth/me`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/users/register` | 201; 409 on a taken username or email |
//! | `GET`    | `/users` | Live accounts, paginated |
//! | `GET`    | `/users/{id}` | 404 if absent or deleted |
//! | `PUT`    | `/users/{id}` | Self only; fields left out keep their value |
//! | `DELETE` | `/users/{id}` | Self only; soft delete |
//! | `POST`   | `/users/{id}/deactivate` | Self only; `{"start"?, "end"?}` |
//! | `POST`   | `/users/{id}/reactivate` | Self only |
//! | `GET`    | `/auth/me` | The caller's own profile |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use skillshare_core::{
  account::{Account, NewAccount, Profile, ProfileUpdate},
  deactivation::Deactivation,
  page::Page,
  store::{AccountStore, PlatformStore},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{Caller, password::hash_password},
  error::ApiError,
  params::PageParams,
  views::ProfileView,
};

const MIN_PASSWORD_LEN: usize = 8;

/// The live account `id`; a soft-deleted one is reported as missing.
pub(crate) async fn live_account<S: AccountStore>(store: &S, id: Uuid) -> Result<Account, ApiError> {
  store
    .get_account(id)
    .await
    .map_err(ApiError::store)?
    .filter(|a| !a.deleted)
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))
}

fn ensure_self(caller: Caller, id: Uuid) -> Result<(), ApiError> {
  if caller.account_id == id {
    Ok(())
  } else {
    Err(ApiError::Forbidden("you may only change your own account".into()))
  }
}

fn check_password(password: &str) -> Result<(), ApiError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:          String,
  pub email:             String,
  pub password:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub bio:               Option<String>,
  pub profile_image_url: Option<String>,
  pub contact_number:    Option<String>,
  pub gender:            Option<String>,
  pub address:           Option<String>,
  pub birthday:          Option<NaiveDate>,
  #[serde(default = "default_public")]
  pub is_public:         bool,
}

fn default_public() -> bool { true }

/// `POST /users/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let username = body.username.trim().to_owned();
  let email = body.email.trim().to_owned();
  if username.is_empty() {
    return Err(ApiError::BadRequest("username must not be empty".into()));
  }
  if !email.contains('@') {
    return Err(ApiError::BadRequest("email address is not valid".into()));
  }
  check_password(&body.password)?;

  let store = &*state.store;
  if store
    .find_account_by_username(&username)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!("username {username:?} is already taken")));
  }
  if store
    .find_account_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict("email address is already registered".into()));
  }

  let account = store
    .create_account(NewAccount {
      username,
      email,
      password_hash: Some(hash_password(&body.password)?),
      profile: Profile {
        first_name:        body.first_name,
        last_name:         body.last_name,
        bio:               body.bio,
        profile_image_url: body.profile_image_url,
        contact_number:    body.contact_number,
        gender:            body.gender,
        address:           body.address,
        birthday:          body.birthday,
      },
      is_public: body.is_public,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(account_id = %account.account_id, "account registered");
  Ok((StatusCode::CREATED, Json(ProfileView::from(&account))))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<ProfileView>, ApiError>
where
  S: PlatformStore,
{
  let account = live_account(&*state.store, caller.account_id).await?;
  Ok(Json(ProfileView::from(&account)))
}

/// `GET /users[?limit=&offset=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<ProfileView>>, ApiError>
where
  S: PlatformStore,
{
  let page = state
    .store
    .list_accounts(params.page())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page.map(|a| ProfileView::from(&a))))
}

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: PlatformStore,
{
  let account = live_account(&*state.store, id).await?;
  Ok(Json(ProfileView::from(&account)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub first_name:        Option<String>,
  pub last_name:         Option<String>,
  pub bio:               Option<String>,
  pub profile_image_url: Option<String>,
  pub contact_number:    Option<String>,
  pub gender:            Option<String>,
  pub address:           Option<String>,
  pub birthday:          Option<NaiveDate>,
  pub is_public:         Option<bool>,
  pub password:          Option<String>,
}

impl UpdateBody {
  fn apply(self, current: &Account) -> Result<ProfileUpdate, ApiError> {
    let password_hash = match self.password.as_deref() {
      Some(pw) => {
        check_password(pw)?;
        Some(hash_password(pw)?)
      }
      None => None,
    };
    let p = current.profile.clone();
    Ok(ProfileUpdate {
      profile: Profile {
        first_name:        self.first_name.unwrap_or(p.first_name),
        last_name:         self.last_name.unwrap_or(p.last_name),
        bio:               self.bio.or(p.bio),
        profile_image_url: self.profile_image_url.or(p.profile_image_url),
        contact_number:    self.contact_number.or(p.contact_number),
        gender:            self.gender.or(p.gender),
        address:           self.address.or(p.address),
        birthday:          self.birthday.or(p.birthday),
      },
      is_public: self.is_public.unwrap_or(current.is_public),
      password_hash,
    })
  }
}

/// `PUT /users/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: PlatformStore,
{
  ensure_self(caller, id)?;
  let current = live_account(&*state.store, id).await?;
  let update = body.apply(&current)?;

  let account = state
    .store
    .update_profile(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(ProfileView::from(&account)))
}

/// `DELETE /users/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  ensure_self(caller, id)?;
  let deleted = state.store.mark_deleted(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(format!("user {id} not found")));
  }
  tracing::info!(account_id = %id, "account soft-deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Deactivation ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DeactivateBody {
  /// Defaults to the time of the request.
  pub start: Option<DateTime<Utc>>,
  /// Open-ended when absent.
  pub end:   Option<DateTime<Utc>>,
}

/// `POST /users/{id}/deactivate`
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<DeactivateBody>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: PlatformStore,
{
  ensure_self(caller, id)?;
  live_account(&*state.store, id).await?;

  let start = body.start.unwrap_or_else(Utc::now);
  if body.end.is_some_and(|end| end <= start) {
    return Err(ApiError::BadRequest("deactivation must end after it starts".into()));
  }

  let account = state
    .store
    .set_deactivation(id, Deactivation::window(start, body.end))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  tracing::info!(account_id = %id, %start, end = ?body.end, "account deactivated");
  Ok(Json(ProfileView::from(&account)))
}

/// `POST /users/{id}/reactivate`
pub async fn reactivate<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: PlatformStore,
{
  ensure_self(caller, id)?;
  live_account(&*state.store, id).await?;

  let account = state
    .store
    .clear_deactivation(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  tracing::info!(account_id = %id, "account reactivated");
  Ok(Json(ProfileView::from(&account)))
}
