//! Password hashing and `POST /auth/login`.

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _, password_hash::SaltString,
};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use skillshare_core::store::{AccountStore as _, PlatformStore};

use crate::{AppState, auth::admit, error::ApiError, views::ProfileView};

/// Produce an argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// `false` for a wrong password and for a malformed stored hash alike.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Verified against when there is no real hash, so a missing account costs
/// the same argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
  LazyLock::new(|| hash_password("skillshare-dummy-password").ok());

fn burn_verification(password: &str) {
  if let Some(phc) = DUMMY_HASH.as_deref() {
    verify_password(password, phc);
  }
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:      String,
  pub token_type: &'static str,
  pub expires_at: DateTime<Utc>,
  pub user:       ProfileView,
}

/// `POST /auth/login` — body: `{"username":"…","password":"…"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: PlatformStore,
{
  let now = Utc::now();

  let account = state
    .store
    .find_account_by_username(&body.username)
    .await
    .map_err(ApiError::store)?
    .filter(|a| !a.deleted);

  let Some(account) = account.filter(|a| a.password_hash.is_some()) else {
    burn_verification(&body.password);
    return Err(ApiError::InvalidCredentials);
  };
  let verified = account
    .password_hash
    .as_deref()
    .is_some_and(|phc| verify_password(&body.password, phc));
  if !verified {
    return Err(ApiError::InvalidCredentials);
  }

  let account = admit(&*state.store, account, now).await?;
  let issued = state.tokens.issue(account.account_id, now)?;
  tracing::debug!(account_id = %account.account_id, "password login");

  Ok(Json(LoginResponse {
    token:      issued.token,
    token_type: "Bearer",
    expires_at: issued.expires_at,
    user:       ProfileView::from(&account),
  }))
}
