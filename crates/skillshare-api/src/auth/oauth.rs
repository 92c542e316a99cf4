//! OAuth2 authorization-code login.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/auth/oauth2/authorize` | 303 to the provider, sets the `oauth_state` cookie |
//! | `GET`  | `/auth/oauth2/callback`  | 303 to the frontend success or error URL |
//!
//! The provider exchange sits behind [`IdentityProvider`] so tests can stand
//! in for the network.

use std::{sync::Arc, time::Duration};

use axum::{
  extract::{Query, State},
  http::{HeaderMap, header},
  response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt as _};
use rand_core::{OsRng, RngCore as _};
use reqwest::Url;
use serde::Deserialize;
use skillshare_core::{
  account::{Account, NewAccount, Profile},
  store::{AccountStore, PlatformStore},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{AppState, auth::admit, error::ApiError};

/// Cookie carrying the anti-forgery `state` between the two legs.
pub const STATE_COOKIE: &str = "oauth_state";

/// Shown on the frontend when a deactivated account signs in.
pub const DEACTIVATED_MESSAGE: &str =
  "Your account has been deactivated. Please contact support for assistance.";

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
  pub client_id:        String,
  pub client_secret:    String,
  pub authorize_url:    String,
  pub token_url:        String,
  pub userinfo_url:     String,
  /// Our callback, as registered with the provider.
  pub redirect_uri:     String,
  #[serde(default = "default_scopes")]
  pub scopes:           Vec<String>,
  /// Frontend page receiving `?token=&user_id=`.
  pub success_redirect: String,
  /// Frontend page receiving `?error=`.
  pub error_redirect:   String,
}

fn default_scopes() -> Vec<String> {
  ["openid", "email", "profile"].map(String::from).to_vec()
}

// ─── Provider ─────────────────────────────────────────────────────────────────

/// What the provider tells us about the person signing in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
  pub email:   String,
  pub name:    Option<String>,
  pub picture: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("provider returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("malformed provider response: {0}")]
  Malformed(String),
}

/// Exchanges an authorization code for the signed-in identity.
pub trait IdentityProvider: Send + Sync {
  fn exchange<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<ProviderIdentity, ProviderError>>;
}

/// Token endpoint, then userinfo endpoint, over HTTPS.
pub struct HttpIdentityProvider {
  client: reqwest::Client,
  config: OAuthConfig,
}

impl HttpIdentityProvider {
  pub fn new(config: OAuthConfig) -> Result<Self, ProviderError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  async fn fetch(&self, code: &str) -> Result<ProviderIdentity, ProviderError> {
    let token_resp = self
      .client
      .post(&self.config.token_url)
      .header("Accept", "application/json")
      .form(&[
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", self.config.client_id.as_str()),
        ("client_secret", self.config.client_secret.as_str()),
        ("redirect_uri", self.config.redirect_uri.as_str()),
      ])
      .send()
      .await?;
    let token_json = json_body(token_resp).await?;
    let access_token = token_json["access_token"]
      .as_str()
      .ok_or_else(|| ProviderError::Malformed("missing access_token".into()))?;

    let userinfo_resp = self
      .client
      .get(&self.config.userinfo_url)
      .bearer_auth(access_token)
      .send()
      .await?;
    let info = json_body(userinfo_resp).await?;
    identity_from_userinfo(&info)
  }
}

impl IdentityProvider for HttpIdentityProvider {
  fn exchange<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<ProviderIdentity, ProviderError>> {
    self.fetch(code).boxed()
  }
}

async fn json_body(resp: reqwest::Response) -> Result<serde_json::Value, ProviderError> {
  let status = resp.status();
  if !status.is_success() {
    let body = resp.text().await.unwrap_or_default();
    return Err(ProviderError::Status { status: status.as_u16(), body });
  }
  Ok(resp.json().await?)
}

/// Pull the fields we use out of a userinfo document. Providers disagree on
/// the avatar key, so both common spellings are accepted.
pub fn identity_from_userinfo(info: &serde_json::Value) -> Result<ProviderIdentity, ProviderError> {
  let email = info["email"]
    .as_str()
    .filter(|e| !e.is_empty())
    .ok_or_else(|| ProviderError::Malformed("userinfo has no email".into()))?;
  let text = |key: &str| info[key].as_str().filter(|s| !s.is_empty()).map(String::from);

  Ok(ProviderIdentity {
    email:   email.to_owned(),
    name:    text("name"),
    picture: text("picture").or_else(|| text("avatar_url")),
  })
}

// ─── Flow ─────────────────────────────────────────────────────────────────────

pub struct OAuthFlow {
  pub config:   OAuthConfig,
  pub provider: Arc<dyn IdentityProvider>,
}

impl OAuthFlow {
  pub fn new(config: OAuthConfig, provider: Arc<dyn IdentityProvider>) -> Self {
    Self { config, provider }
  }

  /// A flow talking to the configured provider over HTTP.
  pub fn http(config: OAuthConfig) -> Result<Self, ProviderError> {
    let provider = HttpIdentityProvider::new(config.clone())?;
    Ok(Self::new(config, Arc::new(provider)))
  }

  pub fn authorize_url(&self, state: &str) -> Result<String, ApiError> {
    let scopes = self.config.scopes.join(" ");
    with_query(&self.config.authorize_url, &[
      ("response_type", "code"),
      ("client_id", self.config.client_id.as_str()),
      ("redirect_uri", self.config.redirect_uri.as_str()),
      ("scope", scopes.as_str()),
      ("state", state),
    ])
  }

  fn success_url(&self, token: &str, account_id: Uuid) -> Result<String, ApiError> {
    with_query(&self.config.success_redirect, &[
      ("token", token),
      ("user_id", account_id.to_string().as_str()),
    ])
  }

  fn error_url(&self, message: &str) -> Result<String, ApiError> {
    with_query(&self.config.error_redirect, &[("error", message)])
  }
}

fn with_query(base: &str, pairs: &[(&str, &str)]) -> Result<String, ApiError> {
  let mut url = Url::parse(base)
    .map_err(|e| ApiError::Internal(format!("invalid oauth url {base:?}: {e}")))?;
  url.query_pairs_mut().extend_pairs(pairs);
  Ok(url.into())
}

fn random_state() -> String {
  let mut bytes = [0u8; 16];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v)
}

fn configured<S>(state: &AppState<S>) -> Result<Arc<OAuthFlow>, ApiError> {
  state
    .oauth
    .clone()
    .ok_or_else(|| ApiError::NotFound("oauth2 login is not configured".into()))
}

// ─── Authorize ────────────────────────────────────────────────────────────────

/// `GET /auth/oauth2/authorize`
pub async fn authorize<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: PlatformStore,
{
  let flow = configured(&state)?;
  let nonce = random_state();
  let url = flow.authorize_url(&nonce)?;
  let cookie = format!("{STATE_COOKIE}={nonce}; Path=/; Max-Age=600; HttpOnly; SameSite=Lax");
  Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&url)).into_response())
}

// ─── Callback ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
  pub code:  Option<String>,
  pub state: Option<String>,
  pub error: Option<String>,
}

/// Why the callback sent the browser to the error page.
enum Denied {
  Message(&'static str),
  Api(ApiError),
}

impl From<ApiError> for Denied {
  fn from(e: ApiError) -> Self { Denied::Api(e) }
}

/// `GET /auth/oauth2/callback?code=&state=`
pub async fn callback<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError>
where
  S: PlatformStore,
{
  let flow = configured(&state)?;
  let clear_cookie = format!("{STATE_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");

  let target = match complete(&state, &flow, &headers, params).await {
    Ok(url) => url,
    Err(Denied::Message(message)) => flow.error_url(message)?,
    Err(Denied::Api(ApiError::AccountBlocked)) => flow.error_url(DEACTIVATED_MESSAGE)?,
    Err(Denied::Api(e)) => return Err(e),
  };
  Ok(([(header::SET_COOKIE, clear_cookie)], Redirect::to(&target)).into_response())
}

async fn complete<S: PlatformStore>(
  state: &AppState<S>,
  flow: &OAuthFlow,
  headers: &HeaderMap,
  params: CallbackParams,
) -> Result<String, Denied> {
  if let Some(error) = params.error {
    tracing::warn!(%error, "oauth2 provider reported an error");
    return Err(Denied::Message("OAuth2 login was cancelled or refused."));
  }
  let code = params
    .code
    .ok_or(Denied::Message("OAuth2 callback is missing the authorization code."))?;

  let expected = cookie_value(headers, STATE_COOKIE);
  if expected.is_none() || expected != params.state.as_deref() {
    tracing::warn!("oauth2 state mismatch");
    return Err(Denied::Message("OAuth2 login expired. Please try again."));
  }

  let identity = flow.provider.exchange(&code).await.map_err(|e| {
    tracing::warn!(error = %e, "oauth2 exchange failed");
    Denied::Message("Could not sign in with the identity provider.")
  })?;

  let now = Utc::now();
  let account = find_or_create(&*state.store, &identity).await?;
  if account.deleted {
    return Err(Denied::Message("This account has been deleted."));
  }
  let account = admit(&*state.store, account, now).await?;
  let issued = state.tokens.issue(account.account_id, now)?;

  Ok(flow.success_url(&issued.token, account.account_id)?)
}

/// The local account for `identity`'s email, created on first sign-in.
pub async fn find_or_create<S: AccountStore>(
  store: &S,
  identity: &ProviderIdentity,
) -> Result<Account, ApiError> {
  if let Some(account) = store
    .find_account_by_email(&identity.email)
    .await
    .map_err(ApiError::store)?
  {
    return Ok(account);
  }

  let username = free_username(store, &identity.email).await?;
  let (first_name, last_name) = split_name(identity.name.as_deref().unwrap_or(&username));

  let account = store
    .create_account(NewAccount {
      username,
      email: identity.email.clone(),
      password_hash: None,
      profile: Profile {
        first_name,
        last_name,
        profile_image_url: identity.picture.clone(),
        ..Profile::default()
      },
      is_public: true,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(account_id = %account.account_id, "account created from oauth2 login");
  Ok(account)
}

/// The email's local part, suffixed when already taken.
async fn free_username<S: AccountStore>(store: &S, email: &str) -> Result<String, ApiError> {
  let base: String = email
    .split('@')
    .next()
    .unwrap_or_default()
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    .collect();
  let base = if base.is_empty() { "user".to_owned() } else { base };

  let mut candidate = base.clone();
  loop {
    let taken = store
      .find_account_by_username(&candidate)
      .await
      .map_err(ApiError::store)?
      .is_some();
    if !taken {
      return Ok(candidate);
    }
    let suffix = Uuid::new_v4().simple().to_string();
    candidate = format!("{base}-{}", &suffix[..6]);
  }
}

/// `"Ada King Lovelace"` → `("Ada", "King Lovelace")`.
fn split_name(name: &str) -> (String, String) {
  let name = name.trim();
  match name.split_once(char::is_whitespace) {
    Some((first, rest)) => (first.to_owned(), rest.trim().to_owned()),
    None => (name.to_owned(), String::new()),
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use serde_json::json;

  use super::*;

  fn config() -> OAuthConfig {
    OAuthConfig {
      client_id:        "client".into(),
      client_secret:    "secret".into(),
      authorize_url:    "https://idp.example/authorize".into(),
      token_url:        "https://idp.example/token".into(),
      userinfo_url:     "https://idp.example/userinfo".into(),
      redirect_uri:     "http://localhost:8080/api/auth/oauth2/callback".into(),
      scopes:           default_scopes(),
      success_redirect: "http://localhost:3000/oauth2/success".into(),
      error_redirect:   "http://localhost:3000/login".into(),
    }
  }

  #[test]
  fn authorize_url_carries_client_and_state() {
    let flow = OAuthFlow::http(config()).unwrap();
    let url = Url::parse(&flow.authorize_url("abc123").unwrap()).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    assert_eq!(url.host_str(), Some("idp.example"));
    assert!(pairs.contains(&("client_id".into(), "client".into())));
    assert!(pairs.contains(&("state".into(), "abc123".into())));
    assert!(pairs.contains(&("scope".into(), "openid email profile".into())));
    assert!(pairs.contains(&("response_type".into(), "code".into())));
  }

  #[test]
  fn error_url_encodes_message() {
    let flow = OAuthFlow::http(config()).unwrap();
    let url = Url::parse(&flow.error_url(DEACTIVATED_MESSAGE).unwrap()).unwrap();
    let error = url
      .query_pairs()
      .find(|(k, _)| k == "error")
      .map(|(_, v)| v.into_owned());
    assert_eq!(error.as_deref(), Some(DEACTIVATED_MESSAGE));
  }

  #[test]
  fn userinfo_accepts_either_avatar_key() {
    let google = identity_from_userinfo(&json!({
      "email": "ada@example.com", "name": "Ada Lovelace", "picture": "https://img/a.png"
    }))
    .unwrap();
    assert_eq!(google.picture.as_deref(), Some("https://img/a.png"));

    let github = identity_from_userinfo(&json!({
      "email": "ada@example.com", "avatar_url": "https://img/b.png"
    }))
    .unwrap();
    assert_eq!(github.picture.as_deref(), Some("https://img/b.png"));
    assert_eq!(github.name, None);

    assert!(identity_from_userinfo(&json!({ "name": "no email" })).is_err());
  }

  #[test]
  fn cookie_lookup_scans_all_pairs() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::COOKIE,
      HeaderValue::from_static("theme=dark; oauth_state=feed; lang=en"),
    );
    assert_eq!(cookie_value(&headers, STATE_COOKIE), Some("feed"));
    assert_eq!(cookie_value(&headers, "missing"), None);
  }

  #[test]
  fn names_split_on_first_space() {
    assert_eq!(split_name("Ada King Lovelace"), ("Ada".into(), "King Lovelace".into()));
    assert_eq!(split_name("Plato"), ("Plato".into(), String::new()));
  }

  #[test]
  fn states_are_unique_hex() {
    let a = random_state();
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, random_state());
  }
}
