//! Server assembly for SkillShare: configuration, application state and the
//! top-level router. The binary in `main.rs` is a thin shell around this.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use chrono::Duration;
use serde::Deserialize;
use skillshare_api::{
  AppState, OAuthFlow, TokenIssuer,
  auth::oauth::{OAuthConfig, ProviderError},
};
use skillshare_store_sqlite::SqliteStore;
use thiserror::Error;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `SKILLSHARE_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  pub store_path:     PathBuf,
  /// HMAC key for session tokens.
  pub jwt_secret:     String,
  #[serde(default = "default_token_ttl")]
  pub token_ttl_secs: u64,
  /// OAuth2 login is disabled when absent.
  #[serde(default)]
  pub oauth:          Option<OAuthConfig>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_token_ttl() -> u64 { 86_400 }

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("jwt_secret must not be empty")]
  EmptySecret,

  #[error("token_ttl_secs {0} is out of range")]
  TokenTtl(u64),

  #[error("oauth provider setup failed: {0}")]
  OAuth(#[from] ProviderError),
}

/// Environment overlay: `SKILLSHARE_PORT`, `SKILLSHARE_OAUTH__CLIENT_ID`, …
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("SKILLSHARE")
    .prefix_separator("_")
    .separator("__")
}

/// Read `path` (optional) overlaid with `env`.
pub fn load_config(
  path: &Path,
  env: config::Environment,
) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(env)
    .build()?
    .try_deserialize()
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn token_issuer(&self) -> Result<TokenIssuer, ConfigError> {
    if self.jwt_secret.is_empty() {
      return Err(ConfigError::EmptySecret);
    }
    let ttl = i64::try_from(self.token_ttl_secs)
      .ok()
      .and_then(Duration::try_seconds)
      .filter(|ttl| *ttl > Duration::zero())
      .ok_or(ConfigError::TokenTtl(self.token_ttl_secs))?;
    Ok(TokenIssuer::new(self.jwt_secret.as_bytes(), ttl))
  }

  /// Application state over `store`, with OAuth2 wired up when configured.
  pub fn state(&self, store: SqliteStore) -> Result<AppState<SqliteStore>, ConfigError> {
    let state = AppState::new(Arc::new(store), self.token_issuer()?);
    Ok(match &self.oauth {
      Some(oauth) => state.with_oauth(OAuthFlow::http(oauth.clone())?),
      None => state,
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API mounted under `/api`, with request tracing.
pub fn app(state: AppState<SqliteStore>) -> Router {
  Router::new()
    .nest("/api", skillshare_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  use super::*;

  fn env(pairs: &[(&str, &str)]) -> config::Environment {
    let map = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    environment().source(Some(map))
  }

  fn missing_file() -> PathBuf { std::env::temp_dir().join("skillshare-no-such-config.toml") }

  #[test]
  fn environment_alone_is_enough() {
    let cfg = load_config(
      &missing_file(),
      env(&[
        ("SKILLSHARE_STORE_PATH", "/tmp/skillshare.db"),
        ("SKILLSHARE_JWT_SECRET", "s3cret"),
        ("SKILLSHARE_PORT", "9000"),
      ]),
    )
    .unwrap();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.token_ttl_secs, 86_400);
    assert!(cfg.oauth.is_none());
    assert_eq!(cfg.address(), "127.0.0.1:9000");
  }

  #[test]
  fn file_with_oauth_section() {
    let path = std::env::temp_dir().join(format!("skillshare-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      r#"
        store_path = "~/skillshare.db"
        jwt_secret = "s3cret"

        [oauth]
        client_id        = "id"
        client_secret    = "secret"
        authorize_url    = "https://accounts.example/authorize"
        token_url        = "https://accounts.example/token"
        userinfo_url     = "https://accounts.example/userinfo"
        redirect_uri     = "http://localhost:8080/api/auth/oauth2/callback"
        success_redirect = "http://localhost:3000/oauth2/success"
        error_redirect   = "http://localhost:3000/login"
      "#,
    )
    .unwrap();

    let cfg = load_config(&path, env(&[("SKILLSHARE_OAUTH__CLIENT_ID", "from-env")])).unwrap();
    std::fs::remove_file(&path).ok();

    let oauth = cfg.oauth.unwrap();
    assert_eq!(oauth.client_id, "from-env");
    assert_eq!(oauth.scopes, ["openid", "email", "profile"]);
  }

  #[test]
  fn token_settings_are_validated() {
    let base = ServerConfig {
      host:           default_host(),
      port:           default_port(),
      store_path:     PathBuf::from(":memory:"),
      jwt_secret:     String::new(),
      token_ttl_secs: default_token_ttl(),
      oauth:          None,
    };
    assert!(matches!(base.token_issuer(), Err(ConfigError::EmptySecret)));

    let zero = ServerConfig { jwt_secret: "k".into(), token_ttl_secs: 0, ..base.clone() };
    assert!(matches!(zero.token_issuer(), Err(ConfigError::TokenTtl(0))));

    let ok = ServerConfig { jwt_secret: "k".into(), ..base };
    assert!(ok.token_issuer().is_ok());
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let cfg = ServerConfig {
      host:           default_host(),
      port:           default_port(),
      store_path:     PathBuf::from(":memory:"),
      jwt_secret:     "k".into(),
      token_ttl_secs: default_token_ttl(),
      oauth:          None,
    };
    let store = SqliteStore::open_in_memory().await.unwrap();
    let router = app(cfg.state(store).unwrap());

    let req = Request::builder().uri("/api/posts").body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder().uri("/posts").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
