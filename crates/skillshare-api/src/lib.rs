//! JSON REST API for SkillShare.
//!
//! Exposes an axum [`Router`] backed by any [`PlatformStore`]. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", skillshare_api::api_router(state))
//! ```

pub mod accounts;
pub mod auth;
pub mod comments;
pub mod error;
pub mod follows;
pub mod goals;
pub mod likes;
pub mod notes;
pub mod notifications;
pub mod params;
pub mod plans;
pub mod posts;
pub mod progress;
pub mod views;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use skillshare_core::store::PlatformStore;

pub use auth::{Caller, oauth::OAuthFlow, token::TokenIssuer};
pub use error::ApiError;

/// Shared state handed to every handler.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenIssuer>,
  /// `None` disables the OAuth2 routes (they answer 404).
  pub oauth:  Option<Arc<OAuthFlow>>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, tokens: TokenIssuer) -> Self {
    Self { store, tokens: Arc::new(tokens), oauth: None }
  }

  pub fn with_oauth(mut self, flow: OAuthFlow) -> Self {
    self.oauth = Some(Arc::new(flow));
    self
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
      oauth:  self.oauth.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PlatformStore + 'static,
{
  Router::new()
    // Authentication
    .route("/auth/login", post(auth::password::login::<S>))
    .route("/auth/oauth2/authorize", get(auth::oauth::authorize::<S>))
    .route("/auth/oauth2/callback", get(auth::oauth::callback::<S>))
    .route("/auth/me", get(accounts::me::<S>))
    // Accounts
    .route("/users/register", post(accounts::register::<S>))
    .route("/users", get(accounts::list::<S>))
    .route(
      "/users/{id}",
      get(accounts::get_one::<S>)
        .put(accounts::update::<S>)
        .delete(accounts::delete_one::<S>),
    )
    .route("/users/{id}/deactivate", post(accounts::deactivate::<S>))
    .route("/users/{id}/reactivate", post(accounts::reactivate::<S>))
    .route("/users/{id}/posts", get(posts::by_author::<S>))
    // Follow graph
    .route("/users/{id}/followers", get(follows::followers::<S>))
    .route("/users/{id}/following", get(follows::following::<S>))
    .route("/users/{id}/follow-counts", get(follows::counts::<S>))
    .route(
      "/users/{id}/follow",
      post(follows::follow::<S>).delete(follows::unfollow::<S>),
    )
    // Posts
    .route("/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route(
      "/posts/{id}",
      get(posts::get_one::<S>)
        .put(posts::update::<S>)
        .delete(posts::delete_one::<S>),
    )
    .route(
      "/posts/{id}/repost",
      post(posts::repost::<S>).delete(posts::unrepost::<S>),
    )
    .route("/posts/{id}/like", post(likes::toggle::<S>).get(likes::status::<S>))
    .route(
      "/posts/{id}/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route(
      "/comments/{id}",
      put(comments::update::<S>).delete(comments::delete_one::<S>),
    )
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
    .route("/notifications/{id}", delete(notifications::delete_one::<S>))
    // Goals
    .route("/goals", get(goals::list::<S>).post(goals::create::<S>))
    .route(
      "/goals/{id}",
      get(goals::get_one::<S>)
        .put(goals::update::<S>)
        .delete(goals::delete_one::<S>),
    )
    // Notes
    .route("/notes", get(notes::list::<S>).post(notes::create::<S>))
    .route(
      "/notes/{id}",
      get(notes::get_one::<S>)
        .put(notes::update::<S>)
        .delete(notes::delete_one::<S>),
    )
    // Learning plans and progress
    .route("/plans", get(plans::list::<S>).post(plans::create::<S>))
    .route("/plans/{id}", get(plans::get_one::<S>).delete(plans::delete_one::<S>))
    .route("/plans/{id}/subtopics/{index}", put(plans::set_subtopic::<S>))
    .route("/progress", get(progress::list::<S>).post(progress::create::<S>))
    .route("/progress/{id}", delete(progress::delete_one::<S>))
    .with_state(state)
}
