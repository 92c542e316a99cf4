//! Handlers for `/notifications` endpoints, plus the fan-out used by the
//! like, comment and repost handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/notifications` | The caller's, newest first; `?unread_only=true` |
//! | `POST`   | `/notifications/{id}/read` | Recipient only |
//! | `DELETE` | `/notifications/{id}` | Recipient only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use skillshare_core::{
  account::Account,
  notification::{Notification, NotificationKind, fan_out},
  page::Page,
  post::Post,
  store::{AccountStore, NotificationStore, PlatformStore},
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError, params::NotificationParams};

/// How an actor is named inside a notification message.
fn display_name(account: &Account) -> String {
  let full = format!("{} {}", account.profile.first_name, account.profile.last_name);
  let full = full.trim();
  if full.is_empty() { account.username.clone() } else { full.to_owned() }
}

/// Tell `post`'s author that `actor_id` interacted with it. Self-interaction
/// produces nothing.
pub(crate) async fn notify<S>(
  store: &S,
  kind: NotificationKind,
  actor_id: Uuid,
  post: &Post,
) -> Result<Option<Notification>, ApiError>
where
  S: AccountStore + NotificationStore,
{
  if actor_id == post.author_id {
    return Ok(None);
  }
  let actor_name = store
    .get_account(actor_id)
    .await
    .map_err(ApiError::store)?
    .map(|a| display_name(&a))
    .unwrap_or_else(|| "Someone".to_owned());

  let Some(input) = fan_out(kind, actor_id, &actor_name, post) else {
    return Ok(None);
  };
  let notification = store
    .create_notification(input)
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(
    recipient = %notification.recipient_id,
    kind = notification.kind.as_str(),
    "notification created"
  );
  Ok(Some(notification))
}

/// The notification `id`, provided the caller received it.
async fn owned<S: NotificationStore>(
  store: &S,
  caller: Caller,
  id: Uuid,
) -> Result<Notification, ApiError> {
  let notification = store
    .get_notification(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("notification {id} not found")))?;
  if notification.recipient_id != caller.account_id {
    return Err(ApiError::Forbidden("not your notification".into()));
  }
  Ok(notification)
}

/// `GET /notifications[?unread_only=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<NotificationParams>,
) -> Result<Json<Page<Notification>>, ApiError>
where
  S: PlatformStore,
{
  let page = state
    .store
    .list_notifications(caller.account_id, params.unread_only, params.page())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `POST /notifications/{id}/read`
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError>
where
  S: PlatformStore,
{
  owned(&*state.store, caller, id).await?;
  let notification = state
    .store
    .mark_notification_read(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("notification {id} not found")))?;
  Ok(Json(notification))
}

/// `DELETE /notifications/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PlatformStore,
{
  owned(&*state.store, caller, id).await?;
  state
    .store
    .delete_notification(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
