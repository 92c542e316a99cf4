//! Authentication: the shared admission gate, bearer tokens, and the two
//! login entry points (password and OAuth2).

pub mod caller;
pub mod oauth;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use skillshare_core::{
  account::Account,
  deactivation::{self, reconcile_if_expired},
  store::AccountStore,
};

use crate::error::ApiError;

pub use caller::Caller;

/// Decide whether a verified `account` may have a session.
///
/// Clears a lapsed deactivation first, then refuses an account still inside
/// its window. Every login path goes through here with a single `now`.
pub async fn admit<S: AccountStore>(
  store:   &S,
  account: Account,
  now:     DateTime<Utc>,
) -> Result<Account, ApiError> {
  let lapsed = account.deactivation.is_lapsed(now);
  let account = reconcile_if_expired(store, account, now)
    .await
    .map_err(ApiError::store)?;
  if lapsed {
    tracing::info!(account_id = %account.account_id, "expired deactivation cleared");
  }

  if deactivation::is_blocked(&account, now) {
    tracing::warn!(account_id = %account.account_id, "login denied: account deactivated");
    return Err(ApiError::AccountBlocked);
  }
  Ok(account)
}
