//! Deactivation windows and the policy that gates authentication.
//!
//! A deactivation is a `[start, end)` window, `end` optional, during which an
//! account may not authenticate. Every function here takes `now` from the
//! caller and never reads the clock itself, so one authentication attempt
//! compares every boundary against the same instant.
//!
//! | flag  | start  | end    | `now`               | blocked |
//! |-------|--------|--------|---------------------|---------|
//! | false | any    | any    | any                 | no      |
//! | true  | `None` | any    | any                 | no      |
//! | true  | `T0`   | any    | `now <= T0`         | no      |
//! | true  | `T0`   | `None` | `now > T0`          | yes     |
//! | true  | `T0`   | `T1`   | `T0 < now < T1`     | yes     |
//! | true  | `T0`   | `T1`   | `now >= T1`         | no      |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{account::Account, store::AccountStore};

// ─── Stored state ────────────────────────────────────────────────────────────

/// Deactivation fields as stored on an [`Account`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deactivation {
  pub deactivated: bool,
  pub start:       Option<DateTime<Utc>>,
  pub end:         Option<DateTime<Utc>>,
}

/// Where a deactivation sits relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
  /// Not deactivated. Stale dates are ignored.
  Active,
  /// Flagged, but the window has not begun or has no start at all.
  Pending,
  /// Inside the window, or past the start of an open-ended one.
  Blocked,
  /// Flagged, but the window has lapsed.
  Expired,
}

impl Deactivation {
  /// A deactivation that starts at `start` and lasts until `end`, or
  /// indefinitely when `end` is `None`.
  pub fn window(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
    Self { deactivated: true, start: Some(start), end }
  }

  pub fn state(&self, now: DateTime<Utc>) -> WindowState {
    if !self.deactivated {
      return WindowState::Active;
    }
    // A flag without a start date never blocks. This may not be what the
    // product wants, but it is the established behaviour.
    let Some(start) = self.start else {
      return WindowState::Pending;
    };
    if now <= start {
      return WindowState::Pending;
    }
    match self.end {
      None => WindowState::Blocked,
      Some(end) if now < end => WindowState::Blocked,
      Some(_) => WindowState::Expired,
    }
  }

  pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
    self.state(now) == WindowState::Blocked
  }

  /// `true` when the flag is still set but `now` is strictly after `end`.
  ///
  /// Note the boundary: at exactly `now == end` the account is already
  /// unblocked but not yet eligible for clearing.
  pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
    self.deactivated && self.end.is_some_and(|end| now > end)
  }
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

/// Is `account` currently barred from authenticating?
///
/// Pure; never fails. Turning `true` into a denied login is the caller's job.
pub fn is_blocked(account: &Account, now: DateTime<Utc>) -> bool {
  account.deactivation.is_blocked(now)
}

/// Clear a lapsed deactivation and persist the change.
///
/// Returns the account unchanged, without touching the store, unless the
/// flag is set and `now` is after the window's end. Calling it again on the
/// returned account is a no-op.
pub async fn reconcile_if_expired<S>(
  store:   &S,
  account: Account,
  now:     DateTime<Utc>,
) -> Result<Account, S::Error>
where
  S: AccountStore,
{
  if !account.deactivation.is_lapsed(now) {
    return Ok(account);
  }

  let refreshed = store.clear_deactivation(account.account_id).await?;
  Ok(refreshed.unwrap_or(Account {
    deactivation: Deactivation::default(),
    ..account
  }))
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use chrono::{Duration, TimeZone};
  use uuid::Uuid;

  use super::*;
  use crate::{
    account::{NewAccount, Profile, ProfileUpdate},
    page::{Page, PageRequest},
    store::Store,
  };

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() }

  fn account(deactivation: Deactivation) -> Account {
    Account {
      account_id: Uuid::new_v4(),
      username: "ada".into(),
      email: "ada@example.com".into(),
      password_hash: None,
      profile: Profile::default(),
      is_public: true,
      deleted: false,
      deactivation,
      created_at: t0() - Duration::days(30),
      updated_at: t0() - Duration::days(30),
    }
  }

  /// Counts `clear_deactivation` calls; everything else is unreachable.
  #[derive(Default)]
  struct CountingStore {
    clears: AtomicUsize,
  }

  impl Store for CountingStore {
    type Error = std::convert::Infallible;
  }

  impl AccountStore for CountingStore {
    async fn create_account(&self, _: NewAccount) -> Result<Account, Self::Error> { unimplemented!() }
    async fn get_account(&self, _: Uuid) -> Result<Option<Account>, Self::Error> { unimplemented!() }
    async fn find_account_by_username(&self, _: &str) -> Result<Option<Account>, Self::Error> { unimplemented!() }
    async fn find_account_by_email(&self, _: &str) -> Result<Option<Account>, Self::Error> { unimplemented!() }
    async fn list_accounts(&self, _: PageRequest) -> Result<Page<Account>, Self::Error> { unimplemented!() }
    async fn get_accounts(&self, _: &[Uuid]) -> Result<Vec<Account>, Self::Error> { unimplemented!() }
    async fn update_profile(&self, _: Uuid, _: ProfileUpdate) -> Result<Option<Account>, Self::Error> { unimplemented!() }
    async fn mark_deleted(&self, _: Uuid) -> Result<bool, Self::Error> { unimplemented!() }
    async fn set_deactivation(&self, _: Uuid, _: Deactivation) -> Result<Option<Account>, Self::Error> { unimplemented!() }
    async fn clear_deactivation(&self, _: Uuid) -> Result<Option<Account>, Self::Error> {
      self.clears.fetch_add(1, Ordering::SeqCst);
      Ok(None)
    }
  }

  // ── is_blocked ──────────────────────────────────────────────────────────

  #[test]
  fn not_deactivated_ignores_stale_dates() {
    let stale = Deactivation {
      deactivated: false,
      start:       Some(t0() - Duration::days(1)),
      end:         None,
    };
    for offset in [-48, -1, 0, 1, 48] {
      let now = t0() + Duration::hours(offset);
      assert!(!is_blocked(&account(stale), now), "offset {offset}h");
      assert_eq!(stale.state(now), WindowState::Active);
    }
  }

  /// Pins the current behaviour: a flag without a start date does not block.
  /// Whether it should block immediately is an open product question.
  #[test]
  fn flag_without_start_never_blocks() {
    let d = Deactivation { deactivated: true, start: None, end: Some(t0()) };
    for offset in [-48, 0, 48] {
      let now = t0() + Duration::hours(offset);
      assert!(!d.is_blocked(now));
      assert_eq!(d.state(now), WindowState::Pending);
    }
  }

  #[test]
  fn open_ended_window_blocks_strictly_after_start() {
    let d = Deactivation::window(t0(), None);
    assert!(!d.is_blocked(t0() - Duration::seconds(1)));
    assert!(!d.is_blocked(t0()));
    assert!(d.is_blocked(t0() + Duration::milliseconds(1)));
    assert!(d.is_blocked(t0() + Duration::days(3650)));
  }

  #[test]
  fn bounded_window_is_exclusive_on_both_ends() {
    let t1 = t0() + Duration::hours(6);
    let d = Deactivation::window(t0(), Some(t1));

    assert!(!d.is_blocked(t0()));
    assert!(d.is_blocked(t0() + Duration::seconds(1)));
    assert!(d.is_blocked(t1 - Duration::seconds(1)));
    assert!(!d.is_blocked(t1));
    assert!(!d.is_blocked(t1 + Duration::days(1)));

    assert_eq!(d.state(t0()), WindowState::Pending);
    assert_eq!(d.state(t0() + Duration::hours(1)), WindowState::Blocked);
    assert_eq!(d.state(t1), WindowState::Expired);
  }

  #[test]
  fn inverted_window_never_blocks() {
    let d = Deactivation::window(t0(), Some(t0() - Duration::hours(1)));
    for offset in [-2, 0, 2] {
      assert!(!d.is_blocked(t0() + Duration::hours(offset)));
    }
  }

  #[test]
  fn lapsed_only_strictly_after_end() {
    let t1 = t0() + Duration::hours(1);
    let d = Deactivation::window(t0(), Some(t1));
    assert!(!d.is_lapsed(t1));
    assert!(d.is_lapsed(t1 + Duration::seconds(1)));
    assert!(!Deactivation::window(t0(), None).is_lapsed(t1 + Duration::days(9)));
  }

  // ── reconcile_if_expired ────────────────────────────────────────────────

  #[tokio::test]
  async fn reconcile_clears_lapsed_window_once() {
    let store = CountingStore::default();
    let d = Deactivation::window(t0(), Some(t0() + Duration::hours(1)));
    let now = t0() + Duration::days(2);

    let first = reconcile_if_expired(&store, account(d), now).await.unwrap();
    assert_eq!(first.deactivation, Deactivation::default());
    assert_eq!(store.clears.load(Ordering::SeqCst), 1);

    let second = reconcile_if_expired(&store, first, now).await.unwrap();
    assert_eq!(second.deactivation, Deactivation::default());
    assert_eq!(store.clears.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn reconcile_leaves_active_window_alone() {
    let store = CountingStore::default();
    let d = Deactivation::window(t0(), Some(t0() + Duration::hours(1)));

    let out = reconcile_if_expired(&store, account(d), t0() + Duration::minutes(5))
      .await
      .unwrap();
    assert_eq!(out.deactivation, d);
    assert_eq!(store.clears.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn reconcile_never_clears_open_ended_window() {
    let store = CountingStore::default();
    let d = Deactivation::window(t0(), None);

    let out = reconcile_if_expired(&store, account(d), t0() + Duration::days(400))
      .await
      .unwrap();
    assert!(out.deactivation.deactivated);
    assert_eq!(store.clears.load(Ordering::SeqCst), 0);
  }
}
