//! Accounts: registered identities that can authenticate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deactivation::Deactivation;

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Free-form profile fields. None of these take part in authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub first_name:        String,
  pub last_name:         String,
  pub bio:               Option<String>,
  pub profile_image_url: Option<String>,
  pub contact_number:    Option<String>,
  pub gender:            Option<String>,
  pub address:           Option<String>,
  pub birthday:          Option<NaiveDate>,
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// A registered account.
///
/// The account record is the sole owner of its deactivation state; no other
/// entity references it.
#[derive(Debug, Clone)]
pub struct Account {
  pub account_id:    Uuid,
  pub username:      String,
  pub email:         String,
  /// Argon2 PHC string. `None` for accounts created through OAuth2, which
  /// can never log in with a password.
  pub password_hash: Option<String>,
  pub profile:       Profile,
  pub is_public:     bool,
  /// Soft-delete flag. Deleted accounts are invisible to lookups by id.
  pub deleted:       bool,
  pub deactivation:  Deactivation,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input to [`crate::store::AccountStore::create_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  pub email:         String,
  pub password_hash: Option<String>,
  pub profile:       Profile,
  pub is_public:     bool,
}

/// Full replacement of the mutable profile fields.
///
/// `password_hash` is only written when `Some`; the existing hash is kept
/// otherwise.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
  pub profile:       Profile,
  pub is_public:     bool,
  pub password_hash: Option<String>,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The public face of an account, embedded in posts, comments and follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
  pub account_id:        Uuid,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub profile_image_url: Option<String>,
}

impl From<&Account> for AccountSummary {
  fn from(a: &Account) -> Self {
    Self {
      account_id:        a.account_id,
      username:          a.username.clone(),
      first_name:        a.profile.first_name.clone(),
      last_name:         a.profile.last_name.clone(),
      profile_image_url: a.profile.profile_image_url.clone(),
    }
  }
}
