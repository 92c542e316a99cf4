//! [`AccountStore`] for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  account::{Account, NewAccount, ProfileUpdate},
  deactivation::Deactivation,
  page::{Page, PageRequest},
  store::AccountStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{ACCOUNT_COLUMNS, RawAccount, decode_count, encode_date, encode_dt, encode_uuid, now},
  store::{SqliteStore, bounds},
};

/// Fetch one account row by id. Runs on the connection thread.
pub(crate) fn select_account(
  conn: &Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawAccount>> {
  conn
    .query_row(
      &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.account_id = ?1"),
      rusqlite::params![id_str],
      RawAccount::from_row,
    )
    .optional()
}

impl SqliteStore {
  async fn account_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.{column} = ?1"),
              rusqlite::params![value],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

impl AccountStore for SqliteStore {
  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let at = now();
    let account = Account {
      account_id:    Uuid::new_v4(),
      username:      input.username,
      email:         input.email,
      password_hash: input.password_hash,
      profile:       input.profile,
      is_public:     input.is_public,
      deleted:       false,
      deactivation:  Deactivation::default(),
      created_at:    at,
      updated_at:    at,
    };

    let id_str   = encode_uuid(account.account_id);
    let username = account.username.clone();
    let email    = account.email.clone();
    let hash     = account.password_hash.clone();
    let profile  = account.profile.clone();
    let birthday = profile.birthday.map(encode_date);
    let public   = account.is_public;
    let at_str   = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             account_id, username, email, password_hash,
             first_name, last_name, bio, profile_image_url,
             contact_number, gender, address, birthday,
             is_public, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
          rusqlite::params![
            id_str,
            username,
            email,
            hash,
            profile.first_name,
            profile.last_name,
            profile.bio,
            profile.profile_image_url,
            profile.contact_number,
            profile.gender,
            profile.address,
            birthday,
            public,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_account(conn, &id_str)?))
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
    self.account_where("username", username.to_owned()).await
  }

  async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    // The column is declared COLLATE NOCASE, so `=` is case-insensitive.
    self.account_where("email", email.to_owned()).await
  }

  async fn list_accounts(&self, page: PageRequest) -> Result<Page<Account>> {
    let (limit, offset) = bounds(page);

    let (raws, total): (Vec<RawAccount>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM accounts WHERE deleted = 0",
          [],
          |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACCOUNT_COLUMNS} FROM accounts a
           WHERE a.deleted = 0
           ORDER BY a.username
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawAccount::into_account)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, decode_count(total)?, page))
  }

  async fn get_accounts(&self, ids: &[Uuid]) -> Result<Vec<Account>> {
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let mut out = Vec::with_capacity(id_strs.len());
        for id in &id_strs {
          if let Some(raw) = select_account(conn, id)? {
            out.push(raw);
          }
        }
        Ok(out)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<Account>> {
    let id_str   = encode_uuid(id);
    let profile  = update.profile;
    let birthday = profile.birthday.map(encode_date);
    let public   = update.is_public;
    let hash     = update.password_hash;
    let at_str   = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE accounts SET
             first_name = ?2, last_name = ?3, bio = ?4, profile_image_url = ?5,
             contact_number = ?6, gender = ?7, address = ?8, birthday = ?9,
             is_public = ?10,
             password_hash = COALESCE(?11, password_hash),
             updated_at = ?12
           WHERE account_id = ?1",
          rusqlite::params![
            id_str,
            profile.first_name,
            profile.last_name,
            profile.bio,
            profile.profile_image_url,
            profile.contact_number,
            profile.gender,
            profile.address,
            birthday,
            public,
            hash,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_account(conn, &id_str)?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn mark_deleted(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET deleted = 1, updated_at = ?2
           WHERE account_id = ?1 AND deleted = 0",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn set_deactivation(
    &self,
    id: Uuid,
    deactivation: Deactivation,
  ) -> Result<Option<Account>> {
    let id_str    = encode_uuid(id);
    let start_str = deactivation.start.map(encode_dt);
    let end_str   = deactivation.end.map(encode_dt);
    let flag      = deactivation.deactivated;
    let at_str    = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE accounts SET
             deactivated = ?2, deactivation_start = ?3, deactivation_end = ?4,
             updated_at = ?5
           WHERE account_id = ?1",
          rusqlite::params![id_str, flag, start_str, end_str, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_account(conn, &id_str)?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn clear_deactivation(&self, id: Uuid) -> Result<Option<Account>> {
    self.set_deactivation(id, Deactivation::default()).await
  }
}
