//! [`SocialStore`] for [`SqliteStore`]: the follow graph.

use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  account::Account,
  page::{Page, PageRequest},
  social::{Follow, FollowCounts},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{ACCOUNT_COLUMNS, RawAccount, RawFollow, decode_count, encode_dt, encode_uuid, now},
  store::{SqliteStore, bounds},
};

/// Which side of the edge to list.
#[derive(Clone, Copy)]
enum Direction {
  /// Accounts whose `following_id` is the subject.
  Followers,
  /// Accounts the subject follows.
  Following,
}

impl Direction {
  /// `(column matched against the subject, column joined to accounts)`.
  fn columns(self) -> (&'static str, &'static str) {
    match self {
      Self::Followers => ("following_id", "follower_id"),
      Self::Following => ("follower_id", "following_id"),
    }
  }
}

/// Edges to live accounts only; a soft-deleted account drops out of both
/// listings and counts.
fn count_edges(conn: &Connection, subject: &str, direction: Direction) -> rusqlite::Result<i64> {
  let (matched, joined) = direction.columns();
  conn.query_row(
    &format!(
      "SELECT COUNT(*) FROM follows f
       JOIN accounts a ON a.account_id = f.{joined}
       WHERE f.{matched} = ?1 AND a.deleted = 0"
    ),
    rusqlite::params![subject],
    |r| r.get(0),
  )
}

fn page_edges(
  conn: &Connection,
  subject: &str,
  direction: Direction,
  limit: i64,
  offset: i64,
) -> rusqlite::Result<(Vec<RawAccount>, i64)> {
  let (matched, joined) = direction.columns();
  let total = count_edges(conn, subject, direction)?;

  let mut stmt = conn.prepare(&format!(
    "SELECT {ACCOUNT_COLUMNS} FROM follows f
     JOIN accounts a ON a.account_id = f.{joined}
     WHERE f.{matched} = ?1 AND a.deleted = 0
     ORDER BY f.created_at DESC, f.rowid DESC
     LIMIT ?2 OFFSET ?3"
  ))?;
  let rows = stmt
    .query_map(rusqlite::params![subject, limit, offset], RawAccount::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok((rows, total))
}

impl SqliteStore {
  async fn list_edges(
    &self,
    account_id: Uuid,
    direction: Direction,
    page: PageRequest,
  ) -> Result<Page<Account>> {
    let subject = encode_uuid(account_id);
    let (limit, offset) = bounds(page);

    let (raws, total) = self
      .conn
      .call(move |conn| Ok(page_edges(conn, &subject, direction, limit, offset)?))
      .await?;

    let items = raws
      .into_iter()
      .map(RawAccount::into_account)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, decode_count(total)?, page))
  }
}

impl SocialStore for SqliteStore {
  async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Option<Follow>> {
    let follow = Follow {
      follow_id: Uuid::new_v4(),
      follower_id,
      following_id,
      created_at: now(),
    };

    let id_str        = encode_uuid(follow.follow_id);
    let follower_str  = encode_uuid(follower_id);
    let following_str = encode_uuid(following_id);
    let at_str        = encode_dt(follow.created_at);

    // A duplicate pair is skipped; the self-follow CHECK still fails.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO follows (follow_id, follower_id, following_id, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (follower_id, following_id) DO NOTHING",
          rusqlite::params![id_str, follower_str, following_str, at_str],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(follow))
  }

  async fn find_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Option<Follow>> {
    let follower_str  = encode_uuid(follower_id);
    let following_str = encode_uuid(following_id);

    let raw: Option<RawFollow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT follow_id, follower_id, following_id, created_at
               FROM follows WHERE follower_id = ?1 AND following_id = ?2",
              rusqlite::params![follower_str, following_str],
              RawFollow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFollow::into_follow).transpose()
  }

  async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
    let follower_str  = encode_uuid(follower_id);
    let following_str = encode_uuid(following_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
          rusqlite::params![follower_str, following_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn list_followers(&self, account_id: Uuid, page: PageRequest) -> Result<Page<Account>> {
    self.list_edges(account_id, Direction::Followers, page).await
  }

  async fn list_following(&self, account_id: Uuid, page: PageRequest) -> Result<Page<Account>> {
    self.list_edges(account_id, Direction::Following, page).await
  }

  async fn follow_counts(&self, account_id: Uuid) -> Result<FollowCounts> {
    let subject = encode_uuid(account_id);

    let (followers, following): (i64, i64) = self
      .conn
      .call(move |conn| {
        Ok((
          count_edges(conn, &subject, Direction::Followers)?,
          count_edges(conn, &subject, Direction::Following)?,
        ))
      })
      .await?;

    Ok(FollowCounts {
      followers: decode_count(followers)?,
      following: decode_count(following)?,
    })
  }
}
