//! [`EngagementStore`] for [`SqliteStore`]: likes and comments.

use rusqlite::OptionalExtension as _;
use skillshare_core::{
  page::{Page, PageRequest},
  post::{Comment, Like},
  store::EngagementStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{COMMENT_COLUMNS, RawComment, RawLike, decode_count, encode_dt, encode_uuid, now},
  store::{SqliteStore, bounds},
};

impl EngagementStore for SqliteStore {
  // ── Likes ─────────────────────────────────────────────────────────────────

  async fn find_like(&self, post_id: Uuid, account_id: Uuid) -> Result<Option<Like>> {
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);

    let raw: Option<RawLike> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT like_id, post_id, account_id, liked_at
               FROM likes WHERE post_id = ?1 AND account_id = ?2",
              rusqlite::params![post_str, account_str],
              RawLike::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLike::into_like).transpose()
  }

  async fn add_like(&self, post_id: Uuid, account_id: Uuid) -> Result<Option<Like>> {
    let like = Like {
      like_id: Uuid::new_v4(),
      post_id,
      account_id,
      liked_at: now(),
    };

    let id_str      = encode_uuid(like.like_id);
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);
    let at_str      = encode_dt(like.liked_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO likes (like_id, post_id, account_id, liked_at) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (post_id, account_id) DO NOTHING",
          rusqlite::params![id_str, post_str, account_str, at_str],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(like))
  }

  async fn remove_like(&self, post_id: Uuid, account_id: Uuid) -> Result<bool> {
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM likes WHERE post_id = ?1 AND account_id = ?2",
          rusqlite::params![post_str, account_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn count_likes(&self, post_id: Uuid) -> Result<u64> {
    let post_str = encode_uuid(post_id);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
          rusqlite::params![post_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    decode_count(n)
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, post_id: Uuid, account_id: Uuid, content: String) -> Result<Comment> {
    let at = now();
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      post_id,
      account_id,
      content,
      commented_at: at,
      updated_at: at,
    };

    let id_str      = encode_uuid(comment.comment_id);
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);
    let body        = comment.content.clone();
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, post_id, account_id, content, commented_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, post_str, account_str, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
              rusqlite::params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(&self, post_id: Uuid, page: PageRequest) -> Result<Page<Comment>> {
    let post_str = encode_uuid(post_id);
    let (limit, offset) = bounds(page);

    let (raws, total): (Vec<RawComment>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
          rusqlite::params![post_str],
          |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE post_id = ?1
           ORDER BY commented_at DESC, rowid DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post_str, limit, offset], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawComment::into_comment)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, decode_count(total)?, page))
  }

  async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE comments SET content = ?2, updated_at = ?3 WHERE comment_id = ?1",
          rusqlite::params![id_str, content, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
              rusqlite::params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM comments WHERE comment_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }
}
